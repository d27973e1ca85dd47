use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use sqlx::{Pool, Sqlite};

use crate::analytics::{CompetitionSummary, MemberRecord, competition_summary, member_records};
use crate::auth::{Permission, User};
use crate::db::{MemberFilter, get_competition_overview, list_members, load_results_ledger};

#[get("/analytics/members?<club_id>&<martial_art_id>")]
pub async fn api_member_analytics(
    club_id: Option<i64>,
    martial_art_id: Option<i64>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<MemberRecord>>, Status> {
    user.require_permission(Permission::ViewAnalytics)?;

    let filter = MemberFilter {
        club_id,
        martial_art_id,
        ..MemberFilter::default()
    };
    let members = list_members(db, &filter).await?;
    let ledger = load_results_ledger(db).await?;

    Ok(Json(member_records(&members, &ledger)))
}

#[get("/analytics/competitions/<id>")]
pub async fn api_competition_analytics(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CompetitionSummary>, Status> {
    user.require_permission(Permission::ViewAnalytics)?;

    let overview = get_competition_overview(db, id).await?;

    Ok(Json(competition_summary(&overview)))
}
