use chrono::NaiveDate;
use rocket::FromForm;
use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::analytics::{CompetitionSummary, competition_summary, filter_by_discipline};
use crate::auth::{Permission, User};
use crate::db::{
    CompetitionFields, CompetitionFilter, create_competition, create_discipline, create_team,
    delete_competition, delete_discipline, delete_entry, delete_team, get_competition,
    get_competition_overview, get_discipline, list_competitions, list_disciplines,
    register_entries, update_competition,
};
use crate::models::{Competition, CompetitionOverview, CompetitionStatus, Discipline};
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse, ValidationResult,
    non_blank,
};

use super::CreatedResponse;

fn parse_status(raw: &str) -> ValidationResult<CompetitionStatus> {
    raw.parse().map_err(|_| {
        Custom(
            Status::UnprocessableEntity,
            Json(ValidationResponse::with_error(
                "status",
                "Status must be one of upcoming, completed, cancelled",
            )),
        )
    })
}

#[derive(FromForm)]
pub struct CompetitionsQueryParams {
    martial_art_id: Option<i64>,
    status: Option<String>,
    search: Option<String>,
}

#[get("/competitions?<params..>")]
pub async fn api_list_competitions(
    params: CompetitionsQueryParams,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Json<Vec<Competition>>> {
    user.require_permission(Permission::ViewCompetitions)
        .validate_custom()?;

    let status = match params.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let filter = CompetitionFilter {
        martial_art_id: params.martial_art_id,
        status,
        search: params.search,
    };

    Ok(Json(list_competitions(db, &filter).await.validate_custom()?))
}

#[get("/competitions/<id>")]
pub async fn api_get_competition(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Competition>, Status> {
    user.require_permission(Permission::ViewCompetitions)?;
    Ok(Json(get_competition(db, id).await?))
}

#[derive(Deserialize, Validate)]
pub struct CreateCompetitionRequest {
    #[validate(custom(function = "non_blank"))]
    name: String,
    martial_art_id: Option<i64>,
    #[serde(default)]
    venue: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: Option<String>,
    #[serde(default)]
    notes: String,
}

#[post("/competitions", data = "<request>")]
pub async fn api_create_competition(
    request: Json<CreateCompetitionRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageCompetitions)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let status = match request.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => CompetitionStatus::Upcoming,
    };

    let fields = CompetitionFields {
        name: request.name.trim().to_string(),
        martial_art_id: request.martial_art_id,
        venue: request.venue,
        start_date: request.start_date,
        end_date: request.end_date,
        status,
        notes: request.notes,
    };

    let id = create_competition(db, &fields).await.validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}

/// Partial update; absent fields keep their stored value. `martial_art_id`
/// and `end_date` can be cleared by sending them as `null`.
#[derive(Deserialize, Validate)]
pub struct UpdateCompetitionRequest {
    #[validate(custom(function = "non_blank"))]
    name: Option<String>,
    #[serde(default, with = "double_option")]
    martial_art_id: Option<Option<i64>>,
    venue: Option<String>,
    start_date: Option<NaiveDate>,
    #[serde(default, with = "double_option")]
    end_date: Option<Option<NaiveDate>>,
    status: Option<String>,
    notes: Option<String>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer).map(Some)
    }
}

#[put("/competitions/<id>", data = "<request>")]
pub async fn api_update_competition(
    id: i64,
    request: Json<UpdateCompetitionRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Json<Competition>> {
    user.require_permission(Permission::ManageCompetitions)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let mut fields = CompetitionFields::from(get_competition(db, id).await.validate_custom()?);

    if let Some(name) = request.name {
        fields.name = name.trim().to_string();
    }
    if let Some(martial_art_id) = request.martial_art_id {
        fields.martial_art_id = martial_art_id;
    }
    if let Some(venue) = request.venue {
        fields.venue = venue;
    }
    if let Some(start_date) = request.start_date {
        fields.start_date = start_date;
    }
    if let Some(end_date) = request.end_date {
        fields.end_date = end_date;
    }
    if let Some(status) = request.status.as_deref() {
        fields.status = parse_status(status)?;
    }
    if let Some(notes) = request.notes {
        fields.notes = notes;
    }

    update_competition(db, id, &fields).await.validate_custom()?;

    Ok(Json(get_competition(db, id).await.validate_custom()?))
}

#[delete("/competitions/<id>")]
pub async fn api_delete_competition(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::ManageCompetitions)?;
    delete_competition(db, id).await?;
    Ok(Status::NoContent)
}

/// The overview plus its medal tally and totals, computed after the
/// discipline filter is applied.
#[derive(Serialize, Deserialize)]
pub struct CompetitionOverviewResponse {
    #[serde(flatten)]
    pub overview: CompetitionOverview,
    pub summary: CompetitionSummary,
}

#[get("/competitions/<id>/overview?<discipline_id>")]
pub async fn api_competition_overview(
    id: i64,
    discipline_id: Option<i64>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Json<CompetitionOverviewResponse>> {
    user.require_permission(Permission::ViewCompetitions)
        .validate_custom()?;

    let overview = get_competition_overview(db, id).await.validate_custom()?;

    let overview = match discipline_id {
        Some(discipline_id) => {
            if overview.discipline(discipline_id).is_none() {
                return Err(Custom(
                    Status::NotFound,
                    Json(ValidationResponse::with_error(
                        "discipline_id",
                        &format!(
                            "Discipline {} is not part of this competition",
                            discipline_id
                        ),
                    )),
                ));
            }
            filter_by_discipline(&overview, discipline_id)
        }
        None => overview,
    };
    let summary = competition_summary(&overview);

    Ok(Json(CompetitionOverviewResponse { overview, summary }))
}

#[derive(Deserialize, Validate)]
pub struct DisciplineRequest {
    #[validate(custom(function = "non_blank"))]
    name: String,
    #[serde(default)]
    is_team_event: bool,
}

#[get("/competitions/<id>/disciplines")]
pub async fn api_list_disciplines(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Discipline>>, Status> {
    user.require_permission(Permission::ViewCompetitions)?;
    get_competition(db, id).await?;
    Ok(Json(list_disciplines(db, id).await?))
}

#[post("/competitions/<id>/disciplines", data = "<request>")]
pub async fn api_create_discipline(
    id: i64,
    request: Json<DisciplineRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageCompetitions)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let discipline_id = create_discipline(db, id, request.name.trim(), request.is_team_event)
        .await
        .validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(CreatedResponse { id: discipline_id }),
    ))
}

#[delete("/disciplines/<id>")]
pub async fn api_delete_discipline(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::ManageCompetitions)?;
    delete_discipline(db, id).await?;
    Ok(Status::NoContent)
}

#[derive(Deserialize, Validate)]
pub struct RegisterEntriesRequest {
    discipline_id: i64,
    #[validate(length(min = 1, message = "Select at least one member"))]
    member_ids: Vec<i64>,
    coach_id: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterEntriesResponse {
    pub entry_ids: Vec<i64>,
}

#[post("/competitions/<id>/entries", data = "<request>")]
pub async fn api_register_entries(
    id: i64,
    request: Json<RegisterEntriesRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Json<RegisterEntriesResponse>> {
    user.require_permission(Permission::RegisterEntries)
        .validate_custom()?;
    let request = request.validate_custom()?;

    get_competition(db, id).await.validate_custom()?;

    let entry_ids = register_entries(
        db,
        id,
        request.discipline_id,
        &request.member_ids,
        request.coach_id,
    )
    .await
    .validate_custom()?;

    Ok(Json(RegisterEntriesResponse { entry_ids }))
}

#[delete("/entries/<id>")]
pub async fn api_delete_entry(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::RegisterEntries)?;
    delete_entry(db, id).await?;
    Ok(Status::NoContent)
}

#[derive(Deserialize, Validate)]
pub struct CreateTeamRequest {
    discipline_id: i64,
    #[validate(custom(function = "non_blank"))]
    name: String,
    #[validate(length(min = 1, message = "A team needs at least one member"))]
    member_ids: Vec<i64>,
}

#[post("/competitions/<id>/teams", data = "<request>")]
pub async fn api_create_team(
    id: i64,
    request: Json<CreateTeamRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::RegisterEntries)
        .validate_custom()?;
    let request = request.validate_custom()?;

    get_competition(db, id).await.validate_custom()?;
    get_discipline(db, request.discipline_id)
        .await
        .validate_custom()?;

    let team_id = create_team(
        db,
        id,
        request.discipline_id,
        request.name.trim(),
        &request.member_ids,
    )
    .await
    .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id: team_id })))
}

#[delete("/teams/<id>")]
pub async fn api_delete_team(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::RegisterEntries)?;
    delete_team(db, id).await?;
    Ok(Status::NoContent)
}
