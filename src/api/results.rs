use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::auth::{Permission, User};
use crate::db::{RecordedResult, delete_bout, delete_result, get_competition_overview, record_result};
use crate::error::AppError;
use crate::validation::{AppErrorExt, PermissionCheckExt, ValidationResult};
use crate::wizard::{ResultDraft, WizardAction};

#[derive(Serialize, Deserialize)]
pub struct WizardRequest {
    #[serde(default)]
    pub draft: ResultDraft,
    pub action: WizardAction,
}

#[post("/competitions/<id>/results/wizard", data = "<request>")]
pub async fn api_advance_wizard(
    id: i64,
    request: Json<WizardRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Json<ResultDraft>> {
    user.require_permission(Permission::LogResults)
        .validate_custom()?;

    let WizardRequest { draft, action } = request.into_inner();
    let overview = get_competition_overview(db, id).await.validate_custom()?;

    let next = draft
        .advance(&overview, action)
        .map_err(AppError::from)
        .validate_custom()?;

    Ok(Json(next))
}

#[post("/competitions/<id>/results", data = "<draft>")]
pub async fn api_commit_result(
    id: i64,
    draft: Json<ResultDraft>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<RecordedResult>>> {
    user.require_permission(Permission::LogResults)
        .validate_custom()?;

    let overview = get_competition_overview(db, id).await.validate_custom()?;
    let submission = draft
        .submission(&overview)
        .map_err(AppError::from)
        .validate_custom()?;

    let recorded = record_result(db, id, &submission).await.validate_custom()?;
    info!(
        bout_id = recorded.bout_id,
        result_id = recorded.result_id,
        "Result logged by {}",
        user.username
    );

    Ok(Custom(Status::Created, Json(recorded)))
}

#[delete("/bouts/<id>")]
pub async fn api_delete_bout(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::LogResults)?;
    delete_bout(db, id).await?;
    Ok(Status::NoContent)
}

#[delete("/results/<id>")]
pub async fn api_delete_result(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::LogResults)?;
    delete_result(db, id).await?;
    Ok(Status::NoContent)
}
