use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    create_club, create_location, delete_club, delete_location, get_club, list_clubs,
    list_locations, update_club,
};
use crate::models::{Club, Location};
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResult, non_blank,
};

use super::CreatedResponse;

#[derive(Deserialize, Validate)]
pub struct ClubRequest {
    #[validate(custom(function = "non_blank"))]
    name: String,
    #[validate(email(message = "Contact email is not valid"))]
    contact_email: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ClubDetailResponse {
    pub club: Club,
    pub locations: Vec<Location>,
}

#[derive(Serialize, Deserialize)]
pub struct ClubDeletedResponse {
    pub club_id: i64,
    pub removed_location_ids: Vec<i64>,
}

#[get("/clubs")]
pub async fn api_list_clubs(
    _user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Club>>, Status> {
    Ok(Json(list_clubs(db).await?))
}

#[get("/clubs/<id>")]
pub async fn api_get_club(
    id: i64,
    _user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ClubDetailResponse>, Status> {
    let club = get_club(db, id).await?;
    let locations = list_locations(db, id).await?;

    Ok(Json(ClubDetailResponse { club, locations }))
}

#[post("/clubs", data = "<request>")]
pub async fn api_create_club(
    request: Json<ClubRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageClubs)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let id = create_club(db, request.name.trim(), request.contact_email.as_deref())
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}

#[put("/clubs/<id>", data = "<request>")]
pub async fn api_update_club(
    id: i64,
    request: Json<ClubRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Status> {
    user.require_permission(Permission::ManageClubs)
        .validate_custom()?;
    let request = request.validate_custom()?;

    update_club(db, id, request.name.trim(), request.contact_email.as_deref())
        .await
        .validate_custom()?;

    Ok(Status::Ok)
}

#[delete("/clubs/<id>")]
pub async fn api_delete_club(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ClubDeletedResponse>, Status> {
    user.require_permission(Permission::ManageClubs)?;

    let removed_location_ids = delete_club(db, id).await?;

    Ok(Json(ClubDeletedResponse {
        club_id: id,
        removed_location_ids,
    }))
}

#[derive(Deserialize, Validate)]
pub struct LocationRequest {
    #[validate(custom(function = "non_blank"))]
    name: String,
    #[serde(default)]
    address: String,
}

#[get("/clubs/<club_id>/locations")]
pub async fn api_list_locations(
    club_id: i64,
    _user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Location>>, Status> {
    get_club(db, club_id).await?;
    Ok(Json(list_locations(db, club_id).await?))
}

#[post("/clubs/<club_id>/locations", data = "<request>")]
pub async fn api_create_location(
    club_id: i64,
    request: Json<LocationRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageClubs)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let id = create_location(db, club_id, request.name.trim(), request.address.trim())
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}

#[delete("/locations/<id>")]
pub async fn api_delete_location(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::ManageClubs)?;
    delete_location(db, id).await?;
    Ok(Status::NoContent)
}
