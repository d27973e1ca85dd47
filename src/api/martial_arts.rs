use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    create_class, create_martial_art, delete_class, delete_martial_art, get_martial_art,
    list_classes, list_martial_arts, update_martial_art,
};
use crate::models::{MartialArt, MartialArtClass};
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResult, non_blank,
};

use super::CreatedResponse;

#[derive(Deserialize, Validate)]
pub struct MartialArtRequest {
    #[validate(custom(function = "non_blank"))]
    name: String,
    #[serde(default)]
    description: String,
}

#[get("/martial-arts")]
pub async fn api_list_martial_arts(
    _user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<MartialArt>>, Status> {
    Ok(Json(list_martial_arts(db).await?))
}

#[post("/martial-arts", data = "<request>")]
pub async fn api_create_martial_art(
    request: Json<MartialArtRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageMartialArts)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let id = create_martial_art(db, request.name.trim(), &request.description)
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}

#[put("/martial-arts/<id>", data = "<request>")]
pub async fn api_update_martial_art(
    id: i64,
    request: Json<MartialArtRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Status> {
    user.require_permission(Permission::ManageMartialArts)
        .validate_custom()?;
    let request = request.validate_custom()?;

    update_martial_art(db, id, request.name.trim(), &request.description)
        .await
        .validate_custom()?;

    Ok(Status::Ok)
}

#[delete("/martial-arts/<id>")]
pub async fn api_delete_martial_art(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::ManageMartialArts)?;
    delete_martial_art(db, id).await?;
    Ok(Status::NoContent)
}

#[derive(Deserialize, Validate)]
pub struct ClassRequest {
    #[validate(custom(function = "non_blank"))]
    name: String,
    location_id: Option<i64>,
    weekday: Option<String>,
    start_time: Option<String>,
}

#[get("/martial-arts/<id>/classes")]
pub async fn api_list_classes(
    id: i64,
    _user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<MartialArtClass>>, Status> {
    get_martial_art(db, id).await?;
    Ok(Json(list_classes(db, id).await?))
}

#[post("/martial-arts/<id>/classes", data = "<request>")]
pub async fn api_create_class(
    id: i64,
    request: Json<ClassRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageMartialArts)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let class_id = create_class(
        db,
        id,
        request.name.trim(),
        request.location_id,
        request.weekday.as_deref(),
        request.start_time.as_deref(),
    )
    .await
    .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id: class_id })))
}

#[delete("/classes/<id>")]
pub async fn api_delete_class(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::ManageMartialArts)?;
    delete_class(db, id).await?;
    Ok(Status::NoContent)
}
