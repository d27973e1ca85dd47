use chrono::NaiveDate;
use rocket::FromForm;
use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    MemberFields, MemberFilter, create_member, get_member, list_members, set_member_archived,
    update_member,
};
use crate::models::Member;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResult, non_blank,
};

use super::CreatedResponse;

#[derive(FromForm)]
pub struct MembersQueryParams {
    club_id: Option<i64>,
    martial_art_id: Option<i64>,
    coaches_only: Option<bool>,
    include_archived: Option<bool>,
}

impl From<MembersQueryParams> for MemberFilter {
    fn from(params: MembersQueryParams) -> Self {
        Self {
            club_id: params.club_id,
            martial_art_id: params.martial_art_id,
            coaches_only: params.coaches_only.unwrap_or(false),
            include_archived: params.include_archived.unwrap_or(false),
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct MemberRequest {
    #[validate(custom(function = "non_blank"))]
    first_name: String,
    #[serde(default)]
    last_name: String,
    club_id: Option<i64>,
    martial_art_id: Option<i64>,
    grade: Option<String>,
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    is_coach: bool,
}

impl MemberRequest {
    fn fields(&self) -> MemberFields<'_> {
        MemberFields {
            first_name: self.first_name.trim(),
            last_name: self.last_name.trim(),
            club_id: self.club_id,
            martial_art_id: self.martial_art_id,
            grade: self.grade.as_deref(),
            date_of_birth: self.date_of_birth,
            is_coach: self.is_coach,
        }
    }
}

#[derive(Deserialize)]
pub struct ArchiveRequest {
    archived: bool,
}

#[get("/members?<params..>")]
pub async fn api_list_members(
    params: MembersQueryParams,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Member>>, Status> {
    user.require_permission(Permission::ViewMembers)?;

    let members = list_members(db, &MemberFilter::from(params)).await?;

    Ok(Json(members))
}

#[get("/members/<id>")]
pub async fn api_get_member(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Member>, Status> {
    user.require_permission(Permission::ViewMembers)?;
    Ok(Json(get_member(db, id).await?))
}

#[post("/members", data = "<request>")]
pub async fn api_create_member(
    request: Json<MemberRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Custom<Json<CreatedResponse>>> {
    user.require_permission(Permission::ManageMembers)
        .validate_custom()?;
    let request = request.validate_custom()?;

    let id = create_member(db, &request.fields())
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}

#[put("/members/<id>", data = "<request>")]
pub async fn api_update_member(
    id: i64,
    request: Json<MemberRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ValidationResult<Status> {
    user.require_permission(Permission::ManageMembers)
        .validate_custom()?;
    let request = request.validate_custom()?;

    update_member(db, id, &request.fields())
        .await
        .validate_custom()?;

    Ok(Status::Ok)
}

#[post("/members/<id>/archive", data = "<request>")]
pub async fn api_archive_member(
    id: i64,
    request: Json<ArchiveRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    user.require_permission(Permission::ManageMembers)?;
    set_member_archived(db, id, request.archived).await?;
    Ok(Status::Ok)
}
