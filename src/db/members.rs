use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbMember, Member};

const MEMBER_COLUMNS: &str = "id, first_name, last_name, club_id, martial_art_id, grade, date_of_birth, is_coach, archived";

#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub club_id: Option<i64>,
    pub martial_art_id: Option<i64>,
    pub coaches_only: bool,
    pub include_archived: bool,
}

impl MemberFilter {
    pub fn matches(&self, member: &Member) -> bool {
        (self.include_archived || !member.archived)
            && (!self.coaches_only || member.is_coach)
            && self.club_id.is_none_or(|id| member.club_id == Some(id))
            && self
                .martial_art_id
                .is_none_or(|id| member.martial_art_id == Some(id))
    }
}

#[derive(Debug, Clone)]
pub struct MemberFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub club_id: Option<i64>,
    pub martial_art_id: Option<i64>,
    pub grade: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_coach: bool,
}

#[instrument]
pub async fn list_members(
    pool: &Pool<Sqlite>,
    filter: &MemberFilter,
) -> Result<Vec<Member>, AppError> {
    info!("Listing members");
    let query = format!(
        "SELECT {} FROM members ORDER BY last_name, first_name",
        MEMBER_COLUMNS
    );
    let rows = sqlx::query_as::<_, DbMember>(&query).fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(Member::from)
        .filter(|member| filter.matches(member))
        .collect())
}

#[instrument]
pub async fn get_member(pool: &Pool<Sqlite>, id: i64) -> Result<Member, AppError> {
    let query = format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS);
    sqlx::query_as::<_, DbMember>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Member::from)
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
}

#[instrument]
pub async fn create_member(pool: &Pool<Sqlite>, fields: &MemberFields<'_>) -> Result<i64, AppError> {
    info!("Creating member");
    let res = sqlx::query(
        "INSERT INTO members (first_name, last_name, club_id, martial_art_id, grade, date_of_birth, is_coach)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(fields.first_name)
    .bind(fields.last_name)
    .bind(fields.club_id)
    .bind(fields.martial_art_id)
    .bind(fields.grade)
    .bind(fields.date_of_birth)
    .bind(fields.is_coach)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_member(
    pool: &Pool<Sqlite>,
    id: i64,
    fields: &MemberFields<'_>,
) -> Result<(), AppError> {
    info!("Updating member");
    let res = sqlx::query(
        "UPDATE members
         SET first_name = ?, last_name = ?, club_id = ?, martial_art_id = ?, grade = ?,
             date_of_birth = ?, is_coach = ?
         WHERE id = ?",
    )
    .bind(fields.first_name)
    .bind(fields.last_name)
    .bind(fields.club_id)
    .bind(fields.martial_art_id)
    .bind(fields.grade)
    .bind(fields.date_of_birth)
    .bind(fields.is_coach)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Member with id {} not found", id)));
    }

    Ok(())
}

#[instrument]
pub async fn set_member_archived(
    pool: &Pool<Sqlite>,
    id: i64,
    archived: bool,
) -> Result<bool, AppError> {
    info!("Toggling member archived status");
    let res = sqlx::query("UPDATE members SET archived = ? WHERE id = ?")
        .bind(archived)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Member with id {} not found", id)));
    }

    Ok(archived)
}
