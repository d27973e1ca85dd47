use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbMartialArt, DbMartialArtClass, MartialArt, MartialArtClass};

#[instrument]
pub async fn list_martial_arts(pool: &Pool<Sqlite>) -> Result<Vec<MartialArt>, AppError> {
    info!("Listing martial arts");
    let rows = sqlx::query_as::<_, DbMartialArt>(
        "SELECT id, name, description FROM martial_arts ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(MartialArt::from).collect())
}

#[instrument]
pub async fn get_martial_art(pool: &Pool<Sqlite>, id: i64) -> Result<MartialArt, AppError> {
    sqlx::query_as::<_, DbMartialArt>("SELECT id, name, description FROM martial_arts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(MartialArt::from)
        .ok_or_else(|| AppError::NotFound(format!("Martial art with id {} not found", id)))
}

#[instrument]
pub async fn create_martial_art(
    pool: &Pool<Sqlite>,
    name: &str,
    description: &str,
) -> Result<i64, AppError> {
    info!("Creating martial art");
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM martial_arts WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Martial art '{}' already exists",
            name
        )));
    }

    let res = sqlx::query("INSERT INTO martial_arts (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_martial_art(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
    description: &str,
) -> Result<(), AppError> {
    info!("Updating martial art");
    let clash: Option<i64> =
        sqlx::query_scalar("SELECT id FROM martial_arts WHERE name = ? AND id != ?")
            .bind(name)
            .bind(id)
            .fetch_optional(pool)
            .await?;

    if clash.is_some() {
        return Err(AppError::Conflict(format!(
            "Martial art '{}' already exists",
            name
        )));
    }

    let res = sqlx::query("UPDATE martial_arts SET name = ?, description = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Martial art with id {} not found", id)));
    }

    Ok(())
}

#[instrument]
pub async fn delete_martial_art(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting martial art");
    let res = sqlx::query("DELETE FROM martial_arts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Martial art with id {} not found", id)));
    }

    Ok(())
}

#[instrument]
pub async fn list_classes(
    pool: &Pool<Sqlite>,
    martial_art_id: i64,
) -> Result<Vec<MartialArtClass>, AppError> {
    info!("Listing classes");
    let rows = sqlx::query_as::<_, DbMartialArtClass>(
        "SELECT id, martial_art_id, location_id, name, weekday, start_time
         FROM martial_art_classes
         WHERE martial_art_id = ?
         ORDER BY name",
    )
    .bind(martial_art_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(MartialArtClass::from).collect())
}

#[instrument]
pub async fn create_class(
    pool: &Pool<Sqlite>,
    martial_art_id: i64,
    name: &str,
    location_id: Option<i64>,
    weekday: Option<&str>,
    start_time: Option<&str>,
) -> Result<i64, AppError> {
    info!("Creating class");
    get_martial_art(pool, martial_art_id).await?;

    let res = sqlx::query(
        "INSERT INTO martial_art_classes (martial_art_id, location_id, name, weekday, start_time)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(martial_art_id)
    .bind(location_id)
    .bind(name)
    .bind(weekday)
    .bind(start_time)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn delete_class(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting class");
    let res = sqlx::query("DELETE FROM martial_art_classes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Class with id {} not found", id)));
    }

    Ok(())
}
