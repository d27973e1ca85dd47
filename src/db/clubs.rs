use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{Club, DbClub, DbLocation, Location};

#[instrument]
pub async fn list_clubs(pool: &Pool<Sqlite>) -> Result<Vec<Club>, AppError> {
    info!("Listing clubs");
    let rows = sqlx::query_as::<_, DbClub>("SELECT id, name, contact_email FROM clubs ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Club::from).collect())
}

#[instrument]
pub async fn get_club(pool: &Pool<Sqlite>, id: i64) -> Result<Club, AppError> {
    info!("Fetching club");
    sqlx::query_as::<_, DbClub>("SELECT id, name, contact_email FROM clubs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Club::from)
        .ok_or_else(|| AppError::NotFound(format!("Club with id {} not found", id)))
}

#[instrument]
pub async fn create_club(
    pool: &Pool<Sqlite>,
    name: &str,
    contact_email: Option<&str>,
) -> Result<i64, AppError> {
    info!("Creating club");
    let res = sqlx::query("INSERT INTO clubs (name, contact_email) VALUES (?, ?)")
        .bind(name)
        .bind(contact_email)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_club(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
    contact_email: Option<&str>,
) -> Result<(), AppError> {
    info!("Updating club");
    let res = sqlx::query("UPDATE clubs SET name = ?, contact_email = ? WHERE id = ?")
        .bind(name)
        .bind(contact_email)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Club with id {} not found", id)));
    }

    Ok(())
}

/// Deletes the club and, through the foreign key cascade, its locations.
/// Returns the ids of the locations that went with it.
#[instrument]
pub async fn delete_club(pool: &Pool<Sqlite>, id: i64) -> Result<Vec<i64>, AppError> {
    info!("Deleting club");
    let mut tx = pool.begin().await?;

    let location_ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM locations WHERE club_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

    let res = sqlx::query("DELETE FROM clubs WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Club with id {} not found", id)));
    }

    tx.commit().await?;

    Ok(location_ids)
}

#[instrument]
pub async fn list_locations(pool: &Pool<Sqlite>, club_id: i64) -> Result<Vec<Location>, AppError> {
    info!("Listing club locations");
    let rows = sqlx::query_as::<_, DbLocation>(
        "SELECT id, club_id, name, address FROM locations WHERE club_id = ? ORDER BY name",
    )
    .bind(club_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Location::from).collect())
}

#[instrument]
pub async fn create_location(
    pool: &Pool<Sqlite>,
    club_id: i64,
    name: &str,
    address: &str,
) -> Result<i64, AppError> {
    info!("Creating location");
    get_club(pool, club_id).await?;

    let res = sqlx::query("INSERT INTO locations (club_id, name, address) VALUES (?, ?, ?)")
        .bind(club_id)
        .bind(name)
        .bind(address)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn delete_location(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting location");
    let res = sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Location with id {} not found", id)));
    }

    Ok(())
}
