use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::{info, instrument, warn};

use crate::db::{get_discipline, get_member};
use crate::error::AppError;
use crate::models::Discipline;

async fn discipline_in_competition(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    discipline_id: i64,
) -> Result<Discipline, AppError> {
    let discipline = get_discipline(pool, discipline_id).await?;

    if discipline.competition_id != competition_id {
        return Err(AppError::Validation(format!(
            "Discipline {} does not belong to competition {}",
            discipline_id, competition_id
        )));
    }

    Ok(discipline)
}

/// Inserts the entry unless the member is already in the discipline and
/// returns the id of whichever row is there afterwards.
async fn upsert_entry(
    conn: &mut SqliteConnection,
    competition_id: i64,
    discipline_id: i64,
    member_id: i64,
    coach_id: Option<i64>,
) -> Result<i64, AppError> {
    let res = sqlx::query(
        "INSERT INTO competition_entries (competition_id, discipline_id, member_id, coach_id)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (discipline_id, member_id) DO NOTHING",
    )
    .bind(competition_id)
    .bind(discipline_id)
    .bind(member_id)
    .bind(coach_id)
    .execute(&mut *conn)
    .await?;

    let id: i64 = sqlx::query_scalar(
        "SELECT id FROM competition_entries WHERE discipline_id = ? AND member_id = ?",
    )
    .bind(discipline_id)
    .bind(member_id)
    .fetch_one(&mut *conn)
    .await?;

    if res.rows_affected() == 0 {
        info!(entry_id = id, "Member already registered, keeping existing entry");
    }

    Ok(id)
}

#[instrument]
pub async fn register_entry(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    discipline_id: i64,
    member_id: i64,
    coach_id: Option<i64>,
) -> Result<i64, AppError> {
    let mut conn = pool.acquire().await?;
    upsert_entry(&mut *conn, competition_id, discipline_id, member_id, coach_id).await
}

/// Registers members into an individual discipline. Members already
/// registered keep their entry; the returned ids line up with `member_ids`.
/// Either every member is registered or none is.
#[instrument]
pub async fn register_entries(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    discipline_id: i64,
    member_ids: &[i64],
    coach_id: Option<i64>,
) -> Result<Vec<i64>, AppError> {
    info!("Registering members for discipline");
    let discipline = discipline_in_competition(pool, competition_id, discipline_id).await?;

    if discipline.is_team_event {
        return Err(AppError::Validation(format!(
            "Discipline '{}' is a team event; register a team instead",
            discipline.name
        )));
    }

    if let Some(coach_id) = coach_id {
        let coach = get_member(pool, coach_id).await?;
        if !coach.is_coach {
            return Err(AppError::Validation(format!(
                "Member {} is not a coach",
                coach_id
            )));
        }
    }

    for member_id in member_ids {
        get_member(pool, *member_id).await?;
    }

    let mut tx = pool.begin().await?;

    let mut entry_ids = Vec::with_capacity(member_ids.len());
    for member_id in member_ids {
        entry_ids.push(
            upsert_entry(&mut *tx, competition_id, discipline_id, *member_id, coach_id).await?,
        );
    }

    tx.commit().await?;

    Ok(entry_ids)
}

#[instrument]
pub async fn delete_entry(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting entry");
    let res = sqlx::query("DELETE FROM competition_entries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Entry with id {} not found", id)));
    }

    Ok(())
}

#[instrument]
pub async fn create_team(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    discipline_id: i64,
    name: &str,
    member_ids: &[i64],
) -> Result<i64, AppError> {
    info!("Creating team");
    let discipline = discipline_in_competition(pool, competition_id, discipline_id).await?;

    if !discipline.is_team_event {
        return Err(AppError::Validation(format!(
            "Discipline '{}' is not a team event",
            discipline.name
        )));
    }

    for member_id in member_ids {
        get_member(pool, *member_id).await?;
    }

    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO competition_teams (competition_id, discipline_id, name) VALUES (?, ?, ?)",
    )
    .bind(competition_id)
    .bind(discipline_id)
    .bind(name)
    .execute(&mut *tx)
    .await?;
    let team_id = res.last_insert_rowid();

    for member_id in member_ids {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO competition_team_members (team_id, member_id) VALUES (?, ?)",
        )
        .bind(team_id)
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            warn!(member_id = member_id, "Member listed twice for team, ignoring duplicate");
        }
    }

    tx.commit().await?;

    Ok(team_id)
}

#[instrument]
pub async fn delete_team(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting team");
    let res = sqlx::query("DELETE FROM competition_teams WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Team with id {} not found", id)));
    }

    Ok(())
}
