use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::wizard::ResultSubmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResult {
    pub bout_id: i64,
    pub result_id: Option<i64>,
}

/// Writes the bout and, when a medal was decided, the result row in one
/// transaction.
#[instrument]
pub async fn record_result(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    submission: &ResultSubmission,
) -> Result<RecordedResult, AppError> {
    info!("Recording bout result");
    let mut tx = pool.begin().await?;

    let bout = sqlx::query(
        "INSERT INTO competition_bouts
         (competition_id, discipline_id, entry_id, team_id, coach_id, result, score_for, score_against, round, is_final)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(competition_id)
    .bind(submission.discipline_id)
    .bind(submission.competitor.entry_id())
    .bind(submission.competitor.team_id())
    .bind(submission.coach_id)
    .bind(submission.result.as_str())
    .bind(submission.score_for)
    .bind(submission.score_against)
    .bind(submission.round.as_deref())
    .bind(submission.is_final)
    .execute(&mut *tx)
    .await?;

    let result_id = if submission.records_result() {
        let res = sqlx::query(
            "INSERT INTO competition_results
             (competition_id, discipline_id, entry_id, team_id, medal, round_reached)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(competition_id)
        .bind(submission.discipline_id)
        .bind(submission.competitor.entry_id())
        .bind(submission.competitor.team_id())
        .bind(submission.medal.map(|m| m.as_str()))
        .bind(submission.round_reached.as_deref())
        .execute(&mut *tx)
        .await?;
        Some(res.last_insert_rowid())
    } else {
        None
    };

    tx.commit().await?;

    Ok(RecordedResult {
        bout_id: bout.last_insert_rowid(),
        result_id,
    })
}

#[instrument]
pub async fn delete_bout(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting bout");
    let res = sqlx::query("DELETE FROM competition_bouts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Bout with id {} not found", id)));
    }

    Ok(())
}

#[instrument]
pub async fn delete_result(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting result");
    let res = sqlx::query("DELETE FROM competition_results WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Result with id {} not found", id)));
    }

    Ok(())
}
