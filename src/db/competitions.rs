use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::analytics::ResultsLedger;
use crate::db::{MemberFilter, list_members};
use crate::error::AppError;
use crate::models::{
    Bout, Competition, CompetitionOverview, CompetitionResult, CompetitionStatus, DbBout,
    DbCompetition, DbCompetitionResult, DbDiscipline, DbEntry, DbTeam, DbTeamMember, Discipline,
    Entry, Team, TeamMember,
};

const COMPETITION_COLUMNS: &str =
    "id, name, martial_art_id, venue, start_date, end_date, status, notes";

#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub martial_art_id: Option<i64>,
    pub status: Option<CompetitionStatus>,
    pub search: Option<String>,
}

impl CompetitionFilter {
    pub fn matches(&self, competition: &Competition) -> bool {
        let search_hit = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => competition
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };

        search_hit
            && self
                .martial_art_id
                .is_none_or(|id| competition.martial_art_id == Some(id))
            && self.status.is_none_or(|status| competition.status == status)
    }
}

#[derive(Debug, Clone)]
pub struct CompetitionFields {
    pub name: String,
    pub martial_art_id: Option<i64>,
    pub venue: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: CompetitionStatus,
    pub notes: String,
}

impl CompetitionFields {
    pub fn check_dates(&self) -> Result<(), AppError> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(AppError::Validation(
                "Competition cannot end before it starts".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl From<Competition> for CompetitionFields {
    fn from(competition: Competition) -> Self {
        Self {
            name: competition.name,
            martial_art_id: competition.martial_art_id,
            venue: competition.venue,
            start_date: competition.start_date,
            end_date: competition.end_date,
            status: competition.status,
            notes: competition.notes,
        }
    }
}

#[instrument]
pub async fn list_competitions(
    pool: &Pool<Sqlite>,
    filter: &CompetitionFilter,
) -> Result<Vec<Competition>, AppError> {
    info!("Listing competitions");
    let query = format!(
        "SELECT {} FROM competitions ORDER BY start_date DESC, id DESC",
        COMPETITION_COLUMNS
    );
    let rows = sqlx::query_as::<_, DbCompetition>(&query)
        .fetch_all(pool)
        .await?;

    let mut competitions = Vec::with_capacity(rows.len());
    for row in rows {
        let competition = Competition::try_from(row)?;
        if filter.matches(&competition) {
            competitions.push(competition);
        }
    }

    Ok(competitions)
}

#[instrument]
pub async fn get_competition(pool: &Pool<Sqlite>, id: i64) -> Result<Competition, AppError> {
    let query = format!("SELECT {} FROM competitions WHERE id = ?", COMPETITION_COLUMNS);
    let row = sqlx::query_as::<_, DbCompetition>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Competition::try_from(row),
        None => Err(AppError::NotFound(format!(
            "Competition with id {} not found",
            id
        ))),
    }
}

#[instrument]
pub async fn create_competition(
    pool: &Pool<Sqlite>,
    fields: &CompetitionFields,
) -> Result<i64, AppError> {
    info!("Creating competition");
    fields.check_dates()?;

    let res = sqlx::query(
        "INSERT INTO competitions (name, martial_art_id, venue, start_date, end_date, status, notes)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&fields.name)
    .bind(fields.martial_art_id)
    .bind(&fields.venue)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.status.as_str())
    .bind(&fields.notes)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn update_competition(
    pool: &Pool<Sqlite>,
    id: i64,
    fields: &CompetitionFields,
) -> Result<(), AppError> {
    info!("Updating competition");
    fields.check_dates()?;

    let res = sqlx::query(
        "UPDATE competitions
         SET name = ?, martial_art_id = ?, venue = ?, start_date = ?, end_date = ?, status = ?, notes = ?
         WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(fields.martial_art_id)
    .bind(&fields.venue)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.status.as_str())
    .bind(&fields.notes)
    .bind(id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Competition with id {} not found",
            id
        )));
    }

    Ok(())
}

#[instrument]
pub async fn delete_competition(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting competition");
    let res = sqlx::query("DELETE FROM competitions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Competition with id {} not found",
            id
        )));
    }

    Ok(())
}

#[instrument]
pub async fn list_disciplines(
    pool: &Pool<Sqlite>,
    competition_id: i64,
) -> Result<Vec<Discipline>, AppError> {
    let rows = sqlx::query_as::<_, DbDiscipline>(
        "SELECT id, competition_id, name, is_team_event
         FROM competition_disciplines
         WHERE competition_id = ?
         ORDER BY name",
    )
    .bind(competition_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Discipline::from).collect())
}

#[instrument]
pub async fn get_discipline(pool: &Pool<Sqlite>, id: i64) -> Result<Discipline, AppError> {
    sqlx::query_as::<_, DbDiscipline>(
        "SELECT id, competition_id, name, is_team_event FROM competition_disciplines WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(Discipline::from)
    .ok_or_else(|| AppError::NotFound(format!("Discipline with id {} not found", id)))
}

#[instrument]
pub async fn create_discipline(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    name: &str,
    is_team_event: bool,
) -> Result<i64, AppError> {
    info!("Creating discipline");
    get_competition(pool, competition_id).await?;

    let res = sqlx::query(
        "INSERT INTO competition_disciplines (competition_id, name, is_team_event) VALUES (?, ?, ?)",
    )
    .bind(competition_id)
    .bind(name)
    .bind(is_team_event)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn delete_discipline(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting discipline");
    let res = sqlx::query("DELETE FROM competition_disciplines WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Discipline with id {} not found", id)));
    }

    Ok(())
}

// `?1` is either a competition id or NULL for every competition.
async fn fetch_entries(pool: &Pool<Sqlite>, competition_id: Option<i64>) -> Result<Vec<Entry>, AppError> {
    let rows = sqlx::query_as::<_, DbEntry>(
        "SELECT e.id, e.competition_id, e.discipline_id, e.member_id,
                m.first_name || ' ' || m.last_name AS member_name,
                m.club_id,
                e.coach_id,
                c.first_name || ' ' || c.last_name AS coach_name
         FROM competition_entries e
         JOIN members m ON m.id = e.member_id
         LEFT JOIN members c ON c.id = e.coach_id
         WHERE ?1 IS NULL OR e.competition_id = ?1
         ORDER BY e.discipline_id, m.last_name, m.first_name",
    )
    .bind(competition_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Entry::from).collect())
}

async fn fetch_teams(pool: &Pool<Sqlite>, competition_id: Option<i64>) -> Result<Vec<Team>, AppError> {
    let rows = sqlx::query_as::<_, DbTeam>(
        "SELECT id, competition_id, discipline_id, name
         FROM competition_teams
         WHERE ?1 IS NULL OR competition_id = ?1
         ORDER BY name",
    )
    .bind(competition_id)
    .fetch_all(pool)
    .await?;

    let member_rows = sqlx::query_as::<_, DbTeamMember>(
        "SELECT tm.team_id, tm.member_id, m.club_id,
                m.first_name || ' ' || m.last_name AS member_name
         FROM competition_team_members tm
         JOIN competition_teams t ON t.id = tm.team_id
         JOIN members m ON m.id = tm.member_id
         WHERE ?1 IS NULL OR t.competition_id = ?1
         ORDER BY m.last_name, m.first_name",
    )
    .bind(competition_id)
    .fetch_all(pool)
    .await?;

    let mut teams: Vec<Team> = rows.into_iter().map(Team::from).collect();
    for row in member_rows {
        let team_id = row.team_id.unwrap_or_default();
        if let Some(team) = teams.iter_mut().find(|t| t.id == team_id) {
            team.members.push(TeamMember {
                member_id: row.member_id.unwrap_or_default(),
                member_name: row.member_name.unwrap_or_default(),
                club_id: row.club_id,
            });
        }
    }

    Ok(teams)
}

async fn fetch_bouts(pool: &Pool<Sqlite>, competition_id: Option<i64>) -> Result<Vec<Bout>, AppError> {
    let rows = sqlx::query_as::<_, DbBout>(
        "SELECT id, competition_id, discipline_id, entry_id, team_id, coach_id, result,
                score_for, score_against, round, is_final, created_at
         FROM competition_bouts
         WHERE ?1 IS NULL OR competition_id = ?1
         ORDER BY created_at, id",
    )
    .bind(competition_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Bout::try_from).collect()
}

async fn fetch_results(
    pool: &Pool<Sqlite>,
    competition_id: Option<i64>,
) -> Result<Vec<CompetitionResult>, AppError> {
    let rows = sqlx::query_as::<_, DbCompetitionResult>(
        "SELECT id, competition_id, discipline_id, entry_id, team_id, medal, round_reached, created_at
         FROM competition_results
         WHERE ?1 IS NULL OR competition_id = ?1
         ORDER BY created_at, id",
    )
    .bind(competition_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CompetitionResult::try_from).collect()
}

#[instrument]
pub async fn list_entries(pool: &Pool<Sqlite>, competition_id: i64) -> Result<Vec<Entry>, AppError> {
    fetch_entries(pool, Some(competition_id)).await
}

#[instrument]
pub async fn list_teams(pool: &Pool<Sqlite>, competition_id: i64) -> Result<Vec<Team>, AppError> {
    fetch_teams(pool, Some(competition_id)).await
}

#[instrument]
pub async fn list_bouts(pool: &Pool<Sqlite>, competition_id: i64) -> Result<Vec<Bout>, AppError> {
    fetch_bouts(pool, Some(competition_id)).await
}

#[instrument]
pub async fn list_results(
    pool: &Pool<Sqlite>,
    competition_id: i64,
) -> Result<Vec<CompetitionResult>, AppError> {
    fetch_results(pool, Some(competition_id)).await
}

/// Every entry, team, bout and result across all competitions, for the
/// member analytics.
#[instrument]
pub async fn load_results_ledger(pool: &Pool<Sqlite>) -> Result<ResultsLedger, AppError> {
    info!("Loading results ledger");
    Ok(ResultsLedger {
        entries: fetch_entries(pool, None).await?,
        teams: fetch_teams(pool, None).await?,
        bouts: fetch_bouts(pool, None).await?,
        results: fetch_results(pool, None).await?,
    })
}

/// Loads a competition with every related row the results screens use.
#[instrument]
pub async fn get_competition_overview(
    pool: &Pool<Sqlite>,
    competition_id: i64,
) -> Result<CompetitionOverview, AppError> {
    info!("Building competition overview");
    let competition = get_competition(pool, competition_id).await?;

    Ok(CompetitionOverview {
        competition,
        disciplines: list_disciplines(pool, competition_id).await?,
        entries: list_entries(pool, competition_id).await?,
        teams: list_teams(pool, competition_id).await?,
        bouts: list_bouts(pool, competition_id).await?,
        results: list_results(pool, competition_id).await?,
        coaches: list_members(
            pool,
            &MemberFilter {
                coaches_only: true,
                ..MemberFilter::default()
            },
        )
        .await?,
    })
}
