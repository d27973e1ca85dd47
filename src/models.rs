use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

fn to_utc(dt: Option<NaiveDateTime>) -> DateTime<Utc> {
    dt.map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .unwrap_or_else(Utc::now)
}

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(AppError::Validation(format!(
                        "Unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(BoutResult { Win => "Win", Loss => "Loss" });
text_enum!(Medal { Gold => "Gold", Silver => "Silver", Bronze => "Bronze" });
text_enum!(CompetitionStatus {
    Upcoming => "upcoming",
    Completed => "completed",
    Cancelled => "cancelled",
});

fn parse_stored<T: FromStr<Err = AppError>>(raw: Option<String>, column: &str) -> Result<T, AppError> {
    let raw = raw.unwrap_or_default();
    raw.parse()
        .map_err(|_| AppError::Internal(format!("Invalid value '{}' stored in {}", raw, column)))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MartialArt {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbMartialArt {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<DbMartialArt> for MartialArt {
    fn from(db: DbMartialArt) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MartialArtClass {
    pub id: i64,
    pub martial_art_id: i64,
    pub location_id: Option<i64>,
    pub name: String,
    pub weekday: Option<String>,
    pub start_time: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbMartialArtClass {
    pub id: Option<i64>,
    pub martial_art_id: Option<i64>,
    pub location_id: Option<i64>,
    pub name: Option<String>,
    pub weekday: Option<String>,
    pub start_time: Option<String>,
}

impl From<DbMartialArtClass> for MartialArtClass {
    fn from(db: DbMartialArtClass) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            martial_art_id: db.martial_art_id.unwrap_or_default(),
            location_id: db.location_id,
            name: db.name.unwrap_or_default(),
            weekday: db.weekday,
            start_time: db.start_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub contact_email: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbClub {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

impl From<DbClub> for Club {
    fn from(db: DbClub) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            contact_email: db.contact_email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub club_id: i64,
    pub name: String,
    pub address: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbLocation {
    pub id: Option<i64>,
    pub club_id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl From<DbLocation> for Location {
    fn from(db: DbLocation) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            club_id: db.club_id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            address: db.address.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub club_id: Option<i64>,
    pub martial_art_id: Option<i64>,
    pub grade: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_coach: bool,
    pub archived: bool,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbMember {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub club_id: Option<i64>,
    pub martial_art_id: Option<i64>,
    pub grade: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_coach: Option<bool>,
    pub archived: Option<bool>,
}

impl From<DbMember> for Member {
    fn from(db: DbMember) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            first_name: db.first_name.unwrap_or_default(),
            last_name: db.last_name.unwrap_or_default(),
            club_id: db.club_id,
            martial_art_id: db.martial_art_id,
            grade: db.grade,
            date_of_birth: db.date_of_birth,
            is_coach: db.is_coach.unwrap_or_default(),
            archived: db.archived.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Competition {
    pub id: i64,
    pub name: String,
    pub martial_art_id: Option<i64>,
    pub venue: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: CompetitionStatus,
    pub notes: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCompetition {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub martial_art_id: Option<i64>,
    pub venue: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<DbCompetition> for Competition {
    type Error = AppError;

    fn try_from(db: DbCompetition) -> Result<Self, Self::Error> {
        Ok(Self {
            id: db.id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            martial_art_id: db.martial_art_id,
            venue: db.venue.unwrap_or_default(),
            start_date: db
                .start_date
                .ok_or_else(|| AppError::Internal("Competition without start date".to_string()))?,
            end_date: db.end_date,
            status: parse_stored(db.status, "competitions.status")?,
            notes: db.notes.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discipline {
    pub id: i64,
    pub competition_id: i64,
    pub name: String,
    pub is_team_event: bool,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbDiscipline {
    pub id: Option<i64>,
    pub competition_id: Option<i64>,
    pub name: Option<String>,
    pub is_team_event: Option<bool>,
}

impl From<DbDiscipline> for Discipline {
    fn from(db: DbDiscipline) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            competition_id: db.competition_id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            is_team_event: db.is_team_event.unwrap_or_default(),
        }
    }
}

/// A member registered into one discipline, with the names joined in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub competition_id: i64,
    pub discipline_id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub club_id: Option<i64>,
    pub coach_id: Option<i64>,
    pub coach_name: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbEntry {
    pub id: Option<i64>,
    pub competition_id: Option<i64>,
    pub discipline_id: Option<i64>,
    pub member_id: Option<i64>,
    pub member_name: Option<String>,
    pub club_id: Option<i64>,
    pub coach_id: Option<i64>,
    pub coach_name: Option<String>,
}

impl From<DbEntry> for Entry {
    fn from(db: DbEntry) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            competition_id: db.competition_id.unwrap_or_default(),
            discipline_id: db.discipline_id.unwrap_or_default(),
            member_id: db.member_id.unwrap_or_default(),
            member_name: db.member_name.unwrap_or_default(),
            club_id: db.club_id,
            coach_id: db.coach_id,
            coach_name: db.coach_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    pub member_id: i64,
    pub member_name: String,
    pub club_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: i64,
    pub competition_id: i64,
    pub discipline_id: i64,
    pub name: String,
    pub members: Vec<TeamMember>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeam {
    pub id: Option<i64>,
    pub competition_id: Option<i64>,
    pub discipline_id: Option<i64>,
    pub name: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTeamMember {
    pub team_id: Option<i64>,
    pub member_id: Option<i64>,
    pub club_id: Option<i64>,
    pub member_name: Option<String>,
}

impl From<DbTeam> for Team {
    fn from(db: DbTeam) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            competition_id: db.competition_id.unwrap_or_default(),
            discipline_id: db.discipline_id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            members: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bout {
    pub id: i64,
    pub competition_id: i64,
    pub discipline_id: i64,
    pub entry_id: Option<i64>,
    pub team_id: Option<i64>,
    pub coach_id: Option<i64>,
    pub result: BoutResult,
    pub score_for: i64,
    pub score_against: i64,
    pub round: Option<String>,
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbBout {
    pub id: Option<i64>,
    pub competition_id: Option<i64>,
    pub discipline_id: Option<i64>,
    pub entry_id: Option<i64>,
    pub team_id: Option<i64>,
    pub coach_id: Option<i64>,
    pub result: Option<String>,
    pub score_for: Option<i64>,
    pub score_against: Option<i64>,
    pub round: Option<String>,
    pub is_final: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<DbBout> for Bout {
    type Error = AppError;

    fn try_from(db: DbBout) -> Result<Self, Self::Error> {
        Ok(Self {
            id: db.id.unwrap_or_default(),
            competition_id: db.competition_id.unwrap_or_default(),
            discipline_id: db.discipline_id.unwrap_or_default(),
            entry_id: db.entry_id,
            team_id: db.team_id,
            coach_id: db.coach_id,
            result: parse_stored(db.result, "competition_bouts.result")?,
            score_for: db.score_for.unwrap_or_default(),
            score_against: db.score_against.unwrap_or_default(),
            round: db.round,
            is_final: db.is_final.unwrap_or_default(),
            created_at: to_utc(db.created_at),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitionResult {
    pub id: i64,
    pub competition_id: i64,
    pub discipline_id: i64,
    pub entry_id: Option<i64>,
    pub team_id: Option<i64>,
    pub medal: Option<Medal>,
    pub round_reached: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCompetitionResult {
    pub id: Option<i64>,
    pub competition_id: Option<i64>,
    pub discipline_id: Option<i64>,
    pub entry_id: Option<i64>,
    pub team_id: Option<i64>,
    pub medal: Option<String>,
    pub round_reached: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<DbCompetitionResult> for CompetitionResult {
    type Error = AppError;

    fn try_from(db: DbCompetitionResult) -> Result<Self, Self::Error> {
        let medal = match db.medal {
            Some(raw) => Some(parse_stored(Some(raw), "competition_results.medal")?),
            None => None,
        };

        Ok(Self {
            id: db.id.unwrap_or_default(),
            competition_id: db.competition_id.unwrap_or_default(),
            discipline_id: db.discipline_id.unwrap_or_default(),
            entry_id: db.entry_id,
            team_id: db.team_id,
            medal,
            round_reached: db.round_reached,
            created_at: to_utc(db.created_at),
        })
    }
}

/// Everything the results page of one competition needs, fetched together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitionOverview {
    pub competition: Competition,
    pub disciplines: Vec<Discipline>,
    pub entries: Vec<Entry>,
    pub teams: Vec<Team>,
    pub bouts: Vec<Bout>,
    pub results: Vec<CompetitionResult>,
    pub coaches: Vec<Member>,
}

impl CompetitionOverview {
    pub fn discipline(&self, id: i64) -> Option<&Discipline> {
        self.disciplines.iter().find(|d| d.id == id)
    }

    pub fn entry(&self, id: i64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn team(&self, id: i64) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn coach(&self, id: i64) -> Option<&Member> {
        self.coaches.iter().find(|c| c.id == id)
    }
}
