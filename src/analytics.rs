use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{
    Bout, BoutResult, CompetitionOverview, CompetitionResult, Entry, Medal, Member, Team,
};
use crate::wizard::Competitor;

/// Entries, teams, bouts and results spanning any number of competitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsLedger {
    pub entries: Vec<Entry>,
    pub teams: Vec<Team>,
    pub bouts: Vec<Bout>,
    pub results: Vec<CompetitionResult>,
}

impl From<&CompetitionOverview> for ResultsLedger {
    fn from(overview: &CompetitionOverview) -> Self {
        Self {
            entries: overview.entries.clone(),
            teams: overview.teams.clone(),
            bouts: overview.bouts.clone(),
            results: overview.results.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalTally {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

impl MedalTally {
    pub fn add(&mut self, medal: Medal) {
        match medal {
            Medal::Gold => self.gold += 1,
            Medal::Silver => self.silver += 1,
            Medal::Bronze => self.bronze += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.gold + self.silver + self.bronze
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubTally {
    /// `None` collects medals of unaffiliated members and mixed-club teams.
    pub club_id: Option<i64>,
    pub tally: MedalTally,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub member_id: i64,
    pub member_name: String,
    pub club_id: Option<i64>,
    pub bouts: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub medals: MedalTally,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionSummary {
    pub competition_id: i64,
    pub disciplines: usize,
    pub entries: usize,
    pub teams: usize,
    pub bouts: usize,
    pub wins: usize,
    pub losses: usize,
    pub medals: MedalTally,
    pub clubs: Vec<ClubTally>,
}

fn medal_rank(medal: Medal) -> u8 {
    match medal {
        Medal::Gold => 3,
        Medal::Silver => 2,
        Medal::Bronze => 1,
    }
}

fn result_competitor(result: &CompetitionResult) -> Option<Competitor> {
    match (result.entry_id, result.team_id) {
        (Some(id), _) => Some(Competitor::Entry(id)),
        (None, Some(id)) => Some(Competitor::Team(id)),
        (None, None) => None,
    }
}

fn bout_competitor(bout: &Bout) -> Option<Competitor> {
    match (bout.entry_id, bout.team_id) {
        (Some(id), _) => Some(Competitor::Entry(id)),
        (None, Some(id)) => Some(Competitor::Team(id)),
        (None, None) => None,
    }
}

/// The best medal each competitor holds in each discipline. A result logged
/// twice for the same competitor only counts once, and a team is a single
/// competitor however many members it has.
fn awarded_medals(results: &[CompetitionResult]) -> Vec<(Competitor, Medal)> {
    let mut best: HashMap<(i64, Competitor), Medal> = HashMap::new();

    for result in results {
        let (Some(medal), Some(competitor)) = (result.medal, result_competitor(result)) else {
            continue;
        };
        best.entry((result.discipline_id, competitor))
            .and_modify(|held| {
                if medal_rank(medal) > medal_rank(*held) {
                    *held = medal;
                }
            })
            .or_insert(medal);
    }

    best.into_iter()
        .map(|((_, competitor), medal)| (competitor, medal))
        .collect()
}

pub fn medal_tally(results: &[CompetitionResult]) -> MedalTally {
    let mut tally = MedalTally::default();
    for (_, medal) in awarded_medals(results) {
        tally.add(medal);
    }
    tally
}

fn competitor_club(ledger: &ResultsLedger, competitor: Competitor) -> Option<i64> {
    match competitor {
        Competitor::Entry(id) => ledger.entries.iter().find(|e| e.id == id)?.club_id,
        Competitor::Team(id) => {
            let team = ledger.teams.iter().find(|t| t.id == id)?;
            let clubs: HashSet<Option<i64>> = team.members.iter().map(|m| m.club_id).collect();
            match clubs.len() {
                1 => clubs.into_iter().next().flatten(),
                _ => None,
            }
        }
    }
}

/// Medals grouped by club, ordered by golds, then silvers, then bronzes.
pub fn club_medal_tally(ledger: &ResultsLedger) -> Vec<ClubTally> {
    let mut by_club: BTreeMap<Option<i64>, MedalTally> = BTreeMap::new();

    for (competitor, medal) in awarded_medals(&ledger.results) {
        by_club
            .entry(competitor_club(ledger, competitor))
            .or_default()
            .add(medal);
    }

    let mut clubs: Vec<ClubTally> = by_club
        .into_iter()
        .map(|(club_id, tally)| ClubTally { club_id, tally })
        .collect();
    clubs.sort_by(|a, b| {
        (b.tally.gold, b.tally.silver, b.tally.bronze)
            .cmp(&(a.tally.gold, a.tally.silver, a.tally.bronze))
    });
    clubs
}

fn competitor_members(ledger: &ResultsLedger, competitor: Competitor) -> Vec<i64> {
    match competitor {
        Competitor::Entry(id) => ledger
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| vec![e.member_id])
            .unwrap_or_default(),
        Competitor::Team(id) => ledger
            .teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.members.iter().map(|m| m.member_id).collect())
            .unwrap_or_default(),
    }
}

fn win_rate(wins: u32, bouts: u32) -> f64 {
    if bouts == 0 {
        return 0.0;
    }
    (f64::from(wins) * 1000.0 / f64::from(bouts)).round() / 10.0
}

/// Win/loss records for the given members. Team bouts and medals count
/// towards every member of the team.
pub fn member_records(members: &[Member], ledger: &ResultsLedger) -> Vec<MemberRecord> {
    let mut records: Vec<MemberRecord> = members
        .iter()
        .map(|m| MemberRecord {
            member_id: m.id,
            member_name: m.full_name(),
            club_id: m.club_id,
            bouts: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            medals: MedalTally::default(),
        })
        .collect();
    let index: HashMap<i64, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.member_id, i))
        .collect();

    for bout in &ledger.bouts {
        let Some(competitor) = bout_competitor(bout) else {
            continue;
        };
        for member_id in competitor_members(ledger, competitor) {
            if let Some(record) = index.get(&member_id).map(|i| &mut records[*i]) {
                record.bouts += 1;
                match bout.result {
                    BoutResult::Win => record.wins += 1,
                    BoutResult::Loss => record.losses += 1,
                }
            }
        }
    }

    for (competitor, medal) in awarded_medals(&ledger.results) {
        for member_id in competitor_members(ledger, competitor) {
            if let Some(record) = index.get(&member_id).map(|i| &mut records[*i]) {
                record.medals.add(medal);
            }
        }
    }

    for record in &mut records {
        record.win_rate = win_rate(record.wins, record.bouts);
    }

    records
}

pub fn competition_summary(overview: &CompetitionOverview) -> CompetitionSummary {
    let ledger = ResultsLedger::from(overview);
    let wins = overview
        .bouts
        .iter()
        .filter(|b| b.result == BoutResult::Win)
        .count();

    CompetitionSummary {
        competition_id: overview.competition.id,
        disciplines: overview.disciplines.len(),
        entries: overview.entries.len(),
        teams: overview.teams.len(),
        bouts: overview.bouts.len(),
        wins,
        losses: overview.bouts.len() - wins,
        medals: medal_tally(&overview.results),
        clubs: club_medal_tally(&ledger),
    }
}

/// Narrows competitors, bouts and results to one discipline. The discipline
/// list itself is kept whole so the caller can still offer the others.
pub fn filter_by_discipline(overview: &CompetitionOverview, discipline_id: i64) -> CompetitionOverview {
    CompetitionOverview {
        competition: overview.competition.clone(),
        disciplines: overview.disciplines.clone(),
        entries: overview
            .entries
            .iter()
            .filter(|e| e.discipline_id == discipline_id)
            .cloned()
            .collect(),
        teams: overview
            .teams
            .iter()
            .filter(|t| t.discipline_id == discipline_id)
            .cloned()
            .collect(),
        bouts: overview
            .bouts
            .iter()
            .filter(|b| b.discipline_id == discipline_id)
            .cloned()
            .collect(),
        results: overview
            .results
            .iter()
            .filter(|r| r.discipline_id == discipline_id)
            .cloned()
            .collect(),
        coaches: overview.coaches.clone(),
    }
}
