//! The "log results" flow as an explicit state machine.
//!
//! A draft walks `Discipline → Competitor → Coach → Outcome → Scores → Medal
//! → Confirm`. Team disciplines skip `Coach`, and outcomes that already
//! decide the medal skip `Medal`. The server keeps no wizard state: clients
//! send the draft with every action and get the next draft back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::models::{BoutResult, CompetitionOverview, Medal};

pub const ROUND_FINAL: &str = "Final";
pub const ROUND_SEMI_FINAL: &str = "Semi Final";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Discipline,
    Competitor,
    Coach,
    Outcome,
    Scores,
    Medal,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Competitor {
    Entry(i64),
    Team(i64),
}

impl Competitor {
    pub fn entry_id(&self) -> Option<i64> {
        match self {
            Competitor::Entry(id) => Some(*id),
            Competitor::Team(_) => None,
        }
    }

    pub fn team_id(&self) -> Option<i64> {
        match self {
            Competitor::Team(id) => Some(*id),
            Competitor::Entry(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    SelectDiscipline {
        discipline_id: i64,
    },
    SelectCompetitor {
        competitor: Competitor,
    },
    SelectCoach {
        coach_id: Option<i64>,
    },
    SetOutcome {
        result: BoutResult,
        is_final: bool,
        #[serde(default)]
        round: Option<String>,
    },
    SetScores {
        score_for: i64,
        score_against: i64,
    },
    SelectMedal {
        medal: Option<Medal>,
    },
    Back,
}

impl WizardAction {
    fn step(&self) -> Option<WizardStep> {
        match self {
            WizardAction::SelectDiscipline { .. } => Some(WizardStep::Discipline),
            WizardAction::SelectCompetitor { .. } => Some(WizardStep::Competitor),
            WizardAction::SelectCoach { .. } => Some(WizardStep::Coach),
            WizardAction::SetOutcome { .. } => Some(WizardStep::Outcome),
            WizardAction::SetScores { .. } => Some(WizardStep::Scores),
            WizardAction::SelectMedal { .. } => Some(WizardStep::Medal),
            WizardAction::Back => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("Action for step {action:?} is not allowed while on step {current:?}")]
    WrongStep {
        current: WizardStep,
        action: WizardStep,
    },

    #[error("Already at the first step")]
    NothingToUndo,

    #[error("{0}")]
    Invalid(String),

    #[error("Draft is incomplete: missing {0}")]
    Incomplete(&'static str),
}

impl From<WizardError> for AppError {
    fn from(error: WizardError) -> Self {
        AppError::Validation(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultDraft {
    #[serde(default)]
    pub step: WizardStep,
    #[serde(default)]
    pub history: Vec<WizardStep>,
    pub discipline_id: Option<i64>,
    pub competitor: Option<Competitor>,
    pub coach_id: Option<i64>,
    pub result: Option<BoutResult>,
    #[serde(default)]
    pub is_final: bool,
    pub round: Option<String>,
    pub score_for: Option<i64>,
    pub score_against: Option<i64>,
    pub medal: Option<Medal>,
    pub round_reached: Option<String>,
}

/// A confirmed draft, ready to be written as a bout plus an optional result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub discipline_id: i64,
    pub competitor: Competitor,
    pub coach_id: Option<i64>,
    pub result: BoutResult,
    pub score_for: i64,
    pub score_against: i64,
    pub round: Option<String>,
    pub is_final: bool,
    pub medal: Option<Medal>,
    pub round_reached: Option<String>,
}

impl ResultSubmission {
    /// Only outcomes that award a medal produce a result row.
    pub fn records_result(&self) -> bool {
        self.medal.is_some()
    }
}

impl ResultDraft {
    /// Applies one action and returns the next draft. `self` is left as is,
    /// so a rejected action leaves the caller's draft untouched.
    pub fn advance(
        &self,
        ctx: &CompetitionOverview,
        action: WizardAction,
    ) -> Result<ResultDraft, WizardError> {
        let mut next = self.clone();

        if let Some(action_step) = action.step() {
            if action_step != self.step {
                return Err(WizardError::WrongStep {
                    current: self.step,
                    action: action_step,
                });
            }
        }

        let following = match action {
            WizardAction::Back => {
                next.step = next.history.pop().ok_or(WizardError::NothingToUndo)?;
                return Ok(next);
            }
            WizardAction::SelectDiscipline { discipline_id } => {
                next.select_discipline(ctx, discipline_id)?
            }
            WizardAction::SelectCompetitor { competitor } => {
                next.select_competitor(ctx, competitor)?
            }
            WizardAction::SelectCoach { coach_id } => next.select_coach(ctx, coach_id)?,
            WizardAction::SetOutcome {
                result,
                is_final,
                round,
            } => {
                next.result = Some(result);
                next.is_final = is_final;
                next.round = round
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                WizardStep::Scores
            }
            WizardAction::SetScores {
                score_for,
                score_against,
            } => next.set_scores(score_for, score_against)?,
            WizardAction::SelectMedal { medal } => next.select_medal(medal)?,
        };

        next.history.push(self.step);
        next.step = following;
        Ok(next)
    }

    fn select_discipline(
        &mut self,
        ctx: &CompetitionOverview,
        discipline_id: i64,
    ) -> Result<WizardStep, WizardError> {
        if ctx.discipline(discipline_id).is_none() {
            return Err(WizardError::Invalid(format!(
                "Discipline {} is not part of this competition",
                discipline_id
            )));
        }

        if self.discipline_id != Some(discipline_id) {
            self.competitor = None;
            self.coach_id = None;
        }
        self.discipline_id = Some(discipline_id);

        Ok(WizardStep::Competitor)
    }

    fn select_competitor(
        &mut self,
        ctx: &CompetitionOverview,
        competitor: Competitor,
    ) -> Result<WizardStep, WizardError> {
        let discipline = self
            .discipline_id
            .and_then(|id| ctx.discipline(id))
            .ok_or(WizardError::Incomplete("discipline"))?;

        match (discipline.is_team_event, competitor) {
            (true, Competitor::Team(team_id)) => {
                let team = ctx.team(team_id).filter(|t| t.discipline_id == discipline.id);
                if team.is_none() {
                    return Err(WizardError::Invalid(format!(
                        "Team {} is not entered in '{}'",
                        team_id, discipline.name
                    )));
                }
                self.competitor = Some(competitor);
                self.coach_id = None;
                Ok(WizardStep::Outcome)
            }
            (false, Competitor::Entry(entry_id)) => {
                let entry = ctx
                    .entry(entry_id)
                    .filter(|e| e.discipline_id == discipline.id)
                    .ok_or_else(|| {
                        WizardError::Invalid(format!(
                            "Entry {} is not registered in '{}'",
                            entry_id, discipline.name
                        ))
                    })?;
                if self.competitor != Some(competitor) {
                    self.coach_id = entry.coach_id;
                }
                self.competitor = Some(competitor);
                Ok(WizardStep::Coach)
            }
            (true, Competitor::Entry(_)) => Err(WizardError::Invalid(format!(
                "'{}' is a team event; choose a team",
                discipline.name
            ))),
            (false, Competitor::Team(_)) => Err(WizardError::Invalid(format!(
                "'{}' is an individual event; choose an entry",
                discipline.name
            ))),
        }
    }

    fn select_coach(
        &mut self,
        ctx: &CompetitionOverview,
        coach_id: Option<i64>,
    ) -> Result<WizardStep, WizardError> {
        if let Some(id) = coach_id {
            if ctx.coach(id).is_none() {
                return Err(WizardError::Invalid(format!("Member {} is not a coach", id)));
            }
        }
        self.coach_id = coach_id;
        Ok(WizardStep::Outcome)
    }

    fn set_scores(&mut self, score_for: i64, score_against: i64) -> Result<WizardStep, WizardError> {
        if score_for < 0 || score_against < 0 {
            return Err(WizardError::Invalid("Scores cannot be negative".to_string()));
        }
        self.score_for = Some(score_for);
        self.score_against = Some(score_against);

        let result = self.result.ok_or(WizardError::Incomplete("result"))?;
        match (result, self.is_final) {
            (BoutResult::Win, true) => {
                self.medal = Some(Medal::Gold);
                self.round_reached = Some(ROUND_FINAL.to_string());
                Ok(WizardStep::Confirm)
            }
            (BoutResult::Loss, true) => {
                self.medal = Some(Medal::Silver);
                self.round_reached = Some(ROUND_FINAL.to_string());
                Ok(WizardStep::Confirm)
            }
            (BoutResult::Win, false) => {
                self.medal = None;
                self.round_reached = None;
                Ok(WizardStep::Confirm)
            }
            (BoutResult::Loss, false) => {
                self.medal = None;
                self.round_reached = None;
                Ok(WizardStep::Medal)
            }
        }
    }

    fn select_medal(&mut self, medal: Option<Medal>) -> Result<WizardStep, WizardError> {
        if self.result != Some(BoutResult::Loss) || self.is_final {
            return Err(WizardError::Invalid(
                "A medal is only chosen after a non-final loss".to_string(),
            ));
        }
        self.round_reached = medal_round(BoutResult::Loss, false, medal, self.round.as_deref())?;
        self.medal = medal;
        Ok(WizardStep::Confirm)
    }

    /// Re-checks a confirmed draft against the competition and turns it into
    /// the rows to write.
    pub fn submission(&self, ctx: &CompetitionOverview) -> Result<ResultSubmission, WizardError> {
        if self.step != WizardStep::Confirm {
            return Err(WizardError::Invalid(format!(
                "Draft is on step {:?}, not ready to confirm",
                self.step
            )));
        }

        let discipline_id = self
            .discipline_id
            .ok_or(WizardError::Incomplete("discipline"))?;
        let discipline = ctx.discipline(discipline_id).ok_or_else(|| {
            WizardError::Invalid(format!(
                "Discipline {} is not part of this competition",
                discipline_id
            ))
        })?;
        let competitor = self.competitor.ok_or(WizardError::Incomplete("competitor"))?;

        let competitor_ok = match competitor {
            Competitor::Entry(id) => {
                !discipline.is_team_event
                    && ctx.entry(id).is_some_and(|e| e.discipline_id == discipline_id)
            }
            Competitor::Team(id) => {
                discipline.is_team_event
                    && ctx.team(id).is_some_and(|t| t.discipline_id == discipline_id)
            }
        };
        if !competitor_ok {
            return Err(WizardError::Invalid(
                "Competitor is no longer registered in this discipline".to_string(),
            ));
        }

        if let Some(coach_id) = self.coach_id {
            if ctx.coach(coach_id).is_none() {
                return Err(WizardError::Invalid(format!("Member {} is not a coach", coach_id)));
            }
        }

        let result = self.result.ok_or(WizardError::Incomplete("result"))?;
        let score_for = self.score_for.ok_or(WizardError::Incomplete("score_for"))?;
        let score_against = self
            .score_against
            .ok_or(WizardError::Incomplete("score_against"))?;
        if score_for < 0 || score_against < 0 {
            return Err(WizardError::Invalid("Scores cannot be negative".to_string()));
        }

        // The draft comes back from the client, so the medal is derived again.
        let round_reached = medal_round(result, self.is_final, self.medal, self.round.as_deref())?;
        if round_reached != self.round_reached {
            return Err(WizardError::Invalid(
                "Round reached does not match the medal".to_string(),
            ));
        }

        Ok(ResultSubmission {
            discipline_id,
            competitor,
            coach_id: self.coach_id,
            result,
            score_for,
            score_against,
            round: self.round.clone(),
            is_final: self.is_final,
            medal: self.medal,
            round_reached,
        })
    }
}

/// The round reached implied by a medal for the given outcome, or an error
/// when that outcome cannot carry the medal.
fn medal_round(
    result: BoutResult,
    is_final: bool,
    medal: Option<Medal>,
    round: Option<&str>,
) -> Result<Option<String>, WizardError> {
    match (result, is_final, medal) {
        (BoutResult::Win, true, Some(Medal::Gold)) | (BoutResult::Loss, true, Some(Medal::Silver)) => {
            Ok(Some(ROUND_FINAL.to_string()))
        }
        (BoutResult::Win, false, None) => Ok(None),
        (BoutResult::Loss, false, Some(Medal::Silver)) => Ok(Some(ROUND_FINAL.to_string())),
        (BoutResult::Loss, false, Some(Medal::Bronze)) => Ok(Some(ROUND_SEMI_FINAL.to_string())),
        (BoutResult::Loss, false, None) => Ok(round.map(str::to_string)),
        (BoutResult::Loss, _, Some(Medal::Gold)) => Err(WizardError::Invalid(
            "A lost bout cannot award a gold medal".to_string(),
        )),
        (result, is_final, medal) => Err(WizardError::Invalid(format!(
            "A {}{} cannot carry medal {:?}",
            if is_final { "final " } else { "" },
            result.as_str().to_lowercase(),
            medal.map(|m| m.as_str()),
        ))),
    }
}
