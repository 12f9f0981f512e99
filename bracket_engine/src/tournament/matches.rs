//! Match generation: pairing rules, progression links and placeholder
//! scheduling.
//!
//! Elimination openings pair adjacent seeds (1v2, 3v4, ...) after byes are
//! removed. Byes never become matches.

use super::errors::{BracketError, BracketResult};
use super::models::{MatchFormatSettings, MatchPhase, MatchStatus, StageId, TeamId};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A slot in another (or the same) stage, by plan index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRef {
    pub stage: usize,
    pub round: u32,
    pub slot: u32,
}

/// A slot in a persisted stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedSlot {
    pub stage_id: StageId,
    pub round: u32,
    pub slot: u32,
}

/// Where the teams of a match go once it is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressionRules {
    pub winner_advances_to: Option<SlotRef>,
    pub loser_drops_to: Option<SlotRef>,
}

/// Progression rules with stage indices replaced by stage IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedProgression {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_advances_to: Option<ResolvedSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser_drops_to: Option<ResolvedSlot>,
}

impl ProgressionRules {
    pub fn is_empty(&self) -> bool {
        self.winner_advances_to.is_none() && self.loser_drops_to.is_none()
    }

    /// Swap stage indices for the IDs the store assigned
    pub fn resolve(&self, stage_ids: &[StageId]) -> BracketResult<ResolvedProgression> {
        let resolve = |slot: Option<SlotRef>| -> BracketResult<Option<ResolvedSlot>> {
            slot.map(|slot| {
                let stage_id = stage_ids
                    .get(slot.stage)
                    .copied()
                    .ok_or(BracketError::UnknownStage(slot.stage))?;
                Ok(ResolvedSlot {
                    stage_id,
                    round: slot.round,
                    slot: slot.slot,
                })
            })
            .transpose()
        };

        Ok(ResolvedProgression {
            winner_advances_to: resolve(self.winner_advances_to)?,
            loser_drops_to: resolve(self.loser_drops_to)?,
        })
    }
}

/// How a match picks its maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VetoFormat {
    #[serde(rename = "type")]
    pub veto_type: String,
    pub maps: u32,
}

impl VetoFormat {
    /// Veto sequence for a best-of format; unknown formats pick three maps
    pub fn for_match_format(match_format: &str) -> Self {
        let (veto_type, maps) = match match_format {
            "bo1" => ("random", 1),
            "bo3" => ("ban-ban-pick", 3),
            "bo5" => ("ban-ban-pick-pick-pick", 5),
            "bo7" => ("ban-ban-pick-pick-pick-pick-pick", 7),
            _ => ("pick", 3),
        };
        Self {
            veto_type: veto_type.to_string(),
            maps,
        }
    }
}

/// Map pool and veto rules stored on every match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapData {
    pub map_pool: Vec<String>,
    pub veto_format: VetoFormat,
}

/// A match before it is persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMatch {
    /// Index of the stage in the plan
    pub stage: usize,
    pub round_number: u32,
    pub match_number: u32,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub status: MatchStatus,
    pub match_format: String,
    pub scheduled_at: DateTime<Utc>,
    pub progression_rules: Option<ProgressionRules>,
    pub map_data: MapData,
}

/// Non-overlapping slot model: rounds are spaced apart, matches within a
/// round are spaced apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    start: DateTime<Utc>,
    round_spacing: Duration,
    match_spacing: Duration,
}

impl Schedule {
    /// # Errors
    ///
    /// Returns `InvalidSchedule` for a negative spacing or one `Duration`
    /// cannot hold.
    pub fn new(
        start: DateTime<Utc>,
        round_spacing_hours: i64,
        match_spacing_hours: i64,
    ) -> BracketResult<Self> {
        Ok(Self {
            start,
            round_spacing: spacing("round spacing", round_spacing_hours)?,
            match_spacing: spacing("match spacing", match_spacing_hours)?,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// `start + (round - 1) * round_spacing + (match_number - 1) * match_spacing`
    pub fn slot(&self, round: u32, match_number: u32) -> DateTime<Utc> {
        self.start
            + self.round_spacing * (round.saturating_sub(1) as i32)
            + self.match_spacing * (match_number.saturating_sub(1) as i32)
    }
}

fn spacing(setting: &'static str, hours: i64) -> BracketResult<Duration> {
    if hours < 0 {
        return Err(BracketError::InvalidSchedule { setting, hours });
    }
    Duration::try_hours(hours).ok_or(BracketError::InvalidSchedule { setting, hours })
}

/// Pair items 0-1, 2-3, ...; an odd item out is left unpaired
pub fn adjacent_pairs<T: Copy>(items: &[T]) -> Vec<(T, T)> {
    items
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Circle-method round for the pair `(i, j)` of an `n` team round robin
pub fn round_robin_round(i: usize, j: usize, n: usize) -> u32 {
    if n < 2 {
        1
    } else {
        1 + ((i + j) % (n - 1)) as u32
    }
}

/// Builds the matches that exist before any result is known
#[derive(Debug, Clone)]
pub struct MatchGenerator {
    schedule: Schedule,
    formats: MatchFormatSettings,
    map_pool: Vec<String>,
}

impl MatchGenerator {
    pub fn new(schedule: Schedule, formats: MatchFormatSettings, map_pool: Vec<String>) -> Self {
        Self {
            schedule,
            formats,
            map_pool,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn formats(&self) -> &MatchFormatSettings {
        &self.formats
    }

    #[allow(clippy::too_many_arguments)]
    fn planned(
        &self,
        stage: usize,
        round_number: u32,
        match_number: u32,
        team1_id: TeamId,
        team2_id: TeamId,
        phase: MatchPhase,
        progression_rules: Option<ProgressionRules>,
    ) -> PlannedMatch {
        let match_format = self.formats.for_phase(phase).to_string();
        PlannedMatch {
            stage,
            round_number,
            match_number,
            team1_id,
            team2_id,
            status: MatchStatus::Pending,
            scheduled_at: self.schedule.slot(round_number, match_number),
            progression_rules,
            map_data: MapData {
                map_pool: self.map_pool.clone(),
                veto_format: VetoFormat::for_match_format(&match_format),
            },
            match_format,
        }
    }

    /// Round 1 of an elimination stage: adjacent seeds, winners to the next
    /// round of the same stage and, when `loser_stage` is given, losers to its
    /// first round
    pub fn elimination_opening(
        &self,
        stage: usize,
        total_rounds: u32,
        loser_stage: Option<usize>,
        teams: &[TeamId],
    ) -> Vec<PlannedMatch> {
        adjacent_pairs(teams)
            .into_iter()
            .enumerate()
            .map(|(index, (team1, team2))| {
                let match_number = index as u32 + 1;
                let next_slot = match_number.div_ceil(2);
                let progression = ProgressionRules {
                    winner_advances_to: (total_rounds > 1).then_some(SlotRef {
                        stage,
                        round: 2,
                        slot: next_slot,
                    }),
                    loser_drops_to: loser_stage.map(|lower| SlotRef {
                        stage: lower,
                        round: 1,
                        slot: next_slot,
                    }),
                };
                self.planned(
                    stage,
                    1,
                    match_number,
                    team1,
                    team2,
                    MatchPhase::Playoffs,
                    (!progression.is_empty()).then_some(progression),
                )
            })
            .collect()
    }

    /// Round 1 of a Swiss stage: adjacent pairs of the shuffled order
    pub fn swiss_opening(&self, stage: usize, teams: &[TeamId]) -> Vec<PlannedMatch> {
        adjacent_pairs(teams)
            .into_iter()
            .enumerate()
            .map(|(index, (team1, team2))| {
                self.planned(stage, 1, index as u32 + 1, team1, team2, MatchPhase::Swiss, None)
            })
            .collect()
    }

    /// Every pair exactly once, circle-method rounds, numbered in generation
    /// order (i outer, j inner)
    pub fn round_robin(&self, stage: usize, teams: &[TeamId]) -> Vec<PlannedMatch> {
        let n = teams.len();
        let mut matches = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        let mut match_number = 1;
        for i in 0..n {
            for j in (i + 1)..n {
                matches.push(self.planned(
                    stage,
                    round_robin_round(i, j, n),
                    match_number,
                    teams[i],
                    teams[j],
                    MatchPhase::GroupStage,
                    None,
                ));
                match_number += 1;
            }
        }
        matches
    }

    /// Every pair of one group exactly once; round `i + j + 1` by position
    /// within the group, numbering restarts per group
    pub fn group_round_robin(&self, stage: usize, teams: &[TeamId]) -> Vec<PlannedMatch> {
        let n = teams.len();
        let mut matches = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        let mut match_number = 1;
        for i in 0..n {
            for j in (i + 1)..n {
                matches.push(self.planned(
                    stage,
                    (i + j + 1) as u32,
                    match_number,
                    teams[i],
                    teams[j],
                    MatchPhase::GroupStage,
                    None,
                ));
                match_number += 1;
            }
        }
        matches
    }

    /// GSL opening: seed 1 v 2 and seed 3 v 4 of the group; short groups only
    /// get the pairings they can fill
    pub fn gsl_opening(
        &self,
        winners_stage: usize,
        losers_stage: usize,
        teams: &[TeamId],
    ) -> Vec<PlannedMatch> {
        let progression = ProgressionRules {
            winner_advances_to: Some(SlotRef {
                stage: winners_stage,
                round: 2,
                slot: 1,
            }),
            loser_drops_to: Some(SlotRef {
                stage: losers_stage,
                round: 1,
                slot: 1,
            }),
        };

        adjacent_pairs(&teams[..teams.len().min(4)])
            .into_iter()
            .enumerate()
            .map(|(index, (team1, team2))| {
                self.planned(
                    winners_stage,
                    1,
                    index as u32 + 1,
                    team1,
                    team2,
                    MatchPhase::GroupStage,
                    Some(progression),
                )
            })
            .collect()
    }
}
