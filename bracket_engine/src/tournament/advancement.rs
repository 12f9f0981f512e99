//! Contract for moving teams through a bracket once results arrive.
//!
//! Generation only builds the opening structure. An [`AdvancementProcessor`]
//! consumes completed matches and is expected to:
//! - eliminate the loser or drop it into the `feeds_from`-linked lower stage,
//! - fill next-round positions and create a match once both slots are filled,
//! - for Swiss, recompute standings (wins, Buchholz) and pair the next round
//!   by score group.

use super::errors::{BracketError, BracketResult};
use super::matches::{ResolvedProgression, ResolvedSlot};
use super::models::{MatchRecord, StageId, TeamId, TournamentId};
use async_trait::async_trait;
use serde::Serialize;

/// A decided match with a validated winner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedMatch {
    pub match_id: i64,
    pub tournament_id: TournamentId,
    pub stage_id: StageId,
    pub round_number: u32,
    pub match_number: u32,
    pub winner_id: TeamId,
    pub loser_id: TeamId,
    pub progression: Option<ResolvedProgression>,
}

/// What happens to the loser of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoserOutcome {
    Eliminated,
    DropsTo(ResolvedSlot),
}

/// Where both teams of a completed match go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvancementOutcome {
    pub winner_id: TeamId,
    /// `None` when the match decided its stage
    pub winner_advances_to: Option<ResolvedSlot>,
    pub loser_id: TeamId,
    pub loser: LoserOutcome,
}

impl CompletedMatch {
    /// Record `winner_id` as the winner of a persisted match
    ///
    /// # Errors
    ///
    /// Returns `NotAParticipant` if `winner_id` did not play the match.
    pub fn from_record(record: &MatchRecord, winner_id: TeamId) -> BracketResult<Self> {
        let planned = &record.planned;
        let loser_id = if winner_id == planned.team1_id {
            planned.team2_id
        } else if winner_id == planned.team2_id {
            planned.team1_id
        } else {
            return Err(BracketError::NotAParticipant {
                match_id: record.id,
                team_id: winner_id,
            });
        };

        Ok(Self {
            match_id: record.id,
            tournament_id: record.tournament_id,
            stage_id: record.stage_id,
            round_number: planned.round_number,
            match_number: planned.match_number,
            winner_id,
            loser_id,
            progression: record.progression,
        })
    }

    /// Routing given by the match's progression rules
    pub fn routing(&self) -> AdvancementOutcome {
        let progression = self.progression.unwrap_or_default();
        AdvancementOutcome {
            winner_id: self.winner_id,
            winner_advances_to: progression.winner_advances_to,
            loser_id: self.loser_id,
            loser: progression
                .loser_drops_to
                .map_or(LoserOutcome::Eliminated, LoserOutcome::DropsTo),
        }
    }
}

/// Follow-on component that advances teams after each result
#[async_trait]
pub trait AdvancementProcessor: Send + Sync {
    /// Apply a completed match to the bracket
    async fn process_completed_match(
        &self,
        completed: &CompletedMatch,
    ) -> BracketResult<AdvancementOutcome>;

    /// Pair the next Swiss round by score group
    async fn pair_next_swiss_round(
        &self,
        tournament_id: TournamentId,
        stage_id: StageId,
        round: u32,
    ) -> BracketResult<Vec<MatchRecord>>;
}
