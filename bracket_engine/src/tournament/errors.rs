//! Bracket generation error types.

use super::models::{TeamId, TournamentId};
use std::time::Duration;
use thiserror::Error;

/// Broad classification of a [`BracketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request cannot be turned into a bracket
    Configuration,
    /// The builder produced an inconsistent plan (a bug, never user input)
    Integrity,
    /// The store failed; the transaction was rolled back
    Persistence,
}

/// Bracket generation errors
#[derive(Debug, Error)]
pub enum BracketError {
    /// No strategy is registered for the requested format
    #[error("Unsupported tournament format: {0}")]
    UnsupportedFormat(String),

    /// The roster is empty
    #[error("Tournament has no teams")]
    NoTeams,

    /// More teams than the tournament allows
    #[error("Too many teams: {team_count} registered, max {max_teams}")]
    TooManyTeams { team_count: usize, max_teams: usize },

    /// The same team appears twice in the roster
    #[error("Team {0} registered more than once")]
    DuplicateTeam(TeamId),

    /// Group-based formats need at least two teams per group
    #[error("Invalid group size {0}: groups need at least two teams")]
    InvalidGroupSize(usize),

    /// Teams advancing per group must be between 1 and the group size
    #[error("Invalid advancement per group: {advancement} with group size {group_size}")]
    InvalidAdvancement { advancement: usize, group_size: usize },

    /// Tournament not found
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    /// A bracket was requested in another format than the tournament's
    #[error("Tournament {tournament_id} is {stored}, cannot generate a {requested} bracket")]
    FormatMismatch {
        tournament_id: TournamentId,
        stored: String,
        requested: String,
    },

    /// A bracket for an existing tournament seeds a team it never registered
    #[error("Team {team_id} is not registered for tournament {tournament_id}")]
    TeamNotRegistered {
        tournament_id: TournamentId,
        team_id: TeamId,
    },

    /// A scheduling interval is negative or too large
    #[error("Invalid {setting}: {hours} hours")]
    InvalidSchedule { setting: &'static str, hours: i64 },

    /// A reported winner did not play the match
    #[error("Team {team_id} did not play match {match_id}")]
    NotAParticipant { match_id: i64, team_id: TeamId },

    /// A match would pair a team against itself
    #[error("Stage {stage} round {round} match {match_number} pairs team {team_id} against itself")]
    SelfPairing {
        stage: usize,
        round: u32,
        match_number: u32,
        team_id: TeamId,
    },

    /// A stage feeds from itself, a later stage or a stage with a later order
    #[error("Stage {stage} feeds from stage {feeds_from}, which is not an earlier stage")]
    InvalidFeed { stage: usize, feeds_from: usize },

    /// A row references a stage index outside the plan
    #[error("Reference to unknown stage {0}")]
    UnknownStage(usize),

    /// A match references a team that is not registered
    #[error("Match references unregistered team {0}")]
    UnregisteredTeam(TeamId),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-SQL store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The write transaction did not finish in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}

impl BracketError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::UnsupportedFormat(_)
            | BracketError::NoTeams
            | BracketError::TooManyTeams { .. }
            | BracketError::DuplicateTeam(_)
            | BracketError::InvalidGroupSize(_)
            | BracketError::InvalidAdvancement { .. }
            | BracketError::TournamentNotFound(_)
            | BracketError::FormatMismatch { .. }
            | BracketError::TeamNotRegistered { .. }
            | BracketError::InvalidSchedule { .. }
            | BracketError::NotAParticipant { .. } => ErrorKind::Configuration,
            BracketError::SelfPairing { .. }
            | BracketError::InvalidFeed { .. }
            | BracketError::UnknownStage(_)
            | BracketError::UnregisteredTeam(_) => ErrorKind::Integrity,
            BracketError::Database(_)
            | BracketError::Migration(_)
            | BracketError::Serialization(_)
            | BracketError::Storage(_)
            | BracketError::Timeout(_) => ErrorKind::Persistence,
        }
    }

    /// Get a client-safe error message that doesn't leak store internals
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Configuration => self.to_string(),
            ErrorKind::Integrity => "Bracket generation failed".to_string(),
            ErrorKind::Persistence => "Internal server error".to_string(),
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
