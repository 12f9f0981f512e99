//! Bracket generation configuration.
//!
//! Every knob has a default; unparsable values fall back to it.

use crate::tournament::errors::{BracketError, BracketResult};
use crate::tournament::models::DEFAULT_TEAM_RATING;
use crate::tournament::sizing::{DEFAULT_ADVANCEMENT_PER_GROUP, DEFAULT_GROUP_SIZE};

/// Longest accepted spacing or start delay: one leap year
pub const MAX_SCHEDULE_HOURS: i64 = 24 * 366;

/// Generation defaults and scheduling heuristics
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Rating for teams that arrive without one
    pub default_rating: f64,
    /// Group size when a request leaves it unset
    pub default_group_size: usize,
    /// Teams leaving each group when a request leaves it unset
    pub advancement_per_group: usize,
    /// Hours between rounds
    pub round_spacing_hours: i64,
    /// Hours between matches of one round
    pub match_spacing_hours: i64,
    /// Delay from creation to the first match when no start date is given
    pub start_delay_hours: i64,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - `BRACKET_DEFAULT_RATING` (default: 1000)
    /// - `BRACKET_DEFAULT_GROUP_SIZE` (default: 4)
    /// - `BRACKET_ADVANCEMENT_PER_GROUP` (default: 2)
    /// - `BRACKET_ROUND_SPACING_HOURS` (default: 4)
    /// - `BRACKET_MATCH_SPACING_HOURS` (default: 1)
    /// - `BRACKET_START_DELAY_HOURS` (default: 24)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            default_rating: parse_or(&lookup, "BRACKET_DEFAULT_RATING", defaults.default_rating),
            default_group_size: parse_or(
                &lookup,
                "BRACKET_DEFAULT_GROUP_SIZE",
                defaults.default_group_size,
            ),
            advancement_per_group: parse_or(
                &lookup,
                "BRACKET_ADVANCEMENT_PER_GROUP",
                defaults.advancement_per_group,
            ),
            round_spacing_hours: parse_or(
                &lookup,
                "BRACKET_ROUND_SPACING_HOURS",
                defaults.round_spacing_hours,
            ),
            match_spacing_hours: parse_or(
                &lookup,
                "BRACKET_MATCH_SPACING_HOURS",
                defaults.match_spacing_hours,
            ),
            start_delay_hours: parse_or(
                &lookup,
                "BRACKET_START_DELAY_HOURS",
                defaults.start_delay_hours,
            ),
        }
    }

    /// Reject defaults no format could use
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroupSize` or `InvalidAdvancement` for unusable group
    /// defaults, and `InvalidSchedule` for a negative interval or one longer
    /// than [`MAX_SCHEDULE_HOURS`].
    pub fn validate(&self) -> BracketResult<()> {
        for (setting, hours) in [
            ("round spacing", self.round_spacing_hours),
            ("match spacing", self.match_spacing_hours),
            ("start delay", self.start_delay_hours),
        ] {
            if !(0..=MAX_SCHEDULE_HOURS).contains(&hours) {
                return Err(BracketError::InvalidSchedule { setting, hours });
            }
        }

        if self.default_group_size <= 1 {
            return Err(BracketError::InvalidGroupSize(self.default_group_size));
        }
        if self.advancement_per_group == 0 || self.advancement_per_group > self.default_group_size {
            return Err(BracketError::InvalidAdvancement {
                advancement: self.advancement_per_group,
                group_size: self.default_group_size,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_rating: DEFAULT_TEAM_RATING,
            default_group_size: DEFAULT_GROUP_SIZE,
            advancement_per_group: DEFAULT_ADVANCEMENT_PER_GROUP,
            round_spacing_hours: 4,
            match_spacing_hours: 1,
            start_delay_hours: 24,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
