//! Seed ordering per format.
//!
//! Rating-sorted policies are deterministic: a stable sort keeps input order
//! between teams of equal rating. Random policies draw from the injected
//! random source only.

use super::models::{TeamId, TeamInput, TournamentFormat};
use super::sizing::next_power_of_two;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How a format orders its teams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingPolicy {
    /// Highest rating first, padded with byes to a power of two
    Standard,
    /// Highest rating first, no byes
    RatingSorted,
    /// Uniform shuffle
    Random,
}

impl SeedingPolicy {
    /// Policy used by a format; unknown formats are shuffled
    pub fn for_format(format: &TournamentFormat) -> Self {
        match format {
            TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => {
                SeedingPolicy::Standard
            }
            TournamentFormat::RoundRobin
            | TournamentFormat::GroupStagePlayoffs
            | TournamentFormat::Gsl => SeedingPolicy::RatingSorted,
            TournamentFormat::Swiss | TournamentFormat::Custom(_) => SeedingPolicy::Random,
        }
    }
}

/// A team with its assigned seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeededTeam {
    pub team_id: TeamId,
    pub rating: f64,
    pub seed: u32,
}

/// One line of the seeded order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedSlot {
    Team(SeededTeam),
    /// Padding slot; never persisted, never part of a match
    Bye,
}

/// Seed snapshot stored on the tournament header
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedingRecord {
    pub seed: u32,
    pub team_id: TeamId,
    pub rating: f64,
}

/// Teams in seed order, possibly followed by byes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeededField {
    slots: Vec<SeedSlot>,
}

impl SeededField {
    pub fn slots(&self) -> &[SeedSlot] {
        &self.slots
    }

    /// Real teams in seed order
    pub fn teams(&self) -> impl Iterator<Item = &SeededTeam> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            SeedSlot::Team(team) => Some(team),
            SeedSlot::Bye => None,
        })
    }

    /// Team IDs in seed order
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams().map(|team| team.team_id).collect()
    }

    pub fn team_count(&self) -> usize {
        self.teams().count()
    }

    pub fn bye_count(&self) -> usize {
        self.slots.len() - self.team_count()
    }

    pub fn records(&self) -> Vec<SeedingRecord> {
        self.teams()
            .map(|team| SeedingRecord {
                seed: team.seed,
                team_id: team.team_id,
                rating: team.rating,
            })
            .collect()
    }
}

/// Orders a roster into seeds
#[derive(Debug, Clone, Copy)]
pub struct SeedingEngine {
    default_rating: f64,
}

impl SeedingEngine {
    pub fn new(default_rating: f64) -> Self {
        Self { default_rating }
    }

    /// Seed `teams` under `policy`; seed `i + 1` goes to the i-th team in order
    pub fn seed<R: Rng + ?Sized>(
        &self,
        teams: &[TeamInput],
        policy: SeedingPolicy,
        rng: &mut R,
    ) -> SeededField {
        let mut ordered: Vec<(TeamId, f64)> = teams
            .iter()
            .map(|team| (team.id, team.rating.unwrap_or(self.default_rating)))
            .collect();

        match policy {
            SeedingPolicy::Standard | SeedingPolicy::RatingSorted => {
                ordered.sort_by(|a, b| b.1.total_cmp(&a.1));
            }
            SeedingPolicy::Random => ordered.shuffle(rng),
        }

        let mut slots: Vec<SeedSlot> = ordered
            .into_iter()
            .enumerate()
            .map(|(index, (team_id, rating))| {
                SeedSlot::Team(SeededTeam {
                    team_id,
                    rating,
                    seed: index as u32 + 1,
                })
            })
            .collect();

        if policy == SeedingPolicy::Standard && !slots.is_empty() {
            slots.resize(next_power_of_two(slots.len()), SeedSlot::Bye);
        }

        SeededField { slots }
    }
}

impl Default for SeedingEngine {
    fn default() -> Self {
        Self::new(super::models::DEFAULT_TEAM_RATING)
    }
}
