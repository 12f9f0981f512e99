//! Tournament bracket generation and seeding.
//!
//! This module turns a roster of rated teams into a complete bracket for one
//! of six formats:
//! - Single and double elimination, padded to a power of two with byes
//! - Swiss, with a top-8 playoff
//! - Round robin
//! - Group stage into an elimination playoff
//! - GSL groups into an elimination playoff
//!
//! Generation is pure up to [`plan::TournamentPlan`]; the
//! [`manager::TournamentAssembler`] then writes the plan through a
//! [`crate::db::BracketRepository`] in one transaction.
//!
//! ## Example
//!
//! ```
//! use bracket_engine::tournament::{
//!     PlanBuilder, StrategyRegistry, TeamInput, TournamentFormat, TournamentRequest,
//! };
//! use bracket_engine::EngineConfig;
//!
//! let teams = (1..=6).map(|id| TeamInput::new(id, 1500.0 - id as f64 * 10.0)).collect();
//! let request = TournamentRequest::new("Weekend Cup", TournamentFormat::SingleElimination, teams);
//!
//! let registry = StrategyRegistry::standard();
//! let config = EngineConfig::default();
//! let plan = PlanBuilder::new(&registry, &config)
//!     .build(&request, chrono::Utc::now(), &mut rand::rng())
//!     .unwrap();
//!
//! assert_eq!(plan.byes, 2);
//! assert_eq!(plan.matches.len(), 3);
//! ```

pub mod advancement;
pub mod clock;
pub mod errors;
pub mod manager;
pub mod matches;
pub mod models;
pub mod plan;
pub mod positions;
pub mod seeding;
pub mod sizing;
pub mod stages;
pub mod strategy;

pub use advancement::{AdvancementOutcome, AdvancementProcessor, CompletedMatch, LoserOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{BracketError, BracketResult, ErrorKind};
pub use manager::TournamentAssembler;
pub use matches::{
    MapData, MatchGenerator, PlannedMatch, ProgressionRules, ResolvedProgression, ResolvedSlot,
    Schedule, SlotRef, VetoFormat,
};
pub use models::{
    BracketData, MatchFormatSettings, MatchRecord, MatchStatus, PersistedStructure,
    PersistedTournament, PhaseSpec, PrizeStructure, QualificationSettings, RowCounts, StageId,
    StageType, TeamId, TeamInput, TournamentFormat, TournamentId, TournamentRecord,
    TournamentRequest, TournamentStatus,
};
pub use plan::{PlanBuilder, TournamentPlan};
pub use positions::{PlannedPosition, PositionAllocator};
pub use seeding::{SeededField, SeedingEngine, SeedingPolicy, SeedingRecord};
pub use stages::StageSpec;
pub use strategy::{BracketFormatStrategy, GenerationContext, StrategyRegistry};
