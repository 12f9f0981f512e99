//! # Bracket Engine
//!
//! Tournament bracket generation and seeding for esports-style competitions.
//!
//! Given a roster of teams with ratings, the engine seeds them, computes the
//! bracket structure for the chosen format and persists stages, positions,
//! opening matches and lifecycle phases atomically.
//!
//! ## Core Modules
//!
//! - [`tournament`]: seeding, sizing, format strategies and the assembler
//! - [`db`]: PostgreSQL pool, migrations and the repository seam
//! - [`config`]: engine defaults loaded from the environment
//!
//! ## Example
//!
//! ```no_run
//! use bracket_engine::db::{Database, DatabaseConfig};
//! use bracket_engine::tournament::{TeamInput, TournamentFormat, TournamentRequest};
//! use bracket_engine::TournamentAssembler;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     db.run_migrations().await?;
//!
//!     let assembler = TournamentAssembler::new(Arc::new(db.bracket_repository()));
//!     let teams = (1..=8).map(|id| TeamInput::new(id, 1200.0)).collect();
//!     let request = TournamentRequest::new("Spring Open", TournamentFormat::Swiss, teams);
//!
//!     let persisted = assembler.create_tournament(&request).await?;
//!     println!("Created tournament {}", persisted.tournament.id);
//!     Ok(())
//! }
//! ```

/// Engine defaults.
pub mod config;

/// Database pool, migrations and bracket storage.
pub mod db;

/// Bracket generation, seeding and persistence orchestration.
pub mod tournament;

pub use config::EngineConfig;
pub use tournament::{
    BracketError, BracketResult, ErrorKind, TournamentAssembler, TournamentFormat, TournamentPlan,
    TournamentRequest,
};
