//! Tournament assembler: turns a request into a persisted bracket.

use super::clock::{Clock, SystemClock};
use super::errors::BracketResult;
use super::models::{
    PersistedStructure, PersistedTournament, RowCounts, TournamentId, TournamentRequest,
};
use super::plan::{PlanBuilder, TournamentPlan};
use super::strategy::StrategyRegistry;
use crate::config::EngineConfig;
use crate::db::BracketRepository;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

/// Builds bracket plans and writes them through a [`BracketRepository`]
///
/// Every write is a single transaction: a failure anywhere leaves no rows
/// behind.
pub struct TournamentAssembler {
    repository: Arc<dyn BracketRepository>,
    registry: StrategyRegistry,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl TournamentAssembler {
    /// Assembler with the standard formats, default config and the system clock
    pub fn new(repository: Arc<dyn BracketRepository>) -> Self {
        Self::with_parts(
            repository,
            StrategyRegistry::standard(),
            EngineConfig::default(),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(
        repository: Arc<dyn BracketRepository>,
        registry: StrategyRegistry,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            config,
            clock,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Replace the format registry
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Make randomized seeding reproducible
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Build and validate the plan for `request` without touching the store
    pub fn plan(&self, request: &TournamentRequest) -> BracketResult<TournamentPlan> {
        let now = self.clock.now();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        PlanBuilder::new(&self.registry, &self.config).build(request, now, &mut *rng)
    }

    /// Create a tournament with its registrations and full bracket structure
    ///
    /// # Errors
    ///
    /// Configuration errors are returned before anything is written. A
    /// persistence error means the transaction was rolled back.
    pub async fn create_tournament(
        &self,
        request: &TournamentRequest,
    ) -> BracketResult<PersistedTournament> {
        let plan = self.plan(request).inspect_err(|e| {
            log::warn!("Rejected tournament '{}': {}", request.name, e);
        })?;

        match self.repository.create_tournament(&plan).await {
            Ok(persisted) => {
                log::info!(
                    "Created {} tournament {} '{}': {} teams, {} stages, {} matches, {} byes",
                    plan.format.as_str(),
                    persisted.tournament.id,
                    plan.name,
                    plan.team_count,
                    persisted.structure.stages.len(),
                    persisted.structure.matches.len(),
                    plan.byes
                );
                Ok(persisted)
            }
            Err(e) => {
                log::warn!("Failed to persist tournament '{}': {}", plan.name, e);
                Err(e)
            }
        }
    }

    /// Generate a bracket structure for an existing tournament
    ///
    /// Not idempotent: each call appends another set of stages, positions,
    /// matches and phases. Call [`Self::teardown_bracket`] first to replace.
    ///
    /// # Errors
    ///
    /// `TournamentNotFound`, `FormatMismatch` or `TeamNotRegistered` when the
    /// request does not describe the stored tournament; nothing is written.
    pub async fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        request: &TournamentRequest,
    ) -> BracketResult<PersistedStructure> {
        let plan = self.plan(request).inspect_err(|e| {
            log::warn!("Rejected bracket for tournament {}: {}", tournament_id, e);
        })?;

        match self.repository.append_structure(tournament_id, &plan).await {
            Ok(structure) => {
                log::info!(
                    "Generated {} bracket for tournament {}: {} stages, {} matches",
                    plan.format.as_str(),
                    tournament_id,
                    structure.stages.len(),
                    structure.matches.len()
                );
                Ok(structure)
            }
            Err(e) => {
                log::warn!(
                    "Failed to generate bracket for tournament {}: {}",
                    tournament_id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Remove the bracket structure of a tournament, keeping its registrations
    pub async fn teardown_bracket(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        let removed = self
            .repository
            .teardown_structure(tournament_id)
            .await
            .inspect_err(|e| {
                log::warn!("Failed to tear down tournament {}: {}", tournament_id, e);
            })?;

        log::info!(
            "Tore down tournament {}: {} rows removed",
            tournament_id,
            removed.total()
        );
        Ok(removed)
    }

    /// Rows currently stored for a tournament
    pub async fn row_counts(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        self.repository.row_counts(tournament_id).await
    }
}

impl std::fmt::Debug for TournamentAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TournamentAssembler")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
