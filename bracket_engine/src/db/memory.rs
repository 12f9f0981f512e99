//! In-process bracket store.
//!
//! Each write method works on a copy of the tables and swaps it in only when
//! every row was written, so a failed call leaves nothing behind. Writers are
//! serialized by one lock, like a single write transaction.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::repository::BracketRepository;
use crate::tournament::errors::{BracketError, BracketResult};
use crate::tournament::models::{
    MatchRecord, PersistedStructure, PersistedTournament, PhaseRecord, PositionRecord, RowCounts,
    StageId, StageRecord, TeamEntryRecord, TeamId, TournamentId, TournamentRecord,
};
use crate::tournament::plan::TournamentPlan;

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: i64,
    tournaments: BTreeMap<TournamentId, TournamentRecord>,
    teams: Vec<TeamEntryRecord>,
    stages: Vec<StageRecord>,
    positions: Vec<PositionRecord>,
    matches: Vec<MatchRecord>,
    phases: Vec<PhaseRecord>,
}

impl Tables {
    fn counts(&self, tournament_id: TournamentId) -> RowCounts {
        let stage_ids: Vec<StageId> = self
            .stages
            .iter()
            .filter(|s| s.tournament_id == tournament_id)
            .map(|s| s.id)
            .collect();

        RowCounts {
            tournaments: usize::from(self.tournaments.contains_key(&tournament_id)),
            teams: self.teams.iter().filter(|t| t.tournament_id == tournament_id).count(),
            stages: stage_ids.len(),
            positions: self
                .positions
                .iter()
                .filter(|p| stage_ids.contains(&p.stage_id))
                .count(),
            matches: self.matches.iter().filter(|m| m.tournament_id == tournament_id).count(),
            phases: self.phases.iter().filter(|p| p.tournament_id == tournament_id).count(),
        }
    }
}

/// Working copy of the tables for one write call
struct Transaction<'a> {
    tables: Tables,
    writes: &'a AtomicUsize,
    fail_on_write: Option<usize>,
}

impl Transaction<'_> {
    /// Account for one row write and hand out its ID
    fn next_id(&mut self) -> BracketResult<i64> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_write == Some(write) {
            return Err(BracketError::Storage(format!("injected failure on write {write}")));
        }
        self.tables.last_id += 1;
        Ok(self.tables.last_id)
    }

    fn insert_structure(
        &mut self,
        tournament_id: TournamentId,
        plan: &TournamentPlan,
    ) -> BracketResult<PersistedStructure> {
        let mut stage_ids: Vec<StageId> = Vec::with_capacity(plan.stages.len());
        let mut stages = Vec::with_capacity(plan.stages.len());
        for stage in &plan.stages {
            let feeds_from = stage
                .feeds_from
                .map(|index| TournamentPlan::stage_id(&stage_ids, index))
                .transpose()?;
            let id = self.next_id()?;
            stage_ids.push(id);
            stages.push(StageRecord {
                id,
                tournament_id,
                feeds_from,
                current_round: 1,
                stage: stage.clone(),
            });
        }

        let mut positions = Vec::with_capacity(plan.positions.len());
        for position in &plan.positions {
            positions.push(PositionRecord {
                id: self.next_id()?,
                stage_id: TournamentPlan::stage_id(&stage_ids, position.stage)?,
                position: position.clone(),
            });
        }

        let mut matches = Vec::with_capacity(plan.matches.len());
        for planned in &plan.matches {
            matches.push(MatchRecord {
                id: self.next_id()?,
                tournament_id,
                stage_id: TournamentPlan::stage_id(&stage_ids, planned.stage)?,
                progression: planned
                    .progression_rules
                    .map(|rules| rules.resolve(&stage_ids))
                    .transpose()?,
                planned: planned.clone(),
            });
        }

        let mut phases = Vec::with_capacity(plan.phases.len());
        for phase in &plan.phases {
            phases.push(PhaseRecord {
                id: self.next_id()?,
                tournament_id,
                phase: phase.clone(),
            });
        }

        let bracket_data = plan.bracket_data_for(&stage_ids);
        let header = self
            .tables
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        header.bracket_data = bracket_data.clone();

        self.tables.stages.extend(stages.iter().cloned());
        self.tables.positions.extend(positions.iter().cloned());
        self.tables.matches.extend(matches.iter().cloned());
        self.tables.phases.extend(phases.iter().cloned());

        Ok(PersistedStructure {
            stages,
            positions,
            matches,
            phases,
            bracket_data,
        })
    }
}

/// `BracketRepository` kept in process memory
#[derive(Debug, Default)]
pub struct MemoryBracketRepository {
    tables: Mutex<Tables>,
    writes: AtomicUsize,
    fail_on_write: Option<usize>,
}

impl MemoryBracketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `n`-th row write (counted from 1 over its lifetime) fails
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_on_write: Some(n),
            ..Self::default()
        }
    }

    /// Row writes attempted so far, including failed ones
    pub fn writes_attempted(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn tournament(&self, tournament_id: TournamentId) -> Option<TournamentRecord> {
        self.tables.lock().await.tournaments.get(&tournament_id).cloned()
    }

    pub async fn teams(&self, tournament_id: TournamentId) -> Vec<TeamEntryRecord> {
        let tables = self.tables.lock().await;
        tables
            .teams
            .iter()
            .filter(|t| t.tournament_id == tournament_id)
            .cloned()
            .collect()
    }

    pub async fn stages(&self, tournament_id: TournamentId) -> Vec<StageRecord> {
        let tables = self.tables.lock().await;
        tables
            .stages
            .iter()
            .filter(|s| s.tournament_id == tournament_id)
            .cloned()
            .collect()
    }

    pub async fn matches(&self, tournament_id: TournamentId) -> Vec<MatchRecord> {
        let tables = self.tables.lock().await;
        tables
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect()
    }

    /// Row counts over every tournament
    pub async fn total_rows(&self) -> usize {
        let tables = self.tables.lock().await;
        tables.tournaments.len()
            + tables.teams.len()
            + tables.stages.len()
            + tables.positions.len()
            + tables.matches.len()
            + tables.phases.len()
    }

    fn begin(&self, tables: &Tables) -> Transaction<'_> {
        Transaction {
            tables: tables.clone(),
            writes: &self.writes,
            fail_on_write: self.fail_on_write,
        }
    }
}

#[async_trait]
impl BracketRepository for MemoryBracketRepository {
    async fn create_tournament(&self, plan: &TournamentPlan) -> BracketResult<PersistedTournament> {
        let mut tables = self.tables.lock().await;
        let mut tx = self.begin(&tables);

        let tournament_id = tx.next_id()?;
        tx.tables
            .tournaments
            .insert(tournament_id, plan.tournament_record(tournament_id, &[]));

        let teams = plan.team_entries(tournament_id);
        for entry in &teams {
            tx.next_id()?;
            tx.tables.teams.push(entry.clone());
        }

        let structure = tx.insert_structure(tournament_id, plan)?;
        let stage_ids: Vec<StageId> = structure.stages.iter().map(|s| s.id).collect();
        *tables = tx.tables;

        Ok(PersistedTournament {
            tournament: plan.tournament_record(tournament_id, &stage_ids),
            teams,
            structure,
        })
    }

    async fn append_structure(
        &self,
        tournament_id: TournamentId,
        plan: &TournamentPlan,
    ) -> BracketResult<PersistedStructure> {
        let mut tables = self.tables.lock().await;
        let header = tables
            .tournaments
            .get(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        let registered: HashSet<TeamId> = tables
            .teams
            .iter()
            .filter(|t| t.tournament_id == tournament_id)
            .map(|t| t.team_id)
            .collect();
        plan.check_registration(tournament_id, &header.format, &registered)?;

        let mut tx = self.begin(&tables);
        let structure = tx.insert_structure(tournament_id, plan)?;
        *tables = tx.tables;
        Ok(structure)
    }

    async fn teardown_structure(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        let mut tables = self.tables.lock().await;
        let before = tables.counts(tournament_id);
        let header = tables
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(BracketError::TournamentNotFound(tournament_id))?;
        header.bracket_data.stages.clear();

        let stage_ids: Vec<StageId> = tables
            .stages
            .iter()
            .filter(|s| s.tournament_id == tournament_id)
            .map(|s| s.id)
            .collect();
        tables.matches.retain(|m| m.tournament_id != tournament_id);
        tables.positions.retain(|p| !stage_ids.contains(&p.stage_id));
        tables.stages.retain(|s| s.tournament_id != tournament_id);
        tables.phases.retain(|p| p.tournament_id != tournament_id);

        Ok(RowCounts {
            tournaments: 0,
            teams: 0,
            ..before
        })
    }

    async fn row_counts(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        Ok(self.tables.lock().await.counts(tournament_id))
    }
}
