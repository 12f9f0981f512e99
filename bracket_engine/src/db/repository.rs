//! Repository trait definitions for testability and dependency injection.
//!
//! The assembler writes through [`BracketRepository`]; the PostgreSQL
//! implementation lives here and an in-process one in [`super::memory`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashSet;

use super::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout};
use crate::tournament::errors::{BracketError, BracketResult};
use crate::tournament::models::{
    MatchRecord, PersistedStructure, PersistedTournament, PhaseRecord, PositionRecord, RowCounts,
    StageId, StageRecord, TeamId, TournamentFormat, TournamentId,
};
use crate::tournament::plan::TournamentPlan;

/// Trait for bracket persistence
///
/// Every write method is one all-or-nothing transaction.
#[async_trait]
pub trait BracketRepository: Send + Sync {
    /// Write the header, registrations and the full structure of `plan`
    async fn create_tournament(&self, plan: &TournamentPlan) -> BracketResult<PersistedTournament>;

    /// Write another copy of the structure of `plan` for an existing
    /// tournament; existing stages are left alone
    ///
    /// The plan must use the stored format and seed only registered teams,
    /// checked before any row is written.
    async fn append_structure(
        &self,
        tournament_id: TournamentId,
        plan: &TournamentPlan,
    ) -> BracketResult<PersistedStructure>;

    /// Delete matches, positions, stages and phases; the header and
    /// registrations survive
    async fn teardown_structure(&self, tournament_id: TournamentId) -> BracketResult<RowCounts>;

    /// Rows stored for a tournament, per table
    async fn row_counts(&self, tournament_id: TournamentId) -> BracketResult<RowCounts>;
}

/// Default PostgreSQL implementation of `BracketRepository`
#[derive(Clone)]
pub struct PgBracketRepository {
    pool: PgPool,
}

impl PgBracketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tournament_exists(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
    ) -> BracketResult<bool> {
        let row = sqlx::query("SELECT id FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.is_some())
    }

    /// Format of a tournament, locking its header row
    async fn tournament_format(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<TournamentFormat>> {
        let row = sqlx::query("SELECT format FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(|row| TournamentFormat::from_name(row.get::<&str, _>("format"))))
    }

    async fn registered_teams(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
    ) -> BracketResult<HashSet<TeamId>> {
        let rows = sqlx::query("SELECT team_id FROM tournament_teams WHERE tournament_id = $1")
            .bind(tournament_id)
            .fetch_all(&mut **tx)
            .await?;
        Ok(rows.iter().map(|row| row.get("team_id")).collect())
    }

    /// Stages, positions, matches and phases of `plan`, then the header
    /// summary pointing at the new stages
    async fn insert_structure(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: TournamentId,
        plan: &TournamentPlan,
    ) -> BracketResult<PersistedStructure> {
        let mut stages: Vec<StageRecord> = Vec::with_capacity(plan.stages.len());
        let mut stage_ids: Vec<StageId> = Vec::with_capacity(plan.stages.len());

        for stage in &plan.stages {
            let feeds_from = stage
                .feeds_from
                .map(|index| TournamentPlan::stage_id(&stage_ids, index))
                .transpose()?;

            let row = sqlx::query(
                r#"
                INSERT INTO bracket_stages (tournament_id, name, type, stage_order, status, max_teams, current_round, total_rounds, settings)
                VALUES ($1, $2, $3, $4, 'pending', $5, 1, $6, $7)
                RETURNING id
                "#,
            )
            .bind(tournament_id)
            .bind(&stage.name)
            .bind(stage.stage_type.as_str())
            .bind(stage.stage_order as i32)
            .bind(stage.max_teams as i32)
            .bind(stage.total_rounds as i32)
            .bind(stage.settings.to_json(feeds_from)?)
            .fetch_one(&mut **tx)
            .await?;

            let id: StageId = row.get("id");
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
            let stage_id = TournamentPlan::stage_id(&stage_ids, position.stage)?;
            let row = sqlx::query(
                r#"
                INSERT INTO bracket_positions (bracket_stage_id, round, position, team_id, status, position_type, advancement_rule)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(stage_id)
            .bind(position.round as i32)
            .bind(position.position as i32)
            .bind(position.team_id)
            .bind(position.status.as_str())
            .bind(position.position_type.as_str())
            .bind(serde_json::to_value(position.advancement_rule)?)
            .fetch_one(&mut **tx)
            .await?;

            positions.push(PositionRecord {
                id: row.get("id"),
                stage_id,
                position: position.clone(),
            });
        }

        let mut matches = Vec::with_capacity(plan.matches.len());
        for planned in &plan.matches {
            let stage_id = TournamentPlan::stage_id(&stage_ids, planned.stage)?;
            let progression = planned
                .progression_rules
                .map(|rules| rules.resolve(&stage_ids))
                .transpose()?;
            let progression_json = progression.map(serde_json::to_value).transpose()?;

            let row = sqlx::query(
                r#"
                INSERT INTO bracket_matches (tournament_id, bracket_stage_id, round_number, match_number, team1_id, team2_id, status, match_format, scheduled_at, progression_rules, map_data)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING id
                "#,
            )
            .bind(tournament_id)
            .bind(stage_id)
            .bind(planned.round_number as i32)
            .bind(planned.match_number as i32)
            .bind(planned.team1_id)
            .bind(planned.team2_id)
            .bind(planned.status.as_str())
            .bind(&planned.match_format)
            .bind(planned.scheduled_at)
            .bind(progression_json)
            .bind(serde_json::to_value(&planned.map_data)?)
            .fetch_one(&mut **tx)
            .await?;

            matches.push(MatchRecord {
                id: row.get("id"),
                tournament_id,
                stage_id,
                progression,
                planned: planned.clone(),
            });
        }

        let mut phases = Vec::with_capacity(plan.phases.len());
        for phase in &plan.phases {
            let row = sqlx::query(
                r#"
                INSERT INTO tournament_phases (tournament_id, name, slug, phase_type, phase_order, status, progression_rule)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(tournament_id)
            .bind(&phase.name)
            .bind(&phase.slug)
            .bind(&phase.phase_type)
            .bind(phase.phase_order as i32)
            .bind(phase.status.as_str())
            .bind(&phase.progression_rule)
            .fetch_one(&mut **tx)
            .await?;

            phases.push(PhaseRecord {
                id: row.get("id"),
                tournament_id,
                phase: phase.clone(),
            });
        }

        let bracket_data = plan.bracket_data_for(&stage_ids);
        sqlx::query("UPDATE tournaments SET bracket_data = $1, updated_at = NOW() WHERE id = $2")
            .bind(serde_json::to_value(&bracket_data)?)
            .bind(tournament_id)
            .execute(&mut **tx)
            .await?;

        Ok(PersistedStructure {
            stages,
            positions,
            matches,
            phases,
            bracket_data,
        })
    }

    async fn create_tournament_tx(&self, plan: &TournamentPlan) -> BracketResult<PersistedTournament> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO tournaments (name, slug, format, status, current_phase, team_count, max_teams, start_date, match_format_settings, map_pool, prize_structure, qualification_settings, seeding_data, bracket_data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(&plan.name)
        .bind(&plan.slug)
        .bind(plan.format.as_str())
        .bind(plan.status.as_str())
        .bind(&plan.current_phase)
        .bind(plan.team_count as i32)
        .bind(plan.max_teams as i32)
        .bind(plan.start_date)
        .bind(serde_json::to_value(&plan.match_format_settings)?)
        .bind(serde_json::to_value(&plan.map_pool)?)
        .bind(plan.prize.as_ref().map(serde_json::to_value).transpose()?)
        .bind(serde_json::to_value(&plan.qualification_settings)?)
        .bind(serde_json::to_value(&plan.seeding)?)
        .bind(serde_json::to_value(&plan.bracket_data)?)
        .bind(plan.created_at)
        .fetch_one(&mut *tx)
        .await?;
        let tournament_id: TournamentId = row.get("id");

        let teams = plan.team_entries(tournament_id);
        for entry in &teams {
            sqlx::query(
                r#"
                INSERT INTO tournament_teams (tournament_id, team_id, seed, rating, status, swiss_wins, swiss_losses, swiss_score, swiss_buchholz, bracket_position, points_earned, registered_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(tournament_id)
            .bind(entry.team_id)
            .bind(entry.seed as i32)
            .bind(entry.rating)
            .bind(entry.status.as_str())
            .bind(entry.swiss_wins as i32)
            .bind(entry.swiss_losses as i32)
            .bind(entry.swiss_score)
            .bind(entry.swiss_buchholz)
            .bind(entry.bracket_position.map(|p| p as i32))
            .bind(entry.points_earned)
            .bind(entry.registered_at)
            .execute(&mut *tx)
            .await?;
        }

        let structure = Self::insert_structure(&mut tx, tournament_id, plan).await?;
        tx.commit().await?;

        let stage_ids: Vec<StageId> = structure.stages.iter().map(|s| s.id).collect();
        Ok(PersistedTournament {
            tournament: plan.tournament_record(tournament_id, &stage_ids),
            teams,
            structure,
        })
    }

    async fn append_structure_tx(
        &self,
        tournament_id: TournamentId,
        plan: &TournamentPlan,
    ) -> BracketResult<PersistedStructure> {
        let mut tx = self.pool.begin().await?;
        let Some(stored_format) = Self::tournament_format(&mut tx, tournament_id).await? else {
            return Err(BracketError::TournamentNotFound(tournament_id));
        };
        let registered = Self::registered_teams(&mut tx, tournament_id).await?;
        plan.check_registration(tournament_id, &stored_format, &registered)?;

        let structure = Self::insert_structure(&mut tx, tournament_id, plan).await?;
        tx.commit().await?;
        Ok(structure)
    }

    async fn teardown_structure_tx(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        let mut tx = self.pool.begin().await?;
        if !Self::tournament_exists(&mut tx, tournament_id).await? {
            return Err(BracketError::TournamentNotFound(tournament_id));
        }

        let matches = sqlx::query("DELETE FROM bracket_matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let positions = sqlx::query(
            "DELETE FROM bracket_positions WHERE bracket_stage_id IN (SELECT id FROM bracket_stages WHERE tournament_id = $1)",
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let stages = sqlx::query("DELETE FROM bracket_stages WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let phases = sqlx::query("DELETE FROM tournament_phases WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(
            "UPDATE tournaments SET bracket_data = jsonb_set(bracket_data, '{stages}', '[]'::jsonb), updated_at = NOW() WHERE id = $1",
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RowCounts {
            tournaments: 0,
            teams: 0,
            stages: stages as usize,
            positions: positions as usize,
            matches: matches as usize,
            phases: phases as usize,
        })
    }

    async fn row_counts_query(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM tournaments WHERE id = $1) AS tournaments,
                (SELECT COUNT(*) FROM tournament_teams WHERE tournament_id = $1) AS teams,
                (SELECT COUNT(*) FROM bracket_stages WHERE tournament_id = $1) AS stages,
                (SELECT COUNT(*) FROM bracket_positions p
                    JOIN bracket_stages s ON s.id = p.bracket_stage_id
                    WHERE s.tournament_id = $1) AS positions,
                (SELECT COUNT(*) FROM bracket_matches WHERE tournament_id = $1) AS matches,
                (SELECT COUNT(*) FROM tournament_phases WHERE tournament_id = $1) AS phases
            "#,
        )
        .bind(tournament_id)
        .fetch_one(&self.pool)
        .await?;

        let count = |column: &str| -> usize { row.get::<i64, _>(column) as usize };
        Ok(RowCounts {
            tournaments: count("tournaments"),
            teams: count("teams"),
            stages: count("stages"),
            positions: count("positions"),
            matches: count("matches"),
            phases: count("phases"),
        })
    }
}

#[async_trait]
impl BracketRepository for PgBracketRepository {
    async fn create_tournament(&self, plan: &TournamentPlan) -> BracketResult<PersistedTournament> {
        with_timeout(DEFAULT_TRANSACTION_TIMEOUT, self.create_tournament_tx(plan)).await
    }

    async fn append_structure(
        &self,
        tournament_id: TournamentId,
        plan: &TournamentPlan,
    ) -> BracketResult<PersistedStructure> {
        with_timeout(
            DEFAULT_TRANSACTION_TIMEOUT,
            self.append_structure_tx(tournament_id, plan),
        )
        .await
    }

    async fn teardown_structure(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        with_timeout(DEFAULT_TRANSACTION_TIMEOUT, self.teardown_structure_tx(tournament_id)).await
    }

    async fn row_counts(&self, tournament_id: TournamentId) -> BracketResult<RowCounts> {
        with_default_timeout(self.row_counts_query(tournament_id)).await
    }
}
