//! In-memory tournament plan.
//!
//! A plan holds every row one generation run will write, with stages referred
//! to by index. It is validated as a whole before anything is persisted.

use super::errors::{BracketError, BracketResult};
use super::matches::{MatchGenerator, PlannedMatch, Schedule};
use super::models::{
    BracketData, DEFAULT_MAP_POOL, MatchFormatSettings, PhaseSpec, PrizeStructure,
    QualificationSettings, StageId, TeamEntryRecord, TeamId, TournamentFormat, TournamentId,
    TournamentRecord, TournamentRequest, TournamentStatus, slugify,
};
use super::positions::{PlannedPosition, PositionAllocator};
use super::seeding::{SeedingEngine, SeedingRecord};
use super::stages::StageSpec;
use super::strategy::{GenerationContext, StrategyRegistry};
use crate::config::EngineConfig;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Everything one generation run writes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentPlan {
    pub name: String,
    pub slug: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub current_phase: String,
    pub team_count: usize,
    pub max_teams: usize,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub match_format_settings: MatchFormatSettings,
    pub map_pool: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<PrizeStructure>,
    pub qualification_settings: QualificationSettings,
    pub seeding: Vec<SeedingRecord>,
    pub byes: usize,
    pub stages: Vec<StageSpec>,
    pub positions: Vec<PlannedPosition>,
    pub matches: Vec<PlannedMatch>,
    pub phases: Vec<PhaseSpec>,
    pub bracket_data: BracketData,
}

impl TournamentPlan {
    /// Check the invariants every persisted bracket must hold
    ///
    /// # Errors
    ///
    /// Returns an integrity error for self pairings, bad feeds, unknown stage
    /// references and unregistered teams, or `TooManyTeams`.
    pub fn validate(&self) -> BracketResult<()> {
        if self.team_count > self.max_teams {
            return Err(BracketError::TooManyTeams {
                team_count: self.team_count,
                max_teams: self.max_teams,
            });
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if let Some(feeds_from) = stage.feeds_from {
                let earlier = feeds_from < index
                    && self.stages[feeds_from].stage_order < stage.stage_order;
                if !earlier {
                    return Err(BracketError::InvalidFeed {
                        stage: index,
                        feeds_from,
                    });
                }
            }
        }

        let registered: HashSet<TeamId> = self.seeding.iter().map(|s| s.team_id).collect();
        let known_stage = |stage: usize| -> BracketResult<()> {
            if stage < self.stages.len() {
                Ok(())
            } else {
                Err(BracketError::UnknownStage(stage))
            }
        };
        let known_team = |team_id: TeamId| -> BracketResult<()> {
            if registered.contains(&team_id) {
                Ok(())
            } else {
                Err(BracketError::UnregisteredTeam(team_id))
            }
        };

        for position in &self.positions {
            known_stage(position.stage)?;
            if let Some(team_id) = position.team_id {
                known_team(team_id)?;
            }
        }

        for planned in &self.matches {
            if planned.team1_id == planned.team2_id {
                return Err(BracketError::SelfPairing {
                    stage: planned.stage,
                    round: planned.round_number,
                    match_number: planned.match_number,
                    team_id: planned.team1_id,
                });
            }
            known_stage(planned.stage)?;
            known_team(planned.team1_id)?;
            known_team(planned.team2_id)?;
            if let Some(rules) = planned.progression_rules {
                for slot in [rules.winner_advances_to, rules.loser_drops_to]
                    .into_iter()
                    .flatten()
                {
                    known_stage(slot.stage)?;
                }
            }
        }

        Ok(())
    }

    /// Check a plan against a tournament that already exists
    ///
    /// The stored format must match and every seeded team must be one of the
    /// tournament's registrations.
    ///
    /// # Errors
    ///
    /// Returns `FormatMismatch` or `TeamNotRegistered`.
    pub fn check_registration(
        &self,
        tournament_id: TournamentId,
        stored_format: &TournamentFormat,
        registered: &HashSet<TeamId>,
    ) -> BracketResult<()> {
        if *stored_format != self.format {
            return Err(BracketError::FormatMismatch {
                tournament_id,
                stored: stored_format.as_str().to_string(),
                requested: self.format.as_str().to_string(),
            });
        }

        match self.seeding.iter().find(|s| !registered.contains(&s.team_id)) {
            Some(stranger) => Err(BracketError::TeamNotRegistered {
                tournament_id,
                team_id: stranger.team_id,
            }),
            None => Ok(()),
        }
    }

    /// Header row once the store assigned `id`
    pub fn tournament_record(&self, id: TournamentId, stage_ids: &[StageId]) -> TournamentRecord {
        TournamentRecord {
            id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            format: self.format.clone(),
            status: self.status,
            current_phase: self.current_phase.clone(),
            team_count: self.team_count,
            max_teams: self.max_teams,
            start_date: self.start_date,
            created_at: self.created_at,
            bracket_data: self.bracket_data_for(stage_ids),
        }
    }

    /// Registrations for every seeded team
    pub fn team_entries(&self, tournament_id: TournamentId) -> Vec<TeamEntryRecord> {
        self.seeding
            .iter()
            .map(|seeding| TeamEntryRecord::registered(tournament_id, seeding, self.created_at))
            .collect()
    }

    /// Bracket summary pointing at persisted stages
    pub fn bracket_data_for(&self, stage_ids: &[StageId]) -> BracketData {
        BracketData {
            stages: stage_ids.to_vec(),
            ..self.bracket_data.clone()
        }
    }

    /// Persisted ID of the stage a plan index refers to
    pub fn stage_id(stage_ids: &[StageId], stage: usize) -> BracketResult<StageId> {
        stage_ids
            .get(stage)
            .copied()
            .ok_or(BracketError::UnknownStage(stage))
    }

    /// Rows this plan writes, header and registrations included
    pub fn row_count(&self) -> usize {
        1 + self.seeding.len()
            + self.stages.len()
            + self.positions.len()
            + self.matches.len()
            + self.phases.len()
    }
}

/// Runs seeding, stage building, position allocation and match generation
pub struct PlanBuilder<'a> {
    registry: &'a StrategyRegistry,
    config: &'a EngineConfig,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(registry: &'a StrategyRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Build and validate the plan for `request`
    ///
    /// `now` stamps the plan and anchors the default start date; `rng` feeds
    /// randomized seeding.
    ///
    /// # Errors
    ///
    /// Configuration errors, an unusable [`EngineConfig`] included, are
    /// returned before any seeding happens; an integrity error means the
    /// builder produced an inconsistent plan.
    pub fn build<R: Rng + ?Sized>(
        &self,
        request: &TournamentRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> BracketResult<TournamentPlan> {
        self.config.validate()?;
        let strategy = self.registry.get(&request.format)?;

        let team_count = request.teams.len();
        if team_count == 0 {
            return Err(BracketError::NoTeams);
        }
        let mut seen = HashSet::with_capacity(team_count);
        if let Some(duplicate) = request.teams.iter().find(|team| !seen.insert(team.id)) {
            return Err(BracketError::DuplicateTeam(duplicate.id));
        }
        let max_teams = request.max_teams.unwrap_or(team_count);
        if team_count > max_teams {
            return Err(BracketError::TooManyTeams {
                team_count,
                max_teams,
            });
        }

        let match_formats = request.match_formats.clone().unwrap_or_default();
        let group_size = request.group_size.unwrap_or(self.config.default_group_size);
        let ctx = GenerationContext {
            team_count,
            group_size,
            advancement_per_group: request
                .advancement_per_group
                .unwrap_or(self.config.advancement_per_group),
            match_formats: &match_formats,
        };
        strategy.validate(&ctx)?;

        let field = SeedingEngine::new(self.config.default_rating).seed(
            &request.teams,
            strategy.seeding_policy(),
            rng,
        );

        let stages = strategy.build_stages(&ctx);
        for (index, stage) in stages.iter().enumerate() {
            log::debug!(
                "Stage {} '{}' ({}): {} rounds, up to {} teams",
                index,
                stage.name,
                stage.stage_type.as_str(),
                stage.total_rounds,
                stage.max_teams
            );
        }

        let mut positions = PositionAllocator::allocate_all(&stages);
        if let Some(opening) = strategy.opening_elimination_stage() {
            let promoted = PositionAllocator::promote_byes(&mut positions, opening, &field);
            if promoted > 0 {
                log::debug!("{promoted} teams advance on a bye");
            }
        }

        let start_date = match request.start_date {
            Some(start_date) => start_date,
            None => Duration::try_hours(self.config.start_delay_hours)
                .and_then(|delay| now.checked_add_signed(delay))
                .ok_or(BracketError::InvalidSchedule {
                    setting: "start delay",
                    hours: self.config.start_delay_hours,
                })?,
        };
        let map_pool = request.map_pool.clone().unwrap_or_else(|| {
            DEFAULT_MAP_POOL.iter().map(|map| map.to_string()).collect()
        });
        let generator = MatchGenerator::new(
            Schedule::new(
                start_date,
                self.config.round_spacing_hours,
                self.config.match_spacing_hours,
            )?,
            match_formats.clone(),
            map_pool.clone(),
        );
        let matches = strategy.generate_matches(&ctx, &stages, &field, &generator);

        let format = strategy.format();
        let plan = TournamentPlan {
            name: request.name.clone(),
            slug: slugify(&request.name),
            qualification_settings: QualificationSettings::for_format(
                &format,
                ctx.group_size,
                ctx.advancement_per_group,
            ),
            format,
            status: TournamentStatus::Draft,
            current_phase: "registration".to_string(),
            team_count,
            max_teams,
            start_date,
            created_at: now,
            map_pool,
            prize: request.prize.clone(),
            seeding: field.records(),
            byes: field.bye_count(),
            phases: strategy.phases(),
            bracket_data: strategy.summarize(&ctx),
            match_format_settings: match_formats,
            stages,
            positions,
            matches,
        };

        plan.validate()?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::matches::{ProgressionRules, SlotRef};
    use crate::tournament::models::{PositionStatus, TeamInput};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    fn roster(n: i64) -> Vec<TeamInput> {
        (1..=n).map(|id| TeamInput::new(id, 2000.0 - id as f64 * 25.0)).collect()
    }

    fn build(request: &TournamentRequest) -> BracketResult<TournamentPlan> {
        let registry = StrategyRegistry::standard();
        let config = EngineConfig::default();
        PlanBuilder::new(&registry, &config).build(request, now(), &mut StdRng::seed_from_u64(5))
    }

    #[test]
    fn test_single_elimination_plan() {
        let request = TournamentRequest::new("Spring Cup", TournamentFormat::SingleElimination, roster(6));
        let plan = build(&request).unwrap();

        assert_eq!(plan.slug, "spring-cup");
        assert_eq!(plan.status, TournamentStatus::Draft);
        assert_eq!(plan.current_phase, "registration");
        assert_eq!(plan.start_date, now() + Duration::hours(24));
        assert_eq!(plan.byes, 2);
        assert_eq!(plan.matches.len(), 3);
        assert_eq!(plan.positions.len(), 7);
        assert_eq!(plan.map_pool.len(), DEFAULT_MAP_POOL.len());
        assert_eq!(plan.row_count(), 1 + 6 + 1 + 7 + 3 + 3);

        // Six teams pair off completely; both byes share line 4
        assert!(plan.positions.iter().all(|p| p.status == PositionStatus::Empty));
    }

    #[test]
    fn test_bye_promotion_in_plan() {
        let request = TournamentRequest::new("Odd Cup", TournamentFormat::SingleElimination, roster(5));
        let plan = build(&request).unwrap();
        let advanced: Vec<_> = plan
            .positions
            .iter()
            .filter(|p| p.status == PositionStatus::Advanced)
            .collect();
        assert_eq!(advanced.len(), 1);
        assert_eq!(advanced[0].team_id, Some(5));
        assert_eq!(plan.matches.len(), 2);
    }

    #[test]
    fn test_roster_errors() {
        let empty = TournamentRequest::new("Empty", TournamentFormat::Swiss, Vec::new());
        assert!(matches!(build(&empty), Err(BracketError::NoTeams)));

        let mut teams = roster(4);
        teams.push(TeamInput::unrated(2));
        let duplicate = TournamentRequest::new("Dupes", TournamentFormat::RoundRobin, teams);
        assert!(matches!(build(&duplicate), Err(BracketError::DuplicateTeam(2))));

        let crowded = TournamentRequest::new("Crowded", TournamentFormat::RoundRobin, roster(9))
            .with_max_teams(8);
        assert!(matches!(
            build(&crowded),
            Err(BracketError::TooManyTeams { team_count: 9, max_teams: 8 })
        ));
    }

    #[test]
    fn test_unsupported_format_fails_first() {
        let request = TournamentRequest::new(
            "Ladder",
            TournamentFormat::Custom("ladder".to_string()),
            Vec::new(),
        );
        assert!(matches!(build(&request), Err(BracketError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_group_size_from_request() {
        let request = TournamentRequest::new("Groups", TournamentFormat::Gsl, roster(8)).with_group_size(1);
        assert!(matches!(build(&request), Err(BracketError::InvalidGroupSize(1))));
    }

    #[test]
    fn test_explicit_start_date_and_formats() {
        let start = Utc.with_ymd_and_hms(2026, 7, 4, 16, 0, 0).unwrap();
        let formats = MatchFormatSettings {
            playoffs: "bo5".to_string(),
            ..MatchFormatSettings::default()
        };
        let request = TournamentRequest::new("Summer", TournamentFormat::SingleElimination, roster(4))
            .with_start_date(start)
            .with_match_formats(formats);
        let plan = build(&request).unwrap();
        assert_eq!(plan.matches[0].scheduled_at, start);
        assert_eq!(plan.matches[1].scheduled_at, start + Duration::hours(1));
        assert!(plan.matches.iter().all(|m| m.match_format == "bo5"));
    }

    #[test]
    fn test_unusable_schedule_is_rejected() {
        let registry = StrategyRegistry::standard();
        let request = TournamentRequest::new("Cup", TournamentFormat::SingleElimination, roster(4));

        let oversized = EngineConfig {
            round_spacing_hours: 99_999_999_999_999,
            ..EngineConfig::default()
        };
        let result = PlanBuilder::new(&registry, &oversized).build(
            &request,
            now(),
            &mut StdRng::seed_from_u64(5),
        );
        assert!(matches!(
            result,
            Err(BracketError::InvalidSchedule { setting: "round spacing", .. })
        ));

        let backwards = EngineConfig {
            match_spacing_hours: -4,
            ..EngineConfig::default()
        };
        let result = PlanBuilder::new(&registry, &backwards).build(
            &request,
            now(),
            &mut StdRng::seed_from_u64(5),
        );
        assert!(matches!(
            result,
            Err(BracketError::InvalidSchedule { setting: "match spacing", hours: -4 })
        ));
    }

    #[test]
    fn test_matches_never_precede_start() {
        let request = TournamentRequest::new("League", TournamentFormat::RoundRobin, roster(6));
        let plan = build(&request).unwrap();
        assert!(plan.matches.iter().all(|m| m.scheduled_at >= plan.start_date));
    }

    #[test]
    fn test_validate_catches_self_pairing() {
        let request = TournamentRequest::new("Cup", TournamentFormat::SingleElimination, roster(4));
        let mut plan = build(&request).unwrap();
        plan.matches[0].team2_id = plan.matches[0].team1_id;
        assert!(matches!(plan.validate(), Err(BracketError::SelfPairing { .. })));
    }

    #[test]
    fn test_validate_catches_forward_feed() {
        let request = TournamentRequest::new("Cup", TournamentFormat::DoubleElimination, roster(4));
        let mut plan = build(&request).unwrap();
        plan.stages[0].feeds_from = Some(1);
        assert!(matches!(
            plan.validate(),
            Err(BracketError::InvalidFeed { stage: 0, feeds_from: 1 })
        ));

        let mut plan = build(&request).unwrap();
        plan.stages[1].stage_order = plan.stages[0].stage_order;
        assert!(matches!(plan.validate(), Err(BracketError::InvalidFeed { .. })));
    }

    #[test]
    fn test_validate_catches_dangling_references() {
        let request = TournamentRequest::new("Cup", TournamentFormat::SingleElimination, roster(4));

        let mut plan = build(&request).unwrap();
        plan.matches[0].team1_id = 999;
        assert!(matches!(plan.validate(), Err(BracketError::UnregisteredTeam(999))));

        let mut plan = build(&request).unwrap();
        plan.matches[0].progression_rules = Some(ProgressionRules {
            winner_advances_to: Some(SlotRef { stage: 7, round: 2, slot: 1 }),
            loser_drops_to: None,
        });
        assert!(matches!(plan.validate(), Err(BracketError::UnknownStage(7))));
    }

    #[test]
    fn test_check_registration() {
        let request = TournamentRequest::new("Cup", TournamentFormat::SingleElimination, roster(4));
        let plan = build(&request).unwrap();
        let registered: HashSet<TeamId> = (1..=4).collect();

        assert!(plan.check_registration(9, &TournamentFormat::SingleElimination, &registered).is_ok());
        assert!(matches!(
            plan.check_registration(9, &TournamentFormat::Swiss, &registered),
            Err(BracketError::FormatMismatch { tournament_id: 9, .. })
        ));

        let fewer: HashSet<TeamId> = (1..=3).collect();
        assert!(matches!(
            plan.check_registration(9, &TournamentFormat::SingleElimination, &fewer),
            Err(BracketError::TeamNotRegistered { tournament_id: 9, team_id: 4 })
        ));
    }

    #[test]
    fn test_records_from_plan() {
        let request = TournamentRequest::new("Cup", TournamentFormat::RoundRobin, roster(3));
        let plan = build(&request).unwrap();

        let record = plan.tournament_record(42, &[7]);
        assert_eq!(record.bracket_data.stages, vec![7]);
        assert_eq!(record.team_count, 3);

        let entries = plan.team_entries(42);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].seed, 1);
        assert_eq!(entries[0].bracket_position, Some(1));
        assert_eq!(entries[2].registered_at, now());

        assert_eq!(TournamentPlan::stage_id(&[7], 0).unwrap(), 7);
        assert!(TournamentPlan::stage_id(&[7], 1).is_err());
    }
}
