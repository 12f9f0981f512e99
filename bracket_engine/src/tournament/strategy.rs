//! One bracket strategy per format, selected through a registry.

use super::errors::{BracketError, BracketResult};
use super::matches::{MatchGenerator, PlannedMatch};
use super::models::{BracketData, MatchFormatSettings, MatchPhase, PhaseSpec, TournamentFormat};
use super::seeding::{SeededField, SeedingPolicy};
use super::sizing::{
    self, SWISS_PLAYOFF_SIZE, double_elimination_rounds, expected_total_matches, group_count,
    next_power_of_two, playoff_size, round_robin_rounds, single_elimination_rounds, swiss_rounds,
};
use super::stages::{self, StageSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// Phases every format opens with
const OPENING_PHASES: [(&str, &str); 2] = [("Registration", "registration"), ("Check-in", "check_in")];

/// Resolved inputs shared by every step of one generation run
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub team_count: usize,
    pub group_size: usize,
    pub advancement_per_group: usize,
    pub match_formats: &'a MatchFormatSettings,
}

/// Sizing, seeding and pairing rules of one competition format
pub trait BracketFormatStrategy: Send + Sync {
    /// Format handled by this strategy
    fn format(&self) -> TournamentFormat;

    fn seeding_policy(&self) -> SeedingPolicy {
        SeedingPolicy::for_format(&self.format())
    }

    /// Reject configurations the format cannot build
    fn validate(&self, _ctx: &GenerationContext<'_>) -> BracketResult<()> {
        Ok(())
    }

    /// Ordered stage graph
    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec>;

    /// Stage whose round 1 absorbs byes from the seeded field
    fn opening_elimination_stage(&self) -> Option<usize> {
        None
    }

    /// Matches that exist before any result is known
    fn generate_matches(
        &self,
        ctx: &GenerationContext<'_>,
        stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch>;

    /// Lifecycle phases after registration and check-in
    fn play_phases(&self) -> &'static [(&'static str, &'static str)];

    /// Full ordered phase list
    fn phases(&self) -> Vec<PhaseSpec> {
        let mut phases: Vec<(&str, &str)> = OPENING_PHASES.to_vec();
        phases.extend_from_slice(self.play_phases());
        PhaseSpec::sequence(&phases)
    }

    /// Summary stored on the tournament header
    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData;
}

fn total_matches(format: &TournamentFormat, ctx: &GenerationContext<'_>) -> usize {
    expected_total_matches(format, ctx.team_count, ctx.group_size, ctx.advancement_per_group)
}

fn validate_group_size(ctx: &GenerationContext<'_>) -> BracketResult<()> {
    if ctx.group_size <= 1 {
        return Err(BracketError::InvalidGroupSize(ctx.group_size));
    }
    Ok(())
}

pub struct SingleEliminationStrategy;

impl BracketFormatStrategy for SingleEliminationStrategy {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::SingleElimination
    }

    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec> {
        stages::single_elimination(ctx.team_count)
    }

    fn opening_elimination_stage(&self) -> Option<usize> {
        Some(0)
    }

    fn generate_matches(
        &self,
        _ctx: &GenerationContext<'_>,
        stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch> {
        let rounds = stages.first().map_or(0, |stage| stage.total_rounds);
        generator.elimination_opening(0, rounds, None, &field.team_ids())
    }

    fn play_phases(&self) -> &'static [(&'static str, &'static str)] {
        &[("Playoffs", "playoffs")]
    }

    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData {
        let mut data = BracketData::new(
            self.format(),
            single_elimination_rounds(ctx.team_count),
            total_matches(&self.format(), ctx),
        );
        data.bracket_size = Some(next_power_of_two(ctx.team_count));
        data
    }
}

pub struct DoubleEliminationStrategy;

impl BracketFormatStrategy for DoubleEliminationStrategy {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::DoubleElimination
    }

    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec> {
        stages::double_elimination(
            ctx.team_count,
            ctx.match_formats.for_phase(MatchPhase::Finals),
        )
    }

    fn opening_elimination_stage(&self) -> Option<usize> {
        Some(0)
    }

    fn generate_matches(
        &self,
        _ctx: &GenerationContext<'_>,
        stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch> {
        let rounds = stages.first().map_or(0, |stage| stage.total_rounds);
        generator.elimination_opening(0, rounds, Some(1), &field.team_ids())
    }

    fn play_phases(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Upper Bracket", "upper_bracket"),
            ("Lower Bracket", "lower_bracket"),
            ("Grand Final", "grand_final"),
        ]
    }

    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData {
        let rounds = double_elimination_rounds(ctx.team_count);
        let mut data = BracketData::new(
            self.format(),
            rounds.upper + rounds.lower + rounds.grand_final,
            total_matches(&self.format(), ctx),
        );
        data.bracket_size = Some(next_power_of_two(ctx.team_count));
        data.upper_rounds = Some(rounds.upper);
        data.lower_rounds = Some(rounds.lower);
        data
    }
}

pub struct SwissStrategy;

impl BracketFormatStrategy for SwissStrategy {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::Swiss
    }

    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec> {
        stages::swiss(ctx.team_count)
    }

    fn generate_matches(
        &self,
        _ctx: &GenerationContext<'_>,
        _stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch> {
        generator.swiss_opening(0, &field.team_ids())
    }

    fn play_phases(&self) -> &'static [(&'static str, &'static str)] {
        &[("Swiss Rounds", "swiss_rounds"), ("Playoffs", "playoffs")]
    }

    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData {
        let rounds = swiss_rounds(ctx.team_count);
        let mut data = BracketData::new(
            self.format(),
            rounds + single_elimination_rounds(SWISS_PLAYOFF_SIZE),
            total_matches(&self.format(), ctx),
        );
        data.swiss_rounds = Some(rounds);
        data.playoff_size = Some(SWISS_PLAYOFF_SIZE);
        data
    }
}

pub struct RoundRobinStrategy;

impl BracketFormatStrategy for RoundRobinStrategy {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::RoundRobin
    }

    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec> {
        stages::round_robin(ctx.team_count)
    }

    fn generate_matches(
        &self,
        _ctx: &GenerationContext<'_>,
        _stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch> {
        generator.round_robin(0, &field.team_ids())
    }

    fn play_phases(&self) -> &'static [(&'static str, &'static str)] {
        &[("Round Robin", "round_robin")]
    }

    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData {
        BracketData::new(
            self.format(),
            round_robin_rounds(ctx.team_count),
            total_matches(&self.format(), ctx),
        )
    }
}

pub struct GroupStagePlayoffsStrategy;

impl BracketFormatStrategy for GroupStagePlayoffsStrategy {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::GroupStagePlayoffs
    }

    fn validate(&self, ctx: &GenerationContext<'_>) -> BracketResult<()> {
        validate_group_size(ctx)?;
        if ctx.advancement_per_group == 0 || ctx.advancement_per_group > ctx.group_size {
            return Err(BracketError::InvalidAdvancement {
                advancement: ctx.advancement_per_group,
                group_size: ctx.group_size,
            });
        }
        Ok(())
    }

    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec> {
        stages::group_stage_playoffs(ctx.team_count, ctx.group_size, ctx.advancement_per_group)
    }

    fn generate_matches(
        &self,
        ctx: &GenerationContext<'_>,
        _stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch> {
        field
            .team_ids()
            .chunks(ctx.group_size)
            .enumerate()
            .flat_map(|(group, members)| generator.group_round_robin(group, members))
            .collect()
    }

    fn play_phases(&self) -> &'static [(&'static str, &'static str)] {
        &[("Group Stage", "group_stage"), ("Playoffs", "playoffs")]
    }

    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData {
        let groups = group_count(ctx.team_count, ctx.group_size);
        let playoffs = playoff_size(groups, ctx.advancement_per_group);
        let mut data = BracketData::new(
            self.format(),
            round_robin_rounds(ctx.group_size) + single_elimination_rounds(playoffs),
            total_matches(&self.format(), ctx),
        );
        data.group_count = Some(groups);
        data.group_size = Some(ctx.group_size);
        data.playoff_size = Some(playoffs);
        data
    }
}

pub struct GslStrategy;

impl BracketFormatStrategy for GslStrategy {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::Gsl
    }

    fn validate(&self, ctx: &GenerationContext<'_>) -> BracketResult<()> {
        validate_group_size(ctx)
    }

    fn build_stages(&self, ctx: &GenerationContext<'_>) -> Vec<StageSpec> {
        stages::gsl(ctx.team_count, ctx.group_size)
    }

    fn generate_matches(
        &self,
        ctx: &GenerationContext<'_>,
        _stages: &[StageSpec],
        field: &SeededField,
        generator: &MatchGenerator,
    ) -> Vec<PlannedMatch> {
        field
            .team_ids()
            .chunks(ctx.group_size)
            .enumerate()
            .flat_map(|(group, members)| generator.gsl_opening(group * 2, group * 2 + 1, members))
            .collect()
    }

    fn play_phases(&self) -> &'static [(&'static str, &'static str)] {
        &[("GSL Groups", "gsl_groups"), ("Finals", "gsl_finals")]
    }

    fn summarize(&self, ctx: &GenerationContext<'_>) -> BracketData {
        let groups = group_count(ctx.team_count, ctx.group_size);
        let finals = groups * 2;
        let mut data = BracketData::new(
            self.format(),
            sizing::GSL_BRACKET_ROUNDS + single_elimination_rounds(finals),
            total_matches(&self.format(), ctx),
        );
        data.group_count = Some(groups);
        data.group_size = Some(ctx.group_size);
        data.playoff_size = Some(finals);
        data
    }
}

/// Strategies keyed by format
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<TournamentFormat, Arc<dyn BracketFormatStrategy>>,
}

impl StrategyRegistry {
    /// Registry without any strategy
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registry with the six built-in formats
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(SingleEliminationStrategy));
        registry.register(Arc::new(DoubleEliminationStrategy));
        registry.register(Arc::new(SwissStrategy));
        registry.register(Arc::new(RoundRobinStrategy));
        registry.register(Arc::new(GroupStagePlayoffsStrategy));
        registry.register(Arc::new(GslStrategy));
        registry
    }

    /// Add or replace the strategy for its format
    pub fn register(&mut self, strategy: Arc<dyn BracketFormatStrategy>) {
        self.strategies.insert(strategy.format(), strategy);
    }

    /// Strategy for `format`
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` if nothing is registered for it.
    pub fn get(&self, format: &TournamentFormat) -> BracketResult<Arc<dyn BracketFormatStrategy>> {
        self.strategies
            .get(format)
            .cloned()
            .ok_or_else(|| BracketError::UnsupportedFormat(format.to_string()))
    }

    pub fn formats(&self) -> Vec<TournamentFormat> {
        let mut formats: Vec<TournamentFormat> = self.strategies.keys().cloned().collect();
        formats.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        formats
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
