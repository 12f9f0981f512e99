/// Property-based tests for sizing, seeding and match generation
///
/// These tests check the structural guarantees of every format across a
/// wide range of roster sizes and ratings.
use bracket_engine::EngineConfig;
use bracket_engine::tournament::sizing::{
    bye_count, double_elimination_rounds, group_count, next_power_of_two, round_robin_rounds,
    round_robin_total_matches, single_elimination_rounds, swiss_rounds,
};
use bracket_engine::tournament::{
    PlanBuilder, SeedingEngine, SeedingPolicy, StrategyRegistry, TeamInput, TournamentFormat,
    TournamentRequest,
};
use chrono::Utc;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

// Strategy to generate a roster with unique IDs and optional ratings
fn roster_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<TeamInput>> {
    prop::collection::vec(prop::option::of(0.0f64..3000.0), min..=max).prop_map(|ratings| {
        ratings
            .into_iter()
            .enumerate()
            .map(|(index, rating)| TeamInput {
                id: index as i64 + 1,
                rating,
            })
            .collect()
    })
}

fn format_strategy() -> impl Strategy<Value = TournamentFormat> {
    prop_oneof![
        Just(TournamentFormat::SingleElimination),
        Just(TournamentFormat::DoubleElimination),
        Just(TournamentFormat::Swiss),
        Just(TournamentFormat::RoundRobin),
        Just(TournamentFormat::GroupStagePlayoffs),
        Just(TournamentFormat::Gsl),
    ]
}

proptest! {
    #[test]
    fn test_bracket_holds_every_team(n in 1usize..2048) {
        let size = next_power_of_two(n);
        prop_assert!(size >= n);
        prop_assert!(size < 2 * n || n == 1);
        prop_assert_eq!(bye_count(n), size - n);
        prop_assert_eq!(1usize << single_elimination_rounds(n), size);
    }

    #[test]
    fn test_sizing_never_shrinks_with_more_teams(n in 0usize..2048, group_size in 1usize..16) {
        prop_assert!(next_power_of_two(n) <= next_power_of_two(n + 1));
        prop_assert!(single_elimination_rounds(n) <= single_elimination_rounds(n + 1));
        prop_assert!(swiss_rounds(n) <= swiss_rounds(n + 1));
        prop_assert!(round_robin_rounds(n) <= round_robin_rounds(n + 1));
        prop_assert!(round_robin_total_matches(n) <= round_robin_total_matches(n + 1));
        prop_assert!(group_count(n, group_size) <= group_count(n + 1, group_size));

        let (this, next) = (double_elimination_rounds(n), double_elimination_rounds(n + 1));
        prop_assert!(this.upper <= next.upper);
        prop_assert!(this.lower <= next.lower);
    }

    #[test]
    fn test_round_counts(n in 2usize..1024) {
        let rounds = double_elimination_rounds(n);
        prop_assert_eq!(rounds.lower, 2 * rounds.upper - 1);
        prop_assert!(swiss_rounds(n) >= 3);
        prop_assert!(swiss_rounds(n) >= single_elimination_rounds(n));
    }

    #[test]
    fn test_rating_seeding_is_sorted(teams in roster_strategy(1, 64), seed in any::<u64>()) {
        let field = SeedingEngine::new(1000.0).seed(
            &teams,
            SeedingPolicy::RatingSorted,
            &mut StdRng::seed_from_u64(seed),
        );
        let records = field.records();

        prop_assert_eq!(records.len(), teams.len());
        prop_assert_eq!(field.bye_count(), 0);
        for (index, record) in records.iter().enumerate() {
            prop_assert_eq!(record.seed as usize, index + 1);
        }
        for pair in records.windows(2) {
            prop_assert!(pair[0].rating >= pair[1].rating);
        }
    }

    #[test]
    fn test_random_seeding_is_a_permutation(teams in roster_strategy(1, 64), seed in any::<u64>()) {
        let field = SeedingEngine::new(1000.0).seed(
            &teams,
            SeedingPolicy::Random,
            &mut StdRng::seed_from_u64(seed),
        );
        let seeded: HashSet<i64> = field.team_ids().into_iter().collect();
        let input: HashSet<i64> = teams.iter().map(|team| team.id).collect();
        prop_assert_eq!(seeded, input);
    }

    #[test]
    fn test_round_robin_plays_every_pair_once(teams in roster_strategy(2, 24)) {
        let n = teams.len();
        let registry = StrategyRegistry::standard();
        let config = EngineConfig::default();
        let request = TournamentRequest::new("League", TournamentFormat::RoundRobin, teams);
        let plan = PlanBuilder::new(&registry, &config)
            .build(&request, Utc::now(), &mut StdRng::seed_from_u64(0))
            .unwrap();

        prop_assert_eq!(plan.matches.len(), n * (n - 1) / 2);
        let mut seen = HashSet::new();
        for planned in &plan.matches {
            let key = (planned.team1_id.min(planned.team2_id), planned.team1_id.max(planned.team2_id));
            prop_assert!(seen.insert(key));
            prop_assert!(planned.round_number >= 1);
            prop_assert!(planned.round_number as usize <= n - 1);
        }
    }

    #[test]
    fn test_every_plan_is_consistent(
        format in format_strategy(),
        teams in roster_strategy(2, 40),
        seed in any::<u64>(),
    ) {
        let n = teams.len();
        let registry = StrategyRegistry::standard();
        let config = EngineConfig::default();
        let request = TournamentRequest::new("Any", format, teams);
        let plan = PlanBuilder::new(&registry, &config)
            .build(&request, Utc::now(), &mut StdRng::seed_from_u64(seed))
            .unwrap();

        prop_assert!(plan.validate().is_ok());
        prop_assert_eq!(plan.seeding.len(), n);

        // No team plays twice in one round of one stage
        let mut booked: HashMap<(usize, u32), HashSet<i64>> = HashMap::new();
        if plan.format != TournamentFormat::RoundRobin
            && plan.format != TournamentFormat::GroupStagePlayoffs
        {
            for planned in &plan.matches {
                let round = booked.entry((planned.stage, planned.round_number)).or_default();
                prop_assert!(round.insert(planned.team1_id));
                prop_assert!(round.insert(planned.team2_id));
            }
        }
    }
}
