//! Bracket sizing arithmetic.
//!
//! Pure functions with no side effects. Every round count, bracket size and
//! match count used by the stage builders comes from here.

use super::models::TournamentFormat;

/// Teams leaving each group for the playoffs unless configured otherwise
pub const DEFAULT_ADVANCEMENT_PER_GROUP: usize = 2;

/// Teams per group unless configured otherwise
pub const DEFAULT_GROUP_SIZE: usize = 4;

/// Size of the playoff bracket that follows a Swiss stage
pub const SWISS_PLAYOFF_SIZE: usize = 8;

/// Swiss never runs fewer rounds than this
pub const MIN_SWISS_ROUNDS: u32 = 3;

/// Rounds in each GSL sub-bracket (opening/winners, then elimination/decider)
pub const GSL_BRACKET_ROUNDS: u32 = 2;

/// Matches a full four-team GSL group plays
pub const GSL_MATCHES_PER_GROUP: usize = 5;

/// Round counts for a double elimination bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleEliminationRounds {
    pub upper: u32,
    pub lower: u32,
    pub grand_final: u32,
}

/// Smallest power of two that holds `n` teams (1 for `n <= 1`)
pub fn next_power_of_two(n: usize) -> usize {
    if n <= 1 { 1 } else { n.next_power_of_two() }
}

/// `ceil(log2(n))`, 0 for `n <= 1`
pub fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

/// Byes needed to pad `n` teams up to a full bracket
pub fn bye_count(n: usize) -> usize {
    if n == 0 { 0 } else { next_power_of_two(n) - n }
}

/// Rounds in a single elimination bracket for `n` teams
pub fn single_elimination_rounds(n: usize) -> u32 {
    next_power_of_two(n).trailing_zeros()
}

/// Upper, lower and grand final round counts for `n` teams
pub fn double_elimination_rounds(n: usize) -> DoubleEliminationRounds {
    let upper = single_elimination_rounds(n);
    DoubleEliminationRounds {
        upper,
        lower: (upper * 2).saturating_sub(1),
        grand_final: 1,
    }
}

/// Swiss rounds for `n` teams: `max(3, ceil(log2(n)))`
pub fn swiss_rounds(n: usize) -> u32 {
    ceil_log2(n).max(MIN_SWISS_ROUNDS)
}

/// Rounds for a single round robin of `n` teams
pub fn round_robin_rounds(n: usize) -> u32 {
    n.saturating_sub(1) as u32
}

/// Matches for a single round robin of `n` teams
pub fn round_robin_total_matches(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Groups needed to split `n` teams into groups of `group_size`
pub fn group_count(n: usize, group_size: usize) -> usize {
    if group_size == 0 {
        0
    } else {
        n.div_ceil(group_size)
    }
}

/// Playoff bracket size after the group stage
pub fn playoff_size(group_count: usize, advancement_per_group: usize) -> usize {
    group_count * advancement_per_group
}

/// Member counts of each seed-contiguous group; only the last may be short
pub fn group_sizes(n: usize, group_size: usize) -> Vec<usize> {
    (0..group_count(n, group_size))
        .map(|group| group_size.min(n - group * group_size))
        .collect()
}

/// Matches played over the whole tournament, not counting a grand final reset
///
/// GSL counts five matches per group regardless of how full it is.
pub fn expected_total_matches(
    format: &TournamentFormat,
    n: usize,
    group_size: usize,
    advancement_per_group: usize,
) -> usize {
    match format {
        TournamentFormat::SingleElimination => n.saturating_sub(1),
        TournamentFormat::DoubleElimination => {
            if n < 2 {
                0
            } else {
                2 * n - 1
            }
        }
        TournamentFormat::Swiss => {
            let playoff_teams = n.min(SWISS_PLAYOFF_SIZE);
            swiss_rounds(n) as usize * (n / 2) + playoff_teams.saturating_sub(1)
        }
        TournamentFormat::RoundRobin => round_robin_total_matches(n),
        TournamentFormat::GroupStagePlayoffs => {
            let groups: usize = group_sizes(n, group_size)
                .into_iter()
                .map(round_robin_total_matches)
                .sum();
            let playoffs = playoff_size(group_count(n, group_size), advancement_per_group);
            groups + playoffs.saturating_sub(1)
        }
        TournamentFormat::Gsl => {
            let groups = group_count(n, group_size);
            groups * GSL_MATCHES_PER_GROUP + (groups * 2).saturating_sub(1)
        }
        TournamentFormat::Custom(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_power_of_two_boundaries() {
        let expected = [(0, 1), (1, 1), (2, 2), (3, 4), (5, 8), (8, 8), (9, 16), (16, 16), (17, 32)];
        for (n, size) in expected {
            assert_eq!(next_power_of_two(n), size, "n = {n}");
        }
    }

    #[test]
    fn test_single_elimination_rounds_boundaries() {
        let expected = [(0, 0), (1, 0), (2, 1), (3, 2), (5, 3), (8, 3), (9, 4), (16, 4), (17, 5)];
        for (n, rounds) in expected {
            assert_eq!(single_elimination_rounds(n), rounds, "n = {n}");
        }
    }

    #[test]
    fn test_bye_count() {
        assert_eq!(bye_count(0), 0);
        assert_eq!(bye_count(1), 0);
        assert_eq!(bye_count(5), 3);
        assert_eq!(bye_count(8), 0);
        assert_eq!(bye_count(17), 15);
    }

    #[test]
    fn test_double_elimination_rounds() {
        let rounds = double_elimination_rounds(8);
        assert_eq!(rounds.upper, 3);
        assert_eq!(rounds.lower, 5);
        assert_eq!(rounds.grand_final, 1);

        let rounds = double_elimination_rounds(1);
        assert_eq!(rounds.upper, 0);
        assert_eq!(rounds.lower, 0);
    }

    #[test]
    fn test_double_elimination_rounds_boundaries() {
        let expected = [(2, 1, 1), (3, 2, 3), (8, 3, 5), (9, 4, 7), (16, 4, 7), (17, 5, 9)];
        for (n, upper, lower) in expected {
            let rounds = double_elimination_rounds(n);
            assert_eq!((rounds.upper, rounds.lower), (upper, lower), "n = {n}");
            assert_eq!(rounds.grand_final, 1, "n = {n}");
        }
    }

    #[test]
    fn test_swiss_rounds_boundaries() {
        let expected = [(0, 3), (1, 3), (2, 3), (3, 3), (5, 3), (8, 3), (9, 4), (16, 4), (17, 5), (33, 6)];
        for (n, rounds) in expected {
            assert_eq!(swiss_rounds(n), rounds, "n = {n}");
        }
    }

    #[test]
    fn test_round_robin_counts() {
        assert_eq!(round_robin_rounds(0), 0);
        assert_eq!(round_robin_rounds(1), 0);
        assert_eq!(round_robin_rounds(5), 4);
        assert_eq!(round_robin_total_matches(0), 0);
        assert_eq!(round_robin_total_matches(1), 0);
        assert_eq!(round_robin_total_matches(5), 10);
        assert_eq!(round_robin_total_matches(16), 120);

        let expected = [(2, 1, 1), (3, 2, 3), (8, 7, 28), (9, 8, 36), (16, 15, 120), (17, 16, 136)];
        for (n, rounds, matches) in expected {
            assert_eq!(round_robin_rounds(n), rounds, "n = {n}");
            assert_eq!(round_robin_total_matches(n), matches, "n = {n}");
        }
    }

    #[test]
    fn test_group_counts() {
        assert_eq!(group_count(8, 4), 2);
        assert_eq!(group_count(9, 4), 3);
        assert_eq!(group_count(0, 4), 0);
        assert_eq!(group_count(3, 0), 0);
        assert_eq!(playoff_size(3, DEFAULT_ADVANCEMENT_PER_GROUP), 6);
        assert_eq!(group_sizes(9, 4), vec![4, 4, 1]);
        assert_eq!(group_sizes(8, 4), vec![4, 4]);
    }

    #[test]
    fn test_expected_total_matches() {
        assert_eq!(expected_total_matches(&TournamentFormat::SingleElimination, 8, 4, 2), 7);
        assert_eq!(expected_total_matches(&TournamentFormat::DoubleElimination, 8, 4, 2), 15);
        assert_eq!(expected_total_matches(&TournamentFormat::RoundRobin, 5, 4, 2), 10);
        // 16 teams: 4 Swiss rounds of 8 matches plus a 7 match playoff
        assert_eq!(expected_total_matches(&TournamentFormat::Swiss, 16, 4, 2), 39);
        // Two groups of 4 (6 each) plus a 4 team playoff (3)
        assert_eq!(expected_total_matches(&TournamentFormat::GroupStagePlayoffs, 8, 4, 2), 15);
        // Two GSL groups (5 each) plus a 4 team final bracket (3)
        assert_eq!(expected_total_matches(&TournamentFormat::Gsl, 8, 4, 2), 13);
        assert_eq!(
            expected_total_matches(&TournamentFormat::Custom("ladder".to_string()), 8, 4, 2),
            0
        );
    }
}
