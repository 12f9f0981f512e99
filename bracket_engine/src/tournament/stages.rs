//! Stage graphs for each format.
//!
//! A stage list is ordered by `stage_order`; `feeds_from` is an index into the
//! same list and always points at an earlier stage.

use super::errors::BracketResult;
use super::models::{PositionType, StageId, StageType};
use super::sizing::{
    GSL_BRACKET_ROUNDS, SWISS_PLAYOFF_SIZE, double_elimination_rounds, group_count,
    next_power_of_two, playoff_size, round_robin_rounds, round_robin_total_matches,
    single_elimination_rounds, swiss_rounds,
};
use serde::{Deserialize, Serialize};

/// How losing works in an elimination-shaped stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationKind {
    /// A loss ends the run (single elimination, playoffs, finals)
    Single,
    /// A loss drops the team to a linked lower stage
    Upper,
    /// Fed by an upper stage
    Lower,
    /// Decider between the upper and lower bracket winners
    GrandFinal,
}

/// Slot layout of an elimination-shaped stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationShape {
    pub kind: EliminationKind,
    pub bracket_size: usize,
}

/// Format-specific stage knobs, stored as JSON
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elimination_type: Option<EliminationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_reset: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bo_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swiss_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wins_to_qualify: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub losses_to_eliminate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buchholz_tiebreaker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_matches: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for_win: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for_tie: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for_loss: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advancement_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_from_groups: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_from_gsl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feeds_from: Option<StageId>,
}

impl StageSettings {
    /// JSON form with the persisted ID of the feeding stage filled in
    pub fn to_json(&self, feeds_from: Option<StageId>) -> BracketResult<serde_json::Value> {
        let settings = StageSettings {
            feeds_from,
            ..self.clone()
        };
        Ok(serde_json::to_value(settings)?)
    }
}

/// A stage before it is persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSpec {
    pub name: String,
    pub stage_type: StageType,
    pub stage_order: u32,
    pub max_teams: usize,
    pub total_rounds: u32,
    /// Index of the feeding stage in the same list
    pub feeds_from: Option<usize>,
    pub settings: StageSettings,
    /// Present for stages that get bracket positions
    pub elimination: Option<EliminationShape>,
}

impl StageSpec {
    pub fn new(
        name: impl Into<String>,
        stage_type: StageType,
        stage_order: u32,
        max_teams: usize,
        total_rounds: u32,
    ) -> Self {
        Self {
            name: name.into(),
            stage_type,
            stage_order,
            max_teams,
            total_rounds,
            feeds_from: None,
            settings: StageSettings::default(),
            elimination: None,
        }
    }

    pub fn feeding_from(mut self, stage_index: usize) -> Self {
        self.feeds_from = Some(stage_index);
        self
    }

    pub fn with_settings(mut self, settings: StageSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Mark the stage as slot-based
    pub fn eliminating(mut self, kind: EliminationKind, bracket_size: usize) -> Self {
        self.elimination = Some(EliminationShape { kind, bracket_size });
        self
    }

    pub fn position_type(&self, round: u32) -> PositionType {
        PositionType::for_round(round, self.total_rounds)
    }
}

/// Group label for the zero-based group index: A..Z, then AA, AB, ...
pub fn group_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// One elimination stage; `bracket_size` of the settings mirrors the shape
fn elimination_stage(
    name: &str,
    stage_type: StageType,
    stage_order: u32,
    team_count: usize,
    kind: EliminationKind,
) -> StageSpec {
    let bracket_size = next_power_of_two(team_count);
    StageSpec::new(
        name,
        stage_type,
        stage_order,
        team_count,
        single_elimination_rounds(team_count),
    )
    .with_settings(StageSettings {
        elimination_type: Some(kind),
        bracket_size: Some(bracket_size),
        ..StageSettings::default()
    })
    .eliminating(kind, bracket_size)
}

/// Main Bracket
pub fn single_elimination(team_count: usize) -> Vec<StageSpec> {
    vec![elimination_stage(
        "Main Bracket",
        StageType::SingleElimination,
        1,
        team_count,
        EliminationKind::Single,
    )]
}

/// Upper Bracket, Lower Bracket (fed by upper), Grand Final
pub fn double_elimination(team_count: usize, finals_format: &str) -> Vec<StageSpec> {
    let rounds = double_elimination_rounds(team_count);
    let bracket_size = next_power_of_two(team_count);

    let upper = elimination_stage(
        "Upper Bracket",
        StageType::UpperBracket,
        1,
        team_count,
        EliminationKind::Upper,
    );

    let lower = StageSpec::new(
        "Lower Bracket",
        StageType::LowerBracket,
        2,
        team_count,
        rounds.lower,
    )
    .feeding_from(0)
    .with_settings(StageSettings {
        elimination_type: Some(EliminationKind::Lower),
        bracket_size: Some(bracket_size),
        ..StageSettings::default()
    })
    .eliminating(EliminationKind::Lower, bracket_size);

    let grand_final = StageSpec::new("Grand Final", StageType::GrandFinal, 3, 2, rounds.grand_final)
        .with_settings(StageSettings {
            bo_format: Some(finals_format.to_string()),
            bracket_reset: Some(true),
            ..StageSettings::default()
        })
        .eliminating(EliminationKind::GrandFinal, 2);

    vec![upper, lower, grand_final]
}

/// Swiss Rounds followed by a fixed top-8 playoff
pub fn swiss(team_count: usize) -> Vec<StageSpec> {
    let rounds = swiss_rounds(team_count);
    let swiss = StageSpec::new("Swiss Rounds", StageType::Swiss, 1, team_count, rounds)
        .with_settings(StageSettings {
            swiss_rounds: Some(rounds),
            wins_to_qualify: Some((rounds as f64 * 0.6).ceil() as u32),
            losses_to_eliminate: Some((rounds as f64 * 0.6).floor() as u32),
            buchholz_tiebreaker: Some(true),
            ..StageSettings::default()
        });

    let playoffs = elimination_stage(
        "Swiss Playoffs",
        StageType::SingleElimination,
        2,
        SWISS_PLAYOFF_SIZE,
        EliminationKind::Single,
    )
    .feeding_from(0);

    vec![swiss, playoffs]
}

/// One round robin stage
pub fn round_robin(team_count: usize) -> Vec<StageSpec> {
    vec![
        StageSpec::new(
            "Round Robin",
            StageType::RoundRobin,
            1,
            team_count,
            round_robin_rounds(team_count),
        )
        .with_settings(StageSettings {
            total_matches: Some(round_robin_total_matches(team_count)),
            points_for_win: Some(3),
            points_for_tie: Some(1),
            points_for_loss: Some(0),
            ..StageSettings::default()
        }),
    ]
}

/// Group A, Group B, ... then a Playoffs bracket of `groups * advancement`
pub fn group_stage_playoffs(
    team_count: usize,
    group_size: usize,
    advancement_per_group: usize,
) -> Vec<StageSpec> {
    let groups = group_count(team_count, group_size);
    let mut stages: Vec<StageSpec> = (0..groups)
        .map(|group| {
            let label = group_label(group);
            StageSpec::new(
                format!("Group {label}"),
                StageType::GroupStage,
                group as u32 + 1,
                group_size,
                round_robin_rounds(group_size),
            )
            .with_settings(StageSettings {
                group_id: Some(label),
                advancement_count: Some(advancement_per_group),
                points_for_win: Some(3),
                points_for_tie: Some(1),
                ..StageSettings::default()
            })
        })
        .collect();

    let mut playoffs = elimination_stage(
        "Playoffs",
        StageType::SingleElimination,
        groups as u32 + 1,
        playoff_size(groups, advancement_per_group),
        EliminationKind::Single,
    );
    playoffs.settings.qualified_from_groups = Some(true);
    playoffs.settings.advancement_count = Some(advancement_per_group);
    stages.push(playoffs);

    stages
}

/// Per group a Winners and a Losers stage, then GSL Finals for two per group
///
/// Group `g` has its winners stage at index `2g` and losers stage at `2g + 1`.
pub fn gsl(team_count: usize, group_size: usize) -> Vec<StageSpec> {
    let groups = group_count(team_count, group_size);
    let group_bracket = next_power_of_two(group_size);
    let mut stages = Vec::with_capacity(groups * 2 + 1);

    for group in 0..groups {
        let label = group_label(group);
        let winners_index = stages.len();
        let settings = StageSettings {
            group_id: Some(label.clone()),
            advancement_count: Some(1),
            bracket_size: Some(group_bracket),
            ..StageSettings::default()
        };

        stages.push(
            StageSpec::new(
                format!("Group {label} Winners"),
                StageType::GslWinners,
                group as u32 * 2 + 1,
                group_size,
                GSL_BRACKET_ROUNDS,
            )
            .with_settings(settings.clone())
            .eliminating(EliminationKind::Upper, group_bracket),
        );

        stages.push(
            StageSpec::new(
                format!("Group {label} Losers"),
                StageType::GslLosers,
                group as u32 * 2 + 2,
                group_size,
                GSL_BRACKET_ROUNDS,
            )
            .feeding_from(winners_index)
            .with_settings(settings)
            .eliminating(EliminationKind::Lower, group_bracket),
        );
    }

    let mut finals = elimination_stage(
        "GSL Finals",
        StageType::SingleElimination,
        groups as u32 * 2 + 1,
        groups * 2,
        EliminationKind::Single,
    );
    finals.settings.qualified_from_gsl = Some(true);
    stages.push(finals);

    stages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_labels() {
        assert_eq!(group_label(0), "A");
        assert_eq!(group_label(3), "D");
        assert_eq!(group_label(25), "Z");
        assert_eq!(group_label(26), "AA");
        assert_eq!(group_label(27), "AB");
    }

    #[test]
    fn test_single_elimination_stage() {
        let stages = single_elimination(6);
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].total_rounds, 3);
        assert_eq!(stages[0].settings.bracket_size, Some(8));
        assert_eq!(stages[0].elimination.map(|e| e.kind), Some(EliminationKind::Single));
    }

    #[test]
    fn test_double_elimination_stage_graph() {
        let stages = double_elimination(8, "bo5");
        let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Upper Bracket", "Lower Bracket", "Grand Final"]);
        assert_eq!(stages[0].total_rounds, 3);
        assert_eq!(stages[1].total_rounds, 5);
        assert_eq!(stages[1].feeds_from, Some(0));
        assert_eq!(stages[2].total_rounds, 1);
        assert_eq!(stages[2].settings.bracket_reset, Some(true));
        assert_eq!(stages[2].settings.bo_format.as_deref(), Some("bo5"));
    }

    #[test]
    fn test_swiss_settings() {
        let stages = swiss(16);
        assert_eq!(stages[0].total_rounds, 4);
        assert_eq!(stages[0].settings.wins_to_qualify, Some(3));
        assert_eq!(stages[0].settings.losses_to_eliminate, Some(2));
        assert!(stages[0].elimination.is_none());
        assert_eq!(stages[1].max_teams, 8);
        assert_eq!(stages[1].total_rounds, 3);
        assert_eq!(stages[1].feeds_from, Some(0));
    }

    #[test]
    fn test_group_stage_playoffs_graph() {
        let stages = group_stage_playoffs(10, 4, 2);
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[2].name, "Group C");
        assert_eq!(stages[2].total_rounds, 3);
        assert_eq!(stages[3].name, "Playoffs");
        assert_eq!(stages[3].stage_order, 4);
        assert_eq!(stages[3].max_teams, 6);
        assert_eq!(stages[3].settings.bracket_size, Some(8));
        assert_eq!(stages[3].total_rounds, 3);
    }

    #[test]
    fn test_gsl_graph() {
        let stages = gsl(8, 4);
        assert_eq!(stages.len(), 5);
        assert_eq!(stages[0].stage_type, StageType::GslWinners);
        assert_eq!(stages[1].stage_type, StageType::GslLosers);
        assert_eq!(stages[1].feeds_from, Some(0));
        assert_eq!(stages[3].feeds_from, Some(2));
        assert_eq!(stages[3].name, "Group B Losers");
        assert_eq!(stages[4].name, "GSL Finals");
        assert_eq!(stages[4].stage_order, 5);
        assert_eq!(stages[4].max_teams, 4);
        assert_eq!(stages[4].total_rounds, 2);
    }

    #[test]
    fn test_settings_json_carries_feed_id() {
        let stages = double_elimination(4, "bo5");
        let json = stages[1].settings.to_json(Some(41)).unwrap();
        assert_eq!(json["feeds_from"], 41);
        assert_eq!(json["elimination_type"], "lower");
        assert!(json.get("bracket_reset").is_none());
    }
}
