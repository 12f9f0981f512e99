//! Bracket position allocation for elimination-shaped stages.
//!
//! Position `(r, p)` is the outcome slot of line `p` in round `r`. Every
//! round of a stage gets its slots up front; only byes fill a slot at
//! generation time.

use super::models::{AdvancementRule, PositionStatus, PositionType, TeamId};
use super::seeding::{SeedSlot, SeededField};
use super::stages::{EliminationKind, StageSpec};
use serde::Serialize;

/// A bracket position before it is persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedPosition {
    /// Index of the stage in the plan
    pub stage: usize,
    pub round: u32,
    pub position: u32,
    pub team_id: Option<TeamId>,
    pub status: PositionStatus,
    pub position_type: PositionType,
    pub advancement_rule: AdvancementRule,
}

impl AdvancementRule {
    /// Rule for a round of an elimination stage
    ///
    /// Grand final positions carry no loss rule: whether a loss ends the
    /// tournament depends on the bracket reset.
    pub fn for_stage(kind: EliminationKind, round: u32, total_rounds: u32) -> Self {
        Self {
            win_advances: round < total_rounds,
            loss_eliminates: kind == EliminationKind::Single,
            loss_drops_to_lower: kind == EliminationKind::Upper,
        }
    }
}

/// Slots in `round` of a bracket of `bracket_size`: `bracket_size / 2^round`,
/// never fewer than one
pub fn positions_in_round(bracket_size: usize, round: u32) -> u32 {
    bracket_size.checked_shr(round).unwrap_or(0).max(1) as u32
}

/// Creates empty positions and records bye promotions
pub struct PositionAllocator;

impl PositionAllocator {
    /// All positions of one stage; empty for stages that are not slot-based
    pub fn allocate(stage_index: usize, stage: &StageSpec) -> Vec<PlannedPosition> {
        let Some(shape) = stage.elimination else {
            return Vec::new();
        };

        (1..=stage.total_rounds)
            .flat_map(|round| {
                (1..=positions_in_round(shape.bracket_size, round)).map(move |position| {
                    PlannedPosition {
                        stage: stage_index,
                        round,
                        position,
                        team_id: None,
                        status: PositionStatus::Empty,
                        position_type: stage.position_type(round),
                        advancement_rule: AdvancementRule::for_stage(
                            shape.kind,
                            round,
                            stage.total_rounds,
                        ),
                    }
                })
            })
            .collect()
    }

    /// Positions for every slot-based stage, in stage order
    pub fn allocate_all(stages: &[StageSpec]) -> Vec<PlannedPosition> {
        stages
            .iter()
            .enumerate()
            .flat_map(|(index, stage)| Self::allocate(index, stage))
            .collect()
    }

    /// Record teams paired with a bye as already advanced out of round 1
    ///
    /// Returns the number of promoted teams.
    pub fn promote_byes(
        positions: &mut [PlannedPosition],
        stage_index: usize,
        field: &SeededField,
    ) -> usize {
        let mut promoted = 0;
        for (line, pair) in field.slots().chunks(2).enumerate() {
            let lone_team = match pair {
                [SeedSlot::Team(team), SeedSlot::Bye] | [SeedSlot::Bye, SeedSlot::Team(team)] => {
                    team
                }
                _ => continue,
            };

            let slot = positions.iter_mut().find(|p| {
                p.stage == stage_index && p.round == 1 && p.position == line as u32 + 1
            });
            if let Some(slot) = slot {
                slot.team_id = Some(lone_team.team_id);
                slot.status = PositionStatus::Advanced;
                promoted += 1;
            }
        }
        promoted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::TeamInput;
    use crate::tournament::seeding::{SeedingEngine, SeedingPolicy};
    use crate::tournament::stages;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_positions_in_round() {
        assert_eq!(positions_in_round(8, 1), 4);
        assert_eq!(positions_in_round(8, 2), 2);
        assert_eq!(positions_in_round(8, 3), 1);
        assert_eq!(positions_in_round(8, 5), 1);
        assert_eq!(positions_in_round(8, 200), 1);
    }

    #[test]
    fn test_single_elimination_positions() {
        let stages = stages::single_elimination(8);
        let positions = PositionAllocator::allocate(0, &stages[0]);
        assert_eq!(positions.len(), 7);

        let round_one: Vec<_> = positions.iter().filter(|p| p.round == 1).collect();
        assert_eq!(round_one.len(), 4);
        assert!(round_one.iter().all(|p| p.position_type == PositionType::FirstRound));
        assert!(round_one.iter().all(|p| p.status == PositionStatus::Empty && p.team_id.is_none()));

        let final_slot = positions.iter().find(|p| p.round == 3).unwrap();
        assert_eq!(final_slot.position_type, PositionType::Final);
        assert!(!final_slot.advancement_rule.win_advances);
        assert!(final_slot.advancement_rule.loss_eliminates);
        assert!(!final_slot.advancement_rule.loss_drops_to_lower);
    }

    #[test]
    fn test_double_elimination_rules() {
        let stages = stages::double_elimination(8, "bo5");
        let positions = PositionAllocator::allocate_all(&stages);

        let upper: Vec<_> = positions.iter().filter(|p| p.stage == 0).collect();
        assert_eq!(upper.len(), 7);
        assert!(upper.iter().all(|p| p.advancement_rule.loss_drops_to_lower));
        assert!(upper.iter().all(|p| !p.advancement_rule.loss_eliminates));

        let lower: Vec<_> = positions.iter().filter(|p| p.stage == 1).collect();
        // 4 + 2 + 1 + 1 + 1 over five rounds
        assert_eq!(lower.len(), 9);
        assert!(lower.iter().all(|p| {
            !p.advancement_rule.loss_eliminates && !p.advancement_rule.loss_drops_to_lower
        }));

        let grand_final: Vec<_> = positions.iter().filter(|p| p.stage == 2).collect();
        assert_eq!(grand_final.len(), 1);
    }

    #[test]
    fn test_round_robin_gets_no_positions() {
        let stages = stages::round_robin(6);
        assert!(PositionAllocator::allocate_all(&stages).is_empty());
    }

    #[test]
    fn test_promote_byes() {
        let teams: Vec<TeamInput> = (1..=5).map(|id| TeamInput::new(id, 2000.0 - id as f64)).collect();
        let field = SeedingEngine::default().seed(&teams, SeedingPolicy::Standard, &mut StdRng::seed_from_u64(3));
        let stages = stages::single_elimination(5);
        let mut positions = PositionAllocator::allocate(0, &stages[0]);

        let promoted = PositionAllocator::promote_byes(&mut positions, 0, &field);
        assert_eq!(promoted, 1);

        let line_three = positions.iter().find(|p| p.round == 1 && p.position == 3).unwrap();
        assert_eq!(line_three.team_id, Some(5));
        assert_eq!(line_three.status, PositionStatus::Advanced);

        let line_four = positions.iter().find(|p| p.round == 1 && p.position == 4).unwrap();
        assert_eq!(line_four.status, PositionStatus::Empty);
    }
}
