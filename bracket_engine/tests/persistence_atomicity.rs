//! Integration tests for all-or-nothing persistence
//!
//! A store that fails on its n-th row write must leave no rows behind, no
//! matter which table the failure lands in.

use bracket_engine::db::{BracketRepository, MemoryBracketRepository};
use bracket_engine::tournament::{
    BracketError, ErrorKind, TeamInput, TournamentAssembler, TournamentFormat, TournamentRequest,
};
use std::sync::Arc;

fn request(format: TournamentFormat, n: i64) -> TournamentRequest {
    let teams = (1..=n).map(|id| TeamInput::new(id, 1800.0 - id as f64 * 10.0)).collect();
    TournamentRequest::new("Atomic Cup", format, teams)
}

#[tokio::test]
async fn test_failure_on_every_write_rolls_back() {
    let request = request(TournamentFormat::DoubleElimination, 6);
    let rows = TournamentAssembler::new(Arc::new(MemoryBracketRepository::new()))
        .plan(&request)
        .unwrap()
        .row_count();

    for failing_write in 1..=rows {
        let repo = Arc::new(MemoryBracketRepository::failing_after(failing_write));
        let assembler = TournamentAssembler::new(repo.clone());

        let err = assembler
            .create_tournament(&request)
            .await
            .expect_err("injected failure should surface");
        assert!(matches!(err, BracketError::Storage(_)));
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(repo.total_rows().await, 0, "write {failing_write} left rows behind");
    }
}

#[tokio::test]
async fn test_store_recovers_after_failed_write() {
    let repo = Arc::new(MemoryBracketRepository::failing_after(3));
    let assembler = TournamentAssembler::new(repo.clone());
    let request = request(TournamentFormat::Swiss, 8);

    assert!(assembler.create_tournament(&request).await.is_err());
    let persisted = assembler.create_tournament(&request).await.unwrap();

    let counts = repo.row_counts(persisted.tournament.id).await.unwrap();
    assert_eq!(counts.tournaments, 1);
    assert_eq!(counts.teams, 8);
    assert_eq!(counts.matches, 4);
    assert_eq!(repo.total_rows().await, counts.total());
}

#[tokio::test]
async fn test_failed_append_keeps_existing_bracket() {
    let request = request(TournamentFormat::RoundRobin, 4);
    let plan_rows = TournamentAssembler::new(Arc::new(MemoryBracketRepository::new()))
        .plan(&request)
        .unwrap()
        .row_count();

    // The second call fails on its next-to-last row
    let structure_rows = plan_rows - 1 - 4;
    let repo = Arc::new(MemoryBracketRepository::failing_after(
        plan_rows + structure_rows - 1,
    ));
    let assembler = TournamentAssembler::new(repo.clone());

    let created = assembler.create_tournament(&request).await.unwrap();
    let id = created.tournament.id;
    let before = repo.row_counts(id).await.unwrap();

    assert!(assembler.generate_bracket(id, &request).await.is_err());
    assert_eq!(repo.row_counts(id).await.unwrap(), before);
}

#[tokio::test]
async fn test_configuration_errors_never_reach_the_store() {
    let repo = Arc::new(MemoryBracketRepository::new());
    let assembler = TournamentAssembler::new(repo.clone());

    let bad_groups = request(TournamentFormat::GroupStagePlayoffs, 8)
        .with_group_size(4)
        .with_advancement_per_group(5);
    let err = assembler.create_tournament(&bad_groups).await.unwrap_err();
    assert!(matches!(err, BracketError::InvalidAdvancement { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let crowded = request(TournamentFormat::SingleElimination, 9).with_max_teams(8);
    assert!(matches!(
        assembler.create_tournament(&crowded).await,
        Err(BracketError::TooManyTeams { .. })
    ));

    assert_eq!(repo.writes_attempted(), 0);
}
