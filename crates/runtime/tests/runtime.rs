//! Runtime behavior observed through game handles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use mars_core::card::ResourceCondition;
use mars_core::{
    Action, ActionAllowance, ActionResult, Card, CardBehavior, CardId, CardPayment, CardTag, CardType,
    GameError, GameId, GamePhase, GameStatus, PlayerId, PlayerState, ResourceType, SkipOutcome,
    TransitionPhase, Trigger,
};
use mars_runtime::{
    CardCatalog, Event, GameEvent, GameRepository, InMemoryGameRepo, Runtime, RuntimeError,
    Topic, TurnEvent,
};

fn catalog() -> CardCatalog {
    CardCatalog::new([
        Card::new("mine", "Mine", CardType::Automated, 4)
            .with_tags([CardTag::Building])
            .with_behavior(
                CardBehavior::new()
                    .with_trigger(Trigger::auto())
                    .with_output(ResourceCondition::new(ResourceType::SteelProduction, 1)),
            ),
        Card::new("lab", "Research Lab", CardType::Automated, 11),
    ])
    .unwrap()
}

fn players() -> Vec<PlayerState> {
    let mut p1 = PlayerState::new("p1", "Ann", 20);
    p1.resources.credits = 40;
    p1.hand = vec!["mine".into(), "lab".into()];
    let mut p2 = PlayerState::new("p2", "Bo", 20);
    p2.resources.credits = 3;
    p2.hand = vec!["lab".into()];
    vec![p1, p2]
}

async fn runtime_with(repository: Arc<InMemoryGameRepo>) -> Runtime {
    Runtime::builder()
        .catalog(catalog())
        .repository(repository)
        .build()
        .await
        .unwrap()
}

async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event within a second")
        .expect("open channel")
}

#[tokio::test]
async fn a_card_played_through_the_handle_is_committed_and_saved() {
    let repository = Arc::new(InMemoryGameRepo::new());
    let mut runtime = runtime_with(repository.clone()).await;
    let game = runtime.create_game("g1", players()).unwrap();

    game.execute_action(Action::StartGame).await.unwrap();
    assert!(game.can_play_card("p1", "mine").await.unwrap().valid);
    assert!(!game.can_play_card("p2", "lab").await.unwrap().valid);

    let result = game
        .play_card("p1", "mine", CardPayment::credits(4))
        .await
        .unwrap();
    assert!(matches!(result, ActionResult::Resolved(_)));

    let state = game.query_state().await.unwrap();
    let p1 = state.player(&PlayerId::from("p1")).unwrap();
    assert_eq!(p1.resources.credits, 36);
    assert_eq!(p1.production.steel, 1);
    assert_eq!(p1.hand, vec![CardId::from("lab")]);
    assert_eq!(
        state.current_turn.as_ref().unwrap().actions_remaining,
        ActionAllowance::Limited(1)
    );

    let saved = repository.load(&GameId::from("g1")).unwrap().unwrap();
    assert_eq!(saved, state);

    let tracked = game.tracked_card_states("p1").await.unwrap();
    assert_eq!(tracked.len(), 1);
    assert!(game.tracked_card_action_states("p1").await.unwrap().is_empty());

    drop(game);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_actions_surface_their_error_code_and_leave_state_alone() {
    let mut runtime = runtime_with(Arc::new(InMemoryGameRepo::new())).await;
    let game = runtime.create_game("g1", players()).unwrap();
    game.execute_action(Action::StartGame).await.unwrap();
    let before = game.query_state().await.unwrap();
    let mut game_rx = game.subscribe(Topic::Game);

    let err = game.skip_action("p2").await.unwrap_err();
    match &err {
        RuntimeError::Execute(inner) => {
            assert!(inner.is_rejection());
            assert_eq!(inner.error_code(), "TURN_NOT_YOUR_TURN");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.error_code(), Some("TURN_NOT_YOUR_TURN"));

    match next_event(&mut game_rx).await {
        Event::Game(GameEvent::ActionFailed {
            game_id,
            phase,
            code,
            ..
        }) => {
            assert_eq!(game_id, GameId::from("g1"));
            assert_eq!(phase, TransitionPhase::PreValidate);
            assert_eq!(code, "TURN_NOT_YOUR_TURN");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(game.query_state().await.unwrap(), before);
}

#[tokio::test]
async fn turn_topic_follows_the_turn_machine() {
    let mut runtime = runtime_with(Arc::new(InMemoryGameRepo::new())).await;
    let game = runtime.create_game("g1", players()).unwrap();
    game.execute_action(Action::StartGame).await.unwrap();
    let mut turn_rx = runtime.subscribe(Topic::Turn);

    assert_eq!(game.skip_action("p1").await.unwrap(), SkipOutcome::Passed);
    match next_event(&mut turn_rx).await {
        Event::Turn(TurnEvent::TurnChanged { player_id, .. }) => {
            assert_eq!(player_id, Some(PlayerId::from("p2")));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert_eq!(game.skip_action("p2").await.unwrap(), SkipOutcome::Passed);
    let mut saw_production = false;
    while let Ok(Ok(event)) = timeout(Duration::from_millis(100), turn_rx.recv()).await {
        if let Event::Turn(TurnEvent::PhaseChanged { phase, .. }) = event {
            saw_production |= phase == GamePhase::ProductionAndCardDraw;
        }
    }
    assert!(saw_production);

    game.advance_generation().await.unwrap();
    match next_event(&mut turn_rx).await {
        Event::Turn(_) => {}
        other => panic!("unexpected event: {other:?}"),
    }
    let state = game.query_state().await.unwrap();
    assert_eq!(state.generation, 2);
    assert_eq!(state.current_phase, GamePhase::Action);
}

#[tokio::test]
async fn consume_and_auto_advance_run_outside_the_action_pipeline() {
    let mut runtime = runtime_with(Arc::new(InMemoryGameRepo::new())).await;
    let game = runtime.create_game("g1", players()).unwrap();
    game.execute_action(Action::StartGame).await.unwrap();

    assert!(!game.auto_advance_turn_if_needed().await.unwrap());
    assert_eq!(
        game.consume_action().await.unwrap(),
        ActionAllowance::Limited(1)
    );
    assert_eq!(
        game.consume_action().await.unwrap(),
        ActionAllowance::Limited(0)
    );
    assert!(matches!(
        game.consume_action().await,
        Err(RuntimeError::Turn(_))
    ));

    assert!(game.auto_advance_turn_if_needed().await.unwrap());
    let state = game.query_state().await.unwrap();
    assert_eq!(state.current_player_id(), Some(&PlayerId::from("p2")));
}

#[tokio::test]
async fn diagnostics_cover_projects_and_missing_card_actions() {
    let mut runtime = runtime_with(Arc::new(InMemoryGameRepo::new())).await;
    let game = runtime.create_game("g1", players()).unwrap();
    game.execute_action(Action::StartGame).await.unwrap();

    let power_plant = game
        .standard_project_state("p1", "power-plant")
        .await
        .unwrap();
    assert!(power_plant.available());

    let unknown = game.standard_project_state("p1", "moon-base").await.unwrap();
    assert!(!unknown.available());
    assert_eq!(unknown.state.errors[0].code, "UNKNOWN_STANDARD_PROJECT");

    assert!(matches!(
        game.card_action_state("p1", "mine", 0).await,
        Err(RuntimeError::CardActionNotFound { behavior_index: 0, .. })
    ));
    assert!(matches!(
        game.card_state("p9", "mine").await,
        Err(RuntimeError::PlayerNotFound(_))
    ));
    assert!(matches!(
        game.card_state("p1", "ghost").await,
        Err(RuntimeError::Oracle(_))
    ));
}

#[tokio::test]
async fn games_run_independently() {
    let mut runtime = runtime_with(Arc::new(InMemoryGameRepo::new())).await;
    let first = runtime.create_game("g1", players()).unwrap();
    let second = runtime.create_game("g2", players()).unwrap();
    assert_eq!(
        runtime.game_ids(),
        vec![GameId::from("g1"), GameId::from("g2")]
    );
    assert!(matches!(
        runtime.create_game("g1", players()),
        Err(RuntimeError::GameAlreadyRunning(_))
    ));

    let (a, b) = tokio::join!(
        first.execute_action(Action::StartGame),
        second.execute_action(Action::StartGame)
    );
    a.unwrap();
    b.unwrap();
    first
        .play_card("p1", "mine", CardPayment::credits(4))
        .await
        .unwrap();

    let untouched = second.query_state().await.unwrap();
    assert_eq!(untouched.status, GameStatus::Active);
    assert_eq!(
        untouched.player(&PlayerId::from("p1")).unwrap().resources.credits,
        40
    );
    assert!(matches!(
        runtime.handle(&GameId::from("g3")),
        Err(RuntimeError::GameNotFound(_))
    ));
}

#[tokio::test]
async fn saved_games_respawn_in_a_new_runtime() {
    let repository = Arc::new(InMemoryGameRepo::new());
    let mut runtime = runtime_with(repository.clone()).await;
    let game = runtime.create_game("g1", players()).unwrap();
    game.execute_action(Action::StartGame).await.unwrap();
    game.skip_action("p1").await.unwrap();
    let saved = game.query_state().await.unwrap();
    drop(game);
    runtime.shutdown().await.unwrap();

    let mut restarted = runtime_with(repository).await;
    assert!(matches!(
        restarted.load_game(&GameId::from("nope")),
        Err(RuntimeError::SavedGameNotFound(_))
    ));
    let game = restarted.load_game(&GameId::from("g1")).unwrap();
    assert_eq!(game.query_state().await.unwrap(), saved);
    assert_eq!(game.skip_action("p2").await.unwrap(), SkipOutcome::Passed);
}

#[tokio::test]
async fn building_without_cards_fails() {
    assert!(matches!(
        Runtime::builder().build().await,
        Err(RuntimeError::MissingCatalog)
    ));
}
