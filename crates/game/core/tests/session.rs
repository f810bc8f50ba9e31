//! Subscribers driven by a [`GameSession`]: generational counters and
//! cached card and card-action playability.

use mars_core::state::GenerationalEvent;
use mars_core::{
    Action, Card, CardBehavior, CardPayment, CardSnapshot, CardType, GameConfig, GameEnv,
    GameSession, GameState, PlaceTileAction, PlayCardAction, PlayerId, PlayerState, Requirement,
    RequirementType, ResourceCondition, ResourceType, SkipAction, StandardProject,
    StandardProjectAction, TileType, Trigger,
};

fn catalog() -> CardSnapshot {
    CardSnapshot::new([
        Card::new("pool", "Lakefront", CardType::Automated, 8)
            .with_requirement(Requirement::new(RequirementType::Oceans).min(1)),
        Card::new("shed", "Tool Shed", CardType::Automated, 3),
        Card::new("bloom", "Bloom", CardType::Automated, 5).with_behavior(
            CardBehavior::new()
                .with_trigger(Trigger::auto())
                .with_output(ResourceCondition::new(ResourceType::Temperature, 1))
                .with_output(ResourceCondition::new(ResourceType::Oxygen, 1)),
        ),
        Card::new("vault", "Vault", CardType::Active, 3).with_behavior(
            CardBehavior::new()
                .with_trigger(Trigger::manual())
                .with_input(ResourceCondition::new(ResourceType::Credits, 30))
                .with_output(ResourceCondition::new(ResourceType::Heat, 5)),
        ),
    ])
}

fn session(config: &GameConfig) -> GameSession {
    session_with_hand(config, &["pool", "shed"])
}

fn session_with_hand(config: &GameConfig, hand: &[&str]) -> GameSession {
    let mut state = GameState::new("session", config);
    let mut p1 = PlayerState::new("p1", "Ann", 20);
    p1.resources.credits = 40;
    p1.hand = hand.iter().map(|&card| card.into()).collect();
    state.add_player(p1).unwrap();
    state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
    state.start(config).unwrap();
    GameSession::new(state)
}

fn p(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn place_ocean(session: &mut GameSession, env: GameEnv<'_>) {
    session
        .execute(
            env,
            &StandardProjectAction::new("p1", StandardProject::Aquifer).into(),
        )
        .unwrap();
    session
        .execute(env, &PlaceTileAction::new("p1", TileType::Ocean).into())
        .unwrap();
}

#[test]
fn counters_follow_published_events_and_reset_each_generation() {
    let cards = catalog();
    let config = GameConfig::default();
    let env = GameEnv::new(&cards, &config);
    let mut session = session(&config);

    place_ocean(&mut session, env);

    let counters = &session.state().players[&p("p1")].generational_events;
    assert_eq!(counters.count(GenerationalEvent::OceanPlacement), 1);
    assert_eq!(counters.count(GenerationalEvent::TrRaise), 1);
    assert_eq!(session.state().players[&p("p1")].terraform_rating, 21);

    for player in ["p1", "p2", "p1"] {
        session
            .execute(env, &SkipAction::new(player).into())
            .unwrap();
    }
    session.execute(env, &Action::AdvanceGeneration).unwrap();

    let counters = &session.state().players[&p("p1")].generational_events;
    assert_eq!(counters.count(GenerationalEvent::OceanPlacement), 0);
    assert_eq!(counters.count(GenerationalEvent::TrRaise), 0);
    assert_eq!(session.state().generation, 2);
}

#[test]
fn raising_two_parameters_with_one_card_counts_both_tr_steps() {
    let cards = catalog();
    let config = GameConfig::default();
    let env = GameEnv::new(&cards, &config);
    let mut session = session_with_hand(&config, &["bloom"]);

    session
        .execute(
            env,
            &PlayCardAction::new("p1", "bloom", CardPayment::credits(5)).into(),
        )
        .unwrap();

    let p1 = &session.state().players[&p("p1")];
    assert_eq!(p1.terraform_rating, 22);
    assert_eq!(p1.generational_events.count(GenerationalEvent::TrRaise), 2);
}

#[test]
fn tracked_card_state_refreshes_and_is_dropped_when_played() {
    let cards = catalog();
    let config = GameConfig::default();
    let env = GameEnv::new(&cards, &config);
    let mut session = session(&config);

    let states = session.track_card_states(env);
    let pool = states.get(&p("p1"), &"pool".into()).unwrap();
    assert!(!pool.snapshot().available());
    let first = pool.last_calculated();

    place_ocean(&mut session, env);

    assert!(pool.snapshot().available());
    assert!(pool.last_calculated() > first);

    session
        .execute(
            env,
            &PlayCardAction::new("p1", "pool", CardPayment::credits(8)).into(),
        )
        .unwrap();

    assert!(states.get(&p("p1"), &"pool".into()).is_none());
    assert!(states.get(&p("p1"), &"shed".into()).is_some());
}

#[test]
fn ending_the_game_tears_down_every_card_subscription() {
    let cards = catalog();
    let config = GameConfig::default();
    let env = GameEnv::new(&cards, &config);
    let mut session = session(&config);
    let states = session.track_card_states(env);
    assert_eq!(states.len(), 2);
    // Generational tracker, card-state tracker and one per hand card.
    assert_eq!(session.dispatcher().len(), 4);

    session.execute(env, &Action::EndGame).unwrap();

    assert!(states.is_empty());
    assert_eq!(session.dispatcher().len(), 1);
    let err = session
        .execute(
            env,
            &StandardProjectAction::new("p1", StandardProject::Aquifer).into(),
        )
        .unwrap_err();
    assert!(err.is_rejection());
}

#[test]
fn played_card_action_state_refreshes_and_freezes_at_game_end() {
    let cards = catalog();
    let config = GameConfig::default();
    let env = GameEnv::new(&cards, &config);
    let mut session = session_with_hand(&config, &["vault"]);
    let states = session.track_card_states(env);
    assert!(states.action(&p("p1"), &"vault".into(), 0).is_none());

    session
        .execute(
            env,
            &PlayCardAction::new("p1", "vault", CardPayment::credits(3)).into(),
        )
        .unwrap();

    let vault = states.action(&p("p1"), &"vault".into(), 0).unwrap();
    assert!(vault.snapshot().available());
    assert_eq!(states.actions_for_player(&p("p1")).len(), 1);
    let first = vault.last_calculated();

    // 37 MC down to 19 leaves the 30 MC input unaffordable.
    session
        .execute(
            env,
            &StandardProjectAction::new("p1", StandardProject::Aquifer).into(),
        )
        .unwrap();

    let refreshed = vault.snapshot();
    assert!(vault.last_calculated() > first);
    assert!(
        refreshed
            .state
            .errors
            .iter()
            .any(|e| e.code == "INPUT_INSUFFICIENT")
    );

    session
        .execute(env, &PlaceTileAction::new("p1", TileType::Ocean).into())
        .unwrap();
    session.execute(env, &Action::EndGame).unwrap();

    assert!(states.action(&p("p1"), &"vault".into(), 0).is_none());
    assert!(states.is_empty());
    assert_eq!(session.dispatcher().len(), 1);

    let frozen = vault.snapshot();
    assert!(
        session
            .execute(env, &SkipAction::new("p2").into())
            .is_err()
    );
    assert_eq!(vault.snapshot(), frozen);
    assert_eq!(vault.last_calculated(), frozen.state.last_calculated);
}
