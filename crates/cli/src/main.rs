//! Terraforming Mars runtime binary.
//!
//! Composition root: loads configuration from the environment (and `.env`),
//! builds the runtime with a card catalog and plays a short scripted
//! generation, logging every committed change.
//!
//! # Examples
//!
//! ```bash
//! # Built-in demo catalog
//! cargo run -p mars-cli
//!
//! # Custom catalog, verbose engine logs
//! MARS_CARD_CATALOG=cards.json RUST_LOG=core=debug,runtime=debug cargo run -p mars-cli
//! ```

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use mars_core::{Action, CardPayment, GameState, PlayerId, PlayerState};
use mars_runtime::{CardCatalog, Event, GameHandle, Runtime, RuntimeConfig, Topic};

const DEMO_CATALOG: &str = include_str!("../cards/demo.json");

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env();
    let mut builder = Runtime::builder().config(config.clone());
    if config.card_catalog.is_none() {
        info!("MARS_CARD_CATALOG not set, using the built-in demo catalog");
        builder = builder.catalog(CardCatalog::from_json_str(DEMO_CATALOG)?);
    }
    let mut runtime = builder.build().await.context("building runtime")?;
    info!(cards = runtime.oracles().cards().len(), "runtime ready");

    let mut turns = runtime.subscribe(Topic::Turn);
    let observer = tokio::spawn(async move {
        loop {
            match turns.recv().await {
                Ok(Event::Turn(event)) => info!(?event, "turn"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "turn observer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let game = runtime.create_game("demo", demo_players())?;
    play_demo_generation(&game).await?;

    let state = game.query_state().await?;
    print_summary(&state);

    drop(game);
    runtime.shutdown().await?;
    observer.abort();
    Ok(())
}

fn demo_players() -> Vec<PlayerState> {
    let mut ann = PlayerState::new("ann", "Ann", 20);
    ann.resources.credits = 30;
    ann.hand = vec!["mine".into(), "lichen".into(), "geothermal-power".into()];

    let mut bo = PlayerState::new("bo", "Bo", 20);
    bo.resources.credits = 12;
    bo.hand = vec!["asteroid".into(), "mine".into()];

    vec![ann, bo]
}

/// One generation: Ann builds twice, Bo builds and passes, Ann passes.
async fn play_demo_generation(game: &GameHandle) -> Result<()> {
    game.execute_action(Action::StartGame).await?;

    for card in ["mine", "lichen", "geothermal-power"] {
        let state = game.card_state("ann", card).await?;
        info!(
            card,
            available = state.available(),
            cost = ?state.state.cost,
            errors = ?state.state.errors.iter().map(|e| e.code.as_str()).collect::<Vec<_>>(),
            "ann's hand"
        );
    }

    game.play_card("ann", "mine", CardPayment::credits(4)).await?;
    game.play_card("ann", "geothermal-power", CardPayment::credits(11))
        .await?;

    if let Err(err) = game
        .play_card("bo", "asteroid", CardPayment::credits(14))
        .await
    {
        info!(code = ?err.error_code(), %err, "bo cannot afford the asteroid");
    }
    game.play_card("bo", "mine", CardPayment::credits(4)).await?;
    let outcome = game.skip_action("bo").await?;
    info!(?outcome, "bo skipped");

    let outcome = game.skip_action("ann").await?;
    info!(?outcome, "ann skipped");
    let outcome = game.skip_action("bo").await?;
    info!(?outcome, "bo skipped");

    game.advance_generation().await?;
    Ok(())
}

fn print_summary(state: &GameState) {
    println!(
        "generation {} | phase {:?} | revision {}",
        state.generation, state.current_phase, state.revision
    );
    for player_id in &state.turn_order {
        let Some(player) = state.player(player_id) else {
            continue;
        };
        println!(
            "  {:<4} TR {:>2} | MC {:>3} (+{}) | steel {} (+{}) | energy {} (+{}) | heat {} | hand {}",
            player.name,
            player.terraform_rating,
            player.resources.credits,
            player.production.credits,
            player.resources.steel,
            player.production.steel,
            player.resources.energy,
            player.production.energy,
            player.resources.heat,
            player.hand.len(),
        );
    }
    if let Some(current) = state.current_player_id().map(PlayerId::as_str) {
        println!("  next: {current}");
    }
}
