use tracing::debug;

use crate::card::{ResourceCondition, ResourceType, TargetType, TileType};
use crate::env::GameEnv;
use crate::state::{
    CardId, GameState, GlobalParameter, PaymentSubstitute, PendingTileSelection, PlayerId,
    PlayerState,
};

use super::{Occurrence, ResolveContext, ResolveError, raise_parameter, scaled_amount};

/// One output after per-condition scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CalculatedOutput {
    pub resource_type: ResourceType,
    pub amount: i32,
    pub is_scaled: bool,
}

/// What applying a list of outputs did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputReport {
    pub calculated: Vec<CalculatedOutput>,
    /// Occurrences other effects may trigger on.
    pub occurrences: Vec<Occurrence>,
}

/// Rejects explicitly chosen targets that can never be valid.
///
/// Absent targets are not an error: those outputs are skipped on application.
pub fn validate_targets(
    outputs: &[ResourceCondition],
    state: &GameState,
    env: &GameEnv<'_>,
    ctx: &ResolveContext<'_>,
) -> Result<(), ResolveError> {
    for output in outputs {
        if output.target.targets_other_player()
            && let Some(target) = &ctx.targets.target_player
        {
            if !state.players.contains_key(target) {
                return Err(ResolveError::TargetPlayerNotFound(target.clone()));
            }
            if output.target == TargetType::Opponent && target == ctx.player_id {
                return Err(ResolveError::SelfTargeted(target.clone()));
            }
        }

        let chosen_card = match output.target {
            TargetType::AnyCard => ctx.targets.target_card.as_ref(),
            TargetType::StealFromAnyCard => ctx.targets.steal_source_card.as_ref(),
            _ => None,
        };
        if let Some(card) = chosen_card {
            let accepts = env
                .cards()
                .get_by_id(card)
                .is_some_and(|c| c.stores(output.resource_type));
            if !accepts || holder_of(state, card).is_none() {
                return Err(ResolveError::InvalidTargetCard {
                    card: card.clone(),
                    resource: output.resource_type,
                });
            }
        }
    }
    Ok(())
}

/// Applies outputs in order, scaling each by its per-condition first.
pub fn apply_outputs(
    state: &mut GameState,
    env: &GameEnv<'_>,
    ctx: &ResolveContext<'_>,
    outputs: &[ResourceCondition],
) -> Result<OutputReport, ResolveError> {
    let mut report = OutputReport::default();
    for output in outputs {
        let amount = {
            let player = state
                .player(ctx.player_id)
                .ok_or_else(|| ResolveError::PlayerNotFound(ctx.player_id.clone()))?;
            scaled_amount(output, state, player, ctx.source_card, env.cards())
        };
        report.calculated.push(CalculatedOutput {
            resource_type: output.resource_type,
            amount,
            is_scaled: output.per.is_some(),
        });
        if amount == 0 {
            continue;
        }
        apply_output(state, env, ctx, output, amount, &mut report)?;
    }
    Ok(report)
}

fn apply_output(
    state: &mut GameState,
    env: &GameEnv<'_>,
    ctx: &ResolveContext<'_>,
    output: &ResourceCondition,
    amount: i32,
    report: &mut OutputReport,
) -> Result<(), ResolveError> {
    use ResourceType as R;

    let resource = output.resource_type;
    match resource {
        R::Credits | R::Steel | R::Titanium | R::Plants | R::Energy | R::Heat => {
            apply_basic(state, ctx, output.target, resource, amount)
        }
        R::CreditsProduction | R::SteelProduction | R::TitaniumProduction | R::PlantsProduction
        | R::EnergyProduction | R::HeatProduction => {
            apply_production(state, env, ctx, output.target, resource, amount)
        }
        R::Microbe | R::Animal | R::Floater | R::Science | R::Asteroid | R::Disease => {
            apply_storage(state, ctx, output.target, resource, amount)
        }
        R::Tr => {
            actor_mut(state, ctx.player_id)?.terraform_rating += amount;
            Ok(())
        }
        R::Temperature | R::Oxygen | R::Venus => {
            let parameter = match resource {
                R::Temperature => GlobalParameter::Temperature,
                R::Oxygen => GlobalParameter::Oxygen,
                _ => GlobalParameter::Venus,
            };
            if raise_parameter(state, env.config(), ctx.player_id, parameter, amount)? > 0 {
                report.occurrences.push(Occurrence::ParameterRaised {
                    player: ctx.player_id.clone(),
                    parameter,
                });
            }
            Ok(())
        }
        R::Ocean => queue_tiles(state, ctx, TileType::Ocean, amount),
        R::CityPlacement | R::OceanPlacement | R::GreeneryPlacement => {
            let tile = resource.tile_placement().unwrap_or(TileType::City);
            queue_tiles(state, ctx, tile, amount)
        }
        R::CardDraw => {
            let requested = usize::try_from(amount).unwrap_or(0);
            let drawn = state.draw_cards(ctx.player_id, requested);
            if drawn < requested {
                debug!(
                    target: "core::resolver",
                    player_id = %ctx.player_id,
                    requested,
                    drawn,
                    "deck ran out while drawing"
                );
            }
            Ok(())
        }
        R::CardTake | R::CardPeek | R::CardBuy => {
            debug!(
                target: "core::resolver",
                player_id = %ctx.player_id,
                resource = %resource,
                "card selection outputs are resolved by the session layer"
            );
            Ok(())
        }
        // Read by the discount calculator from registered effects.
        R::Discount => Ok(()),
        R::ValueModifier => {
            let player = actor_mut(state, ctx.player_id)?;
            for affected in &output.affected_resources {
                *player.value_modifiers.entry(*affected).or_insert(0) += amount;
            }
            Ok(())
        }
        R::PaymentSubstitute => {
            let player = actor_mut(state, ctx.player_id)?;
            for affected in &output.affected_resources {
                if !affected.is_substitute_source() {
                    debug!(
                        target: "core::resolver",
                        resource = %affected,
                        "ignoring invalid payment substitute"
                    );
                    continue;
                }
                match player
                    .payment_substitutes
                    .iter_mut()
                    .find(|s| s.resource_type == *affected)
                {
                    Some(existing) => existing.conversion_rate = amount,
                    None => player.payment_substitutes.push(PaymentSubstitute {
                        resource_type: *affected,
                        conversion_rate: amount,
                    }),
                }
            }
            Ok(())
        }
    }
}

fn actor_mut<'s>(
    state: &'s mut GameState,
    player_id: &PlayerId,
) -> Result<&'s mut PlayerState, ResolveError> {
    state
        .player_mut(player_id)
        .ok_or_else(|| ResolveError::PlayerNotFound(player_id.clone()))
}

/// Chosen target player, or `None` (logged) when the actor supplied none.
fn chosen_player(ctx: &ResolveContext<'_>, resource: ResourceType) -> Option<PlayerId> {
    let target = ctx.targets.target_player.clone();
    if target.is_none() {
        debug!(
            target: "core::resolver",
            player_id = %ctx.player_id,
            resource = %resource,
            "no target player supplied, skipping output"
        );
    }
    target
}

fn apply_basic(
    state: &mut GameState,
    ctx: &ResolveContext<'_>,
    target: TargetType,
    resource: ResourceType,
    amount: i32,
) -> Result<(), ResolveError> {
    match target {
        TargetType::AnyPlayer | TargetType::Opponent | TargetType::StealAnyPlayer => {
            let Some(victim_id) = chosen_player(ctx, resource) else {
                return Ok(());
            };
            let victim = state
                .player_mut(&victim_id)
                .ok_or_else(|| ResolveError::TargetPlayerNotFound(victim_id.clone()))?;

            let requested = amount.abs();
            let held = victim.resources.get(resource).unwrap_or(0).max(0);
            let removed = requested.min(held);
            victim.resources.add(resource, -removed);
            if removed < requested {
                debug!(
                    target: "core::resolver",
                    player_id = %victim_id,
                    resource = %resource,
                    requested,
                    removed,
                    "removal clamped at zero"
                );
            }

            if target == TargetType::StealAnyPlayer {
                actor_mut(state, ctx.player_id)?
                    .resources
                    .add(resource, removed);
            }
            Ok(())
        }
        TargetType::SelfPlayer
        | TargetType::SelfCard
        | TargetType::AnyCard
        | TargetType::StealFromAnyCard
        | TargetType::None => {
            let player = actor_mut(state, ctx.player_id)?;
            let current = player.resources.get(resource).unwrap_or(0);
            let delta = amount.max(-current.max(0));
            player.resources.add(resource, delta);
            Ok(())
        }
    }
}

fn apply_production(
    state: &mut GameState,
    env: &GameEnv<'_>,
    ctx: &ResolveContext<'_>,
    target: TargetType,
    resource: ResourceType,
    amount: i32,
) -> Result<(), ResolveError> {
    let owner = if target.targets_other_player() {
        match chosen_player(ctx, resource) {
            Some(id) => id,
            None => return Ok(()),
        }
    } else {
        ctx.player_id.clone()
    };

    let floor = resource
        .production_base()
        .map_or(0, |base| env.config().min_production(base));
    let player = state.player_mut(&owner).ok_or_else(|| {
        if owner == *ctx.player_id {
            ResolveError::PlayerNotFound(owner.clone())
        } else {
            ResolveError::TargetPlayerNotFound(owner.clone())
        }
    })?;
    let current = player.production.get(resource).unwrap_or(0);
    let next = (current + amount).max(floor.min(current));
    if next != current + amount {
        debug!(
            target: "core::resolver",
            player_id = %owner,
            resource = %resource,
            requested = amount,
            applied = next - current,
            "production change clamped at minimum"
        );
    }
    player.production.add(resource, next - current);
    Ok(())
}

/// Player whose tableau holds `card`.
fn holder_of(state: &GameState, card: &CardId) -> Option<PlayerId> {
    state
        .players
        .values()
        .find(|p| p.played_cards.contains(card) || p.corporation.as_ref() == Some(card))
        .map(|p| p.id.clone())
}

fn add_to_card(state: &mut GameState, holder: &PlayerId, card: &CardId, amount: i32) -> i32 {
    let Some(player) = state.player_mut(holder) else {
        return 0;
    };
    let slot = player.card_storage.entry(card.clone()).or_insert(0);
    let applied = amount.max(-*slot);
    *slot += applied;
    applied
}

fn apply_storage(
    state: &mut GameState,
    ctx: &ResolveContext<'_>,
    target: TargetType,
    resource: ResourceType,
    amount: i32,
) -> Result<(), ResolveError> {
    match target {
        TargetType::AnyCard => {
            let Some(card) = ctx.targets.target_card.as_ref() else {
                debug!(
                    target: "core::resolver",
                    player_id = %ctx.player_id,
                    resource = %resource,
                    "no target card supplied, skipping output"
                );
                return Ok(());
            };
            let holder = holder_of(state, card).ok_or_else(|| ResolveError::InvalidTargetCard {
                card: card.clone(),
                resource,
            })?;
            add_to_card(state, &holder, card, amount);
            Ok(())
        }
        TargetType::StealFromAnyCard => {
            let (Some(from), Some(into)) =
                (ctx.targets.steal_source_card.as_ref(), ctx.source_card)
            else {
                debug!(
                    target: "core::resolver",
                    player_id = %ctx.player_id,
                    resource = %resource,
                    "no card to steal from, skipping output"
                );
                return Ok(());
            };
            let victim = holder_of(state, from).ok_or_else(|| ResolveError::InvalidTargetCard {
                card: from.clone(),
                resource,
            })?;
            let taken = -add_to_card(state, &victim, from, -amount.abs());
            add_to_card(state, ctx.player_id, into, taken);
            Ok(())
        }
        TargetType::SelfPlayer
        | TargetType::SelfCard
        | TargetType::AnyPlayer
        | TargetType::Opponent
        | TargetType::StealAnyPlayer
        | TargetType::None => {
            let Some(card) = ctx.source_card else {
                debug!(
                    target: "core::resolver",
                    player_id = %ctx.player_id,
                    resource = %resource,
                    "card resource output without a source card, skipping"
                );
                return Ok(());
            };
            add_to_card(state, ctx.player_id, card, amount);
            Ok(())
        }
    }
}

fn queue_tiles(
    state: &mut GameState,
    ctx: &ResolveContext<'_>,
    tile_type: TileType,
    amount: i32,
) -> Result<(), ResolveError> {
    let player = actor_mut(state, ctx.player_id)?;
    for _ in 0..amount.max(0) {
        player.pending_tile_selections.push_back(PendingTileSelection {
            tile_type,
            source: ctx.source.to_string(),
        });
    }
    Ok(())
}
