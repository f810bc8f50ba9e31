use std::collections::BTreeMap;
use std::str::FromStr;

use crate::card::{ResourceType, StandardProject};
use crate::discount::{DiscountTarget, calculate_discount};
use crate::env::GameEnv;
use crate::error::{ErrorCategory, ValidationError};
use crate::resolver::{Shortfall, ShortfallKind};
use crate::state::{GameState, GlobalParameter, PlayerState};

use super::{EntityState, PlayerCardActionState, cost_error, phase_error, turn_errors};

/// Resource and amount a project charges, after discounts.
///
/// Returns `(resource, cost, discount)`.
pub(crate) fn project_cost(
    project: StandardProject,
    player: &PlayerState,
    env: &GameEnv<'_>,
) -> (ResourceType, i32, i32) {
    let config = env.config();
    match project {
        StandardProject::ConvertPlantsToGreenery => {
            (ResourceType::Plants, config.plants_per_greenery, 0)
        }
        StandardProject::ConvertHeatToTemperature => {
            (ResourceType::Heat, config.heat_per_temperature, 0)
        }
        _ => {
            let discount = calculate_discount(player, DiscountTarget::Project(project));
            (
                ResourceType::Credits,
                (project.credit_cost() - discount).max(0),
                discount,
            )
        }
    }
}

/// Diagnostic state of a standard project for `player`.
///
/// An unknown project id yields a single `configuration` error.
pub fn calculate_player_standard_project_state(
    project_id: &str,
    player: &PlayerState,
    game: &GameState,
    env: &GameEnv<'_>,
) -> PlayerCardActionState {
    let Ok(project) = StandardProject::from_str(project_id) else {
        return PlayerCardActionState {
            card_id: None,
            behavior_index: None,
            project: None,
            state: EntityState {
                errors: vec![ValidationError::new(
                    ErrorCategory::Configuration,
                    "UNKNOWN_STANDARD_PROJECT",
                    format!("Unknown standard project: {project_id}"),
                )],
                last_calculated: game.revision,
                ..EntityState::default()
            },
        };
    };

    let config = env.config();
    let mut errors: Vec<ValidationError> = phase_error(game).into_iter().collect();
    errors.extend(turn_errors(game, player));
    let mut metadata = BTreeMap::new();

    match project {
        StandardProject::SellPatents => {
            let hand = player.hand.len() as i32;
            metadata.insert("handSize".to_string(), hand);
            if hand < 1 {
                errors.push(
                    ValidationError::new(
                        ErrorCategory::Availability,
                        "NO_CARDS_TO_SELL",
                        "No cards in hand to sell",
                    )
                    .with_values(1, hand),
                );
            }
        }
        StandardProject::Aquifer => {
            let remaining = game.global_parameters.oceans_remaining(config);
            metadata.insert("oceansRemaining".to_string(), remaining);
            if remaining <= 0 {
                errors.push(
                    ValidationError::new(
                        ErrorCategory::Availability,
                        "NO_OCEANS_REMAINING",
                        "No ocean tiles remaining",
                    )
                    .with_values(1, remaining),
                );
            }
        }
        StandardProject::Asteroid | StandardProject::ConvertHeatToTemperature => {
            if game
                .global_parameters
                .is_maxed(GlobalParameter::Temperature, config)
            {
                errors.push(ValidationError::new(
                    ErrorCategory::Availability,
                    "TEMPERATURE_MAXED",
                    "Temperature is already at maximum",
                ));
            }
        }
        StandardProject::PowerPlant
        | StandardProject::Greenery
        | StandardProject::City
        | StandardProject::ConvertPlantsToGreenery => {}
    }

    let (resource, amount, discount) = project_cost(project, player, env);
    if discount != 0 {
        metadata.insert("discount".to_string(), discount);
    }
    let available = player.resources.get(resource).unwrap_or(0);
    if available < amount {
        errors.push(if resource == ResourceType::Credits {
            cost_error(amount, available)
        } else {
            Shortfall {
                kind: ShortfallKind::Resource,
                resource,
                required: amount,
                available,
            }
            .to_validation_error()
        });
    }

    let mut cost = BTreeMap::new();
    if amount > 0 {
        cost.insert(resource, amount);
    }

    PlayerCardActionState {
        card_id: None,
        behavior_index: None,
        project: Some(project),
        state: EntityState {
            errors,
            cost,
            metadata,
            last_calculated: game.revision,
        },
    }
}
