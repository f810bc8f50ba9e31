//! Requirement evaluation against a game snapshot.
//!
//! Pure predicate checks: nothing here mutates state. Every violated bound
//! yields one [`ValidationError`]; evaluation never short-circuits so the
//! caller sees all reasons at once.

use crate::card::{
    CardTag, CardType, GenerationalEventRequirement, Requirement, RequirementLocation,
    RequirementType, TileType,
};
use crate::env::CardOracle;
use crate::error::{ErrorCategory, ValidationError};
use crate::state::{GameState, PlayerState};

/// Evaluates every requirement and collects all violations.
pub fn evaluate_requirements(
    requirements: &[Requirement],
    game: &GameState,
    player: &PlayerState,
    cards: &dyn CardOracle,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for requirement in requirements {
        let Some(current) = current_value(requirement, game, player, cards) else {
            continue;
        };
        check_bounds(requirement, current, &mut errors);
    }
    errors
}

/// Measures the quantity a requirement refers to.
///
/// Returns `None` when the requirement is incomplete (a tag requirement without
/// a tag, a production/resource requirement without a resource); such
/// requirements are skipped.
pub fn current_value(
    requirement: &Requirement,
    game: &GameState,
    player: &PlayerState,
    cards: &dyn CardOracle,
) -> Option<i32> {
    let params = &game.global_parameters;
    let owner = match requirement.location.unwrap_or_default() {
        RequirementLocation::Owned => Some(&player.id),
        RequirementLocation::Anywhere => None,
    };

    match requirement.requirement_type {
        RequirementType::Temperature => Some(params.temperature),
        RequirementType::Oxygen => Some(params.oxygen),
        RequirementType::Oceans => Some(params.oceans),
        RequirementType::Venus => Some(params.venus),
        RequirementType::Tr => Some(player.terraform_rating),
        RequirementType::Cities => Some(game.board.count(TileType::City, owner)),
        RequirementType::Greeneries => Some(game.board.count(TileType::Greenery, owner)),
        RequirementType::Tags => requirement.tag.map(|tag| count_tags(player, tag, cards)),
        RequirementType::Production => {
            let resource = requirement.resource?;
            player.production.get(resource)
        }
        RequirementType::Resource => {
            let resource = requirement.resource?;
            player.resources.get(resource)
        }
    }
}

/// Counts the player's cards carrying `tag`: played cards plus the corporation.
///
/// Played events no longer show their tags. Cards missing from the catalog
/// are ignored.
pub fn count_tags(player: &PlayerState, tag: CardTag, cards: &dyn CardOracle) -> i32 {
    player
        .played_cards
        .iter()
        .chain(player.corporation.iter())
        .filter_map(|id| cards.get_by_id(id))
        .filter(|card| card.card_type != CardType::Event && card.has_tag(tag))
        .count() as i32
}

/// Checks per-generation counters against a behavior's declared bounds.
pub fn evaluate_generational_requirements(
    requirements: &[GenerationalEventRequirement],
    player: &PlayerState,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for requirement in requirements {
        let count = player.generational_events.count(requirement.event);
        if let Some(min) = requirement.bounds.min
            && count < min
        {
            errors.push(
                ValidationError::new(
                    ErrorCategory::GenerationalEvent,
                    "GENERATIONAL_EVENT_NOT_MET",
                    format!("Requires {} this generation", requirement.event),
                )
                .with_values(min, count),
            );
        }
        if let Some(max) = requirement.bounds.max
            && count > max
        {
            errors.push(
                ValidationError::new(
                    ErrorCategory::GenerationalEvent,
                    "GENERATIONAL_EVENT_EXCEEDED",
                    format!("Too many {} this generation", requirement.event),
                )
                .with_values(max, count),
            );
        }
    }
    errors
}

fn check_bounds(requirement: &Requirement, current: i32, errors: &mut Vec<ValidationError>) {
    let label = label(requirement.requirement_type);
    if let Some(min) = requirement.min
        && current < min
    {
        errors.push(
            ValidationError::new(
                ErrorCategory::Requirement,
                "REQUIREMENT_NOT_MET",
                format!("{label} requirement not met"),
            )
            .with_values(min, current),
        );
    }
    if let Some(max) = requirement.max
        && current > max
    {
        errors.push(
            ValidationError::new(
                ErrorCategory::Requirement,
                "REQUIREMENT_EXCEEDED",
                format!("{label} exceeds maximum"),
            )
            .with_values(max, current),
        );
    }
}

fn label(requirement_type: RequirementType) -> &'static str {
    match requirement_type {
        RequirementType::Temperature => "Temperature",
        RequirementType::Oxygen => "Oxygen",
        RequirementType::Oceans => "Oceans",
        RequirementType::Venus => "Venus",
        RequirementType::Cities => "City",
        RequirementType::Greeneries => "Greenery",
        RequirementType::Tags => "Tag",
        RequirementType::Production => "Production",
        RequirementType::Tr => "Terraform rating",
        RequirementType::Resource => "Resource",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, MinMax, ResourceType};
    use crate::env::CardSnapshot;
    use crate::state::{GenerationalEvent, PlacedTile, PlayerId};

    fn fixture() -> (GameState, PlayerState, CardSnapshot) {
        let game = GameState::default();
        let player = PlayerState::new("p1", "Ann", 20);
        let cards = CardSnapshot::new([
            Card::new("sci1", "Lab", CardType::Automated, 5).with_tags([CardTag::Science]),
            Card::new("sci2", "Probe", CardType::Event, 5).with_tags([CardTag::Science]),
            Card::new("corp", "Corp", CardType::Corporation, 0).with_tags([CardTag::Science]),
        ]);
        (game, player, cards)
    }

    #[test]
    fn collects_every_violation() {
        let (mut game, player, cards) = fixture();
        game.global_parameters.oxygen = 3;
        game.global_parameters.temperature = 4;

        let reqs = [
            Requirement::new(RequirementType::Oxygen).min(5),
            Requirement::new(RequirementType::Temperature).max(0),
        ];
        let errors = evaluate_requirements(&reqs, &game, &player, &cards);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Oxygen requirement not met");
        assert_eq!(errors[0].required_value, Some(5));
        assert_eq!(errors[0].current_value, Some(3));
        assert_eq!(errors[1].message, "Temperature exceeds maximum");
        assert_eq!(errors[1].current_value, Some(4));
    }

    #[test]
    fn unbounded_requirement_never_fails() {
        let (game, player, cards) = fixture();
        let reqs = [Requirement::new(RequirementType::Oceans)];
        assert!(evaluate_requirements(&reqs, &game, &player, &cards).is_empty());
    }

    #[test]
    fn tags_count_played_cards_and_corporation_but_not_events() {
        let (game, mut player, cards) = fixture();
        player.played_cards = vec!["sci1".into(), "sci2".into(), "missing".into()];
        player.corporation = Some("corp".into());
        assert_eq!(count_tags(&player, CardTag::Science, &cards), 2);

        let reqs = [Requirement::new(RequirementType::Tags)
            .tag(CardTag::Science)
            .min(3)];
        let errors = evaluate_requirements(&reqs, &game, &player, &cards);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].current_value, Some(2));
    }

    #[test]
    fn incomplete_requirements_are_skipped() {
        let (game, player, cards) = fixture();
        let reqs = [
            Requirement::new(RequirementType::Tags).min(1),
            Requirement::new(RequirementType::Production).min(1),
            Requirement::new(RequirementType::Resource).min(1),
        ];
        assert!(evaluate_requirements(&reqs, &game, &player, &cards).is_empty());
    }

    #[test]
    fn production_and_cities_lookup() {
        let (mut game, mut player, cards) = fixture();
        player.production.energy = 1;
        game.board.tiles.push(PlacedTile {
            tile_type: TileType::City,
            owner: Some(PlayerId::from("other")),
        });

        let production = Requirement::new(RequirementType::Production)
            .resource(ResourceType::EnergyProduction)
            .min(1);
        assert_eq!(current_value(&production, &game, &player, &cards), Some(1));

        let own_cities = Requirement::new(RequirementType::Cities).min(1);
        assert_eq!(current_value(&own_cities, &game, &player, &cards), Some(0));
        let any_cities = Requirement::new(RequirementType::Cities).min(1).anywhere();
        assert_eq!(current_value(&any_cities, &game, &player, &cards), Some(1));
    }

    #[test]
    fn generational_counts_are_bounded() {
        let (_, mut player, _) = fixture();
        let reqs = [GenerationalEventRequirement {
            event: GenerationalEvent::TrRaise,
            bounds: MinMax::new(Some(1), None),
        }];
        let errors = evaluate_generational_requirements(&reqs, &player);
        assert_eq!(errors[0].category, ErrorCategory::GenerationalEvent);

        player.generational_events.increment(GenerationalEvent::TrRaise);
        assert!(evaluate_generational_requirements(&reqs, &player).is_empty());
    }
}
