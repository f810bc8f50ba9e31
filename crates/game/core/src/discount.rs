//! Cost discounts and payment conversion rates.
//!
//! Discounts come from the player's registered [`CardEffect`]s whose behavior
//! carries a `discount` output. Matching uses OR logic over the output's
//! affected tags, card types and standard projects; matching discounts add up.
//!
//! [`CardEffect`]: crate::state::CardEffect

use std::collections::BTreeMap;

use crate::card::{Card, ResourceCondition, ResourceType, StandardProject};
use crate::config::GameConfig;
use crate::env::CardOracle;
use crate::state::{CardId, PaymentSubstitute, PlayerState};

/// What a discount is being computed for.
#[derive(Clone, Copy, Debug)]
pub enum DiscountTarget<'a> {
    Card(&'a Card),
    Project(StandardProject),
}

/// Aggregated discount on one hand card or standard project.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct RequirementModifier {
    pub amount: i32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub card_target: Option<CardId>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub standard_project_target: Option<StandardProject>,
}

/// Sum of every matching discount the player holds for `target`.
pub fn calculate_discount(player: &PlayerState, target: DiscountTarget<'_>) -> i32 {
    player
        .effects
        .iter()
        .flat_map(|effect| effect.behavior.outputs.iter())
        .filter(|output| output.resource_type == ResourceType::Discount)
        .filter(|output| discount_applies(output, target))
        .map(|output| output.amount)
        .sum()
}

/// Card cost after discounts, floored at zero.
pub fn effective_card_cost(player: &PlayerState, card: &Card) -> (i32, i32) {
    let discount = calculate_discount(player, DiscountTarget::Card(card));
    ((card.cost - discount).max(0), discount)
}

/// OR-matching of one discount output against a target.
///
/// An output naming no tags, card types or projects discounts every card.
pub fn discount_applies(output: &ResourceCondition, target: DiscountTarget<'_>) -> bool {
    match target {
        DiscountTarget::Card(card) => {
            let unconstrained = output.affected_tags.is_empty()
                && output.affected_card_types.is_empty()
                && output.affected_standard_projects.is_empty();
            unconstrained
                || card.tags.iter().any(|tag| output.affected_tags.contains(tag))
                || output.affected_card_types.contains(&card.card_type)
        }
        DiscountTarget::Project(project) => output.affected_standard_projects.contains(&project),
    }
}

/// Discounts currently applying to each hand card and each standard project.
///
/// Entries with a zero total are omitted.
pub fn requirement_modifiers(
    player: &PlayerState,
    cards: &dyn CardOracle,
) -> Vec<RequirementModifier> {
    let mut by_card: BTreeMap<CardId, i32> = BTreeMap::new();
    for card_id in &player.hand {
        let Some(card) = cards.get_by_id(card_id) else {
            continue;
        };
        let amount = calculate_discount(player, DiscountTarget::Card(card));
        if amount != 0 {
            *by_card.entry(card_id.clone()).or_insert(0) += amount;
        }
    }

    let mut modifiers: Vec<RequirementModifier> = by_card
        .into_iter()
        .map(|(card, amount)| RequirementModifier {
            amount,
            card_target: Some(card),
            standard_project_target: None,
        })
        .collect();

    for project in <StandardProject as strum::IntoEnumIterator>::iter() {
        let amount = calculate_discount(player, DiscountTarget::Project(project));
        if amount != 0 {
            modifiers.push(RequirementModifier {
                amount,
                card_target: None,
                standard_project_target: Some(project),
            });
        }
    }
    modifiers
}

/// Conversion rates the player may pay with.
///
/// Steel and titanium are always listed, with any accumulated value modifier
/// added to the base rate. Granted substitutes follow.
pub fn payment_substitutes(player: &PlayerState, config: &GameConfig) -> Vec<PaymentSubstitute> {
    let mut substitutes = vec![
        PaymentSubstitute {
            resource_type: ResourceType::Steel,
            conversion_rate: config.steel_value + player.value_modifier(ResourceType::Steel),
        },
        PaymentSubstitute {
            resource_type: ResourceType::Titanium,
            conversion_rate: config.titanium_value + player.value_modifier(ResourceType::Titanium),
        },
    ];
    substitutes.extend(
        player
            .payment_substitutes
            .iter()
            .filter(|s| !matches!(s.resource_type, ResourceType::Steel | ResourceType::Titanium))
            .copied(),
    );
    substitutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardBehavior, CardTag, CardType, Trigger};
    use crate::state::CardEffect;

    fn with_discount(player: &mut PlayerState, output: ResourceCondition) {
        player.effects.push(CardEffect {
            card_id: format!("effect{}", player.effects.len()).into(),
            card_name: "Discounter".into(),
            behavior_index: 0,
            behavior: CardBehavior::new()
                .with_trigger(Trigger::auto())
                .with_output(output),
        });
    }

    #[test]
    fn or_matching_across_tags_types_and_projects() {
        let mut player = PlayerState::new("p1", "Ann", 20);
        with_discount(
            &mut player,
            ResourceCondition::new(ResourceType::Discount, 2).affecting_tags([CardTag::Space]),
        );
        with_discount(
            &mut player,
            ResourceCondition::new(ResourceType::Discount, 1)
                .affecting_card_types([CardType::Event]),
        );
        with_discount(
            &mut player,
            ResourceCondition::new(ResourceType::Discount, 3)
                .affecting_projects([StandardProject::City]),
        );

        let space_event = Card::new("a", "A", CardType::Event, 10).with_tags([CardTag::Space]);
        assert_eq!(calculate_discount(&player, DiscountTarget::Card(&space_event)), 3);

        let building = Card::new("b", "B", CardType::Automated, 10).with_tags([CardTag::Building]);
        assert_eq!(calculate_discount(&player, DiscountTarget::Card(&building)), 0);

        assert_eq!(
            calculate_discount(&player, DiscountTarget::Project(StandardProject::City)),
            3
        );
        assert_eq!(
            calculate_discount(&player, DiscountTarget::Project(StandardProject::Aquifer)),
            0
        );
    }

    #[test]
    fn effective_cost_floors_at_zero() {
        let mut player = PlayerState::new("p1", "Ann", 20);
        with_discount(&mut player, ResourceCondition::new(ResourceType::Discount, 5));
        let cheap = Card::new("c", "Cheap", CardType::Automated, 3);
        assert_eq!(effective_card_cost(&player, &cheap), (0, 5));
    }

    #[test]
    fn steel_and_titanium_always_listed() {
        let config = GameConfig::default();
        let mut player = PlayerState::new("p1", "Ann", 20);
        let rates = payment_substitutes(&player, &config);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].conversion_rate, 2);
        assert_eq!(rates[1].conversion_rate, 3);

        player.value_modifiers.insert(ResourceType::Titanium, 1);
        player.payment_substitutes.push(PaymentSubstitute {
            resource_type: ResourceType::Heat,
            conversion_rate: 1,
        });
        let rates = payment_substitutes(&player, &config);
        assert_eq!(rates[1].conversion_rate, 4);
        assert_eq!(rates[2].resource_type, ResourceType::Heat);
    }
}
