//! Declarative card behaviors.
//!
//! A behavior is plain data: triggers decide *when* it fires, inputs are what
//! the actor pays, outputs are what gets produced, and choices are mutually
//! exclusive input/output bundles the actor picks one of. Interpretation lives
//! in [`crate::resolver`]; nothing here mutates state.

use std::collections::BTreeMap;

use super::{CardTag, CardType, RequirementLocation, ResourceType, StandardProject};
use crate::state::GenerationalEvent;

/// Who a resource condition applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TargetType {
    #[default]
    SelfPlayer,
    SelfCard,
    AnyCard,
    AnyPlayer,
    Opponent,
    /// Moves resources from the chosen player to the actor.
    StealAnyPlayer,
    /// Moves card-bound resources from a chosen card to the acting card.
    StealFromAnyCard,
    None,
}

impl TargetType {
    /// Targets that act on another player's pool and therefore need a chosen player.
    pub const fn targets_other_player(self) -> bool {
        matches!(self, Self::AnyPlayer | Self::Opponent | Self::StealAnyPlayer)
    }
}

/// Inclusive optional bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MinMax {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub min: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max: Option<i32>,
}

impl MinMax {
    pub const fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Scales a condition's amount by a counted quantity:
/// `amount × floor(counted / per.amount)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PerCondition {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub resource_type: ResourceType,
    pub amount: i32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<RequirementLocation>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target: Option<TargetType>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub tag: Option<CardTag>,
}

impl PerCondition {
    pub fn new(resource_type: ResourceType, amount: i32) -> Self {
        Self {
            resource_type,
            amount,
            location: None,
            target: None,
            tag: None,
        }
    }

    /// Counts cards carrying `tag` instead of a resource.
    pub fn tag(tag: CardTag, amount: i32) -> Self {
        Self {
            tag: Some(tag),
            ..Self::new(ResourceType::Credits, amount)
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetType) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: RequirementLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// One input or output line of a behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ResourceCondition {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub resource_type: ResourceType,
    pub amount: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetType,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_resources: Vec<ResourceType>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_tags: Vec<CardTag>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_card_types: Vec<CardType>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_standard_projects: Vec<StandardProject>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_trigger: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub per: Option<PerCondition>,
}

impl ResourceCondition {
    pub fn new(resource_type: ResourceType, amount: i32) -> Self {
        Self {
            resource_type,
            amount,
            target: TargetType::SelfPlayer,
            affected_resources: Vec::new(),
            affected_tags: Vec::new(),
            affected_card_types: Vec::new(),
            affected_standard_projects: Vec::new(),
            max_trigger: None,
            per: None,
        }
    }

    #[must_use]
    pub fn target(mut self, target: TargetType) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn per(mut self, per: PerCondition) -> Self {
        self.per = Some(per);
        self
    }

    #[must_use]
    pub fn affecting_tags(mut self, tags: impl IntoIterator<Item = CardTag>) -> Self {
        self.affected_tags.extend(tags);
        self
    }

    #[must_use]
    pub fn affecting_card_types(mut self, types: impl IntoIterator<Item = CardType>) -> Self {
        self.affected_card_types.extend(types);
        self
    }

    #[must_use]
    pub fn affecting_projects(
        mut self,
        projects: impl IntoIterator<Item = StandardProject>,
    ) -> Self {
        self.affected_standard_projects.extend(projects);
        self
    }

    #[must_use]
    pub fn affecting_resources(
        mut self,
        resources: impl IntoIterator<Item = ResourceType>,
    ) -> Self {
        self.affected_resources.extend(resources);
        self
    }

    /// Outputs of these kinds are registered as persistent effects instead of applied once.
    pub const fn is_persistent_modifier(&self) -> bool {
        matches!(
            self.resource_type,
            ResourceType::Discount | ResourceType::ValueModifier | ResourceType::PaymentSubstitute
        )
    }
}

// ============================================================================
// Triggers
// ============================================================================

/// Condition class that fires a behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ResourceTriggerType {
    /// Activated by the player as a card action.
    Manual,
    /// Applied on play, or whenever its trigger condition matches.
    Auto,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "auto-corp-first-action", alias = "auto-corporation-first-action")
    )]
    AutoCorpFirstAction,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "auto-corp-start", alias = "auto-corporation-start")
    )]
    AutoCorpStart,
}

/// Game occurrences a conditional trigger can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TriggerEvent {
    OceanPlaced,
    CityPlaced,
    GreeneryPlaced,
    TilePlaced,
    TemperatureRaise,
    OxygenRaise,
    CardPlayed,
    TagPlayed,
    StandardProjectPlayed,
    AlwaysActive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ResourceTriggerCondition {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub event: TriggerEvent,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<RequirementLocation>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_tags: Vec<CardTag>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_resources: Vec<ResourceType>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub affected_card_types: Vec<CardType>,
    /// `self-player` restricts the trigger to the effect owner's own occurrences;
    /// `any-player` (or absent) accepts anyone's.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target: Option<TargetType>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub required_original_cost: Option<MinMax>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub required_resource_change: BTreeMap<ResourceType, MinMax>,
}

impl ResourceTriggerCondition {
    pub fn new(event: TriggerEvent) -> Self {
        Self {
            event,
            location: None,
            affected_tags: Vec::new(),
            affected_resources: Vec::new(),
            affected_card_types: Vec::new(),
            target: None,
            required_original_cost: None,
            required_resource_change: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Trigger {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub trigger_type: ResourceTriggerType,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub condition: Option<ResourceTriggerCondition>,
}

impl Trigger {
    pub const fn manual() -> Self {
        Self {
            trigger_type: ResourceTriggerType::Manual,
            condition: None,
        }
    }

    pub const fn auto() -> Self {
        Self {
            trigger_type: ResourceTriggerType::Auto,
            condition: None,
        }
    }

    pub fn on(condition: ResourceTriggerCondition) -> Self {
        Self {
            trigger_type: ResourceTriggerType::Auto,
            condition: Some(condition),
        }
    }
}

// ============================================================================
// Behavior
// ============================================================================

/// Mutually exclusive bundle the actor picks when a behavior offers choices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Choice {
    #[cfg_attr(feature = "serde", serde(default))]
    pub inputs: Vec<ResourceCondition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub outputs: Vec<ResourceCondition>,
}

/// Bounds on a per-generation occurrence counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationalEventRequirement {
    pub event: GenerationalEvent,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub bounds: MinMax,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CardBehavior {
    #[cfg_attr(feature = "serde", serde(default))]
    pub triggers: Vec<Trigger>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inputs: Vec<ResourceCondition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub outputs: Vec<ResourceCondition>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub choices: Vec<Choice>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub generational_event_requirements: Vec<GenerationalEventRequirement>,
}

/// Inputs and outputs after a choice has been folded in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedBehavior {
    pub inputs: Vec<ResourceCondition>,
    pub outputs: Vec<ResourceCondition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorError {
    #[error("choice index {index} is out of range ({available} choices)")]
    InvalidChoice { index: usize, available: usize },

    #[error("behavior offers {available} choices but none was selected")]
    ChoiceRequired { available: usize },
}

impl CardBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: ResourceCondition) -> Self {
        self.inputs.push(input);
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: ResourceCondition) -> Self {
        self.outputs.push(output);
        self
    }

    #[must_use]
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    #[must_use]
    pub fn with_generational_requirement(mut self, requirement: GenerationalEventRequirement) -> Self {
        self.generational_event_requirements.push(requirement);
        self
    }

    pub fn has_trigger(&self, trigger_type: ResourceTriggerType) -> bool {
        self.triggers.iter().any(|t| t.trigger_type == trigger_type)
    }

    /// Manual behaviors become repeatable card actions.
    pub fn is_manual(&self) -> bool {
        self.has_trigger(ResourceTriggerType::Manual)
    }

    /// Auto behaviors without a condition resolve when the card is played.
    pub fn applies_on_play(&self) -> bool {
        self.triggers
            .iter()
            .any(|t| t.trigger_type == ResourceTriggerType::Auto && t.condition.is_none())
    }

    /// Resolves once on play and leaves nothing registered.
    pub fn is_immediate(&self) -> bool {
        self.applies_on_play()
            && !self.outputs.iter().any(ResourceCondition::is_persistent_modifier)
    }

    /// Behaviors that stay registered on the player after the card is played.
    pub fn is_persistent(&self) -> bool {
        let conditional = self
            .triggers
            .iter()
            .any(|t| t.trigger_type == ResourceTriggerType::Auto && t.condition.is_some());
        conditional || self.outputs.iter().any(ResourceCondition::is_persistent_modifier)
    }

    /// Returns base inputs/outputs followed by those of the selected choice.
    pub fn extract_inputs_outputs(
        &self,
        choice_index: Option<usize>,
    ) -> Result<ResolvedBehavior, BehaviorError> {
        let mut resolved = ResolvedBehavior {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        };

        match choice_index {
            Some(index) => {
                let choice = self.choices.get(index).ok_or(BehaviorError::InvalidChoice {
                    index,
                    available: self.choices.len(),
                })?;
                resolved.inputs.extend(choice.inputs.iter().cloned());
                resolved.outputs.extend(choice.outputs.iter().cloned());
            }
            None if !self.choices.is_empty() => {
                return Err(BehaviorError::ChoiceRequired {
                    available: self.choices.len(),
                });
            }
            None => {}
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plants_or_heat() -> CardBehavior {
        CardBehavior::new()
            .with_trigger(Trigger::manual())
            .with_input(ResourceCondition::new(ResourceType::Energy, 1))
            .with_choice(Choice {
                inputs: vec![],
                outputs: vec![ResourceCondition::new(ResourceType::Plants, 2)],
            })
            .with_choice(Choice {
                inputs: vec![ResourceCondition::new(ResourceType::Credits, 1)],
                outputs: vec![ResourceCondition::new(ResourceType::Heat, 4)],
            })
    }

    #[test]
    fn choice_is_appended_to_base_conditions() {
        let resolved = plants_or_heat().extract_inputs_outputs(Some(1)).unwrap();
        assert_eq!(resolved.inputs.len(), 2);
        assert_eq!(resolved.inputs[1].resource_type, ResourceType::Credits);
        assert_eq!(resolved.outputs, vec![ResourceCondition::new(ResourceType::Heat, 4)]);
    }

    #[test]
    fn out_of_range_or_missing_choice_is_rejected() {
        let behavior = plants_or_heat();
        assert_eq!(
            behavior.extract_inputs_outputs(Some(2)),
            Err(BehaviorError::InvalidChoice {
                index: 2,
                available: 2
            })
        );
        assert_eq!(
            behavior.extract_inputs_outputs(None),
            Err(BehaviorError::ChoiceRequired { available: 2 })
        );
    }

    #[test]
    fn discount_outputs_are_persistent_not_immediate() {
        let discount = CardBehavior::new()
            .with_trigger(Trigger::auto())
            .with_output(
                ResourceCondition::new(ResourceType::Discount, 2)
                    .affecting_tags([CardTag::Space]),
            );
        assert!(discount.is_persistent());
        assert!(!discount.is_immediate());

        let immediate = CardBehavior::new()
            .with_trigger(Trigger::auto())
            .with_output(ResourceCondition::new(ResourceType::Heat, 3));
        assert!(immediate.is_immediate());
        assert!(!immediate.is_persistent());
    }

    #[test]
    fn clones_do_not_alias() {
        let catalog = plants_or_heat();
        let mut copy = catalog.clone();
        copy.inputs[0].amount = 99;
        assert_eq!(catalog.inputs[0].amount, 1);
    }
}
