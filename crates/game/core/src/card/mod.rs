//! Immutable card catalog model.
//!
//! Cards are loaded once by the catalog collaborator and never mutated. Any
//! per-player copy of a behavior (effects, actions) is an owned clone.
mod behavior;
mod project;
mod requirement;
mod resource;

pub use behavior::{
    BehaviorError, CardBehavior, Choice, GenerationalEventRequirement, MinMax, PerCondition,
    ResolvedBehavior, ResourceCondition, ResourceTriggerCondition, ResourceTriggerType,
    TargetType, Trigger, TriggerEvent,
};
pub use project::StandardProject;
pub use requirement::{Requirement, RequirementLocation, RequirementType};
pub use resource::{CardTag, ResourceType, TileType};

use crate::state::{CardId, ResourceSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum CardType {
    Automated,
    Active,
    Event,
    Corporation,
    Prelude,
}

/// Card-bound resource counter declared by the card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ResourceStorage {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub resource_type: ResourceType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub starting: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum VictoryPointKind {
    Fixed,
    Per,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct VictoryPointCondition {
    pub amount: i32,
    pub condition: VictoryPointKind,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub per: Option<PerCondition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub card_type: CardType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pack: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<CardTag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Vec<Requirement>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behaviors: Vec<CardBehavior>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub resource_storage: Option<ResourceStorage>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub vp_conditions: Vec<VictoryPointCondition>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub starting_resources: Option<ResourceSet>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub starting_production: Option<ResourceSet>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, card_type: CardType, cost: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_type,
            cost,
            pack: String::from("base"),
            tags: Vec::new(),
            requirements: Vec::new(),
            behaviors: Vec::new(),
            resource_storage: None,
            vp_conditions: Vec::new(),
            starting_resources: None,
            starting_production: None,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = CardTag>) -> Self {
        self.tags.extend(tags);
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: CardBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, resource_type: ResourceType) -> Self {
        self.resource_storage = Some(ResourceStorage {
            resource_type,
            starting: 0,
        });
        self
    }

    pub fn has_tag(&self, tag: CardTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Steel may pay for building cards.
    pub fn allows_steel(&self) -> bool {
        self.has_tag(CardTag::Building)
    }

    /// Titanium may pay for space cards.
    pub fn allows_titanium(&self) -> bool {
        self.has_tag(CardTag::Space)
    }

    pub fn stores(&self, resource_type: ResourceType) -> bool {
        self.resource_storage
            .as_ref()
            .is_some_and(|storage| storage.resource_type == resource_type)
    }
}
