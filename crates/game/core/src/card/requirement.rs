use super::{CardTag, ResourceType};

/// Quantity a requirement is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RequirementType {
    Temperature,
    Oxygen,
    Oceans,
    Venus,
    Cities,
    Greeneries,
    Tags,
    Production,
    Tr,
    Resource,
}

/// Whose tiles a board-count requirement considers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RequirementLocation {
    /// Only tiles owned by the evaluating player.
    #[default]
    Owned,
    /// Every tile on the board regardless of owner.
    Anywhere,
}

/// A global or player-level bound a card must satisfy before it can be played.
///
/// Both bounds are inclusive; an absent bound is unbounded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Requirement {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub requirement_type: RequirementType,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub min: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<RequirementLocation>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub tag: Option<CardTag>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub resource: Option<ResourceType>,
}

impl Requirement {
    pub fn new(requirement_type: RequirementType) -> Self {
        Self {
            requirement_type,
            min: None,
            max: None,
            location: None,
            tag: None,
            resource: None,
        }
    }

    #[must_use]
    pub fn min(mut self, min: i32) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: i32) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: CardTag) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub fn resource(mut self, resource: ResourceType) -> Self {
        self.resource = Some(resource);
        self
    }

    #[must_use]
    pub fn anywhere(mut self) -> Self {
        self.location = Some(RequirementLocation::Anywhere);
        self
    }

    /// Returns true when `value` lies inside both bounds.
    pub fn contains(&self, value: i32) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}
