use crate::card::ResourceType;

/// Amounts of the six basic resources.
///
/// Used both for a player's pool and for production tracks, which are indexed
/// by the basic resource they produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ResourceSet {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl ResourceSet {
    pub const fn new() -> Self {
        Self {
            credits: 0,
            steel: 0,
            titanium: 0,
            plants: 0,
            energy: 0,
            heat: 0,
        }
    }

    /// Reads the amount for a basic resource or production track.
    ///
    /// Returns `None` for resources that are not held in a pool.
    pub fn get(&self, resource: ResourceType) -> Option<i32> {
        let basic = resource.production_base().unwrap_or(resource);
        match basic {
            ResourceType::Credits => Some(self.credits),
            ResourceType::Steel => Some(self.steel),
            ResourceType::Titanium => Some(self.titanium),
            ResourceType::Plants => Some(self.plants),
            ResourceType::Energy => Some(self.energy),
            ResourceType::Heat => Some(self.heat),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, resource: ResourceType) -> Option<&mut i32> {
        let basic = resource.production_base().unwrap_or(resource);
        match basic {
            ResourceType::Credits => Some(&mut self.credits),
            ResourceType::Steel => Some(&mut self.steel),
            ResourceType::Titanium => Some(&mut self.titanium),
            ResourceType::Plants => Some(&mut self.plants),
            ResourceType::Energy => Some(&mut self.energy),
            ResourceType::Heat => Some(&mut self.heat),
            _ => None,
        }
    }

    /// Adds `delta` (which may be negative). Returns false for non-pool resources.
    pub fn add(&mut self, resource: ResourceType, delta: i32) -> bool {
        match self.get_mut(resource) {
            Some(slot) => {
                *slot += delta;
                true
            }
            None => false,
        }
    }

    /// Component-wise sum.
    pub fn merge(&mut self, other: &ResourceSet) {
        for resource in ResourceType::BASIC {
            self.add(resource, other.get(resource).unwrap_or(0));
        }
    }

    #[must_use]
    pub fn with(mut self, resource: ResourceType, amount: i32) -> Self {
        if let Some(slot) = self.get_mut(resource) {
            *slot = amount;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_tracks_address_basic_slots() {
        let mut set = ResourceSet::new().with(ResourceType::Energy, 2);
        assert_eq!(set.get(ResourceType::EnergyProduction), Some(2));
        assert!(set.add(ResourceType::HeatProduction, 3));
        assert_eq!(set.heat, 3);
        assert!(!set.add(ResourceType::Microbe, 1));
        assert_eq!(set.get(ResourceType::Tr), None);
    }

    #[test]
    fn merge_sums_components() {
        let mut a = ResourceSet::new().with(ResourceType::Credits, 5);
        a.merge(&ResourceSet::new().with(ResourceType::Credits, 3).with(ResourceType::Steel, 1));
        assert_eq!(a.credits, 8);
        assert_eq!(a.steel, 1);
    }
}
