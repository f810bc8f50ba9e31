use std::collections::BTreeMap;

/// Occurrence types counted per player and reset every generation.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum GenerationalEvent {
    TrRaise,
    OceanPlacement,
    CityPlacement,
    GreeneryPlacement,
}

/// Per-player occurrence counters for the current generation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct GenerationalEventCounters {
    counts: BTreeMap<GenerationalEvent, i32>,
}

impl GenerationalEventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event: GenerationalEvent) -> i32 {
        self.counts.get(&event).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, event: GenerationalEvent) {
        self.add(event, 1);
    }

    /// Records `n` occurrences at once; non-positive `n` is ignored.
    pub fn add(&mut self, event: GenerationalEvent, n: i32) {
        if n > 0 {
            *self.counts.entry(event).or_insert(0) += n;
        }
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&count| count == 0)
    }
}
