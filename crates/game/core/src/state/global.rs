use crate::card::TileType;
use crate::config::GameConfig;

use super::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum GlobalParameter {
    Temperature,
    Oxygen,
    Oceans,
    Venus,
}

/// Shared terraforming tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GlobalParameters {
    pub temperature: i32,
    pub oxygen: i32,
    pub oceans: i32,
    pub venus: i32,
}

impl GlobalParameters {
    pub fn initial(config: &GameConfig) -> Self {
        Self {
            temperature: config.min_temperature,
            oxygen: 0,
            oceans: 0,
            venus: 0,
        }
    }

    pub fn get(&self, parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => self.temperature,
            GlobalParameter::Oxygen => self.oxygen,
            GlobalParameter::Oceans => self.oceans,
            GlobalParameter::Venus => self.venus,
        }
    }

    /// Raises a track by `steps`, clamped at its maximum. Returns steps actually taken.
    pub fn raise(&mut self, parameter: GlobalParameter, steps: i32, config: &GameConfig) -> i32 {
        let (value, step, max) = match parameter {
            GlobalParameter::Temperature => (
                &mut self.temperature,
                config.temperature_step,
                config.max_temperature,
            ),
            GlobalParameter::Oxygen => (&mut self.oxygen, 1, config.max_oxygen),
            GlobalParameter::Oceans => (&mut self.oceans, 1, config.max_oceans),
            GlobalParameter::Venus => (&mut self.venus, config.venus_step, config.max_venus),
        };

        let mut taken = 0;
        while taken < steps && *value + step <= max {
            *value += step;
            taken += 1;
        }
        taken
    }

    pub fn is_maxed(&self, parameter: GlobalParameter, config: &GameConfig) -> bool {
        match parameter {
            GlobalParameter::Temperature => self.temperature >= config.max_temperature,
            GlobalParameter::Oxygen => self.oxygen >= config.max_oxygen,
            GlobalParameter::Oceans => self.oceans >= config.max_oceans,
            GlobalParameter::Venus => self.venus >= config.max_venus,
        }
    }

    pub fn oceans_remaining(&self, config: &GameConfig) -> i32 {
        (config.max_oceans - self.oceans).max(0)
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self::initial(&GameConfig::default())
    }
}

/// A tile on the board. Geometry is owned by the board collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PlacedTile {
    pub tile_type: TileType,
    pub owner: Option<PlayerId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    pub tiles: Vec<PlacedTile>,
}

impl Board {
    /// Counts tiles of a type, optionally restricted to one owner.
    pub fn count(&self, tile_type: TileType, owner: Option<&PlayerId>) -> i32 {
        self.tiles
            .iter()
            .filter(|tile| tile.tile_type == tile_type)
            .filter(|tile| owner.is_none_or(|owner| tile.owner.as_ref() == Some(owner)))
            .count() as i32
    }
}
