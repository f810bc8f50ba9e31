/// Rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GameConfig {
    /// Base MC value of one steel when paying for building cards.
    pub steel_value: i32,
    /// Base MC value of one titanium when paying for space cards.
    pub titanium_value: i32,
    /// Actions granted to a player at the start of each turn.
    pub actions_per_turn: u8,
    pub max_oceans: i32,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub temperature_step: i32,
    pub max_oxygen: i32,
    pub max_venus: i32,
    pub venus_step: i32,
    pub plants_per_greenery: i32,
    pub heat_per_temperature: i32,
    /// Lowest MC production a player may be reduced to. Other production floors at 0.
    pub min_credits_production: i32,
    pub starting_terraform_rating: i32,
}

impl GameConfig {
    // ===== rule defaults =====
    pub const DEFAULT_STEEL_VALUE: i32 = 2;
    pub const DEFAULT_TITANIUM_VALUE: i32 = 3;
    pub const DEFAULT_ACTIONS_PER_TURN: u8 = 2;
    pub const DEFAULT_MAX_OCEANS: i32 = 9;
    pub const DEFAULT_MIN_TEMPERATURE: i32 = -30;
    pub const DEFAULT_MAX_TEMPERATURE: i32 = 8;
    pub const DEFAULT_MAX_OXYGEN: i32 = 14;
    pub const DEFAULT_MAX_VENUS: i32 = 30;
    pub const DEFAULT_CONVERSION_COST: i32 = 8;
    pub const DEFAULT_MIN_CREDITS_PRODUCTION: i32 = -5;
    pub const DEFAULT_TERRAFORM_RATING: i32 = 20;

    pub fn new() -> Self {
        Self {
            steel_value: Self::DEFAULT_STEEL_VALUE,
            titanium_value: Self::DEFAULT_TITANIUM_VALUE,
            actions_per_turn: Self::DEFAULT_ACTIONS_PER_TURN,
            max_oceans: Self::DEFAULT_MAX_OCEANS,
            min_temperature: Self::DEFAULT_MIN_TEMPERATURE,
            max_temperature: Self::DEFAULT_MAX_TEMPERATURE,
            temperature_step: 2,
            max_oxygen: Self::DEFAULT_MAX_OXYGEN,
            max_venus: Self::DEFAULT_MAX_VENUS,
            venus_step: 2,
            plants_per_greenery: Self::DEFAULT_CONVERSION_COST,
            heat_per_temperature: Self::DEFAULT_CONVERSION_COST,
            min_credits_production: Self::DEFAULT_MIN_CREDITS_PRODUCTION,
            starting_terraform_rating: Self::DEFAULT_TERRAFORM_RATING,
        }
    }

    /// Lowest value the given production track may reach.
    pub fn min_production(&self, resource: crate::card::ResourceType) -> i32 {
        if resource == crate::card::ResourceType::Credits {
            self.min_credits_production
        } else {
            0
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
