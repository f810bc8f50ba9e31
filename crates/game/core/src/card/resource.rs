//! Resource, tag and tile vocabularies used by card definitions.

/// Every quantity a card condition can reference.
///
/// The wire form is the kebab-case variant name (`credits-production`,
/// `ocean-placement`, ...), shared by serde and `Display`/`FromStr`.
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
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ResourceType {
    // Basic resources
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,

    // Card-bound storage
    Microbe,
    Animal,
    Floater,
    Science,
    Asteroid,
    Disease,

    // Card flow
    CardDraw,
    CardTake,
    CardPeek,
    CardBuy,

    // Tile placements
    CityPlacement,
    OceanPlacement,
    GreeneryPlacement,

    // Global parameters and rating
    Temperature,
    Oxygen,
    Ocean,
    Venus,
    Tr,

    // Production tracks
    CreditsProduction,
    SteelProduction,
    TitaniumProduction,
    PlantsProduction,
    EnergyProduction,
    HeatProduction,

    // Persistent effect kinds
    Discount,
    ValueModifier,
    PaymentSubstitute,
}

impl ResourceType {
    /// The six resources held in a player's pool.
    pub const BASIC: [ResourceType; 6] = [
        ResourceType::Credits,
        ResourceType::Steel,
        ResourceType::Titanium,
        ResourceType::Plants,
        ResourceType::Energy,
        ResourceType::Heat,
    ];

    pub const fn is_basic(self) -> bool {
        matches!(
            self,
            Self::Credits | Self::Steel | Self::Titanium | Self::Plants | Self::Energy | Self::Heat
        )
    }

    /// Resources that live on a card rather than in the player's pool.
    pub const fn is_card_storage(self) -> bool {
        matches!(
            self,
            Self::Microbe
                | Self::Animal
                | Self::Floater
                | Self::Science
                | Self::Asteroid
                | Self::Disease
        )
    }

    pub const fn is_production(self) -> bool {
        self.production_base().is_some()
    }

    /// Maps a production track onto the basic resource it produces.
    pub const fn production_base(self) -> Option<ResourceType> {
        match self {
            Self::CreditsProduction => Some(Self::Credits),
            Self::SteelProduction => Some(Self::Steel),
            Self::TitaniumProduction => Some(Self::Titanium),
            Self::PlantsProduction => Some(Self::Plants),
            Self::EnergyProduction => Some(Self::Energy),
            Self::HeatProduction => Some(Self::Heat),
            _ => None,
        }
    }

    /// Tile queued by a placement resource.
    pub const fn tile_placement(self) -> Option<TileType> {
        match self {
            Self::CityPlacement => Some(TileType::City),
            Self::OceanPlacement => Some(TileType::Ocean),
            Self::GreeneryPlacement => Some(TileType::Greenery),
            _ => None,
        }
    }

    /// Resources a player may be granted as a payment substitute.
    pub const fn is_substitute_source(self) -> bool {
        matches!(self, Self::Heat | Self::Energy | Self::Plants)
    }
}

/// Card tags.
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
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum CardTag {
    Space,
    Earth,
    Science,
    Power,
    Building,
    Microbe,
    Animal,
    Plant,
    Event,
    City,
    Venus,
    Jovian,
    Wildlife,
    Wild,
}

/// Tiles a player can own on the board.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TileType {
    Ocean,
    Greenery,
    City,
}
