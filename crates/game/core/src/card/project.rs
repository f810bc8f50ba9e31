use super::ResourceType;

/// Fixed-cost actions available to every player regardless of hand.
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
pub enum StandardProject {
    SellPatents,
    PowerPlant,
    Asteroid,
    Aquifer,
    Greenery,
    City,
    ConvertPlantsToGreenery,
    ConvertHeatToTemperature,
}

impl StandardProject {
    /// Resource the project is paid with.
    pub const fn payment_resource(self) -> ResourceType {
        match self {
            Self::ConvertPlantsToGreenery => ResourceType::Plants,
            Self::ConvertHeatToTemperature => ResourceType::Heat,
            _ => ResourceType::Credits,
        }
    }

    /// MC cost before discounts. Conversions are priced by [`crate::GameConfig`].
    pub const fn credit_cost(self) -> i32 {
        match self {
            Self::SellPatents => 0,
            Self::PowerPlant => 11,
            Self::Asteroid => 14,
            Self::Aquifer => 18,
            Self::Greenery => 23,
            Self::City => 25,
            Self::ConvertPlantsToGreenery | Self::ConvertHeatToTemperature => 0,
        }
    }

    pub const fn is_conversion(self) -> bool {
        matches!(
            self,
            Self::ConvertPlantsToGreenery | Self::ConvertHeatToTemperature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_wire_ids() {
        assert_eq!(
            StandardProject::from_str("power-plant"),
            Ok(StandardProject::PowerPlant)
        );
        assert!(StandardProject::from_str("space-elevator").is_err());
        assert_eq!(StandardProject::Aquifer.credit_cost(), 18);
        assert_eq!(
            StandardProject::ConvertHeatToTemperature.payment_resource(),
            ResourceType::Heat
        );
    }
}
