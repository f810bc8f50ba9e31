//! Multi-resource card payments.
//!
//! Tag restrictions and total value are independent checks: steel needs a
//! building tag and titanium a space tag no matter how large the player's
//! conversion bonuses are, and the value must still cover the cost.

use std::collections::BTreeMap;

use crate::card::ResourceType;
use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{PaymentSubstitute, ResourceSet};

/// Resources offered to pay a card's MC cost.
///
/// Wire shape: `{credits, steel, titanium, substitutes: {resourceType: int}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CardPayment {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub substitutes: BTreeMap<ResourceType, i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaymentError {
    #[error("payment amounts cannot be negative: {resource} = {amount}")]
    Negative { resource: ResourceType, amount: i32 },

    #[error("card does not have building tag, cannot use steel")]
    SteelNotAllowed,

    #[error("card does not have space tag, cannot use titanium")]
    TitaniumNotAllowed,

    #[error("player cannot use {0} as payment substitute")]
    UnknownSubstitute(ResourceType),

    #[error("{0} is not a valid payment substitute resource")]
    InvalidSubstituteSource(ResourceType),

    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: ResourceType,
        needed: i32,
        available: i32,
    },

    #[error("payment insufficient: card costs {cost} MC, payment provides {provided} MC")]
    Insufficient { cost: i32, provided: i32 },
}

impl GameError for PaymentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            PaymentError::Negative { .. } => "PAYMENT_NEGATIVE",
            PaymentError::SteelNotAllowed => "PAYMENT_STEEL_NOT_ALLOWED",
            PaymentError::TitaniumNotAllowed => "PAYMENT_TITANIUM_NOT_ALLOWED",
            PaymentError::UnknownSubstitute(_) => "PAYMENT_UNKNOWN_SUBSTITUTE",
            PaymentError::InvalidSubstituteSource(_) => "PAYMENT_INVALID_SUBSTITUTE_SOURCE",
            PaymentError::InsufficientResource { .. } => "PAYMENT_INSUFFICIENT_RESOURCE",
            PaymentError::Insufficient { .. } => "PAYMENT_INSUFFICIENT",
        }
    }
}

impl CardPayment {
    /// All-credits payment.
    pub fn credits(amount: i32) -> Self {
        Self {
            credits: amount,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_steel(mut self, steel: i32) -> Self {
        self.steel = steel;
        self
    }

    #[must_use]
    pub fn with_titanium(mut self, titanium: i32) -> Self {
        self.titanium = titanium;
        self
    }

    #[must_use]
    pub fn with_substitute(mut self, resource: ResourceType, amount: i32) -> Self {
        self.substitutes.insert(resource, amount);
        self
    }

    /// Every component must be non-negative.
    pub fn validate(&self) -> Result<(), PaymentError> {
        let components = [
            (ResourceType::Credits, self.credits),
            (ResourceType::Steel, self.steel),
            (ResourceType::Titanium, self.titanium),
        ];
        for (resource, amount) in components
            .into_iter()
            .chain(self.substitutes.iter().map(|(r, a)| (*r, *a)))
        {
            if amount < 0 {
                return Err(PaymentError::Negative { resource, amount });
            }
        }
        Ok(())
    }

    /// Every component must be covered by the player's pool.
    ///
    /// Only heat, energy and plants may ever be offered as substitutes.
    pub fn can_afford(&self, resources: &ResourceSet) -> Result<(), PaymentError> {
        let required = [
            (ResourceType::Credits, self.credits),
            (ResourceType::Steel, self.steel),
            (ResourceType::Titanium, self.titanium),
        ];
        for (resource, needed) in required {
            let available = resources.get(resource).unwrap_or(0);
            if needed > available {
                return Err(PaymentError::InsufficientResource {
                    resource,
                    needed,
                    available,
                });
            }
        }

        for (&resource, &needed) in &self.substitutes {
            if !resource.is_substitute_source() {
                return Err(PaymentError::InvalidSubstituteSource(resource));
            }
            let available = resources.get(resource).unwrap_or(0);
            if needed > available {
                return Err(PaymentError::InsufficientResource {
                    resource,
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    /// MC value of the payment given the player's conversion rates.
    ///
    /// Steel and titanium fall back to their base rates when missing from
    /// `substitutes`; unknown substitute entries contribute nothing.
    pub fn total_value(&self, substitutes: &[PaymentSubstitute]) -> i32 {
        let steel_rate =
            rate_of(substitutes, ResourceType::Steel).unwrap_or(GameConfig::DEFAULT_STEEL_VALUE);
        let titanium_rate = rate_of(substitutes, ResourceType::Titanium)
            .unwrap_or(GameConfig::DEFAULT_TITANIUM_VALUE);

        let substituted: i32 = self
            .substitutes
            .iter()
            .map(|(resource, amount)| amount * rate_of(substitutes, *resource).unwrap_or(0))
            .sum();

        self.credits + self.steel * steel_rate + self.titanium * titanium_rate + substituted
    }

    /// Validates the payment against a card's cost and tag restrictions.
    ///
    /// Overpayment is accepted.
    pub fn covers_card_cost(
        &self,
        cost: i32,
        allow_steel: bool,
        allow_titanium: bool,
        substitutes: &[PaymentSubstitute],
    ) -> Result<(), PaymentError> {
        self.validate()?;

        if self.steel > 0 && !allow_steel {
            return Err(PaymentError::SteelNotAllowed);
        }
        if self.titanium > 0 && !allow_titanium {
            return Err(PaymentError::TitaniumNotAllowed);
        }
        for resource in self.substitutes.keys() {
            if rate_of(substitutes, *resource).is_none() {
                return Err(PaymentError::UnknownSubstitute(*resource));
            }
        }

        let provided = self.total_value(substitutes);
        if provided < cost {
            return Err(PaymentError::Insufficient { cost, provided });
        }
        Ok(())
    }
}

fn rate_of(substitutes: &[PaymentSubstitute], resource: ResourceType) -> Option<i32> {
    substitutes
        .iter()
        .find(|s| s.resource_type == resource)
        .map(|s| s.conversion_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_rates() -> Vec<PaymentSubstitute> {
        vec![
            PaymentSubstitute {
                resource_type: ResourceType::Steel,
                conversion_rate: 2,
            },
            PaymentSubstitute {
                resource_type: ResourceType::Titanium,
                conversion_rate: 3,
            },
        ]
    }

    #[test]
    fn negative_components_are_rejected() {
        let payment = CardPayment::credits(5).with_steel(-1);
        assert_eq!(
            payment.validate(),
            Err(PaymentError::Negative {
                resource: ResourceType::Steel,
                amount: -1
            })
        );
        let payment = CardPayment::credits(5).with_substitute(ResourceType::Heat, -2);
        assert!(payment.validate().is_err());
    }

    #[test]
    fn value_is_linear_in_each_component() {
        let mut rates = base_rates();
        let base = CardPayment::credits(3).total_value(&rates);
        assert_eq!(CardPayment::credits(3).with_steel(1).total_value(&rates), base + 2);
        assert_eq!(CardPayment::credits(3).with_titanium(2).total_value(&rates), base + 6);

        rates[1].conversion_rate = 4;
        assert_eq!(CardPayment::credits(3).with_titanium(2).total_value(&rates), base + 8);
    }

    #[test]
    fn tag_restrictions_ignore_value() {
        let mut rates = base_rates();
        rates[0].conversion_rate = 10;
        let payment = CardPayment::default().with_steel(5);
        assert_eq!(
            payment.covers_card_cost(4, false, true, &rates),
            Err(PaymentError::SteelNotAllowed)
        );
        let payment = CardPayment::default().with_titanium(1);
        assert_eq!(
            payment.covers_card_cost(1, true, false, &rates),
            Err(PaymentError::TitaniumNotAllowed)
        );
    }

    #[test]
    fn insufficient_value_fails_regardless_of_split() {
        let rates = base_rates();
        for payment in [
            CardPayment::credits(10),
            CardPayment::credits(4).with_steel(3),
            CardPayment::credits(1).with_steel(3).with_titanium(1),
        ] {
            assert_eq!(payment.total_value(&rates), 10);
            assert_eq!(
                payment.covers_card_cost(11, true, true, &rates),
                Err(PaymentError::Insufficient {
                    cost: 11,
                    provided: 10
                })
            );
            assert!(payment.covers_card_cost(10, true, true, &rates).is_ok());
        }
    }

    #[test]
    fn substitutes_must_be_granted_and_from_valid_sources() {
        let mut rates = base_rates();
        let payment = CardPayment::credits(2).with_substitute(ResourceType::Heat, 3);
        assert_eq!(
            payment.covers_card_cost(5, false, false, &rates),
            Err(PaymentError::UnknownSubstitute(ResourceType::Heat))
        );

        rates.push(PaymentSubstitute {
            resource_type: ResourceType::Heat,
            conversion_rate: 1,
        });
        assert!(payment.covers_card_cost(5, false, false, &rates).is_ok());

        let pool = ResourceSet::new()
            .with(ResourceType::Credits, 2)
            .with(ResourceType::Heat, 2);
        assert_eq!(
            payment.can_afford(&pool),
            Err(PaymentError::InsufficientResource {
                resource: ResourceType::Heat,
                needed: 3,
                available: 2
            })
        );

        let bogus = CardPayment::default().with_substitute(ResourceType::Microbe, 1);
        assert_eq!(
            bogus.can_afford(&pool),
            Err(PaymentError::InvalidSubstituteSource(ResourceType::Microbe))
        );
    }
}
