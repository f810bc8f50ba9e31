use std::fmt;

use super::PlayerId;

/// Lifecycle of a game instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum GameStatus {
    #[default]
    Lobby,
    Active,
    Finished,
}

/// Phase inside an active game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum GamePhase {
    #[default]
    WaitingForStart,
    StartingCardSelection,
    Action,
    ProductionAndCardDraw,
    Complete,
}

/// Actions left in the current turn.
///
/// On the wire this is a plain integer where `-1` means unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "i32", try_from = "i32")
)]
pub enum ActionAllowance {
    Limited(u8),
    /// Solo play, or the last player who has not passed.
    Unlimited,
}

impl ActionAllowance {
    pub const UNLIMITED_SENTINEL: i32 = -1;

    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }

    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Limited(0))
    }

    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Limited(n) => n as i32,
            Self::Unlimited => Self::UNLIMITED_SENTINEL,
        }
    }
}

impl From<ActionAllowance> for i32 {
    fn from(value: ActionAllowance) -> Self {
        value.as_i32()
    }
}

/// Raised when an integer is neither `-1` nor a small non-negative count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid actions remaining value {0}")]
pub struct InvalidAllowance(pub i32);

impl TryFrom<i32> for ActionAllowance {
    type Error = InvalidAllowance;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            Self::UNLIMITED_SENTINEL => Ok(Self::Unlimited),
            n => u8::try_from(n)
                .map(Self::Limited)
                .map_err(|_| InvalidAllowance(value)),
        }
    }
}

impl fmt::Display for ActionAllowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Whose turn it is and how many actions they have left.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct TurnState {
    pub player_id: PlayerId,
    pub actions_remaining: ActionAllowance,
}

impl TurnState {
    pub fn new(player_id: PlayerId, actions_remaining: ActionAllowance) -> Self {
        Self {
            player_id,
            actions_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowance_wire_conversion() {
        assert_eq!(ActionAllowance::try_from(-1), Ok(ActionAllowance::Unlimited));
        assert_eq!(ActionAllowance::try_from(2), Ok(ActionAllowance::Limited(2)));
        assert_eq!(ActionAllowance::try_from(-2), Err(InvalidAllowance(-2)));
        assert_eq!(i32::from(ActionAllowance::Unlimited), -1);
        assert!(ActionAllowance::Limited(0).is_exhausted());
    }
}
