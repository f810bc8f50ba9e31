//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::CardId;

/// Errors that occur when accessing catalog data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// Card id is not present in the catalog.
    #[error("card '{0}' not found in catalog")]
    CardNotFound(CardId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            OracleError::CardNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::CardNotFound(_) => "ORACLE_CARD_NOT_FOUND",
        }
    }
}
