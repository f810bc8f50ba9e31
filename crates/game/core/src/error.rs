//! Common error infrastructure for mars-core.
//!
//! Execution errors (`ActionError`, `PaymentError`, `OracleError`) are typed
//! enums defined next to the code that raises them. Diagnostic calculators do
//! not fail; they collect [`ValidationError`] values instead so the caller can
//! show every reason an entity is unavailable at once.
//!
//! # Design Principles
//!
//! - **Type Safety**: execution paths return a typed error per failure class
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Stable Codes**: every variant maps to a SCREAMING_SNAKE identifier

use std::fmt;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed once the game moves on
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted game state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can retry later (e.g. not your turn yet, waiting on a tile placement).
    Recoverable,

    /// Invalid input (e.g. malformed payment, unknown card, failed requirement).
    Validation,

    /// Unexpected state inconsistency, indicates a bug.
    Internal,

    /// Game state corrupted or a required collaborator is missing.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all mars-core execution errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Codes are stable and safe to match on in clients and tests
pub trait GameError: fmt::Display + fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// Diagnostic errors
// ============================================================================

/// Taxonomy of diagnostic errors produced by the state calculators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ErrorCategory {
    Phase,
    Turn,
    Requirement,
    Cost,
    Input,
    Availability,
    GenerationalEvent,
    Validation,
    /// Entity is not in a state where it can be considered at all (card not in hand).
    GameState,
    /// The request names something the engine does not know (unknown standard project).
    Configuration,
}

/// A single reason why a card, card action or standard project is unavailable.
///
/// Wire shape: `{type, code, message, requiredValue?, currentValue?}`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ValidationError {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub required_value: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub current_value: Option<i32>,
}

impl ValidationError {
    pub fn new(
        category: ErrorCategory,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code: code.into(),
            message: message.into(),
            required_value: None,
            current_value: None,
        }
    }

    /// Attaches the required and observed values (builder pattern).
    #[must_use]
    pub fn with_values(mut self, required: i32, current: i32) -> Self {
        self.required_value = Some(required);
        self.current_value = Some(current);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.required_value, self.current_value) {
            (Some(required), Some(current)) => write!(
                f,
                "{} (required {}, current {})",
                self.message, required, current
            ),
            _ => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_values_when_present() {
        let error = ValidationError::new(ErrorCategory::Cost, "COST_INSUFFICIENT_CREDITS", "Not enough credits")
            .with_values(11, 5);
        assert_eq!(
            error.to_string(),
            "Not enough credits (required 11, current 5)"
        );
    }

    #[test]
    fn severity_helpers() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
    }
}
