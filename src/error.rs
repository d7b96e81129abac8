//! Error types for projection runs

use thiserror::Error;

/// Errors raised by the projection engine
///
/// `Configuration` and `InvariantViolation` abort a run. `Arithmetic` is
/// produced per entity; the engine isolates it and keeps projecting the rest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Malformed input detected before the first period
    #[error("configuration error in {entity}: {reason}")]
    Configuration { entity: String, reason: String },

    /// A calculation that cannot be evaluated for one entity
    #[error("arithmetic error in {entity} at period {period}: {reason}")]
    Arithmetic {
        entity: String,
        period: u32,
        reason: String,
    },

    /// Engine bug detected at the allocator boundary
    #[error("invariant violated at period {period}{}: {detail}", rule_suffix(.rule))]
    InvariantViolation {
        period: u32,
        rule: Option<u32>,
        detail: String,
    },
}

fn rule_suffix(rule: &Option<u32>) -> String {
    match rule {
        Some(priority) => format!(" (rule priority {})", priority),
        None => String::new(),
    }
}

impl ProjectionError {
    pub fn config(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError::Configuration {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn arithmetic(entity: impl Into<String>, period: u32, reason: impl Into<String>) -> Self {
        ProjectionError::Arithmetic {
            entity: entity.into(),
            period,
            reason: reason.into(),
        }
    }

    pub fn invariant(period: u32, rule: Option<u32>, detail: impl Into<String>) -> Self {
        ProjectionError::InvariantViolation {
            period,
            rule,
            detail: detail.into(),
        }
    }

    /// Whether the engine may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProjectionError::Arithmetic { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Errors raised while reading input documents
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value in {file}: {reason}")]
    Invalid { file: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_entity() {
        let err = ProjectionError::config("debt-1", "maturity must be after start");
        assert_eq!(
            err.to_string(),
            "configuration error in debt-1: maturity must be after start"
        );

        let err = ProjectionError::invariant(7, Some(2), "duplicate priority");
        assert_eq!(
            err.to_string(),
            "invariant violated at period 7 (rule priority 2): duplicate priority"
        );
        assert!(!err.is_recoverable());
        assert!(ProjectionError::arithmetic("p", 0, "x").is_recoverable());
    }
}
