//! Error types for field and topology construction.
//!
//! Every core operation is pure and deterministic, so none of these errors
//! is retryable: the caller has to change the input or widen the supported
//! range.

/// Broad classification of a [`TopologyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller-supplied input (field order, radix, router count).
    Configuration,
    /// An internal consistency check failed after construction.
    ConstructionInvariant,
    /// The input lies outside the validated supported range.
    Unsupported,
}

/// Errors raised while building fields, graphs and routing tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Invalid field order {0}: expected a prime power >= 2")]
    InvalidFieldOrder(u64),

    #[error("Unsupported field size {q}: supported orders are 2..={max}")]
    UnsupportedFieldSize { q: u64, max: u64 },

    #[error("Field construction failed for GF({q}): {reason}")]
    FieldConstruction { q: u32, reason: String },

    #[error("Division by zero in GF({q})")]
    DivisionByZero { q: u32 },

    #[error("Invalid dragonfly radix {degree}: {reason}")]
    InvalidRadix { degree: u32, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Construction invariant violated: {0}")]
    ConstructionInvariant(String),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
}

impl TopologyError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFieldOrder(_)
            | Self::InvalidRadix { .. }
            | Self::InvalidConfiguration(_)
            | Self::DivisionByZero { .. } => ErrorKind::Configuration,
            Self::FieldConstruction { .. } | Self::ConstructionInvariant(_) => {
                ErrorKind::ConstructionInvariant
            }
            Self::UnsupportedFieldSize { .. } | Self::UnsupportedFeature(_) => {
                ErrorKind::Unsupported
            }
        }
    }

    /// Returns true if the error indicates an algorithm defect rather than bad input.
    pub fn is_fatal_defect(&self) -> bool {
        self.kind() == ErrorKind::ConstructionInvariant
    }
}

/// Result alias used throughout the core builders.
pub type Result<T, E = TopologyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(TopologyError::InvalidFieldOrder(6).kind(), ErrorKind::Configuration);
        assert_eq!(
            TopologyError::UnsupportedFeature("extended polarfly".to_string()).kind(),
            ErrorKind::Unsupported
        );
        assert!(TopologyError::ConstructionInvariant("mean degree".to_string()).is_fatal_defect());
        assert!(!TopologyError::DivisionByZero { q: 7 }.is_fatal_defect());
    }

    #[test]
    fn test_error_messages_carry_offending_value() {
        let err = TopologyError::InvalidFieldOrder(12);
        assert!(err.to_string().contains("12"));

        let err = TopologyError::UnsupportedFieldSize { q: 512, max: 256 };
        assert!(err.to_string().contains("512"));
        assert!(err.to_string().contains("256"));
    }
}
