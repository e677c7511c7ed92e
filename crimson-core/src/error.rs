//! Error types shared by the sketching, indexing and mapping engines

use thiserror::Error;

/// Errors raised by core operations.
///
/// A failed call never leaves a [`crate::ReferenceIndex`] half-updated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid base {} ({:#04x}) at position {position}", display_base(*base), base)]
    InvalidBase { base: u8, position: usize },

    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Sketch parameters k={query_k}, w={query_w} do not match index parameters k={index_k}, w={index_w}")]
    ParameterMismatch {
        index_k: u32,
        index_w: u32,
        query_k: u32,
        query_w: u32,
    },

    #[error("Reference index has not been built")]
    IndexNotBuilt,

    #[error("Reference index is already built; reset it before rebuilding")]
    IndexAlreadyBuilt,

    #[error("Invalid CIGAR: {0}")]
    InvalidCigar(String),
}

impl CoreError {
    pub fn invalid_base(base: u8, position: usize) -> Self {
        Self::InvalidBase { base, position }
    }

    pub fn invalid_parameter<V: ToString, R: Into<String>>(
        name: &'static str,
        value: V,
        reason: R,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_cigar<S: Into<String>>(message: S) -> Self {
        Self::InvalidCigar(message.into())
    }
}

fn display_base(base: u8) -> String {
    if base.is_ascii_graphic() {
        format!("'{}'", base as char)
    } else {
        "<non-printable>".to_string()
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_message() {
        let err = CoreError::invalid_base(b'N', 7);
        assert_eq!(err.to_string(), "Invalid base 'N' (0x4e) at position 7");
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = CoreError::invalid_parameter("k", 17, "must be in 1..=16");
        assert!(matches!(err, CoreError::InvalidParameter { name: "k", .. }));
        assert_eq!(err.to_string(), "Invalid parameter k = 17: must be in 1..=16");
    }

    #[test]
    fn test_non_printable_base() {
        let err = CoreError::invalid_base(0, 0);
        assert!(err.to_string().contains("<non-printable>"));
    }
}
