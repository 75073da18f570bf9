//! Error taxonomy for HSSP report generation

use thiserror::Error;

/// Main error type for HSSP operations
#[derive(Error, Debug)]
pub enum HsspError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid residue '{residue}' in sequence {row} at column {column}")]
    InvalidResidue {
        row: String,
        residue: char,
        column: usize,
    },

    #[error("No hits found or remaining")]
    NoHits,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unresolved accession: {0}")]
    UnresolvedAccession(String),

    #[error("Degenerate alignment: {0}")]
    DegenerateAlignment(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for HSSP operations
pub type HsspResult<T> = Result<T, HsspError>;

impl HsspError {
    /// Per-row resolution failures are absorbed by the caller; everything else
    /// aborts report generation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HsspError::UnresolvedAccession(_))
    }
}

impl From<serde_json::Error> for HsspError {
    fn from(err: serde_json::Error) -> Self {
        HsspError::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for HsspError {
    fn from(err: std::fmt::Error) -> Self {
        HsspError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for HsspError {
    fn from(err: anyhow::Error) -> Self {
        HsspError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let invalid = HsspError::InvalidResidue {
            row: "P12345".to_string(),
            residue: 'J',
            column: 17,
        };
        assert_eq!(
            format!("{}", invalid),
            "Invalid residue 'J' in sequence P12345 at column 17"
        );

        assert_eq!(format!("{}", HsspError::NoHits), "No hits found or remaining");

        let malformed = HsspError::MalformedInput("row length mismatch".to_string());
        assert_eq!(format!("{}", malformed), "Malformed input: row length mismatch");

        let unresolved = HsspError::UnresolvedAccession("Q99999".to_string());
        assert_eq!(format!("{}", unresolved), "Unresolved accession: Q99999");

        let degenerate = HsspError::DegenerateAlignment("hit1".to_string());
        assert_eq!(format!("{}", degenerate), "Degenerate alignment: hit1");

        let config = HsspError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config), "Configuration error: missing field");

        assert_eq!(format!("{}", HsspError::Cancelled), "Operation cancelled");
    }

    #[test]
    fn test_only_unresolved_accession_is_recoverable() {
        assert!(!HsspError::UnresolvedAccession("X".to_string()).is_fatal());

        assert!(HsspError::NoHits.is_fatal());
        assert!(HsspError::MalformedInput("x".to_string()).is_fatal());
        assert!(HsspError::DegenerateAlignment("x".to_string()).is_fatal());
        assert!(HsspError::InvalidResidue {
            row: "r".to_string(),
            residue: '#',
            column: 0
        }
        .is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: HsspError = io_err.into();

        match err {
            HsspError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");

        let err: HsspError = parse_result.unwrap_err().into();
        match err {
            HsspError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: HsspError = anyhow::anyhow!("custom error message").into();
        match err {
            HsspError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }
}
