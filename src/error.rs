//! Error types for echoview

use crate::visibility::{SplitDiagnostic, ViewId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchoViewError {
    /// A view kept two or more candidates but none of them has an edge that
    /// divides its window. Only that view is lost; the search carries on.
    #[error("No splitting edge: {0}")]
    NoSplittingEdge(Box<SplitDiagnostic>),

    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown view: {0}")]
    UnknownView(ViewId),

    #[error("Worker error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, EchoViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EchoViewError::InvalidPolygon("fewer than 3 vertices".into());
        assert_eq!(err.to_string(), "Invalid polygon: fewer than 3 vertices");

        let err = EchoViewError::UnknownView(ViewId::new(7));
        assert_eq!(err.to_string(), "Unknown view: ViewId(7)");
    }

    #[test]
    fn test_error_is_std_error() {
        let err = EchoViewError::Worker("channel closed".into());
        let _: &dyn std::error::Error = &err;
    }
}
