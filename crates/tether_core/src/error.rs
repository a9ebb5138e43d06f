use thiserror::Error;

use crate::family::Family;

#[derive(Error, Debug)]
pub enum RelationError {
    #[error("metric '{metric}' does not belong to family {family}")]
    MetricFamilyMismatch { family: Family, metric: String },

    #[error("family {family} requires {expected} members, found {found}")]
    ArityMismatch { family: Family, expected: usize, found: usize },

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("unknown curve: {0}")]
    UnknownCurve(String),

    #[error("unsupported schema version: found {found}, expected {expected}")]
    SchemaVersion { found: u8, expected: u8 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelationError {
    /// Whether the caller can continue with degraded output.
    ///
    /// Mirrors the availability-over-failure policy: only trust-boundary
    /// violations are hard rejections.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RelationError::MetricFamilyMismatch { .. } => false,
            RelationError::SchemaVersion { .. } => false,
            RelationError::Serialization(_) => false,
            RelationError::ArityMismatch { .. } => true,
            RelationError::UnknownEntity(_) => true,
            RelationError::UnknownCurve(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelationError>;
