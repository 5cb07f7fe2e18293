//! Error types for configuration delivery.
//!
//! Matching and bookkeeping never fail: stale updates, unmatched candidates,
//! and unknown identifiers are ordinary boolean or integer outcomes. The only
//! fallible seam is the external delivery callback wrapped by
//! [`FactoryRevisionTracker::try_apply`](crate::factory::FactoryRevisionTracker::try_apply).

use thiserror::Error;

/// Failure reported by the external delivery callback.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The target's update callback reported a failure.
    #[error("Update callback failed: {0}")]
    Callback(String),

    /// The target was retired between matching and delivery.
    #[error("Target retired: {0}")]
    TargetRetired(String),
}

/// Result type for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

impl DeliveryError {
    /// Create a callback failure.
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }

    /// Create a retired-target failure.
    pub fn target_retired(id: impl Into<String>) -> Self {
        Self::TargetRetired(id.into())
    }
}
