//! Weft config prelude.
//!
//! Curated re-exports for configuration distribution callers.

pub use crate::{
    best_match, ConfigTarget, DeliveryError, FactoryRevisionTracker, IdentifierSet, Revision,
    TargetDescriptor, TargetedId,
};
