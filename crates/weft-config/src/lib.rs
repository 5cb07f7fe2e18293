//! Weft Config - Configuration Resolution Core
//!
//! This crate decides which configuration applies to which managed component
//! instance in the Weft runtime, and guarantees that concurrent, possibly
//! out-of-order configuration updates are applied monotonically. Everything
//! around it (the component registry, the callback proxy layer, the
//! configuration store, the dispatch queue) is a collaborator reached
//! through traits and plain inputs.
//!
//! # Pieces
//!
//! - [`TargetedId`]: parses `base|name|version|origin` identifiers and ranks
//!   how precisely one matches a candidate target
//! - [`IdentifierSet`]: the identifiers a tracker cares about, with state
//!   carried across wholesale re-declarations
//! - [`FactoryRevisionTracker`]: per-factory revision records enforcing
//!   strict newer-wins delivery
//! - [`best_match`]: selects the single most specific configuration for a
//!   target
//!
//! # Design Principles
//!
//! - **Total operations**: no input shape is an error; parsing never fails
//!   and staleness is an ordinary boolean outcome
//! - **Raw-string identity**: targeted identifiers compare by their raw
//!   string, never structurally
//! - **Caller-owned concurrency**: no internal threads or locks; mutating
//!   operations take `&mut self` and
//!   [`FactoryRevisionTracker::try_apply`] keeps the check-deliver-record
//!   sequence in one call

#![forbid(unsafe_code)]

/// Delivery-seam error types
pub mod error;

/// Revision-guarded delivery recording for factory configurations
pub mod factory;

/// Curated re-exports
pub mod prelude;

/// Best-match selection across candidates
pub mod resolve;

/// Targeted identifiers and specificity ranking
pub mod targeted;

/// Tracked-identifier-set bookkeeping
pub mod tracked;

pub use error::DeliveryError;
pub use factory::{FactoryRevisionTracker, Revision};
pub use resolve::best_match;
pub use targeted::{ConfigTarget, TargetDescriptor, TargetedId, EMPTY_VERSION, TARGET_SEPARATOR};
pub use tracked::IdentifierSet;
