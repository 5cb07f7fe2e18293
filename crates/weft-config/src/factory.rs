//! Revision-guarded delivery recording for factory configurations.
//!
//! A factory identifier names a template from which many configuration
//! instances are produced; updates for those instances arrive concurrently
//! and possibly out of order. [`FactoryRevisionTracker`] remembers, per
//! (factory identifier, configuration identifier) pair, the revision last
//! delivered, so a stale update can never overwrite a newer one and a
//! removal is distinguishable from "never configured."
//!
//! The check and the record form a critical section per factory identifier:
//! both mutating operations take `&mut self`, and [`try_apply`] is the
//! recommended single-call form that keeps the delivery callback inside it.
//!
//! [`try_apply`]: FactoryRevisionTracker::try_apply

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DeliveryError, Result};
use crate::targeted::TargetedId;
use crate::tracked::IdentifierSet;

/// Externally assigned version stamp on a configuration record.
///
/// Revisions are assigned monotonically by the configuration store. Negative
/// values are the removal sentinel and are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub i64);

impl Revision {
    /// Sentinel carried by removal events.
    pub const REMOVED: Revision = Revision(-1);

    /// Create a revision stamp.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The inner stamp value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether this stamp marks a removal rather than a storable revision.
    pub fn is_removal(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rev-{}", self.0)
    }
}

impl From<i64> for Revision {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

type RevisionMap = BTreeMap<TargetedId, Revision>;

/// Per-factory record of the configuration revisions last delivered.
///
/// Built on an [`IdentifierSet`] keyed by factory base identifier; each
/// tracked factory carries a nested map from configuration identifier to the
/// last-applied revision. A factory with no live configurations holds no map
/// at all: "all configurations removed" and "never configured" collapse to
/// the same observable state, which bounds memory to factories with at least
/// one live configuration.
#[derive(Debug, Clone, Default)]
pub struct FactoryRevisionTracker {
    factories: IdentifierSet<Option<RevisionMap>>,
}

impl FactoryRevisionTracker {
    /// Create a tracker for the given factory identifiers.
    pub fn new<S: AsRef<str>>(factory_ids: Option<&[S]>) -> Self {
        Self {
            factories: IdentifierSet::new(factory_ids),
        }
    }

    /// Whether `id` is a tracked factory identifier.
    pub fn accepts_factory(&self, id: &str) -> bool {
        self.factories.accepts(id)
    }

    /// Replace the tracked factory identifiers wholesale, preserving
    /// delivery records for factories that remain tracked.
    pub fn track_factories<S: AsRef<str>>(&mut self, ids: Option<&[S]>) {
        self.factories.set_tracked(ids);
    }

    /// Whether `ids` declares a different factory set than currently tracked.
    pub fn is_different_from<S: AsRef<str>>(&self, ids: Option<&[S]>) -> bool {
        self.factories.is_different_from(ids)
    }

    /// Pre-delivery gate: whether `revision` is newer than anything already
    /// delivered for this (configuration, factory) pair.
    ///
    /// An untracked factory, a factory with no delivery record, and an
    /// unseen configuration identifier all accept. Otherwise strictly newer
    /// wins; an equal revision is a duplicate or replay and is rejected.
    pub fn shall_take(
        &self,
        config: &TargetedId,
        factory: &TargetedId,
        revision: Revision,
    ) -> bool {
        let recorded = self
            .factories
            .get(factory.base())
            .and_then(|slot| slot.as_ref())
            .and_then(|per_factory| per_factory.get(config));
        match recorded {
            None => true,
            Some(last) => {
                let take = *last < revision;
                if !take {
                    tracing::debug!(
                        config = %config,
                        factory = %factory,
                        recorded = %last,
                        offered = %revision,
                        "stale configuration update rejected"
                    );
                }
                take
            }
        }
    }

    /// Record a delivered revision, or a removal when the stamp is negative.
    ///
    /// Called after the external delivery callback succeeds. A removal
    /// deletes the configuration's entry; once a factory's nested map is
    /// empty it is dropped entirely. Recording against an untracked factory
    /// is a no-op, since the caller may race a declaration change.
    pub fn record(&mut self, config: &TargetedId, factory: &TargetedId, revision: Revision) {
        let Some(slot) = self.factories.get_mut(factory.base()) else {
            return;
        };
        if revision.is_removal() {
            if let Some(per_factory) = slot.as_mut() {
                per_factory.remove(config);
                if per_factory.is_empty() {
                    // Collapse back to "never configured".
                    *slot = None;
                    tracing::debug!(
                        factory = %factory,
                        "last configuration removed, factory record dropped"
                    );
                }
            }
            return;
        }
        slot.get_or_insert_with(RevisionMap::new)
            .insert(config.clone(), revision);
        tracing::trace!(
            config = %config,
            factory = %factory,
            revision = %revision,
            "configuration revision recorded"
        );
    }

    /// Whether `config` currently has a delivery record under `factory`.
    ///
    /// Lets a caller decide whether an externally observed removal event is
    /// relevant before issuing the removal [`record`](Self::record).
    pub fn remove_configuration(&self, config: &TargetedId, factory: &TargetedId) -> bool {
        self.factories
            .get(factory.base())
            .and_then(|slot| slot.as_ref())
            .is_some_and(|per_factory| per_factory.contains_key(config))
    }

    /// Run the staleness gate, the delivery callback, and the record as a
    /// single call.
    ///
    /// Returns `Ok(false)` without invoking `deliver` when the revision is
    /// stale. A failed delivery leaves the record untouched, so the same
    /// revision can be retried. The `&mut self` receiver spans the whole
    /// sequence; cross-thread callers wrap the tracker in a lock held for
    /// the duration of the call.
    pub fn try_apply<F>(
        &mut self,
        config: &TargetedId,
        factory: &TargetedId,
        revision: Revision,
        deliver: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> Result<()>,
    {
        if !self.shall_take(config, factory, revision) {
            return Ok(false);
        }
        deliver()?;
        self.record(config, factory, revision);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(config: &str, factory: &str) -> (TargetedId, TargetedId) {
        (TargetedId::new(config), TargetedId::new(factory))
    }

    fn tracker(factories: &[&str]) -> FactoryRevisionTracker {
        FactoryRevisionTracker::new(Some(factories))
    }

    #[test]
    fn first_delivery_is_always_accepted() {
        let t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");
        assert!(t.shall_take(&cfg, &factory, Revision(0)));
    }

    #[test]
    fn equal_revision_is_rejected_as_replay() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");
        t.record(&cfg, &factory, Revision(1));
        assert!(!t.shall_take(&cfg, &factory, Revision(1)));
        assert!(!t.shall_take(&cfg, &factory, Revision(0)));
        assert!(t.shall_take(&cfg, &factory, Revision(2)));
    }

    #[test]
    fn removal_of_last_configuration_collapses_to_unseen() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");
        t.record(&cfg, &factory, Revision(5));
        assert!(t.remove_configuration(&cfg, &factory));

        t.record(&cfg, &factory, Revision::REMOVED);
        assert!(!t.remove_configuration(&cfg, &factory));
        // The record is gone entirely: even an old revision is accepted again.
        assert!(t.shall_take(&cfg, &factory, Revision(1)));
    }

    #[test]
    fn removal_without_prior_record_is_a_no_op() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");
        t.record(&cfg, &factory, Revision::REMOVED);
        assert!(!t.remove_configuration(&cfg, &factory));
        assert!(t.shall_take(&cfg, &factory, Revision(0)));
    }

    #[test]
    fn recording_against_untracked_factory_is_a_no_op() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, unknown) = ids("cfg1", "other.pid");
        t.record(&cfg, &unknown, Revision(3));
        assert!(!t.remove_configuration(&cfg, &unknown));
        assert!(t.shall_take(&cfg, &unknown, Revision(3)));
    }

    #[test]
    fn configurations_are_independent_within_a_factory() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg1, factory) = ids("cfg1", "factory.pid");
        let (cfg2, _) = ids("cfg2", "factory.pid");

        t.record(&cfg1, &factory, Revision(4));
        assert!(t.shall_take(&cfg2, &factory, Revision(1)));

        t.record(&cfg2, &factory, Revision(1));
        t.record(&cfg1, &factory, Revision::REMOVED);
        // cfg2 still has a record, so the factory entry survives.
        assert!(t.remove_configuration(&cfg2, &factory));
        assert!(!t.remove_configuration(&cfg1, &factory));
    }

    #[test]
    fn retracking_preserves_records_for_retained_factories() {
        let mut t = tracker(&["f1", "f2"]);
        let (cfg, f1) = ids("cfg", "f1");
        let (_, f2) = ids("cfg", "f2");

        t.record(&cfg, &f1, Revision(2));
        t.record(&cfg, &f2, Revision(3));

        t.track_factories(Some(["f1", "f3"].as_slice()));
        assert!(!t.shall_take(&cfg, &f1, Revision(2)));
        // f2 was dropped with its record; f3 starts fresh.
        assert!(t.shall_take(&cfg, &f2, Revision(1)));
        assert!(t.accepts_factory("f3"));
        assert!(!t.accepts_factory("f2"));
    }

    #[test]
    fn try_apply_skips_delivery_for_stale_revisions() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");
        t.record(&cfg, &factory, Revision(2));

        let mut delivered = false;
        let applied = t
            .try_apply(&cfg, &factory, Revision(1), || {
                delivered = true;
                Ok(())
            })
            .unwrap();
        assert!(!applied);
        assert!(!delivered);
    }

    #[test]
    fn try_apply_records_only_after_successful_delivery() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");

        let failed = t.try_apply(&cfg, &factory, Revision(1), || {
            Err(DeliveryError::callback("target threw"))
        });
        assert!(failed.is_err());
        // Nothing was recorded; the same revision is retryable.
        assert!(t.shall_take(&cfg, &factory, Revision(1)));

        let applied = t
            .try_apply(&cfg, &factory, Revision(1), || Ok(()))
            .unwrap();
        assert!(applied);
        assert!(!t.shall_take(&cfg, &factory, Revision(1)));
    }

    #[test]
    fn try_apply_propagates_a_retired_target() {
        let mut t = tracker(&["factory.pid"]);
        let (cfg, factory) = ids("cfg1", "factory.pid");

        // The registry found the target gone when the callback fired.
        let result = t.try_apply(&cfg, &factory, Revision(1), || {
            Err(DeliveryError::target_retired("cfg1"))
        });
        assert!(matches!(result, Err(DeliveryError::TargetRetired(_))));
        assert!(t.shall_take(&cfg, &factory, Revision(1)));
    }

    #[test]
    fn factory_lookup_uses_the_base_identifier() {
        let mut t = tracker(&["factory.pid"]);
        let cfg = TargetedId::new("cfg1");
        let targeted_factory = TargetedId::new("factory.pid|com.example.Comp|1.0.0");

        t.record(&cfg, &targeted_factory, Revision(1));
        // A differently targeted spelling of the same factory shares the record.
        let other_spelling = TargetedId::new("factory.pid|com.example.Comp");
        assert!(!t.shall_take(&cfg, &other_spelling, Revision(1)));
    }
}
