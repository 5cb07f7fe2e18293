//! Tracked-identifier-set bookkeeping.
//!
//! A tracker (a component holder, a configuration listener) cares about a
//! set of base identifiers that can be re-declared wholesale at any time.
//! [`IdentifierSet`] detects whether a newly supplied declaration actually
//! changes the set, and carries per-identifier state across replacements for
//! the identifiers that persist.

use std::collections::{BTreeMap, BTreeSet};

/// The set of base identifiers a tracker currently cares about, with
/// caller-defined state attached to each.
///
/// The key set always equals the most recently supplied declaration,
/// duplicates collapsed; a `None` declaration yields an empty set.
#[derive(Debug, Clone, Default)]
pub struct IdentifierSet<V> {
    entries: BTreeMap<String, V>,
}

impl<V> IdentifierSet<V> {
    /// Whether `id` is currently a tracked identifier.
    pub fn accepts(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// State attached to a tracked identifier.
    pub fn get(&self, id: &str) -> Option<&V> {
        self.entries.get(id)
    }

    /// Mutable state attached to a tracked identifier.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut V> {
        self.entries.get_mut(id)
    }

    /// The tracked identifiers, in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifiers are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether replacing the tracked set with `ids` would change membership.
    ///
    /// The comparison is set-wise: order-insensitive, duplicates collapsed.
    /// An empty tracked set is not different from a `None` declaration, but
    /// it is different from an explicitly empty one. Callers use this to
    /// skip reconfiguration only when the declaration is genuinely unchanged.
    pub fn is_different_from<S: AsRef<str>>(&self, ids: Option<&[S]>) -> bool {
        let Some(ids) = ids else {
            return !self.entries.is_empty();
        };
        if self.entries.is_empty() {
            return true;
        }
        let candidate: BTreeSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        if candidate.len() != self.entries.len() {
            return true;
        }
        !self.entries.keys().all(|key| candidate.contains(key.as_str()))
    }
}

impl<V: Default> IdentifierSet<V> {
    /// Create a set tracking `ids`, each with default state.
    pub fn new<S: AsRef<str>>(ids: Option<&[S]>) -> Self {
        let mut set = Self {
            entries: BTreeMap::new(),
        };
        set.set_tracked(ids);
        set
    }

    /// Replace the tracked set wholesale.
    ///
    /// State is carried over for identifiers that were already tracked;
    /// newly tracked identifiers start from default state; identifiers no
    /// longer declared are dropped along with their state.
    pub fn set_tracked<S: AsRef<str>>(&mut self, ids: Option<&[S]>) {
        let mut next = BTreeMap::new();
        for id in ids.unwrap_or_default() {
            let id = id.as_ref();
            if next.contains_key(id) {
                continue;
            }
            let value = self.entries.remove(id).unwrap_or_default();
            next.insert(id.to_string(), value);
        }
        tracing::debug!(tracked = next.len(), "tracked identifier set replaced");
        self.entries = next;
    }
}
