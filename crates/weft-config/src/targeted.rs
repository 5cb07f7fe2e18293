//! Targeted configuration identifiers and specificity ranking.
//!
//! A configuration identifier may narrow its applicability by appending up to
//! three targeting segments to its base identifier:
//!
//! ```text
//! base
//! base|name
//! base|name|version
//! base|name|version|origin      (origin may itself contain '|')
//! ```
//!
//! [`TargetedId`] parses such a raw string and ranks how precisely it matches
//! a candidate target. Parsing is total: malformed or over-segmented input
//! never fails, it degrades into the origin segment.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator between the base identifier and the targeting segments.
pub const TARGET_SEPARATOR: char = '|';

/// Canonical string form of the empty version, substituted when a candidate
/// target declares no version of its own.
pub const EMPTY_VERSION: &str = "0.0.0";

/// A candidate target a configuration may apply to.
///
/// Implemented by the component registry over its live registrations; the
/// matching core only reads identity metadata through this trait and never
/// holds on to a target.
pub trait ConfigTarget {
    /// The plain configuration identifier the target declared for itself.
    fn declared_id(&self) -> &str;

    /// Symbolic name of the implementation that registered the target.
    fn symbolic_name(&self) -> Option<&str>;

    /// Version of the implementation in canonical string form.
    fn version(&self) -> Option<&str>;

    /// Install origin of the target. `None` once the target has been
    /// retired; matching treats such a target as gone.
    fn origin(&self) -> Option<&str>;
}

/// Plain-data [`ConfigTarget`] for callers that already hold the metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// Identifier the target declared for itself.
    pub declared_id: String,
    /// Symbolic name of the registering implementation.
    pub symbolic_name: Option<String>,
    /// Implementation version in canonical string form.
    pub version: Option<String>,
    /// Install origin; `None` for a retired target.
    pub origin: Option<String>,
}

impl ConfigTarget for TargetDescriptor {
    fn declared_id(&self) -> &str {
        &self.declared_id
    }

    fn symbolic_name(&self) -> Option<&str> {
        self.symbolic_name.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

/// A configuration identifier with optional narrowing segments.
///
/// Two `TargetedId`s are equal iff their raw strings are equal. Equality is
/// deliberately not structural: call sites keyed on identity (map keys,
/// rebinding checks) must see exactly the identifiers they were given.
/// Ordering and hashing follow the same rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TargetedId {
    raw: String,
    base: String,
    target_name: Option<String>,
    target_version: Option<String>,
    target_origin: Option<String>,
}

impl TargetedId {
    /// Parse a raw identifier string.
    ///
    /// Splits on the first three occurrences of [`TARGET_SEPARATOR`]; any
    /// remainder past the third separator belongs to the origin segment.
    /// Segments are present strictly left to right: a version is never set
    /// without a name, an origin never without a version.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut segments = raw.splitn(4, TARGET_SEPARATOR);
        let base = segments.next().unwrap_or_default().to_string();
        let target_name = segments.next().map(str::to_string);
        let target_version = segments.next().map(str::to_string);
        let target_origin = segments.next().map(str::to_string);
        Self {
            raw,
            base,
            target_name,
            target_version,
            target_origin,
        }
    }

    /// The original, unparsed identifier string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The identifier portion before the first separator.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Targeted symbolic name, if any.
    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    /// Targeted version, if any.
    pub fn target_version(&self) -> Option<&str> {
        self.target_version.as_deref()
    }

    /// Targeted origin, if any.
    pub fn target_origin(&self) -> Option<&str> {
        self.target_origin.as_deref()
    }

    /// Number of targeting segments present (0–3).
    pub fn specificity(&self) -> u8 {
        [
            self.target_name.is_some(),
            self.target_version.is_some(),
            self.target_origin.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count() as u8
    }

    /// Whether this identifier binds more strongly than the identifier a
    /// target is currently bound to.
    ///
    /// An absent previous binding is always superseded; otherwise strictly
    /// more targeting segments win. Equal specificity does not supersede;
    /// replacing an equally specific binding is a caller-level decision.
    pub fn binds_stronger(&self, previous: Option<&TargetedId>) -> bool {
        match previous {
            None => true,
            Some(other) => self.specificity() > other.specificity(),
        }
    }

    /// Accept/reject filter for a candidate target, applied before ranking.
    ///
    /// A retired target (no determinable origin) never matches. An
    /// untargeted identifier matches every live target. Each present segment
    /// narrows further: name, then version (the candidate's version defaults
    /// to [`EMPTY_VERSION`] when absent), then origin compared exactly.
    pub fn matches_target<T: ConfigTarget>(&self, target: &T) -> bool {
        let Some(origin) = target.origin() else {
            return false;
        };
        let Some(name) = self.target_name.as_deref() else {
            return true;
        };
        if target.symbolic_name() != Some(name) {
            return false;
        }
        let Some(version) = self.target_version.as_deref() else {
            return true;
        };
        if target.version().unwrap_or(EMPTY_VERSION) != version {
            return false;
        }
        match self.target_origin.as_deref() {
            None => true,
            Some(expected) => expected == origin,
        }
    }

    /// Rank how precisely this identifier matches a candidate target.
    ///
    /// Returns -1 for no match, otherwise 0–3 with higher values more
    /// specific. Callers pick, among all identifiers ranking ≥ 0 for a
    /// target, the one with the highest level; ties are caller policy.
    ///
    /// A candidate whose declared identifier is literally equal to the full
    /// raw string ranks 1 immediately: that declared identifier merely
    /// contains the separator character and was never targeted at all.
    pub fn match_level<T: ConfigTarget>(&self, target: &T) -> i8 {
        if target.declared_id() == self.raw {
            return 1;
        }
        if target.declared_id() != self.base {
            return -1;
        }
        let Some(name) = self.target_name.as_deref() else {
            return 0;
        };
        if target.symbolic_name() != Some(name) {
            return -1;
        }
        let Some(version) = self.target_version.as_deref() else {
            return 1;
        };
        if target.version().unwrap_or(EMPTY_VERSION) != version {
            return -1;
        }
        let Some(origin) = self.target_origin.as_deref() else {
            return 2;
        };
        if target.origin() != Some(origin) {
            return -1;
        }
        3
    }
}

impl PartialEq for TargetedId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for TargetedId {}

impl PartialOrd for TargetedId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TargetedId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for TargetedId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for TargetedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for TargetedId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for TargetedId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<TargetedId> for String {
    fn from(id: TargetedId) -> Self {
        id.raw
    }
}
