//! Best-match selection across candidate targeted identifiers.
//!
//! Several configurations sharing one base identifier may be visible at
//! once, each targeted with a different precision. The distribution layer
//! resolves which single configuration a target receives by ranking every
//! candidate with [`TargetedId::match_level`] and keeping the most specific.

use crate::targeted::{ConfigTarget, TargetedId};

/// Pick the single best-matching identifier for `target`.
///
/// Candidates ranking below zero are excluded; among the rest the highest
/// match level wins. The first candidate encountered wins among equals;
/// callers that need a different tie policy order their input accordingly.
pub fn best_match<'a, I, T>(candidates: I, target: &T) -> Option<&'a TargetedId>
where
    I: IntoIterator<Item = &'a TargetedId>,
    T: ConfigTarget,
{
    let mut best: Option<(&'a TargetedId, i8)> = None;
    for candidate in candidates {
        let level = candidate.match_level(target);
        if level < 0 {
            continue;
        }
        if best.map_or(true, |(_, held)| level > held) {
            best = Some((candidate, level));
        }
    }
    if let Some((winner, level)) = best {
        tracing::trace!(
            declared = target.declared_id(),
            winner = %winner,
            level,
            "configuration candidate selected"
        );
    }
    best.map(|(winner, _)| winner)
}
