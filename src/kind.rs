//! Per-object-kind expiry policy (§4.3, §9).

use crate::object::ObjectMeta;

/// Result of an expiry callback: an absolute timestamp, or one of the two sentinels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Expire at this absolute timestamp, in nanoseconds on the store's clock.
    At(i64),
    /// Never expire.
    Unlimited,
    /// Do not cache this entry at all; a write under this policy acts as a remove.
    NotCached,
}

/// Per-kind caching policy: the only source of object-specific TTL behavior.
///
/// Implemented per kind (an enum variant, a concrete type, whatever the caller's object
/// model uses) rather than registered in a global table (§9 Design Notes), so the cache
/// itself stays agnostic to the set of kinds that exist.
pub trait KindPolicy {
    /// TTL for a positively cached (found) entry. Takes the full object, not just `self`, so
    /// a policy can decide on the object's own fields (size, id, payload) rather than only
    /// on whatever was baked into the `Kind` value at construction time (spec.md/SPEC_FULL.md
    /// §4.3: `positiveExpiresAt(obj, now)`). `now_micros` is the current time in
    /// microseconds, matching the policy boundary's unit (§4.3); the cache converts to/from
    /// the store's nanosecond clock at the boundary.
    fn positive_expires_at<Obj: ObjectMeta<Self>>(&self, obj: &Obj, now_micros: i64) -> Expiry
    where
        Self: Sized;

    /// TTL for a negatively cached ("not found") entry. There is no object to consult here —
    /// a negative entry by definition has no decoded object — matching §4.3's
    /// `negativeExpiresAt(now)` exactly.
    fn negative_expires_at(&self, now_micros: i64) -> Expiry;
}

/// Converts a microsecond-domain [`Expiry`] into an absolute nanosecond timestamp for the
/// store, or `None` for [`Expiry::NotCached`] (§4.3: "Conversion must clamp UNLIMITED through
/// without arithmetic").
pub fn expiry_to_nanos(expiry: Expiry) -> Option<i64> {
    match expiry {
        Expiry::At(micros) => Some(micros.saturating_mul(1_000)),
        Expiry::Unlimited => Some(i64::MAX),
        Expiry::NotCached => None,
    }
}
