//! Best-effort peer invalidation hook (§4.2, §9).
//!
//! The transport itself is out of scope (§6); this module only defines the seam. It is
//! deliberately a single outbound hook, not the teacher's tag/event/dependency registry
//! (`cachelito_core::invalidation::InvalidationRegistry`) — that registry exists to let
//! independently memoized functions invalidate each other by shared tags, which has no
//! counterpart here: this cache has exactly one reason to notify peers, "this key changed."

use crate::key::{ObjId, RepositoryId};

/// Outbound notification that a key has changed, sent after the local mutation is already
/// visible (§9: "never hold the cache's internal locks while calling it").
pub trait PeerInvalidation: Send + Sync {
    fn send_invalidation_obj(&self, repo: &RepositoryId, id: &ObjId);
    fn send_invalidation_ref(&self, repo: &RepositoryId, name: &str);
}

/// Default implementation: no peers configured, so invalidation is a no-op.
#[derive(Default)]
pub struct NoopPeerInvalidation;

impl PeerInvalidation for NoopPeerInvalidation {
    fn send_invalidation_obj(&self, _repo: &RepositoryId, _id: &ObjId) {}
    fn send_invalidation_ref(&self, _repo: &RepositoryId, _name: &str) {}
}
