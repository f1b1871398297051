//! The underlying persistence collaborator (§1, §6 — out of scope, defined here only as the
//! trait shape [`crate::adapter::CachingPersistence`] wraps).

use crate::key::ObjId;
use crate::reference::Reference;

/// A plain (non-caching) persistence store for objects and references, scoped by
/// repository id on every operation.
///
/// `Obj` is the caller's object representation; `Kind` is the caller's per-kind policy type
/// (see [`crate::kind::KindPolicy`]). `Error` must be able to report "not found" via
/// [`crate::errors::NotFound`] so the adapter can tell a missing key apart from any other
/// failure (§7).
pub trait Persistence<Obj, Kind> {
    type Error: crate::errors::NotFound + Send + Sync + 'static;

    fn get_obj(&self, repo: &str, id: &ObjId, kind: &Kind) -> Result<Obj, Self::Error>;

    /// Batch read, preserving the underlying store's ordering and partial-result semantics
    /// (§4.5: "the adapter must preserve the underlying batch semantics").
    fn get_objs(
        &self,
        repo: &str,
        ids: &[ObjId],
        kind: &Kind,
    ) -> Vec<Result<Obj, Self::Error>>;

    fn write_obj(&self, repo: &str, obj: &Obj) -> Result<(), Self::Error>;

    fn delete_obj(&self, repo: &str, id: &ObjId) -> Result<(), Self::Error>;

    fn find_reference(&self, repo: &str, name: &str) -> Result<Reference, Self::Error>;

    fn write_reference(&self, repo: &str, reference: &Reference) -> Result<(), Self::Error>;

    fn update_reference(&self, repo: &str, reference: &Reference) -> Result<(), Self::Error>;

    fn delete_reference(&self, repo: &str, name: &str) -> Result<(), Self::Error>;
}
