//! Degenerate backend: always misses, never stores anything (§4.6).
//!
//! Useful as a drop-in when caching should be disabled entirely without changing call sites
//! that expect a [`crate::backend::CacheBackend`] — a caller composes with the adapter the
//! same way whether the backend is a real [`crate::backend::MokaCacheBackend`] or this one.

use crate::backend::{CacheBackend, Lookup};
use crate::errors::CacheError;
use crate::key::{ObjId, RepositoryId};
use crate::object::ObjectMeta;
use crate::reference::Reference;
use crate::stats::CacheStats;

pub struct NoopCacheBackend {
    stats: CacheStats,
}

impl NoopCacheBackend {
    pub fn new() -> Self {
        Self {
            stats: CacheStats::new(),
        }
    }
}

impl Default for NoopCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl<Obj, Kind> CacheBackend<Obj, Kind> for NoopCacheBackend
where
    Obj: ObjectMeta<Kind> + Clone,
{
    fn get(&self, _repo: &RepositoryId, _id: &ObjId) -> Result<Lookup<Obj>, CacheError> {
        self.stats.record_miss();
        Ok(Lookup::Miss)
    }

    fn put(&self, _repo: &RepositoryId, _obj: &Obj) -> Result<(), CacheError> {
        Ok(())
    }

    fn put_local(&self, _repo: &RepositoryId, _obj: &Obj) -> Result<(), CacheError> {
        Ok(())
    }

    fn put_negative(&self, _repo: &RepositoryId, _id: &ObjId, _kind: &Kind) {}

    fn remove(&self, _repo: &RepositoryId, _id: &ObjId) {}

    fn clear(&self, _repo: &RepositoryId) {}

    fn get_reference(&self, _repo: &RepositoryId, _name: &str) -> Result<Lookup<Reference>, CacheError> {
        self.stats.record_miss();
        Ok(Lookup::Miss)
    }

    fn put_reference(&self, _repo: &RepositoryId, _reference: &Reference) -> Result<(), CacheError> {
        Ok(())
    }

    fn put_reference_local(
        &self,
        _repo: &RepositoryId,
        _reference: &Reference,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    fn put_reference_negative(&self, _repo: &RepositoryId, _name: &str) {}

    fn remove_reference(&self, _repo: &RepositoryId, _name: &str) {}

    fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
