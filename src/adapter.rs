//! The coherence boundary: wraps a [`Persistence`] with a [`CacheBackend`] so that reads
//! check the cache first and writes keep it in sync (§4.5).
//!
//! This is the only component that calls both collaborators. Every method here mirrors one
//! underlying persistence operation; nothing here ever changes what a caller observes beyond
//! latency, since a cache failure never masks or replaces a persistence result.

use std::marker::PhantomData;

use crate::backend::{CacheBackend, Lookup};
use crate::errors::NotFound;
use crate::key::{ObjId, RepositoryId};
use crate::object::ObjectMeta;
use crate::persistence::Persistence;
use crate::reference::Reference;

/// A [`Persistence`] implementation backed by a direct delegate plus a [`CacheBackend`].
pub struct CachingPersistence<P, B, Obj, Kind> {
    persistence: P,
    backend: B,
    _marker: PhantomData<(Obj, Kind)>,
}

impl<P, B, Obj, Kind> CachingPersistence<P, B, Obj, Kind>
where
    P: Persistence<Obj, Kind>,
    B: CacheBackend<Obj, Kind>,
    Obj: ObjectMeta<Kind> + Clone,
{
    pub fn new(persistence: P, backend: B) -> Self {
        Self {
            persistence,
            backend,
            _marker: PhantomData,
        }
    }

    /// Exposes the wrapped backend, e.g. for a caller that wants to report its [`CacheStats`](crate::stats::CacheStats).
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<P, B, Obj, Kind> Persistence<Obj, Kind> for CachingPersistence<P, B, Obj, Kind>
where
    P: Persistence<Obj, Kind>,
    B: CacheBackend<Obj, Kind>,
    Obj: ObjectMeta<Kind> + Clone,
{
    type Error = P::Error;

    fn get_obj(&self, repo: &str, id: &ObjId, kind: &Kind) -> Result<Obj, Self::Error> {
        let repo_id = RepositoryId::from(repo);
        match self.backend.get(&repo_id, id) {
            Ok(Lookup::Hit(obj)) => return Ok(obj),
            Ok(Lookup::NegativeHit) => {
                tracing::debug!(repo, "translating negative cache sentinel into not-found error");
                return Err(P::Error::not_found());
            }
            Ok(Lookup::Miss) => {}
            Err(error) => {
                tracing::debug!(%error, "cache decode failure, falling through to persistence");
            }
        }
        match self.persistence.get_obj(repo, id, kind) {
            Ok(obj) => {
                self.backend.stats().record_load();
                if let Err(error) = self.backend.put_local(&repo_id, &obj) {
                    tracing::debug!(%error, "failed to populate cache after load");
                }
                Ok(obj)
            }
            Err(error) => {
                if error.is_not_found() {
                    tracing::trace!(repo, "caching negative result");
                    self.backend.put_negative(&repo_id, id, kind);
                }
                Err(error)
            }
        }
    }

    fn get_objs(&self, repo: &str, ids: &[ObjId], kind: &Kind) -> Vec<Result<Obj, Self::Error>> {
        let repo_id = RepositoryId::from(repo);
        let mut results: Vec<Option<Result<Obj, Self::Error>>> = Vec::with_capacity(ids.len());
        let mut miss_indices = Vec::new();
        let mut miss_ids = Vec::new();

        for id in ids {
            match self.backend.get(&repo_id, id) {
                Ok(Lookup::Hit(obj)) => results.push(Some(Ok(obj))),
                Ok(Lookup::NegativeHit) => results.push(Some(Err(P::Error::not_found()))),
                Ok(Lookup::Miss) => {
                    miss_indices.push(results.len());
                    miss_ids.push(id.clone());
                    results.push(None);
                }
                Err(_) => {
                    miss_indices.push(results.len());
                    miss_ids.push(id.clone());
                    results.push(None);
                }
            }
        }

        if !miss_ids.is_empty() {
            // One batch call to the underlying store for every miss, preserving its own
            // ordering and partial-result semantics over that sub-batch (§4.5).
            let fetched = self.persistence.get_objs(repo, &miss_ids, kind);
            for (slot, result) in miss_indices.into_iter().zip(fetched.into_iter()) {
                match &result {
                    Ok(obj) => {
                        self.backend.stats().record_load();
                        let _ = self.backend.put_local(&repo_id, obj);
                    }
                    Err(error) if error.is_not_found() => {
                        self.backend.put_negative(&repo_id, &ids[slot], kind);
                    }
                    Err(_) => {}
                }
                results[slot] = Some(result);
            }
        }

        results
            .into_iter()
            .map(|slot| slot.expect("every index is filled by either the cache pass or the batch pass"))
            .collect()
    }

    fn write_obj(&self, repo: &str, obj: &Obj) -> Result<(), Self::Error> {
        self.persistence.write_obj(repo, obj)?;
        let repo_id = RepositoryId::from(repo);
        if let Err(error) = self.backend.put(&repo_id, obj) {
            tracing::debug!(%error, "failed to refresh cache after write");
        }
        Ok(())
    }

    fn delete_obj(&self, repo: &str, id: &ObjId) -> Result<(), Self::Error> {
        self.persistence.delete_obj(repo, id)?;
        let repo_id = RepositoryId::from(repo);
        self.backend.remove(&repo_id, id);
        Ok(())
    }

    fn find_reference(&self, repo: &str, name: &str) -> Result<Reference, Self::Error> {
        let repo_id = RepositoryId::from(repo);
        match self.backend.get_reference(&repo_id, name) {
            Ok(Lookup::Hit(reference)) => return Ok(reference),
            Ok(Lookup::NegativeHit) => {
                tracing::debug!(repo, name, "translating negative reference sentinel into not-found error");
                return Err(P::Error::not_found());
            }
            Ok(Lookup::Miss) => {}
            Err(error) => {
                tracing::debug!(%error, "cache decode failure, falling through to persistence");
            }
        }
        match self.persistence.find_reference(repo, name) {
            Ok(reference) => {
                self.backend.stats().record_load();
                if let Err(error) = self.backend.put_reference_local(&repo_id, &reference) {
                    tracing::debug!(%error, "failed to cache reference after load");
                }
                Ok(reference)
            }
            Err(error) => {
                if error.is_not_found() {
                    self.backend.put_reference_negative(&repo_id, name);
                }
                Err(error)
            }
        }
    }

    fn write_reference(&self, repo: &str, reference: &Reference) -> Result<(), Self::Error> {
        self.persistence.write_reference(repo, reference)?;
        let repo_id = RepositoryId::from(repo);
        if let Err(error) = self.backend.put_reference(&repo_id, reference) {
            tracing::debug!(%error, "failed to refresh reference cache after write");
        }
        Ok(())
    }

    fn update_reference(&self, repo: &str, reference: &Reference) -> Result<(), Self::Error> {
        self.persistence.update_reference(repo, reference)?;
        let repo_id = RepositoryId::from(repo);
        if let Err(error) = self.backend.put_reference(&repo_id, reference) {
            tracing::debug!(%error, "failed to refresh reference cache after update");
        }
        Ok(())
    }

    fn delete_reference(&self, repo: &str, name: &str) -> Result<(), Self::Error> {
        self.persistence.delete_reference(repo, name)?;
        let repo_id = RepositoryId::from(repo);
        self.backend.remove_reference(&repo_id, name);
        Ok(())
    }
}
