//! Public cache operations (§4.2): lookup/insert/remove, reference variants, sentinel
//! translation, and peer-invalidation dispatch.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::errors::CacheError;
use crate::key::{CacheKey, CacheValue, ObjId, RepositoryId};
use crate::kind::{expiry_to_nanos, KindPolicy};
use crate::object::ObjectMeta;
use crate::reference::Reference;
use crate::stats::CacheStats;
use crate::store::WeightedTtlStore;

/// Result of a cache lookup, mirroring §9's guidance to expose two hit variants rather than
/// a byte-identity sentinel at the public API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Hit(T),
    NegativeHit,
    Miss,
}

impl<T> Lookup<T> {
    pub fn is_miss(&self) -> bool {
        matches!(self, Lookup::Miss)
    }
}

/// The public cache surface (§4.2), generic over the caller's object and kind types so the
/// same backend works for any version-control-like object model.
///
/// `Obj` must be `Clone` so a decoded hit can be handed back to the caller while a copy
/// stays nowhere else (the store itself only ever holds bytes).
pub trait CacheBackend<Obj, Kind>
where
    Obj: ObjectMeta<Kind> + Clone,
{
    fn get(&self, repo: &RepositoryId, id: &ObjId) -> Result<Lookup<Obj>, CacheError>;
    fn put(&self, repo: &RepositoryId, obj: &Obj) -> Result<(), CacheError>;
    fn put_local(&self, repo: &RepositoryId, obj: &Obj) -> Result<(), CacheError>;
    fn put_negative(&self, repo: &RepositoryId, id: &ObjId, kind: &Kind);
    fn remove(&self, repo: &RepositoryId, id: &ObjId);
    fn clear(&self, repo: &RepositoryId);

    fn get_reference(&self, repo: &RepositoryId, name: &str) -> Result<Lookup<Reference>, CacheError>;
    fn put_reference(&self, repo: &RepositoryId, reference: &Reference) -> Result<(), CacheError>;
    fn put_reference_local(&self, repo: &RepositoryId, reference: &Reference) -> Result<(), CacheError>;
    fn put_reference_negative(&self, repo: &RepositoryId, name: &str);
    fn remove_reference(&self, repo: &RepositoryId, name: &str);

    fn stats(&self) -> &CacheStats;
}

/// Encodes/decodes objects and references so the backend never needs to be generic over a
/// serialization library directly; kept as a narrow trait so `MokaCacheBackend` can be
/// constructed with any codec implementation. This is the cache's codec boundary (§6); it is
/// distinct from whatever codec the underlying persistence store uses to talk to disk.
///
/// Decoding takes only `id` and `bytes`, not a kind hint: a payload produced by `encode_obj`
/// must be self-describing (it carries its own kind discriminator) for cache-stored bytes
/// specifically, so `get()` can decode a hit without the caller supplying a kind for a bare
/// existence check. §6's `deserializeObj(id, generation, bytes, hint)` signature applies to
/// decoding the underlying persistence store's own bytes, which is that store's concern, not
/// this trait's.
pub trait ObjCodec<Obj, Kind> {
    fn encode_obj(&self, obj: &Obj) -> Result<Vec<u8>, CacheError>;
    fn decode_obj(&self, id: &ObjId, bytes: &[u8]) -> Result<Obj, CacheError>;
    fn encode_reference(&self, reference: &Reference) -> Result<Vec<u8>, CacheError>;
    fn decode_reference(&self, bytes: &[u8]) -> Result<Reference, CacheError>;
}

/// The production backend: a [`WeightedTtlStore`] plus kind-policy-driven expiry, the
/// reference TTL pair, and a peer-invalidation hook.
pub struct MokaCacheBackend<Obj, Kind, C> {
    store: WeightedTtlStore,
    clock: Arc<dyn Clock>,
    reference_ttl_nanos: i64,
    reference_negative_ttl_nanos: i64,
    invalidation: Arc<dyn crate::invalidation::PeerInvalidation>,
    codec: C,
    _marker: PhantomData<(Obj, Kind)>,
}

impl<Obj, Kind, C> MokaCacheBackend<Obj, Kind, C>
where
    Obj: ObjectMeta<Kind> + Clone,
    C: ObjCodec<Obj, Kind>,
{
    pub fn new(config: &CacheConfig, codec: C) -> Self {
        let store = WeightedTtlStore::with_meter_sink(
            config.capacity_bytes,
            Arc::clone(&config.clock),
            config.meter_sink.clone(),
        );
        Self {
            store,
            clock: Arc::clone(&config.clock),
            reference_ttl_nanos: config.reference_ttl_nanos,
            reference_negative_ttl_nanos: config.reference_negative_ttl_nanos,
            invalidation: Arc::clone(&config.invalidation),
            codec,
            _marker: PhantomData,
        }
    }

    fn insert_encoded(
        &self,
        repo: &RepositoryId,
        id: &ObjId,
        value: CacheValue,
        expires_at_nanos: i64,
    ) {
        let key = CacheKey::new(repo.clone(), id.clone());
        self.store.put(key, value, expires_at_nanos);
    }
}

impl<Obj, Kind, C> CacheBackend<Obj, Kind> for MokaCacheBackend<Obj, Kind, C>
where
    Obj: ObjectMeta<Kind> + Clone,
    Kind: KindPolicy,
    C: ObjCodec<Obj, Kind>,
{
    fn get(&self, repo: &RepositoryId, id: &ObjId) -> Result<Lookup<Obj>, CacheError> {
        let key = CacheKey::new(repo.clone(), id.clone());
        match self.store.get(&key) {
            None => Ok(Lookup::Miss),
            Some(CacheValue::Negative) => Ok(Lookup::NegativeHit),
            Some(CacheValue::Present(bytes)) => {
                Ok(Lookup::Hit(self.codec.decode_obj(id, &bytes)?))
            }
        }
    }

    fn put(&self, repo: &RepositoryId, obj: &Obj) -> Result<(), CacheError> {
        self.put_local(repo, obj)?;
        tracing::trace!("dispatching peer invalidation for object write");
        self.invalidation.send_invalidation_obj(repo, &obj.id());
        Ok(())
    }

    fn put_local(&self, repo: &RepositoryId, obj: &Obj) -> Result<(), CacheError> {
        let now_micros = self.clock.now_nanos() / 1_000;
        let expiry = obj.kind().positive_expires_at(obj, now_micros);
        let Some(expires_at_nanos) = expiry_to_nanos(expiry) else {
            return Ok(());
        };
        let bytes = self.codec.encode_obj(obj)?;
        self.insert_encoded(
            repo,
            &obj.id(),
            CacheValue::Present(Arc::from(bytes)),
            expires_at_nanos,
        );
        Ok(())
    }

    fn put_negative(&self, repo: &RepositoryId, id: &ObjId, kind: &Kind) {
        let now_micros = self.clock.now_nanos() / 1_000;
        let expiry = kind.negative_expires_at(now_micros);
        match expiry_to_nanos(expiry) {
            None => self.remove(repo, id),
            Some(expires_at_nanos) => {
                self.insert_encoded(repo, id, CacheValue::Negative, expires_at_nanos)
            }
        }
    }

    fn remove(&self, repo: &RepositoryId, id: &ObjId) {
        let key = CacheKey::new(repo.clone(), id.clone());
        self.store.remove(&key);
        tracing::trace!("dispatching peer invalidation for object removal");
        self.invalidation.send_invalidation_obj(repo, id);
    }

    fn clear(&self, repo: &RepositoryId) {
        self.store.clear_repository(repo);
    }

    fn get_reference(&self, repo: &RepositoryId, name: &str) -> Result<Lookup<Reference>, CacheError> {
        if self.reference_ttl_nanos <= 0 {
            return Ok(Lookup::Miss);
        }
        let key = CacheKey::for_reference(repo.clone(), name);
        match self.store.get(&key) {
            None => Ok(Lookup::Miss),
            Some(CacheValue::Negative) => Ok(Lookup::NegativeHit),
            Some(CacheValue::Present(bytes)) => {
                Ok(Lookup::Hit(self.codec.decode_reference(&bytes)?))
            }
        }
    }

    fn put_reference(&self, repo: &RepositoryId, reference: &Reference) -> Result<(), CacheError> {
        self.put_reference_local(repo, reference)?;
        tracing::trace!("dispatching peer invalidation for reference write");
        self.invalidation.send_invalidation_ref(repo, &reference.name);
        Ok(())
    }

    fn put_reference_local(&self, repo: &RepositoryId, reference: &Reference) -> Result<(), CacheError> {
        if self.reference_ttl_nanos <= 0 {
            return Ok(());
        }
        let bytes = self.codec.encode_reference(reference)?;
        let now = self.clock.now_nanos();
        let key = CacheKey::for_reference(repo.clone(), &reference.name);
        self.store.put(
            key,
            CacheValue::Present(Arc::from(bytes)),
            now.saturating_add(self.reference_ttl_nanos),
        );
        Ok(())
    }

    fn put_reference_negative(&self, repo: &RepositoryId, name: &str) {
        if self.reference_ttl_nanos <= 0 || self.reference_negative_ttl_nanos <= 0 {
            return;
        }
        let now = self.clock.now_nanos();
        let key = CacheKey::for_reference(repo.clone(), name);
        self.store.put(
            key,
            CacheValue::Negative,
            now.saturating_add(self.reference_negative_ttl_nanos),
        );
    }

    fn remove_reference(&self, repo: &RepositoryId, name: &str) {
        if self.reference_ttl_nanos <= 0 {
            return;
        }
        let key = CacheKey::for_reference(repo.clone(), name);
        self.store.remove(&key);
        tracing::trace!("dispatching peer invalidation for reference removal");
        self.invalidation.send_invalidation_ref(repo, name);
    }

    fn stats(&self) -> &CacheStats {
        self.store.stats()
    }
}
