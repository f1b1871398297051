use std::sync::Arc;

use proptest::prelude::*;
use vcscache::backend::{CacheBackend, Lookup, MokaCacheBackend, ObjCodec};
use vcscache::clock::{Clock, TestClock};
use vcscache::config::CacheConfig;
use vcscache::errors::CacheError;
use vcscache::key::{CacheKey, CacheValue, ObjId, RepositoryId};
use vcscache::kind::{Expiry, KindPolicy};
use vcscache::object::ObjectMeta;
use vcscache::reference::Reference;

/// Always-unlimited kind, so round-trip tests never race a TTL against proptest shrinking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct UnlimitedKind;

impl KindPolicy for UnlimitedKind {
    fn positive_expires_at<Obj: ObjectMeta<Self>>(&self, _obj: &Obj, _now_micros: i64) -> Expiry {
        Expiry::Unlimited
    }

    fn negative_expires_at(&self, _now_micros: i64) -> Expiry {
        Expiry::Unlimited
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Blob {
    id: ObjId,
    body: Vec<u8>,
}

impl ObjectMeta<UnlimitedKind> for Blob {
    fn id(&self) -> ObjId {
        self.id.clone()
    }
    fn kind(&self) -> &UnlimitedKind {
        &UnlimitedKind
    }
}

struct RawCodec;

impl ObjCodec<Blob, UnlimitedKind> for RawCodec {
    fn encode_obj(&self, obj: &Blob) -> Result<Vec<u8>, CacheError> {
        Ok(obj.body.clone())
    }
    fn decode_obj(&self, id: &ObjId, bytes: &[u8]) -> Result<Blob, CacheError> {
        Ok(Blob { id: id.clone(), body: bytes.to_vec() })
    }
    fn encode_reference(&self, reference: &Reference) -> Result<Vec<u8>, CacheError> {
        let mut bytes = reference.pointer_id.as_bytes().to_vec();
        bytes.push(0);
        bytes.extend_from_slice(reference.name.as_bytes());
        Ok(bytes)
    }
    fn decode_reference(&self, bytes: &[u8]) -> Result<Reference, CacheError> {
        let split = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| CacheError::Encoding("missing separator".to_string()))?;
        let pointer_id = ObjId::from(bytes[..split].to_vec());
        let name = String::from_utf8(bytes[split + 1..].to_vec())
            .map_err(|e| CacheError::Encoding(e.to_string()))?;
        Ok(Reference::new(name, pointer_id, 0))
    }
}

fn unlimited_backend() -> MokaCacheBackend<Blob, UnlimitedKind, RawCodec> {
    let config = CacheConfig::builder()
        .capacity_mb(16)
        .clock(Arc::new(TestClock::new()) as Arc<dyn Clock>)
        .build()
        .unwrap();
    MokaCacheBackend::new(&config, RawCodec)
}

proptest! {
    // §4.4: key equality and hashing never depend on expiry — only (repo, id) participate
    // in `CacheKey`, so this holds trivially by construction, but pins the invariant down
    // against arbitrary repo/id pairs rather than the fixed examples in src/key.rs.
    #[test]
    fn key_equality_ignores_any_payload(
        repo in "[a-z0-9]{0,16}",
        id in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let k1 = CacheKey::new(RepositoryId::from(repo.as_str()), ObjId::from(id.clone()));
        let k2 = CacheKey::new(RepositoryId::from(repo.as_str()), ObjId::from(id));
        prop_assert_eq!(&k1, &k2);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        k1.hash(&mut h1);
        k2.hash(&mut h2);
        prop_assert_eq!(h1.finish(), h2.finish());
    }

    // §9: the negative sentinel is a distinct tag, never equal to a `Present` value
    // regardless of what bytes that value happens to hold (including empty bytes).
    #[test]
    fn negative_sentinel_never_equals_a_present_value(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let present = CacheValue::Present(Arc::from(bytes));
        prop_assert_ne!(present, CacheValue::Negative);
    }

    // Two `Present` values are equal exactly when their bytes are equal.
    #[test]
    fn present_equality_is_byte_equality(
        a in proptest::collection::vec(any::<u8>(), 0..64),
        b in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let expect_eq = a == b;
        let va = CacheValue::Present(Arc::from(a));
        let vb = CacheValue::Present(Arc::from(b));
        prop_assert_eq!(va == vb, expect_eq);
    }

    // `ObjId::for_reference` is injective over names: distinct names never derive the same
    // reference-keyspace id (§3 invariant 5).
    #[test]
    fn reference_ids_are_injective_over_distinct_names(
        a in "[a-zA-Z0-9/_-]{1,24}",
        b in "[a-zA-Z0-9/_-]{1,24}",
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(ObjId::for_reference(&a), ObjId::for_reference(&b));
    }

    // spec.md §8 round-trip law: for any object whose kind policy is not NOT_CACHED,
    // `putLocal(r, o); get(r, o.id)` returns a value deserialization-equal to `o`.
    #[test]
    fn put_local_then_get_round_trips_over_arbitrary_objects(
        repo in "[a-z0-9]{1,16}",
        id in proptest::collection::vec(any::<u8>(), 1..32),
        body in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let cache = unlimited_backend();
        let r = RepositoryId::from(repo.as_str());
        let obj = Blob { id: ObjId::from(id), body };
        cache.put_local(&r, &obj).unwrap();
        prop_assert_eq!(cache.get(&r, &obj.id).unwrap(), Lookup::Hit(obj));
    }

    // spec.md §8 round-trip law: for any reference with positive TTL enabled,
    // `putReferenceLocal(r, ref); getReference(r, ref.name)` returns a value
    // deserialization-equal to `ref`.
    #[test]
    fn put_reference_local_then_get_round_trips_over_arbitrary_references(
        repo in "[a-z0-9]{1,16}",
        name in "[a-zA-Z0-9/_-]{1,24}",
        pointer_id in proptest::collection::vec(any::<u8>(), 1..32),
        generation in any::<u64>(),
    ) {
        let cache = unlimited_backend();
        let r = RepositoryId::from(repo.as_str());
        // `extended_info` is not carried by `RawCodec`'s wire format, so the round trip is
        // only asserted over the fields the codec actually encodes (name, pointer id).
        let reference = Reference::new(name.clone(), ObjId::from(pointer_id), generation);
        cache.put_reference_local(&r, &reference).unwrap();
        match cache.get_reference(&r, &name).unwrap() {
            Lookup::Hit(found) => {
                prop_assert_eq!(found.name, reference.name);
                prop_assert_eq!(found.pointer_id, reference.pointer_id);
            }
            other => prop_assert!(false, "expected a hit, got {:?}", other),
        }
    }
}
