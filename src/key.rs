//! Key and value types for the weighted TTL store (§3, §4.4).

use std::sync::Arc;

use crate::memory_estimator::MemoryEstimator;

/// Tenant namespace. The empty string is a valid, distinct tenant (§3).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryId(Arc<str>);

impl RepositoryId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RepositoryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RepositoryId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl MemoryEstimator for RepositoryId {
    fn estimate_memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.0.len()
    }
}

/// Opaque content-addressed object identifier, or a reference's derived `"r:" + name` id.
///
/// Equality is by byte content (§3). `heap_size()` feeds the weigher (§4.1).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(Arc<[u8]>);

impl ObjId {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn heap_size(&self) -> usize {
        self.0.len()
    }

    /// Derives the reference keyspace id `"r:" + name` (§3 invariant 5).
    ///
    /// A content hash is fixed-width binary, never valid UTF-8 text shaped like
    /// `r:<name>`, so this can never collide with a real object id.
    pub fn for_reference(name: &str) -> Self {
        let mut bytes = Vec::with_capacity(2 + name.len());
        bytes.extend_from_slice(b"r:");
        bytes.extend_from_slice(name.as_bytes());
        Self::new(bytes)
    }
}

impl From<&[u8]> for ObjId {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<Vec<u8>> for ObjId {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl MemoryEstimator for ObjId {
    fn estimate_memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.0.len()
    }
}

/// Composite cache key: `(repository-id, object-id)`.
///
/// Equality and hashing never depend on the entry's expiry (§4.4) — this struct simply
/// doesn't carry one; expiry lives alongside the value in [`crate::store::StoredEntry`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repo: RepositoryId,
    pub id: ObjId,
}

impl CacheKey {
    pub fn new(repo: RepositoryId, id: ObjId) -> Self {
        Self { repo, id }
    }

    pub fn for_reference(repo: RepositoryId, name: &str) -> Self {
        Self::new(repo, ObjId::for_reference(name))
    }
}

impl MemoryEstimator for CacheKey {
    fn estimate_memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.repo.0.len() + self.id.heap_size()
    }
}

/// A cache value: either an opaque encoded payload, or the negative sentinel (§3, §9).
///
/// Modeled as a tagged variant rather than a byte-identity constant: equality here is by
/// *tag*, never by comparing bytes against a magic constant, which is the property §9 asks
/// implementations in systems languages to preserve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheValue {
    /// An encoded object or reference payload.
    Present(Arc<[u8]>),
    /// Records that the persistent store is known to lack this key.
    Negative,
}

impl CacheValue {
    pub fn is_negative(&self) -> bool {
        matches!(self, CacheValue::Negative)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CacheValue::Present(bytes) => Some(bytes),
            CacheValue::Negative => None,
        }
    }
}

impl MemoryEstimator for CacheValue {
    fn estimate_memory(&self) -> usize {
        std::mem::size_of::<Self>()
            + match self {
                CacheValue::Present(bytes) => bytes.len(),
                CacheValue::Negative => 0,
            }
    }
}
