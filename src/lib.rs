//! A weighted, TTL-based object and reference cache for a version-control-style
//! persistence layer.
//!
//! The cache sits in front of an arbitrary [`persistence::Persistence`] implementation,
//! keyed by `(repository, object-id)` so that unrelated tenants never share or evict each
//! other's entries. Per-kind policies decide how long a found object stays cached and how
//! long a "not found" result is remembered; a separate, optionally-disabled sub-cache does
//! the same for named references (branches and tags). A capacity is enforced by total
//! encoded-byte weight, not entry count, and entries whose policy marks them unlimited never
//! count against a TTL clock.
//!
//! The [`backend::CacheBackend`] trait is the cache's own surface: lookup, insert, remove,
//! and repository-scoped clear, for both objects and references. Most callers won't use it
//! directly — [`adapter::CachingPersistence`] wraps a [`persistence::Persistence`] and a
//! [`backend::CacheBackend`] together so that reads transparently check the cache first and
//! writes populate it, matching the shape of the store it wraps.
//!
//! ```
//! use std::sync::Arc;
//! use vcscache::clock::TestClock;
//! use vcscache::config::CacheConfig;
//!
//! let config = CacheConfig::builder()
//!     .capacity_mb(64)
//!     .clock(Arc::new(TestClock::new()))
//!     .build()
//!     .expect("valid configuration");
//! assert!(config.capacity_bytes > 0);
//! ```

pub mod adapter;
pub mod backend;
pub mod clock;
pub mod config;
pub mod errors;
pub mod invalidation;
pub mod key;
pub mod kind;
pub mod memory_estimator;
pub mod noop;
pub mod object;
pub mod persistence;
pub mod reference;
pub mod stats;
pub mod store;

pub use adapter::CachingPersistence;
pub use backend::{CacheBackend, Lookup, MokaCacheBackend, ObjCodec};
pub use clock::{Clock, SystemClock, TestClock};
pub use config::{CacheConfig, CacheConfigBuilder};
pub use errors::{CacheError, NotFound};
pub use invalidation::{NoopPeerInvalidation, PeerInvalidation};
pub use key::{CacheKey, CacheValue, ObjId, RepositoryId};
pub use kind::{Expiry, KindPolicy};
pub use noop::NoopCacheBackend;
pub use object::ObjectMeta;
pub use persistence::Persistence;
pub use reference::Reference;
pub use stats::{CacheStats, MeterSink};
