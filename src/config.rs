//! Typed cache configuration (§6, §4.9).

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::errors::CacheError;
use crate::invalidation::{NoopPeerInvalidation, PeerInvalidation};
use crate::stats::MeterSink;

pub struct CacheConfig {
    pub capacity_bytes: u64,
    pub reference_ttl_nanos: i64,
    pub reference_negative_ttl_nanos: i64,
    pub clock: Arc<dyn Clock>,
    pub invalidation: Arc<dyn PeerInvalidation>,
    pub meter_sink: Option<Arc<dyn MeterSink>>,
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Whether the positive reference sub-cache is enabled (§4.2 reference TTL rule).
    pub fn reference_cache_enabled(&self) -> bool {
        self.reference_ttl_nanos > 0
    }

    pub fn reference_negative_cache_enabled(&self) -> bool {
        self.reference_negative_ttl_nanos > 0
    }
}

/// Builds a [`CacheConfig`], validating eagerly at `build()` (§4.9) so a misconfigured cache
/// fails at construction, not on first use.
pub struct CacheConfigBuilder {
    capacity_mb: Option<u64>,
    reference_ttl_nanos: i64,
    reference_negative_ttl_nanos: i64,
    clock: Option<Arc<dyn Clock>>,
    invalidation: Option<Arc<dyn PeerInvalidation>>,
    meter_sink: Option<Arc<dyn MeterSink>>,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self {
            capacity_mb: None,
            reference_ttl_nanos: 0,
            reference_negative_ttl_nanos: 0,
            clock: None,
            invalidation: None,
            meter_sink: None,
        }
    }
}

impl CacheConfigBuilder {
    pub fn capacity_mb(mut self, capacity_mb: u64) -> Self {
        self.capacity_mb = Some(capacity_mb);
        self
    }

    pub fn reference_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.reference_ttl_nanos = ttl.as_nanos().min(i64::MAX as u128) as i64;
        self
    }

    /// Accepts a possibly-negative duration in nanoseconds directly, since §6 allows
    /// "zero or negative" to disable the sub-cache and `std::time::Duration` cannot be
    /// negative.
    pub fn reference_ttl_nanos(mut self, nanos: i64) -> Self {
        self.reference_ttl_nanos = nanos;
        self
    }

    pub fn reference_negative_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.reference_negative_ttl_nanos = ttl.as_nanos().min(i64::MAX as u128) as i64;
        self
    }

    pub fn reference_negative_ttl_nanos(mut self, nanos: i64) -> Self {
        self.reference_negative_ttl_nanos = nanos;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn invalidation(mut self, invalidation: Arc<dyn PeerInvalidation>) -> Self {
        self.invalidation = Some(invalidation);
        self
    }

    pub fn meter_sink(mut self, sink: Arc<dyn MeterSink>) -> Self {
        self.meter_sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<CacheConfig, CacheError> {
        let capacity_mb = self
            .capacity_mb
            .ok_or_else(|| CacheError::Config("capacity_mb is required".to_string()))?;
        if capacity_mb == 0 {
            return Err(CacheError::Config(
                "capacity_mb must be positive".to_string(),
            ));
        }
        let capacity_bytes = capacity_mb * 1024 * 1024;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let invalidation = self
            .invalidation
            .unwrap_or_else(|| Arc::new(NoopPeerInvalidation));

        tracing::debug!(
            capacity_bytes,
            reference_ttl_nanos = self.reference_ttl_nanos,
            reference_negative_ttl_nanos = self.reference_negative_ttl_nanos,
            "constructed cache configuration"
        );

        if let Some(sink) = &self.meter_sink {
            sink.report_capacity(capacity_bytes);
        }

        Ok(CacheConfig {
            capacity_bytes,
            reference_ttl_nanos: self.reference_ttl_nanos,
            reference_negative_ttl_nanos: self.reference_negative_ttl_nanos,
            clock,
            invalidation,
            meter_sink: self.meter_sink,
        })
    }
}
