/// Crate-wide error type.
///
/// Mirrors the error surface of whatever [`crate::persistence::Persistence`] implementation
/// the caller wraps with [`crate::adapter::CachingPersistence`]: the adapter never invents new
/// failure modes, it only adds the `Encoding` and `Config` variants that have no analogue on
/// the wrapped store.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The codec failed to encode or decode a value. Treated as an internal failure: the
    /// cache layer never retries and never partially populates on this path.
    #[error("failed to encode or decode cache payload: {0}")]
    Encoding(String),

    /// An error surfaced unchanged from the wrapped persistence store.
    #[error("persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// `CacheConfig` was built with an invalid value.
    #[error("invalid cache configuration: {0}")]
    Config(String),
}

impl CacheError {
    pub fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CacheError::Persistence(Box::new(err))
    }
}

/// Marker for "not found" style failures coming out of a wrapped persistence call.
///
/// The adapter needs to distinguish "the underlying store does not have this key" from any
/// other error in order to decide between `putNegative`/`putReferenceNegative` and simply
/// propagating the failure untouched (§7). Persistence implementations express this by
/// implementing this trait on their own error type rather than the cache defining a
/// universal "not found" error, since the exact shape of "not found" is the wrapped store's
/// business.
pub trait NotFound: std::error::Error {
    fn is_not_found(&self) -> bool;

    /// Synthesizes a "not found" error of this type without consulting the underlying
    /// store. The adapter needs this to translate a negative cache hit (§4.5) into the same
    /// error its caller would have seen on a real miss, without making a round trip just to
    /// manufacture the error value.
    fn not_found() -> Self
    where
        Self: Sized;
}
