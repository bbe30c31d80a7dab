//! GeoIP Cache Port
//!
//! Defines the interface for caching resolved lookups by client IP.

use crate::domain::entities::GeoRecord;
use std::sync::Arc;

/// Time-bounded store of lookup results keyed by the client IP string.
///
/// This is an outbound port. Implementations provide their own
/// synchronization; callers never lock around it.
pub trait GeoCache: Send + Sync {
    /// Get a live record for a key.
    ///
    /// Returns None both for keys never written and for expired keys.
    fn get(&self, key: &str) -> Option<Arc<GeoRecord>>;

    /// Store a record, replacing any previous entry and restarting its
    /// expiration window.
    fn set(&self, key: String, record: Arc<GeoRecord>);
}
