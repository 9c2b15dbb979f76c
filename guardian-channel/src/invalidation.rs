//! Cache invalidation dispatch.
//!
//! Maps event types to the read-model cache keys that must be refreshed.
//! The table decouples the channel from the shape of the cache: adding a
//! new event type requires only a table entry. Unknown types map to the
//! empty set, so protocol evolution degrades to "logged, not acted upon"
//! rather than breaking.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use guardian_core::data::GuardianEvent;
use guardian_core::traits::ReadModelCache;

/// Read-model cache keys used by the dashboard.
pub mod keys {
    /// Latest scan result.
    pub const LAST_SCAN: &str = "lastScan";
    /// Audit log entries.
    pub const AUDIT_LOG: &str = "auditLog";
    /// Aggregated health status.
    pub const HEALTH_STATUS: &str = "healthStatus";
    /// Individual health check results.
    pub const HEALTH_CHECKS: &str = "healthChecks";
}

/// Mapping from event type to the cache keys it staleness-marks.
#[derive(Debug, Clone)]
pub struct InvalidationTable {
    map: HashMap<String, Vec<String>>,
}

impl InvalidationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Adds or replaces the key set for an event type.
    pub fn insert(
        &mut self,
        kind: impl Into<String>,
        cache_keys: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.map.insert(
            kind.into(),
            cache_keys.into_iter().map(Into::into).collect(),
        );
    }

    /// Returns the cache keys mapped to an event type, empty for
    /// unknown types.
    #[must_use]
    pub fn keys_for(&self, kind: &str) -> &[String] {
        self.map.get(kind).map_or(&[], Vec::as_slice)
    }
}

impl Default for InvalidationTable {
    /// The dashboard's standard mapping.
    fn default() -> Self {
        let mut table = Self::new();
        table.insert("scan_complete", [keys::LAST_SCAN, keys::AUDIT_LOG]);
        table.insert("health_update", [keys::HEALTH_STATUS, keys::HEALTH_CHECKS]);
        table.insert("alert_received", [keys::AUDIT_LOG]);
        table.insert("security_alert", [keys::AUDIT_LOG]);
        table
    }
}

/// Applies table-driven invalidations to the external cache.
///
/// Invoked once per qualifying inbound event. The cache guarantees
/// `invalidate` to be idempotent, so duplicate dispatch is harmless.
pub struct InvalidationBridge {
    table: InvalidationTable,
    cache: Arc<dyn ReadModelCache>,
}

impl InvalidationBridge {
    /// Creates a bridge with the standard table.
    #[must_use]
    pub fn new(cache: Arc<dyn ReadModelCache>) -> Self {
        Self::with_table(InvalidationTable::default(), cache)
    }

    /// Creates a bridge with a custom table.
    #[must_use]
    pub fn with_table(table: InvalidationTable, cache: Arc<dyn ReadModelCache>) -> Self {
        Self { table, cache }
    }

    /// Dispatches the invalidations mapped to the event's type.
    pub fn apply(&self, event: &GuardianEvent) {
        let cache_keys = self.table.keys_for(&event.kind);
        if cache_keys.is_empty() {
            debug!(kind = %event.kind, "no invalidation mapping for event type");
            return;
        }
        for key in cache_keys {
            debug!(kind = %event.kind, key = %key, "invalidating read model");
            self.cache.invalidate(key);
        }
    }
}
