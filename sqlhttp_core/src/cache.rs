//! Live database handles keyed by (database, username, password).
//!
//! Each identity owns a slot holding an async once-cell. The first request for an identity opens
//! and pings a handle inside the cell while concurrent requests for the same identity wait on it;
//! requests for other identities only touch their own slot. Shard locks of the map are never held
//! across an `.await`.

use crate::error::Error::{ConstructionFailed, LivenessCheckFailed};
use crate::error::Result;
use dashmap::DashMap;
use sqlhttp_driver::{Connection, DriverManager, Endpoint, Identity};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Slot {
    connection: OnceCell<Arc<dyn Connection>>,
    last_used: AtomicU64,
}

impl Slot {
    fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.connection.get()
    }
}

/// Cache of open database handles.
pub struct ConnectionCache {
    driver_manager: DriverManager,
    driver: String,
    endpoint: Endpoint,
    max_connections: Option<usize>,
    entries: DashMap<Identity, Arc<Slot>>,
    clock: AtomicU64,
}

impl ConnectionCache {
    /// Create an empty cache opening handles with the `driver` registered in `driver_manager`.
    #[must_use]
    pub fn new<S: Into<String>>(
        driver_manager: DriverManager,
        driver: S,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            driver_manager,
            driver: driver.into(),
            endpoint,
            max_connections: None,
            entries: DashMap::new(),
            clock: AtomicU64::new(0),
        }
    }

    /// Bound the number of cached handles; `None` keeps every handle for the life of the cache.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: Option<usize>) -> Self {
        self.max_connections = max_connections;
        self
    }

    #[must_use]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Return the handle cached for `identity`, opening and pinging a new one on a miss.
    ///
    /// A cached handle is returned without checking that it is still alive.
    ///
    /// # Errors
    /// * [`ConstructionFailed`] if the driver could not build a handle
    /// * [`LivenessCheckFailed`] if the new handle did not answer the ping
    #[instrument(level = "debug", skip_all, fields(database = identity.database()))]
    pub async fn acquire(&self, identity: &Identity) -> Result<Arc<dyn Connection>> {
        let slot = self
            .entries
            .entry(identity.clone())
            .or_default()
            .value()
            .clone();

        if let Some(connection) = slot.connection() {
            debug!("Used cache for database {:?}", identity.database());
            self.touch(&slot);
            return Ok(Arc::clone(connection));
        }

        match slot.connection.get_or_try_init(|| self.open(identity)).await {
            Ok(connection) => {
                let connection = Arc::clone(connection);
                self.touch(&slot);
                self.retain(identity, &slot);
                Ok(connection)
            }
            Err(error) => {
                // waiters on this slot retry the construction on the same cell, so the slot is
                // only dropped once the map and this request hold the last references to it
                let _ = self.entries.remove_if(identity, |_, existing| {
                    Arc::ptr_eq(existing, &slot)
                        && existing.connection().is_none()
                        && Arc::strong_count(existing) == 2
                });
                Err(error)
            }
        }
    }

    async fn open(&self, identity: &Identity) -> Result<Arc<dyn Connection>> {
        let driver = self
            .driver_manager
            .require(&self.driver)
            .map_err(ConstructionFailed)?;
        let url = driver
            .url(identity, &self.endpoint)
            .map_err(ConstructionFailed)?;
        let connection = driver.connect(&url).await.map_err(ConstructionFailed)?;
        connection.ping().await.map_err(LivenessCheckFailed)?;
        info!("Stored database {:?}", identity.database());
        Ok(connection)
    }

    fn touch(&self, slot: &Slot) {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        slot.last_used.store(tick, Ordering::Relaxed);
    }

    /// Keep a freshly opened slot in the map and evict the least recently used handles above
    /// capacity.
    fn retain(&self, identity: &Identity, slot: &Arc<Slot>) {
        let _ = self
            .entries
            .entry(identity.clone())
            .or_insert_with(|| Arc::clone(slot));

        let Some(max_connections) = self.max_connections else {
            return;
        };
        while self.len() > max_connections {
            let least_recently_used = self
                .entries
                .iter()
                .filter(|entry| entry.key() != identity && entry.value().connection().is_some())
                .min_by_key(|entry| entry.value().last_used.load(Ordering::Relaxed))
                .map(|entry| (entry.key().clone(), Arc::clone(entry.value())));
            let Some((evicted, evicted_slot)) = least_recently_used else {
                return;
            };
            if self
                .entries
                .remove_if(&evicted, |_, existing| Arc::ptr_eq(existing, &evicted_slot))
                .is_some()
            {
                info!("Evicted database {:?}", evicted.database());
            }
        }
    }

    /// Number of open handles in the cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().connection().is_some())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an open handle is cached for `identity`.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|entry| entry.value().connection().is_some())
    }

    /// Remove every handle from the cache and close it.
    #[instrument(level = "debug", skip(self))]
    pub async fn close_all(&self) {
        let identities: Vec<Identity> = self
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        for identity in identities {
            let Some((_, slot)) = self.entries.remove(&identity) else {
                continue;
            };
            let Some(connection) = slot.connection() else {
                continue;
            };
            if let Err(error) = connection.close().await {
                warn!("unable to close database {:?}: {error}", identity.database());
            }
        }
    }
}

impl fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("driver", &self.driver)
            .field("endpoint", &self.endpoint)
            .field("max_connections", &self.max_connections)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
