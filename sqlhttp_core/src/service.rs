use crate::cache::ConnectionCache;
use crate::configuration::Configuration;
use crate::envelope::{Outcome, QueryResult};
use crate::error::Error::LivenessCheckFailed;
use crate::executors::{CommandExecutor, QueryExecutor};
use sqlhttp_driver::{DriverManager, Endpoint, Identity};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Entry point for the request gateway: owns the connection cache and the executors running on
/// top of it.
#[derive(Debug)]
pub struct Service {
    cache: Arc<ConnectionCache>,
    query_executor: QueryExecutor,
    command_executor: CommandExecutor,
}

impl Service {
    #[must_use]
    pub fn new(cache: ConnectionCache) -> Self {
        let cache = Arc::new(cache);
        Self {
            query_executor: QueryExecutor::new(Arc::clone(&cache)),
            command_executor: CommandExecutor::new(Arc::clone(&cache)),
            cache,
        }
    }

    /// Create a service using the drivers enabled for this build.
    #[must_use]
    pub fn from_configuration(configuration: &Configuration) -> Self {
        let driver_manager = sqlhttp_drivers::initialize();
        Self::with_driver_manager(configuration, driver_manager)
    }

    #[must_use]
    pub fn with_driver_manager(
        configuration: &Configuration,
        driver_manager: DriverManager,
    ) -> Self {
        if driver_manager.get(&configuration.driver).is_none() {
            warn!(
                "driver {:?} is not available; every request will fail",
                configuration.driver
            );
        }
        let endpoint = Endpoint::new(configuration.host.as_str())
            .with_port(configuration.port)
            .with_data_dir(&configuration.data_dir);
        let cache = ConnectionCache::new(driver_manager, configuration.driver.as_str(), endpoint)
            .with_max_connections(configuration.max_connections);
        Self::new(cache)
    }

    #[must_use]
    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }

    /// Run a read statement.
    #[instrument(level = "info", skip_all, fields(database = identity.database()))]
    pub async fn query(&self, identity: &Identity, sql: &str) -> Outcome {
        info!("query {sql:?}");
        let start = Instant::now();
        let outcome = self.query_executor.execute(identity, sql).await;
        info!(
            status = outcome.status_code(),
            "query rendered in {:?}",
            start.elapsed()
        );
        outcome
    }

    /// Run a mutation statement.
    #[instrument(level = "info", skip_all, fields(database = identity.database()))]
    pub async fn exec(&self, identity: &Identity, sql: &str) -> Outcome {
        info!("exec {sql:?}");
        let start = Instant::now();
        let outcome = self.command_executor.execute(identity, sql).await;
        info!(
            status = outcome.status_code(),
            "exec rendered in {:?}",
            start.elapsed()
        );
        outcome
    }

    /// Acquire the handle for `identity` and check that it still answers.
    #[instrument(level = "info", skip_all, fields(database = identity.database()))]
    pub async fn ping(&self, identity: &Identity) -> Outcome {
        let start = Instant::now();
        let result = match self.cache.acquire(identity).await {
            Ok(connection) => connection.ping().await.map_err(LivenessCheckFailed),
            Err(error) => Err(error),
        };
        let outcome = match result {
            Ok(()) => Outcome::ok(QueryResult::default()),
            Err(error) => {
                warn!("{error}");
                Outcome::from(error)
            }
        };
        info!(
            status = outcome.status_code(),
            "ping done in {:?}",
            start.elapsed()
        );
        outcome
    }

    /// Close every cached handle.
    pub async fn shutdown(&self) {
        info!("closing {} cached database handles", self.cache.len());
        self.cache.close_all().await;
    }
}
