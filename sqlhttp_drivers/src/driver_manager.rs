use sqlhttp_driver::DriverManager;
#[cfg(any(
    feature = "driver-mysql",
    feature = "driver-postgresql",
    feature = "driver-sqlite"
))]
use std::sync::Arc;
use tracing::instrument;

/// Create a driver manager holding the known drivers based on enabled features
#[must_use]
#[instrument(level = "debug")]
pub fn initialize() -> DriverManager {
    let mut driver_manager = DriverManager::new();
    #[cfg(feature = "driver-mysql")]
    driver_manager.add(Arc::new(sqlhttp_driver_mysql::Driver));
    #[cfg(feature = "driver-postgresql")]
    driver_manager.add(Arc::new(sqlhttp_driver_postgresql::Driver));
    #[cfg(feature = "driver-sqlite")]
    driver_manager.add(Arc::new(sqlhttp_driver_sqlite::Driver));
    driver_manager
}
