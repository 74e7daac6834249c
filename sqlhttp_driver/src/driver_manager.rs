use crate::Driver;
use crate::Error::DriverNotFound;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Manages available drivers
#[derive(Debug, Default)]
pub struct DriverManager {
    drivers: BTreeMap<&'static str, Arc<dyn Driver>>,
}

impl DriverManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new driver to the list of available drivers
    pub fn add(&mut self, driver: Arc<dyn Driver>) {
        let identifier = driver.identifier();
        debug!("registered driver {identifier}");
        let _ = self.drivers.insert(identifier, driver);
    }

    /// Get a driver by name
    #[must_use]
    pub fn get<S: AsRef<str>>(&self, identifier: S) -> Option<Arc<dyn Driver>> {
        self.drivers.get(identifier.as_ref()).cloned()
    }

    /// Get a driver by name, failing when it is not registered
    ///
    /// # Errors
    /// * If no driver is registered for the identifier
    pub fn require<S: AsRef<str>>(&self, identifier: S) -> Result<Arc<dyn Driver>> {
        let identifier = identifier.as_ref();
        self.get(identifier)
            .ok_or_else(|| DriverNotFound(identifier.to_string()))
    }

    /// Get all drivers
    #[must_use]
    pub fn drivers(&self) -> Vec<Arc<dyn Driver>> {
        self.drivers.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, MockDriver};

    const IDENTIFIER: &str = "test";

    fn mock_driver() -> Arc<dyn Driver> {
        let mut mock_driver = MockDriver::new();
        mock_driver.expect_identifier().returning(|| IDENTIFIER);
        Arc::new(mock_driver)
    }

    #[test]
    fn test_add() {
        let mut driver_manager = DriverManager::new();
        assert!(driver_manager.drivers().is_empty());

        driver_manager.add(mock_driver());

        assert_eq!(driver_manager.drivers().len(), 1);
        assert!(driver_manager.get(IDENTIFIER).is_some());
    }

    #[test]
    fn test_add_replaces_existing() {
        let mut driver_manager = DriverManager::new();
        driver_manager.add(mock_driver());
        driver_manager.add(mock_driver());
        assert_eq!(driver_manager.drivers().len(), 1);
    }

    #[test]
    fn test_require() {
        let mut driver_manager = DriverManager::new();
        driver_manager.add(mock_driver());

        assert!(driver_manager.require(IDENTIFIER).is_ok());
        let error = driver_manager.require("foo").expect_err("driver not found");
        assert!(matches!(error, Error::DriverNotFound(_)));
    }
}
