use crate::error::Result;
use crate::{Connection, Endpoint, Identity};
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;
use std::sync::Arc;

#[automock]
#[async_trait]
pub trait Driver: Debug + Send + Sync {
    fn identifier(&self) -> &'static str;

    /// Build the connection URL for an identity using this driver's conventions.
    ///
    /// # Errors
    /// * If the identity cannot be expressed as a URL for this driver
    fn url(&self, identity: &Identity, endpoint: &Endpoint) -> Result<String>;

    /// Construct a handle for the URL without contacting the database.
    ///
    /// # Errors
    /// * If the URL is not valid for this driver
    async fn connect(&self, url: &str) -> Result<Arc<dyn Connection>>;
}
