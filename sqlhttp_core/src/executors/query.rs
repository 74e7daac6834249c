use crate::cache::ConnectionCache;
use crate::decoder::decode;
use crate::envelope::{Outcome, QueryResult};
use crate::error::Error::StatementRejected;
use crate::error::Result;
use sqlhttp_driver::Identity;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Runs statements with read semantics and materializes their rows.
#[derive(Debug)]
pub struct QueryExecutor {
    cache: Arc<ConnectionCache>,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(cache: Arc<ConnectionCache>) -> Self {
        Self { cache }
    }

    /// Execute a read statement; the statement is passed to the database verbatim.
    #[instrument(level = "debug", skip_all, fields(database = identity.database()))]
    pub async fn execute(&self, identity: &Identity, sql: &str) -> Outcome {
        match self.fetch(identity, sql).await {
            Ok(result) => Outcome::ok(result),
            Err(error) => {
                warn!("{error}");
                Outcome::from(error)
            }
        }
    }

    async fn fetch(&self, identity: &Identity, sql: &str) -> Result<QueryResult> {
        let connection = self.cache.acquire(identity).await?;
        let cursor = connection.query(sql).await.map_err(StatementRejected)?;
        let (columns, rows) = decode(cursor).await?;
        Ok(QueryResult::rows(columns, rows))
    }
}
