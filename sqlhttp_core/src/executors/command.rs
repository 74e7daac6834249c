use crate::cache::ConnectionCache;
use crate::envelope::{Outcome, QueryResult};
use crate::error::Error::{MetadataUnavailable, StatementRejected};
use crate::error::Result;
use sqlhttp_driver::Identity;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Runs statements with mutation semantics and reports the insert id and affected row count.
#[derive(Debug)]
pub struct CommandExecutor {
    cache: Arc<ConnectionCache>,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(cache: Arc<ConnectionCache>) -> Self {
        Self { cache }
    }

    /// Execute a mutation; both metadata values are reported together or not at all.
    #[instrument(level = "debug", skip_all, fields(database = identity.database()))]
    pub async fn execute(&self, identity: &Identity, sql: &str) -> Outcome {
        match self.exec(identity, sql).await {
            Ok(result) => Outcome::ok(result),
            Err(error) => {
                warn!("{error}");
                Outcome::from(error)
            }
        }
    }

    async fn exec(&self, identity: &Identity, sql: &str) -> Result<QueryResult> {
        let connection = self.cache.acquire(identity).await?;
        let result = connection.execute(sql).await.map_err(StatementRejected)?;
        let last_insert_id = result.last_insert_id().map_err(MetadataUnavailable)?;
        let rows_affected = result.rows_affected().map_err(MetadataUnavailable)?;
        Ok(QueryResult::infos(last_insert_id, rows_affected))
    }
}
