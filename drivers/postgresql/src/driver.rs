use crate::results::PostgreSqlQueryResult;
use async_trait::async_trait;
use sqlhttp_driver::Error::{InvalidUrl, IoError};
use sqlhttp_driver::{Endpoint, ExecuteResult, Identity, QueryResult, Result};
use sqlx::Connection as _;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Column, Executor, PgPool, Row, Statement};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl sqlhttp_driver::Driver for Driver {
    fn identifier(&self) -> &'static str {
        "postgresql"
    }

    fn url(&self, identity: &Identity, endpoint: &Endpoint) -> Result<String> {
        sqlhttp_driver::server_url("postgresql", identity, endpoint)
    }

    async fn connect(&self, url: &str) -> Result<Arc<dyn sqlhttp_driver::Connection>> {
        let connection = Connection::new(url)?;
        Ok(Arc::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    pool: PgPool,
}

impl Connection {
    /// Creates a handle for the `PostgreSQL` database; no connection is opened until first use.
    ///
    /// # Errors
    /// if the url is not a valid `PostgreSQL` url.
    pub fn new(url: &str) -> Result<Connection> {
        let options =
            PgConnectOptions::from_str(url).map_err(|error| InvalidUrl(error.to_string()))?;
        let pool = PgPoolOptions::new().connect_lazy_with(options);
        Ok(Connection { pool })
    }

    async fn describe_columns(&self, sql: &str) -> Vec<String> {
        match self.pool.prepare(sql).await {
            Ok(statement) => statement
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            Err(error) => {
                debug!("unable to describe columns: {error}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl sqlhttp_driver::Connection for Connection {
    async fn ping(&self) -> Result<()> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| IoError(error.to_string()))?;
        connection
            .ping()
            .await
            .map_err(|error| IoError(error.to_string()))
    }

    /// `PostgreSQL` does not report generated keys for a plain statement, so the result never
    /// carries a last insert id.
    async fn execute(&self, sql: &str) -> Result<ExecuteResult> {
        let result = (&self.pool)
            .execute(sql)
            .await
            .map_err(|error| IoError(error.to_string()))?;
        Ok(ExecuteResult::new(None, result.rows_affected()))
    }

    async fn query(&self, sql: &str) -> Result<Box<dyn QueryResult>> {
        let query_rows = (&self.pool)
            .fetch_all(sql)
            .await
            .map_err(|error| IoError(error.to_string()))?;
        let columns: Vec<String> = match query_rows.first() {
            Some(row) => row
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            None => self.describe_columns(sql).await,
        };

        let query_result = PostgreSqlQueryResult::new(columns, query_rows);
        Ok(Box::new(query_result))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
