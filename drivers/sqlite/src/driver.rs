use crate::results::SqliteQueryResult;
use async_trait::async_trait;
use sqlhttp_driver::Error::{InvalidUrl, IoError};
use sqlhttp_driver::{Endpoint, ExecuteResult, Identity, QueryResult, Result};
use sqlx::Connection as _;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Column, Executor, Row, SqlitePool, Statement};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

const MEMORY_DATABASE: &str = ":memory:";
const MEMORY_URL: &str = "sqlite::memory:";
/// Characters that would let a database name escape the data directory or be read as url options.
const RESERVED_CHARACTERS: [char; 6] = ['/', '\\', '?', '#', '%', '\0'];

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl sqlhttp_driver::Driver for Driver {
    fn identifier(&self) -> &'static str {
        "sqlite"
    }

    /// The database name is a file name inside the endpoint's data directory; credentials are
    /// not used by `SQLite`.
    fn url(&self, identity: &Identity, endpoint: &Endpoint) -> Result<String> {
        let database = identity.database();
        if database == MEMORY_DATABASE {
            return Ok(MEMORY_URL.to_string());
        }
        if database.is_empty()
            || database == "."
            || database == ".."
            || database.contains(RESERVED_CHARACTERS)
        {
            return Err(InvalidUrl(format!(
                "invalid sqlite database name: {database:?}"
            )));
        }

        let path = endpoint.data_dir().join(database);
        Ok(format!("sqlite://{}", path.display()))
    }

    async fn connect(&self, url: &str) -> Result<Arc<dyn sqlhttp_driver::Connection>> {
        let connection = Connection::new(url)?;
        Ok(Arc::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    pool: SqlitePool,
}

impl Connection {
    /// Creates a handle for the database file; the file is opened (and created if missing) on
    /// first use.
    ///
    /// # Errors
    /// if the url is not a valid `SQLite` url.
    pub fn new(url: &str) -> Result<Connection> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|error| InvalidUrl(error.to_string()))?
            .create_if_missing(true);
        let pool_options = if url == MEMORY_URL {
            // an in-memory database only lives as long as one of its connections
            SqlitePoolOptions::new().idle_timeout(None).max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_lazy_with(options);
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

    async fn execute(&self, sql: &str) -> Result<ExecuteResult> {
        let result = (&self.pool)
            .execute(sql)
            .await
            .map_err(|error| IoError(error.to_string()))?;
        Ok(ExecuteResult::new(
            Some(result.last_insert_rowid()),
            result.rows_affected(),
        ))
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

        let query_result = SqliteQueryResult::new(columns, query_rows);
        Ok(Box::new(query_result))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
