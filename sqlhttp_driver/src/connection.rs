use crate::Error::{ConversionError, Unsupported};
use crate::Value;
use crate::error::Result;
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;

/// A single row of a query result
pub type Row = Vec<Value>;

/// Cursor over the rows of a query.
///
/// Resources held by the cursor are released when it is dropped.
#[async_trait]
pub trait QueryResult: Debug + Send + Sync {
    fn columns(&self) -> &[String];

    /// Advance to the next row.
    ///
    /// # Errors
    /// * If the row cannot be read or converted
    async fn next(&mut self) -> Result<Option<&Row>>;
}

/// In-memory query result
#[derive(Clone, Debug, Default)]
pub struct MemoryQueryResult {
    columns: Vec<String>,
    row_index: usize,
    rows: Vec<Row>,
}

impl MemoryQueryResult {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            row_index: 0,
            rows,
        }
    }
}

#[async_trait]
impl QueryResult for MemoryQueryResult {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<&Row>> {
        if self.row_index >= self.rows.len() {
            return Ok(None);
        }
        let row = &self.rows[self.row_index];
        self.row_index += 1;
        Ok(Some(row))
    }
}

/// Metadata reported by the database after a mutation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    // wide enough for both signed (sqlite rowid) and unsigned (mysql) identity values
    last_insert_id: Option<i128>,
    rows_affected: u64,
}

impl ExecuteResult {
    #[must_use]
    pub fn new(last_insert_id: Option<i64>, rows_affected: u64) -> Self {
        Self {
            last_insert_id: last_insert_id.map(i128::from),
            rows_affected,
        }
    }

    /// Result for databases reporting unsigned identity values.
    #[must_use]
    pub fn with_unsigned_last_insert_id(last_insert_id: u64, rows_affected: u64) -> Self {
        Self {
            last_insert_id: Some(i128::from(last_insert_id)),
            rows_affected,
        }
    }

    /// The identity value generated by the statement.
    ///
    /// # Errors
    /// * If the driver does not report generated identity values
    /// * If the value does not fit in an `i64`
    pub fn last_insert_id(&self) -> Result<i64> {
        let Some(last_insert_id) = self.last_insert_id else {
            return Err(Unsupported(
                "LastInsertId is not supported by this driver".to_string(),
            ));
        };
        i64::try_from(last_insert_id)
            .map_err(|_| ConversionError(format!("last insert id {last_insert_id} overflows i64")))
    }

    /// The number of rows changed by the statement.
    ///
    /// # Errors
    /// * If the count does not fit in an `i64`
    pub fn rows_affected(&self) -> Result<i64> {
        let rows_affected = self.rows_affected;
        i64::try_from(rows_affected)
            .map_err(|_| ConversionError(format!("rows affected {rows_affected} overflows i64")))
    }
}

/// Shared handle to a database.
///
/// A handle is used by many requests at once, so every operation takes `&self`; drivers rely on
/// their own pooling for concurrent use.
#[automock]
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    /// Check that the database is reachable and accepts the credentials.
    async fn ping(&self) -> Result<()>;

    /// Execute a statement with mutation semantics.
    async fn execute(&self, sql: &str) -> Result<ExecuteResult>;

    /// Execute a statement with read semantics.
    async fn query(&self, sql: &str) -> Result<Box<dyn QueryResult>>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
