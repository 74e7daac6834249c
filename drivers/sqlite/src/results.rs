use async_trait::async_trait;
use sqlhttp_driver::Error::ConversionError;
use sqlhttp_driver::{QueryResult, Result, Value};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Query result that converts SQLite rows to values on demand
pub(crate) struct SqliteQueryResult {
    columns: Vec<String>,
    rows: Vec<SqliteRow>,
    row_index: usize,
    row_buffer: sqlhttp_driver::Row,
}

impl std::fmt::Debug for SqliteQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteQueryResult")
            .field("columns", &self.columns)
            .field("row_index", &self.row_index)
            .field("row_count", &self.rows.len())
            .finish()
    }
}

impl SqliteQueryResult {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<SqliteRow>) -> Self {
        Self {
            columns,
            rows,
            row_index: 0,
            row_buffer: Vec::new(),
        }
    }

    /// Reading a value as a blob makes SQLite render integers and reals as text first.
    fn convert_row(row: &SqliteRow, buffer: &mut Vec<Value>) -> Result<()> {
        buffer.clear();
        for index in 0..row.len() {
            let raw = row
                .try_get_unchecked::<Option<Vec<u8>>, usize>(index)
                .map_err(|error| ConversionError(error.to_string()))?;
            buffer.push(Value::from(raw));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryResult for SqliteQueryResult {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<&sqlhttp_driver::Row>> {
        if self.row_index >= self.rows.len() {
            return Ok(None);
        }
        let row = &self.rows[self.row_index];
        self.row_index += 1;
        Self::convert_row(row, &mut self.row_buffer)?;
        Ok(Some(&self.row_buffer))
    }
}
