use async_trait::async_trait;
use sqlhttp_driver::Error::ConversionError;
use sqlhttp_driver::{QueryResult, Result, Value};
use sqlx::Row;
use sqlx::postgres::PgRow;

/// Query result that converts PostgreSQL rows to values on demand
pub(crate) struct PostgreSqlQueryResult {
    columns: Vec<String>,
    rows: Vec<PgRow>,
    row_index: usize,
    row_buffer: sqlhttp_driver::Row,
}

impl std::fmt::Debug for PostgreSqlQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgreSqlQueryResult")
            .field("columns", &self.columns)
            .field("row_index", &self.row_index)
            .field("row_count", &self.rows.len())
            .finish()
    }
}

impl PostgreSqlQueryResult {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<PgRow>) -> Self {
        Self {
            columns,
            rows,
            row_index: 0,
            row_buffer: Vec::new(),
        }
    }

    /// Simple query protocol rows are always in text format.
    fn convert_row(row: &PgRow, buffer: &mut Vec<Value>) -> Result<()> {
        buffer.clear();
        for index in 0..row.len() {
            let text = row
                .try_get_unchecked::<Option<String>, usize>(index)
                .map_err(|error| ConversionError(error.to_string()))?;
            buffer.push(Value::from(text));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryResult for PostgreSqlQueryResult {
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
