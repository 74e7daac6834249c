use async_trait::async_trait;
use sqlhttp_driver::Error::ConversionError;
use sqlhttp_driver::{QueryResult, Result, Value};
use sqlx::Row;
use sqlx::mysql::MySqlRow;

/// Query result that converts MySQL rows to values on demand
pub(crate) struct MySqlQueryResult {
    columns: Vec<String>,
    rows: Vec<MySqlRow>,
    row_index: usize,
    row_buffer: sqlhttp_driver::Row,
}

impl std::fmt::Debug for MySqlQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlQueryResult")
            .field("columns", &self.columns)
            .field("row_index", &self.row_index)
            .field("row_count", &self.rows.len())
            .finish()
    }
}

impl MySqlQueryResult {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<MySqlRow>) -> Self {
        Self {
            columns,
            rows,
            row_index: 0,
            row_buffer: Vec::new(),
        }
    }

    /// Rows arrive over the text protocol, so the raw bytes of every column are already the
    /// value's canonical text form.
    fn convert_row(row: &MySqlRow, buffer: &mut Vec<Value>) -> Result<()> {
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
impl QueryResult for MySqlQueryResult {
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
