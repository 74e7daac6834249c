use crate::error::Error::ScanFailed;
use crate::error::Result;
use sqlhttp_driver::{QueryResult, Row};

/// Materialize a cursor into its column names and every row, in cursor order.
///
/// The cursor is consumed and released on return, whether it was exhausted or failed. A failure
/// discards the rows read so far.
///
/// # Errors
/// * If a row cannot be read from the cursor
/// * If a row's width differs from the number of columns
pub async fn decode(mut cursor: Box<dyn QueryResult>) -> Result<(Vec<String>, Vec<Row>)> {
    let columns = cursor.columns().to_vec();
    let mut rows = Vec::new();

    while let Some(row) = cursor
        .next()
        .await
        .map_err(|error| ScanFailed(error.to_string()))?
    {
        if row.len() != columns.len() {
            return Err(ScanFailed(format!(
                "row {} has {} values for {} columns",
                rows.len(),
                row.len(),
                columns.len()
            )));
        }
        rows.push(row.clone());
    }

    Ok((columns, rows))
}
