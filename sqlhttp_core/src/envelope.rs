//! The response body written for every request and the severity that picks its status code.

use crate::error::Error;
use serde::Serialize;
use sqlhttp_driver::Row;
use std::collections::BTreeMap;

pub const LAST_INSERT_ID: &str = "lastInsertId";
pub const ROWS_AFFECTED: &str = "rowsAffected";

/// Schema-agnostic result of a statement; absent fields are omitted from the JSON body.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infos: Option<BTreeMap<String, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    #[must_use]
    pub fn rows(columns: Vec<String>, data: Vec<Row>) -> Self {
        Self {
            columns: Some(columns),
            data: Some(data),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn infos(last_insert_id: i64, rows_affected: i64) -> Self {
        let infos = BTreeMap::from([
            (LAST_INSERT_ID.to_string(), last_insert_id),
            (ROWS_AFFECTED.to_string(), rows_affected),
        ]);
        Self {
            infos: Some(infos),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Ok,
    ClientError,
    InternalError,
}

impl Severity {
    /// HTTP status code for the severity
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Severity::Ok => 200,
            Severity::ClientError => 400,
            Severity::InternalError => 500,
        }
    }
}

/// Terminal state of a request: the response body and its severity
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub severity: Severity,
    pub result: QueryResult,
}

impl Outcome {
    #[must_use]
    pub fn ok(result: QueryResult) -> Self {
        Self {
            severity: Severity::Ok,
            result,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.severity.status_code()
    }
}

impl From<Error> for Outcome {
    fn from(error: Error) -> Self {
        Self {
            severity: error.severity(),
            result: QueryResult::error(error.to_string()),
        }
    }
}
