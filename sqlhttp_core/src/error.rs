use crate::envelope::Severity;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures of a single request; every variant ends the request and is reported in the response
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The driver could not build a handle for the identity
    #[error("{0}")]
    ConstructionFailed(sqlhttp_driver::Error),
    /// The handle was built but the database did not answer
    #[error("{0}")]
    LivenessCheckFailed(sqlhttp_driver::Error),
    /// The database rejected the statement
    #[error("{0}")]
    StatementRejected(sqlhttp_driver::Error),
    /// A row of a valid result set could not be read
    #[error("{0}")]
    ScanFailed(String),
    /// Insert id or affected row count could not be retrieved
    #[error("{0}")]
    MetadataUnavailable(sqlhttp_driver::Error),
}

impl Error {
    /// Who is presumed at fault for this error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Error::ConstructionFailed(_) | Error::ScanFailed(_) => Severity::InternalError,
            Error::LivenessCheckFailed(_)
            | Error::StatementRejected(_)
            | Error::MetadataUnavailable(_) => Severity::ClientError,
        }
    }
}
