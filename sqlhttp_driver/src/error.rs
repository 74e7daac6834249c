pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Data type conversion error
    #[error("{0}")]
    ConversionError(String),
    /// Error when a driver for an identifier is not found
    #[error("driver not found for: {0}")]
    DriverNotFound(String),
    /// Error building a connection URL
    #[error("{0}")]
    InvalidUrl(String),
    /// IO error
    #[error("{0}")]
    IoError(String),
    /// Error when the driver does not support an operation
    #[error("{0}")]
    Unsupported(String),
}

/// Converts a [`std::io::Error`] into an [`IoError`](Error::IoError)
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IoError(error.to_string())
    }
}

/// Convert [`url::ParseError`] to [`InvalidUrl`](Error::InvalidUrl)
impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidUrl(error.to_string())
    }
}

/// Converts a [`std::num::TryFromIntError`] into a [`ConversionError`](Error::ConversionError)
impl From<std::num::TryFromIntError> for Error {
    fn from(error: std::num::TryFromIntError) -> Self {
        Error::ConversionError(error.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_std_io_error() {
        let error = std::io::Error::other("test");
        let io_error = Error::from(error);

        assert_eq!(io_error.to_string(), "test");
    }

    #[test]
    fn test_from_url_parse_error() {
        let error = url::ParseError::EmptyHost;
        let url_error = Error::from(error);

        assert!(matches!(url_error, Error::InvalidUrl(_)));
        assert_eq!(url_error.to_string(), "empty host");
    }

    #[test]
    fn test_from_try_from_int_error() {
        let error = i64::try_from(u64::MAX).expect_err("overflow");
        let conversion_error = Error::from(error);

        assert!(matches!(conversion_error, Error::ConversionError(_)));
    }

    #[test]
    fn test_driver_not_found() {
        let error = Error::DriverNotFound("foo".to_string());
        assert_eq!(error.to_string(), "driver not found for: foo");
    }
}
