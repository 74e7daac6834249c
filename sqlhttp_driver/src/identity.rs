use std::fmt;
use std::path::{Path, PathBuf};

/// The (database name, username, password) tuple identifying a logical connection target.
///
/// Two identities referencing the same database with different credentials are distinct.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    database: String,
    username: String,
    password: String,
}

impl Identity {
    #[must_use]
    pub fn new<S: Into<String>>(database: S, username: S, password: S) -> Self {
        Self {
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Location of the database server (or, for file based drivers, the directory holding the
/// database files).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: Option<u16>,
    data_dir: PathBuf,
}

impl Endpoint {
    #[must_use]
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            data_dir: PathBuf::from("."),
        }
    }
}
