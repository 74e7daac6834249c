use anyhow::{Result, bail};
use config::{Config, ConfigError, FileFormat};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub(crate) static DEFAULT_CONFIG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/sqlhttp.toml"));

/// A builder for creating a [Configuration] instance.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationBuilder {
    configuration: Configuration,
}

impl ConfigurationBuilder {
    #[must_use]
    pub fn new<S: Into<String>>(program_name: S, version: S) -> Self {
        let mut configuration = Configuration::default();
        configuration.program_name = program_name.into();
        configuration.version = version.into();
        Self { configuration }
    }

    /// Initialize configuration from the built-in defaults, the optional configuration file and
    /// environment variables prefixed with the upper-cased program name (e.g. `SQLHTTP_DRIVER`,
    /// `SQLHTTP_DATABASE__PORT`).
    ///
    /// # Errors
    /// * If the configuration file cannot be read or holds an invalid value
    pub fn with_config_file<P: AsRef<Path>>(mut self, config_file: Option<P>) -> Result<Self> {
        let config_file = config_file.map(|path| path.as_ref().to_path_buf());
        let file = ConfigFile::new(&self.configuration.program_name, config_file.as_deref())?;
        file.load_configuration(&mut self.configuration)?;
        self.configuration.config_file = config_file;
        Ok(self)
    }

    /// Set the driver to use.
    #[must_use]
    pub fn with_driver<S: Into<String>>(mut self, driver: S) -> Self {
        self.configuration.driver = driver.into();
        self
    }

    /// Set the address to listen on.
    #[must_use]
    pub fn with_listen<S: Into<String>>(mut self, listen: S) -> Self {
        self.configuration.listen = listen.into();
        self
    }

    /// Set the database host to use.
    #[must_use]
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.configuration.host = host.into();
        self
    }

    /// Set the database port to use.
    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.configuration.port = port;
        self
    }

    /// Set the directory holding file based databases.
    #[must_use]
    pub fn with_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.configuration.data_dir = data_dir.into();
        self
    }

    /// Set the maximum number of cached database handles.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: Option<usize>) -> Self {
        self.configuration.max_connections = max_connections;
        self
    }

    /// Set the log level to use.
    #[must_use]
    pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
        self.configuration.log_level = log_level;
        self
    }

    /// Set the log directory to use.
    #[must_use]
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, log_dir: P) -> Self {
        self.configuration.log_dir = Some(log_dir.into());
        self
    }

    /// Set the log rotation to use.
    #[must_use]
    pub fn with_log_rotation(mut self, log_rotation: Rotation) -> Self {
        self.configuration.log_rotation = log_rotation;
        self
    }

    /// Build a [Configuration] instance and install the global tracing subscriber.
    ///
    /// `RUST_LOG` directives take precedence over the configured log level. If a subscriber is
    /// already installed it is left in place.
    ///
    /// # Errors
    /// * If the log file appender cannot be created
    pub fn build(self) -> Result<Configuration> {
        let configuration = self.configuration;
        let log_level = configuration.log_level;

        if log_level != LevelFilter::OFF {
            let filter = EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy();
            let registry = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

            if let Some(log_dir) = &configuration.log_dir {
                let file_appender = RollingFileAppender::builder()
                    .rotation(configuration.log_rotation.clone())
                    .filename_prefix(&configuration.program_name)
                    .filename_suffix("log")
                    .build(log_dir)?;
                let _ = registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_ansi(false)
                            .with_writer(file_appender),
                    )
                    .try_init();
            } else {
                let _ = registry.try_init();
            }
        }

        Ok(configuration)
    }
}

/// The configuration for the application.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub program_name: String,
    pub version: String,
    pub config_file: Option<PathBuf>,
    pub driver: String,
    pub listen: String,
    pub host: String,
    pub port: Option<u16>,
    pub data_dir: PathBuf,
    pub max_connections: Option<usize>,
    pub log_level: LevelFilter,
    pub log_dir: Option<PathBuf>,
    pub log_rotation: Rotation,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            program_name: String::new(),
            version: String::new(),
            config_file: None,
            driver: "mysql".to_string(),
            listen: "0.0.0.0:6033".to_string(),
            host: "localhost".to_string(),
            port: None,
            data_dir: PathBuf::from("."),
            max_connections: None,
            log_level: LevelFilter::INFO,
            log_dir: None,
            log_rotation: Rotation::DAILY,
        }
    }
}

/// The layered configuration sources for the application.
#[derive(Clone, Debug)]
struct ConfigFile {
    config: Config,
}

impl ConfigFile {
    fn new(program_name: &str, config_file: Option<&Path>) -> Result<ConfigFile> {
        let prefix = program_name.to_uppercase().replace('-', "_");
        debug!("Configuration environment prefix: {prefix}");

        let mut builder =
            Config::builder().add_source(config::File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(config_file) = config_file {
            debug!("Configuration file: {}", config_file.display());
            builder = builder.add_source(config::File::from(config_file).format(FileFormat::Toml));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(prefix.as_str())
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(Self { config })
    }

    fn load_configuration(&self, configuration: &mut Configuration) -> Result<()> {
        let config = &self.config;

        if let Some(driver) = get(config, "driver")? {
            configuration.driver = driver;
        }
        if let Some(listen) = get(config, "listen")? {
            configuration.listen = listen;
        }
        if let Some(host) = get(config, "database.host")? {
            configuration.host = host;
        }
        if let Some(port) = get(config, "database.port")? {
            configuration.port = Some(port);
        }
        if let Some(data_dir) = get::<String>(config, "database.data_dir")? {
            configuration.data_dir = PathBuf::from(data_dir);
        }
        if let Some(max_connections) = get(config, "database.max_connections")? {
            configuration.max_connections = Some(max_connections);
        }

        if let Some(log_level) = get::<String>(config, "log.level")? {
            configuration.log_level = LevelFilter::from_str(log_level.as_str())?;
        }
        if let Some(log_dir) = get::<String>(config, "log.dir")? {
            configuration.log_dir = Some(PathBuf::from(log_dir));
        }
        if let Some(rotation) = get::<String>(config, "log.rotation")? {
            configuration.log_rotation = match rotation.as_str() {
                "minutely" => Rotation::MINUTELY,
                "hourly" => Rotation::HOURLY,
                "daily" => Rotation::DAILY,
                "never" => Rotation::NEVER,
                rotation => bail!("Invalid log.rotation: {rotation}"),
            };
        }

        Ok(())
    }
}

/// Get an optional value; a missing key is `None`, a value of the wrong type is an error.
fn get<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_configuration() {
        let configuration = Configuration::default();
        assert!(configuration.program_name.is_empty());
        assert!(configuration.version.is_empty());
        assert_eq!(configuration.config_file, None);
        assert_eq!(configuration.driver, "mysql");
        assert_eq!(configuration.listen, "0.0.0.0:6033");
        assert_eq!(configuration.host, "localhost");
        assert_eq!(configuration.port, None);
        assert_eq!(configuration.data_dir, PathBuf::from("."));
        assert_eq!(configuration.max_connections, None);
        assert_eq!(configuration.log_level, LevelFilter::INFO);
        assert_eq!(configuration.log_dir, None);
        assert_eq!(configuration.log_rotation, Rotation::DAILY);
    }

    #[test]
    fn test_configuration_builder() -> Result<()> {
        let configuration = ConfigurationBuilder::new("test", "1.2.3")
            .with_driver("sqlite")
            .with_listen("127.0.0.1:8080")
            .with_host("db.internal")
            .with_port(Some(3307))
            .with_data_dir("/var/lib/sqlhttp")
            .with_max_connections(Some(8))
            .with_log_level(LevelFilter::OFF)
            .with_log_dir("logs")
            .with_log_rotation(Rotation::HOURLY)
            .build()?;

        assert_eq!(configuration.program_name, "test");
        assert_eq!(configuration.version, "1.2.3");
        assert_eq!(configuration.driver, "sqlite");
        assert_eq!(configuration.listen, "127.0.0.1:8080");
        assert_eq!(configuration.host, "db.internal");
        assert_eq!(configuration.port, Some(3307));
        assert_eq!(configuration.data_dir, PathBuf::from("/var/lib/sqlhttp"));
        assert_eq!(configuration.max_connections, Some(8));
        assert_eq!(configuration.log_level, LevelFilter::OFF);
        assert_eq!(configuration.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(configuration.log_rotation, Rotation::HOURLY);
        Ok(())
    }

    #[test]
    fn test_default_config_file() -> Result<()> {
        let configuration = ConfigurationBuilder::new("sqlhttp_default_test", "1.0.0")
            .with_config_file(None::<&Path>)?
            .with_log_level(LevelFilter::OFF)
            .build()?;

        assert_eq!(configuration.driver, "mysql");
        assert_eq!(configuration.listen, "0.0.0.0:6033");
        assert_eq!(configuration.host, "localhost");
        assert_eq!(configuration.port, None);
        assert_eq!(configuration.max_connections, None);
        assert_eq!(configuration.log_dir, None);
        assert_eq!(configuration.log_rotation, Rotation::DAILY);
        Ok(())
    }

    #[test]
    fn test_config_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_file = temp_dir.path().join("sqlhttp.toml");
        fs::write(
            &config_file,
            indoc! {r#"
                driver = "postgresql"
                listen = "127.0.0.1:7000"

                [database]
                host = "db.internal"
                port = 5432
                max_connections = 16

                [log]
                level = "debug"
                dir = "/var/log/sqlhttp"
                rotation = "never"
            "#},
        )?;

        let configuration = ConfigurationBuilder::new("sqlhttp_file_test", "1.0.0")
            .with_config_file(Some(&config_file))?
            .with_log_level(LevelFilter::OFF)
            .build()?;

        assert_eq!(configuration.config_file, Some(config_file));
        assert_eq!(configuration.driver, "postgresql");
        assert_eq!(configuration.listen, "127.0.0.1:7000");
        assert_eq!(configuration.host, "db.internal");
        assert_eq!(configuration.port, Some(5432));
        assert_eq!(configuration.data_dir, PathBuf::from("."));
        assert_eq!(configuration.max_connections, Some(16));
        assert_eq!(configuration.log_dir, Some(PathBuf::from("/var/log/sqlhttp")));
        assert_eq!(configuration.log_rotation, Rotation::NEVER);
        Ok(())
    }

    #[test]
    fn test_config_file_log_level() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_file = temp_dir.path().join("sqlhttp.toml");
        fs::write(&config_file, "[log]\nlevel = \"warn\"\n")?;

        let builder = ConfigurationBuilder::new("sqlhttp_level_test", "1.0.0")
            .with_config_file(Some(&config_file))?;

        assert_eq!(builder.configuration.log_level, LevelFilter::WARN);
        Ok(())
    }

    #[test]
    fn test_invalid_rotation() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_file = temp_dir.path().join("sqlhttp.toml");
        fs::write(&config_file, "[log]\nrotation = \"weekly\"\n")?;

        let result = ConfigurationBuilder::new("sqlhttp_rotation_test", "1.0.0")
            .with_config_file(Some(&config_file));

        let error = result.err().map(|error| error.to_string());
        assert_eq!(error.as_deref(), Some("Invalid log.rotation: weekly"));
        Ok(())
    }

    #[test]
    fn test_invalid_port() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_file = temp_dir.path().join("sqlhttp.toml");
        fs::write(&config_file, "[database]\nport = \"not a port\"\n")?;

        let result = ConfigurationBuilder::new("sqlhttp_port_test", "1.0.0")
            .with_config_file(Some(&config_file));

        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigurationBuilder::new("sqlhttp_missing_test", "1.0.0")
            .with_config_file(Some("/nonexistent/sqlhttp.toml"));
        assert!(result.is_err());
    }
}
