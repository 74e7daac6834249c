#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod auth;
mod gateway;
mod version;

use anyhow::Result;
use clap::Parser;
use sqlhttp_core::Service;
use sqlhttp_core::configuration::{Configuration, ConfigurationBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use version::full_version;

/// Serve MySQL, PostgreSQL and SQLite databases over HTTP.
///
/// Options left unset fall back to the configuration file, then to `SQLHTTP_*` environment
/// variables, then to the built-in defaults.
#[derive(Debug, Default, Parser)]
#[command(version, about)]
pub(crate) struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "SQLHTTP_CONFIG")]
    config: Option<PathBuf>,

    /// Database driver: mysql, postgresql or sqlite
    #[arg(short, long)]
    driver: Option<String>,

    /// Address to listen on (e.g. 0.0.0.0:6033)
    #[arg(short, long)]
    listen: Option<String>,

    /// Database server host
    #[arg(long)]
    host: Option<String>,

    /// Database server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding sqlite database files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Maximum number of cached database handles
    #[arg(long)]
    max_connections: Option<usize>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    execute(args).await
}

async fn execute(args: Args) -> Result<()> {
    let configuration = configure(args)?;
    let version = full_version(&configuration);
    let service = Arc::new(Service::from_configuration(&configuration));
    let listener = TcpListener::bind(&configuration.listen).await?;

    info!(
        "{version} listening on {} using driver {}",
        listener.local_addr()?,
        configuration.driver
    );
    let result = gateway::serve(listener, Arc::clone(&service), shutdown_signal()).await;
    service.shutdown().await;
    info!("{version} completed");

    Ok(result?)
}

fn configure(args: Args) -> Result<Configuration> {
    let program_name = "sqlhttp";
    let version = env!("CARGO_PKG_VERSION");
    let mut builder =
        ConfigurationBuilder::new(program_name, version).with_config_file(args.config)?;

    if let Some(driver) = args.driver {
        builder = builder.with_driver(driver);
    }
    if let Some(listen) = args.listen {
        builder = builder.with_listen(listen);
    }
    if let Some(host) = args.host {
        builder = builder.with_host(host);
    }
    if args.port.is_some() {
        builder = builder.with_port(args.port);
    }
    if let Some(data_dir) = args.data_dir {
        builder = builder.with_data_dir(data_dir);
    }
    if args.max_connections.is_some() {
        builder = builder.with_max_connections(args.max_connections);
    }
    if let Some(log_level) = args.log_level {
        builder = builder.with_log_level(log_level);
    }
    if let Some(log_dir) = args.log_dir {
        builder = builder.with_log_dir(log_dir);
    }

    builder.build()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(error) => {
            warn!("unable to listen for shutdown signal: {error}");
            std::future::pending::<()>().await;
        }
    }
}
