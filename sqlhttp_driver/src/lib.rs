//! # sqlhttp Driver
//!
//! The sqlhttp driver library provides the interfaces the service uses to open connections to
//! different databases and execute raw SQL statements against them.

#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod connection;
mod driver;
mod driver_manager;
mod dsn;
mod error;
mod identity;
mod value;

pub use connection::{
    Connection, ExecuteResult, MemoryQueryResult, MockConnection, QueryResult, Row,
};
pub use driver::{Driver, MockDriver};
pub use driver_manager::DriverManager;
pub use dsn::server_url;
pub use error::{Error, Result};
pub use identity::{Endpoint, Identity};
pub use value::Value;
