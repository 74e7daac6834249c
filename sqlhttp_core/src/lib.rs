//! # sqlhttp Core
//!
//! Serves relational databases over HTTP: a request names a database, carries credentials and a
//! raw SQL statement, and receives a schema-agnostic JSON result. This crate holds the connection
//! cache shared by all requests, the row decoder turning any result set into nullable text
//! values, and the executors and [`Service`] the request gateway calls into.

#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

pub mod cache;
pub mod configuration;
pub mod decoder;
pub mod envelope;
mod error;
pub mod executors;
mod service;

pub use cache::ConnectionCache;
pub use envelope::{Outcome, QueryResult, Severity};
pub use error::{Error, Result};
pub use service::Service;
pub use sqlhttp_driver::{Endpoint, Identity, Value};
