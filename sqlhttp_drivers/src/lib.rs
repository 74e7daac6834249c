#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod driver_manager;

pub use driver_manager::initialize;
pub use sqlhttp_driver::{
    Connection, Driver, DriverManager, Endpoint, Error, ExecuteResult, Identity,
    MemoryQueryResult, MockConnection, MockDriver, QueryResult, Result, Row, Value,
};
