mod command;
mod query;

pub use command::CommandExecutor;
pub use query::QueryExecutor;
