pub mod schema;
pub mod connection;
pub mod repositories;
mod rows;

pub use connection::{Database, DbConnection, DbPool};
