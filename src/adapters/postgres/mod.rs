//! PostgreSQL warehouse adapter: pool, schema bootstrap, dimension
//! upserts, fact inserts.

pub mod connection;
pub mod dimensions;
pub mod facts;
pub mod schema;

pub use connection::{create_pool, verify_connection, ConnectionError};
