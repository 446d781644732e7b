pub mod backends;
mod connection;
pub mod repository;
pub(crate) mod schema;
pub mod traits;

pub use backends::libsql::LibSqlBackend;
pub use backends::memory::InMemoryBackend;
pub use connection::Database;
pub use traits::*;
