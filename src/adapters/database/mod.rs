//! Product database adapters.
//!
//! - `FunctionDatabaseClient` - Managed serverless-function endpoint
//! - `PostgresProductDatabase` - Direct sqlx connection
//! - `MockProductDatabase` - In-memory double for tests

mod function_client;
mod mock;
mod postgres;

pub use function_client::FunctionDatabaseClient;
pub use mock::MockProductDatabase;
pub use postgres::PostgresProductDatabase;
