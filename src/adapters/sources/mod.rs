//! Product source tiers for the resolution chain.
//!
//! - `DatabaseSource` - Product database, via the function or a direct connection
//! - `CommerceSource` - Commerce API, variations fetched per product
//! - `StaticSource` - Hard-coded catalogue

mod catalogue;
mod commerce_source;
mod database_source;
mod static_source;

pub use commerce_source::CommerceSource;
pub use database_source::DatabaseSource;
pub use static_source::StaticSource;
