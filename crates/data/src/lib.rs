//! Card catalog and game config loading, with validation.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
