//! Safe SQL builder: identifiers from table definitions only, values as parameters.

mod builder;
pub mod filter;
pub mod params;
pub mod table;
pub use builder::*;
pub use filter::{Filter, OrderBy, Query, DEFAULT_LIMIT};
pub use params::SqlValue;
pub use table::{Column, EnumType, Table};
