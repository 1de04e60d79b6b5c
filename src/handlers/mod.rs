//! HTTP handlers for the hero endpoints.

pub mod heroes;
pub use heroes::*;
