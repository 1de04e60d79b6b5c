//! Service settings: environment-driven, validated once at startup.

pub mod loader;
pub mod settings;
pub mod validator;

pub use loader::*;
pub use settings::*;
pub use validator::*;
