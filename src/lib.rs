//! Heroes service: hero records over PostgreSQL with public and API-key gated admin routes.

pub mod config;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod uow;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::Settings;
pub use entity::{Hero, Role};
pub use error::{AppError, ConfigError, StoreError};
pub use migration::apply_migrations;
pub use routes::app;
pub use service::{Audience, HeroService};
pub use state::AppState;
pub use store::{connect, ensure_database_exists};
pub use uow::{PgUnitOfWorkProvider, UnitOfWork, UnitOfWorkProvider};
