//! Hero service and the generic data-access layer it is built on.

mod crud;
mod guard;
mod heroes;
pub mod schemas;
mod validation;

pub use crud::{Crud, PgCrud};
pub use guard::{not_found, transaction, ConflictExt, Finalize};
pub use heroes::{Audience, HeroFilters, HeroService, HERO_DELETED, HERO_EXISTS, HERO_NOT_FOUND};
pub use validation::{RequestValidator, Validate};
