//! Request extractors: admin API key and per-request services.

mod api_key;
mod services;

pub use api_key::{StaffAccess, API_KEY_HEADER, FORBIDDEN};
