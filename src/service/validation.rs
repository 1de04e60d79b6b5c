//! Request validation for hero inputs.

use crate::error::AppError;
use crate::sql::{OrderBy, Table};
use std::ops::RangeInclusive;

/// Implemented by request bodies that carry constraints serde cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

pub struct RequestValidator;

impl RequestValidator {
    /// Length is counted in characters, not bytes.
    pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), AppError> {
        if value.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
        Ok(())
    }

    pub fn optional_max_chars(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
        match value {
            Some(v) => Self::max_chars(field, v, max),
            None => Ok(()),
        }
    }

    pub fn within(field: &str, value: u32, range: RangeInclusive<u32>) -> Result<(), AppError> {
        if !range.contains(&value) {
            return Err(AppError::Validation(format!(
                "{} must be between {} and {}",
                field,
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }

    /// Every ordering field must be a column of `table`.
    pub fn order_fields(table: &Table, order_by: &[OrderBy]) -> Result<(), AppError> {
        for o in order_by {
            if !table.has_column(&o.field) {
                return Err(AppError::Validation(format!(
                    "order_by field must be one of: {}",
                    table.columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
                )));
            }
        }
        Ok(())
    }
}
