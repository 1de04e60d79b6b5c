//! Filter predicates and ordering accepted by the data-access layer.

use crate::sql::params::SqlValue;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single predicate; a filter list is a conjunction.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq(&'static str, SqlValue),
    /// Case-insensitive substring match.
    Contains(&'static str, String),
    IsNull(&'static str),
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(c, _) | Filter::Contains(c, _) | Filter::IsNull(c) => c,
        }
    }

    /// Evaluates the predicate against a column value read from an entity.
    pub fn matches(&self, value: &SqlValue) -> bool {
        match self {
            Filter::Eq(_, expected) => !value.is_null() && value == expected,
            Filter::Contains(_, needle) => value
                .as_str()
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Filter::IsNull(_) => value.is_null(),
        }
    }
}

/// ILIKE pattern matching `needle` anywhere, with LIKE metacharacters escaped.
pub fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderBy {
    #[serde(default = "default_order_field")]
    pub field: String,
    #[serde(default = "default_desc")]
    pub desc: bool,
}

fn default_order_field() -> String {
    "updated_at".into()
}

fn default_desc() -> bool {
    true
}

impl Default for OrderBy {
    fn default() -> Self {
        OrderBy {
            field: default_order_field(),
            desc: default_desc(),
        }
    }
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        OrderBy {
            field: field.to_string(),
            desc: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        OrderBy {
            field: field.to_string(),
            desc: true,
        }
    }
}

pub const DEFAULT_LIMIT: u32 = 10;

/// Filters, ordering and window for a `select`.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Vec<OrderBy>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            filters: Vec::new(),
            order_by: Vec::new(),
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Query {
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Query {
            filters,
            ..Query::default()
        }
    }

    pub fn order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn window(mut self, offset: u32, limit: u32) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}
