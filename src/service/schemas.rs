//! Request and response bodies for the hero endpoints.

use crate::entity::{Hero, HeroChanges, NewHero, Role, HEROES};
use crate::error::AppError;
use crate::service::validation::{RequestValidator, Validate};
use crate::sql::{OrderBy, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const NICKNAME_MAX_CHARS: usize = 255;
pub const MAX_LIMIT: u32 = 1000;

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct HeroCreate {
    pub nickname: String,
    pub role: Role,
}

impl Validate for HeroCreate {
    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::max_chars("nickname", &self.nickname, NICKNAME_MAX_CHARS)
    }
}

impl From<HeroCreate> for NewHero {
    fn from(c: HeroCreate) -> Self {
        NewHero {
            nickname: c.nickname,
            role: c.role,
        }
    }
}

/// Full replacement: every editable field is required.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct HeroUpdate {
    pub nickname: String,
    pub role: Role,
}

/// Partial update: absent fields keep their value.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct HeroPatch {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// How an update treats fields missing from the request.
#[derive(Clone, Debug)]
pub enum HeroWrite {
    Replace(HeroUpdate),
    Patch(HeroPatch),
}

impl Validate for HeroWrite {
    fn validate(&self) -> Result<(), AppError> {
        match self {
            HeroWrite::Replace(u) => RequestValidator::max_chars("nickname", &u.nickname, NICKNAME_MAX_CHARS),
            HeroWrite::Patch(p) => {
                RequestValidator::optional_max_chars("nickname", p.nickname.as_deref(), NICKNAME_MAX_CHARS)
            }
        }
    }
}

impl From<HeroWrite> for HeroChanges {
    fn from(w: HeroWrite) -> Self {
        match w {
            HeroWrite::Replace(u) => HeroChanges {
                nickname: Some(u.nickname),
                role: Some(u.role),
                ..HeroChanges::default()
            },
            HeroWrite::Patch(p) => HeroChanges {
                nickname: p.nickname,
                role: p.role,
                ..HeroChanges::default()
            },
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_order_by() -> Vec<OrderBy> {
    vec![OrderBy::default()]
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct HeroSearch {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_order_by")]
    pub order_by: Vec<OrderBy>,
}

impl Default for HeroSearch {
    fn default() -> Self {
        HeroSearch {
            nickname: None,
            role: None,
            offset: 0,
            limit: default_limit(),
            order_by: default_order_by(),
        }
    }
}

impl Validate for HeroSearch {
    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::optional_max_chars("nickname", self.nickname.as_deref(), NICKNAME_MAX_CHARS)?;
        RequestValidator::within("limit", self.limit, 1..=MAX_LIMIT)?;
        RequestValidator::order_fields(&HEROES, &self.order_by)
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct HeroSearchResult {
    pub count: i64,
    pub items: Vec<Hero>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusMessage {
    pub status: bool,
    pub message: String,
}

impl StatusMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        StatusMessage {
            status: true,
            message: message.into(),
        }
    }
}
