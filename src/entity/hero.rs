//! The hero record and its `hrs_heroes` table.

use crate::entity::{Assign, Entity};
use crate::sql::{Column, EnumType, SqlValue, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "hrs_roles", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mage,
    Assassin,
    Warrior,
    Priest,
    Tank,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Mage, Role::Assassin, Role::Warrior, Role::Priest, Role::Tank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mage => "mage",
            Role::Assassin => "assassin",
            Role::Warrior => "warrior",
            Role::Priest => "priest",
            Role::Tank => "tank",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Role> for SqlValue {
    fn from(r: Role) -> Self {
        SqlValue::Text(r.as_str().to_string())
    }
}

pub const ROLES: EnumType = EnumType {
    name: "hrs_roles",
    values: &["mage", "assassin", "warrior", "priest", "tank"],
};

pub const HEROES: Table = Table {
    name: "hrs_heroes",
    primary_key: "uuid",
    columns: &[
        Column::new("uuid", "uuid").defined_as("UUID NOT NULL DEFAULT gen_random_uuid()"),
        Column::new("nickname", "text").defined_as("VARCHAR(255) NOT NULL"),
        Column::new("role", "hrs_roles").defined_as("hrs_roles NOT NULL"),
        Column::new("created_at", "timestamptz").defined_as("TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
        Column::new("updated_at", "timestamptz").defined_as("TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
        Column::new("deleted_at", "timestamptz").defined_as("TIMESTAMPTZ"),
    ],
    unique: &[&["nickname"]],
    indexed: &["nickname"],
    touch_column: Some("updated_at"),
};

/// A hero row. `deleted_at` set means soft-deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Hero {
    pub uuid: Uuid,
    pub nickname: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Hero {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewHero {
    pub nickname: String,
    pub role: Role,
}

impl Assign for NewHero {
    fn assignments(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("nickname", self.nickname.clone().into()),
            ("role", self.role.into()),
        ]
    }
}

/// Fields to change on a hero; `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeroChanges {
    pub nickname: Option<String>,
    pub role: Option<Role>,
    /// `Some(None)` restores a soft-deleted hero.
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl HeroChanges {
    pub fn soft_delete(at: DateTime<Utc>) -> Self {
        HeroChanges {
            deleted_at: Some(Some(at)),
            ..HeroChanges::default()
        }
    }
}

impl Assign for HeroChanges {
    fn assignments(&self) -> Vec<(&'static str, SqlValue)> {
        let mut out = Vec::new();
        if let Some(nickname) = &self.nickname {
            out.push(("nickname", nickname.clone().into()));
        }
        if let Some(role) = self.role {
            out.push(("role", role.into()));
        }
        if let Some(deleted_at) = self.deleted_at {
            out.push(("deleted_at", deleted_at.into()));
        }
        out
    }
}

impl Entity for Hero {
    type Id = Uuid;
    type New = NewHero;
    type Changes = HeroChanges;

    const TABLE: &'static Table = &HEROES;

    fn value(&self, column: &str) -> SqlValue {
        match column {
            "uuid" => self.uuid.into(),
            "nickname" => self.nickname.clone().into(),
            "role" => self.role.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            "deleted_at" => self.deleted_at.into(),
            _ => SqlValue::Null,
        }
    }
}
