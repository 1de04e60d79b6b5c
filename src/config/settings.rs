//! Settings types. Built by the loader, read-only afterwards.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub title: String,
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

/// Mount points of the two route groups, without the version segment.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixSettings {
    pub public: String,
    pub admin: String,
}

#[derive(Clone, PartialEq)]
pub struct PostgresSettings {
    pub dsn: String,
    pub max_connections: u32,
}

#[derive(Clone, PartialEq)]
pub struct SecuritySettings {
    /// Expected value of the `access_token` header on admin routes.
    pub api_key: String,
}

impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dsn = match self.dsn.split_once('@') {
            Some((_, host)) => format!("postgres://***@{}", host),
            None => self.dsn.clone(),
        };
        f.debug_struct("PostgresSettings")
            .field("dsn", &dsn)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySettings").field("api_key", &"***").finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub app: AppSettings,
    pub prefix: PrefixSettings,
    pub postgres: PostgresSettings,
    pub security: SecuritySettings,
}

impl Settings {
    pub fn public_v1(&self) -> String {
        format!("{}/v1", self.prefix.public)
    }

    pub fn admin_v1(&self) -> String {
        format!("{}/v1", self.prefix.admin)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}
