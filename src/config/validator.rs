//! Settings validation: route prefixes, DSN scheme, API key.

use crate::config::Settings;
use crate::error::ConfigError;
use regex::Regex;

/// One or more `/segment` parts, no trailing slash.
const PREFIX_PATTERN: &str = r"^(/[A-Za-z0-9._~-]+)+$";

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let prefix = Regex::new(PREFIX_PATTERN).map_err(|e| ConfigError::Load(e.to_string()))?;
    for (key, value) in [
        ("PREFIX_PUBLIC", &settings.prefix.public),
        ("PREFIX_ADMIN", &settings.prefix.admin),
    ] {
        if !prefix.is_match(value) {
            return Err(ConfigError::InvalidValue {
                key,
                reason: format!("{:?} must look like /segment, without a trailing slash", value),
            });
        }
    }
    if settings.prefix.public == settings.prefix.admin {
        return Err(ConfigError::Validation(
            "public and admin prefixes must differ".into(),
        ));
    }

    let dsn = &settings.postgres.dsn;
    if !(dsn.starts_with("postgres://") || dsn.starts_with("postgresql://")) {
        return Err(ConfigError::InvalidValue {
            key: "POSTGRESQL_DSN",
            reason: "expected a postgres:// or postgresql:// URL".into(),
        });
    }
    if settings.postgres.max_connections == 0 {
        return Err(ConfigError::InvalidValue {
            key: "POSTGRESQL_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }

    if settings.security.api_key.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "SECURITY_API_KEY",
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Settings::default()).is_ok());
    }

    #[test]
    fn prefixes_need_a_leading_slash_and_no_trailing_one() {
        for bad in ["public", "/public/", "", "/", "/pub lic"] {
            let mut s = Settings::default();
            s.prefix.public = bad.into();
            assert!(validate(&s).is_err(), "{:?} accepted", bad);
        }
        let mut s = Settings::default();
        s.prefix.public = "/api/public".into();
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn prefixes_must_differ() {
        let mut s = Settings::default();
        s.prefix.admin = s.prefix.public.clone();
        assert!(matches!(validate(&s), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn dsn_scheme_and_api_key_are_checked() {
        let mut s = Settings::default();
        s.postgres.dsn = "mysql://localhost/db".into();
        assert!(validate(&s).is_err());

        let mut s = Settings::default();
        s.postgres.dsn = "postgresql://localhost/db".into();
        assert!(validate(&s).is_ok());

        let mut s = Settings::default();
        s.security.api_key = "  ".into();
        assert!(matches!(
            validate(&s),
            Err(ConfigError::InvalidValue { key: "SECURITY_API_KEY", .. })
        ));
    }
}
