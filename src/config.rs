//! Configuration for the persistence collaborator
//!
//! Connection parameters come from environment variables with the
//! documented defaults. An unreachable database never prevents card
//! operations; it only disables the persistence side-path.

/// Database connection parameters
///
/// | variable      | default       |
/// |---------------|---------------|
/// | `DB_HOST`     | `localhost`   |
/// | `DB_USER`     | `root`        |
/// | `DB_PASSWORD` | (empty)       |
/// | `DB_NAME`     | `nfc_game_db` |
/// | `DB_PORT`     | `3306`        |
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl DbConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an injected variable lookup (testable
    /// without mutating the process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        DbConfig {
            host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            user: lookup("DB_USER").unwrap_or_else(|| "root".to_string()),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            database: lookup("DB_NAME").unwrap_or_else(|| "nfc_game_db".to_string()),
            port: lookup("DB_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3306),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(|_| None);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.user, "root");
        assert_eq!(config.password, "");
        assert_eq!(config.database, "nfc_game_db");
        assert_eq!(config.port, 3306);
    }

    #[test]
    fn test_overrides() {
        let config = DbConfig::from_lookup(|key| match key {
            "DB_HOST" => Some("db.example".to_string()),
            "DB_PORT" => Some("13306".to_string()),
            _ => None,
        });
        assert_eq!(config.host, "db.example");
        assert_eq!(config.port, 13306);
        assert_eq!(config.user, "root");
    }

    #[test]
    fn test_unparsable_port_falls_back() {
        let config = DbConfig::from_lookup(|key| match key {
            "DB_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 3306);
    }
}
