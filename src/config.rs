//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use dotenvy::dotenv;
use regex::Regex;

use crate::validation::{ValidationRules, DEFAULT_MOBILE_MAX_LEN, DEFAULT_NAME_MAX_LEN};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-records";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "students.sqlite";
/// Log folder inside the application data directory.
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_MYSQL_HOST: &str = "localhost";
const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Which store the gateway talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Local single-file SQLite database.
    Sqlite { path: PathBuf },
    /// Networked MySQL server.
    MySql(ServerConfig),
}

/// Connection settings for the networked backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Everything `main` needs to bring the application up.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub rules: ValidationRules,
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment, reading a `.env` file
    /// first when one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = get("STUDENTS_BACKEND").unwrap_or_else(|| "sqlite".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "sqlite" => {
                let path = match get("STUDENTS_DB_PATH") {
                    Some(path) => PathBuf::from(path),
                    None => data_dir()?.join(DB_FILE_NAME),
                };
                StoreConfig::Sqlite { path }
            }
            "mysql" => StoreConfig::MySql(ServerConfig {
                host: get("DB_HOST").unwrap_or_else(|| DEFAULT_MYSQL_HOST.to_string()),
                port: match get("DB_PORT") {
                    Some(raw) => raw
                        .trim()
                        .parse()
                        .context("DB_PORT must be a valid port number")?,
                    None => DEFAULT_MYSQL_PORT,
                },
                user: get("DB_USER").context("DB_USER must be set for the mysql backend")?,
                password: lookup("DB_PW").unwrap_or_default(),
                database: get("DB_ADDRESS")
                    .context("DB_ADDRESS must be set for the mysql backend")?,
            }),
            other => bail!("STUDENTS_BACKEND must be `sqlite` or `mysql`, got `{other}`"),
        };

        let rules = ValidationRules {
            name_max_len: parse_limit(get("STUDENTS_NAME_MAX_LEN"), DEFAULT_NAME_MAX_LEN)
                .context("STUDENTS_NAME_MAX_LEN must be a positive integer")?,
            mobile_max_len: parse_limit(get("STUDENTS_MOBILE_MAX_LEN"), DEFAULT_MOBILE_MAX_LEN)
                .context("STUDENTS_MOBILE_MAX_LEN must be a positive integer")?,
            mobile_pattern: get("STUDENTS_MOBILE_PATTERN")
                .map(|raw| Regex::new(&raw))
                .transpose()
                .context("STUDENTS_MOBILE_PATTERN must be a valid regular expression")?,
        };

        let log_dir = match get("STUDENTS_LOG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => data_dir()?.join(LOG_DIR_NAME),
        };

        Ok(Self {
            store,
            rules,
            log_dir,
        })
    }
}

fn parse_limit(raw: Option<String>, default: usize) -> Result<usize> {
    match raw {
        None => Ok(default),
        Some(raw) => {
            let value: usize = raw.trim().parse()?;
            if value == 0 {
                Err(anyhow!("limit must be greater than zero"))
            } else {
                Ok(value)
            }
        }
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn explicit_sqlite_path_is_used() {
        let config = load(&[
            ("STUDENTS_DB_PATH", "/tmp/students.sqlite"),
            ("STUDENTS_LOG_DIR", "/tmp/logs"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                path: PathBuf::from("/tmp/students.sqlite")
            }
        );
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.rules.name_max_len, DEFAULT_NAME_MAX_LEN);
        assert!(config.rules.mobile_pattern.is_none());
    }

    #[test]
    fn mysql_reads_the_server_variables() {
        let config = load(&[
            ("STUDENTS_BACKEND", "MySQL"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "3307"),
            ("DB_USER", "school"),
            ("DB_PW", "secret"),
            ("DB_ADDRESS", "school"),
            ("STUDENTS_LOG_DIR", "/tmp/logs"),
        ])
        .unwrap();
        match config.store {
            StoreConfig::MySql(server) => {
                assert_eq!(server.host, "db.internal");
                assert_eq!(server.port, 3307);
                assert_eq!(server.user, "school");
                assert_eq!(server.password, "secret");
                assert_eq!(server.database, "school");
                assert!(!format!("{server:?}").contains("secret"));
            }
            other => panic!("expected mysql config, got {other:?}"),
        }
    }

    #[test]
    fn mysql_defaults_host_and_port() {
        let config = load(&[
            ("STUDENTS_BACKEND", "mysql"),
            ("DB_USER", "root"),
            ("DB_ADDRESS", "school"),
            ("STUDENTS_LOG_DIR", "/tmp/logs"),
        ])
        .unwrap();
        let StoreConfig::MySql(server) = config.store else {
            panic!("expected mysql config");
        };
        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 3306);
        assert_eq!(server.password, "");
    }

    #[test]
    fn mysql_requires_user_and_database() {
        let err = load(&[("STUDENTS_BACKEND", "mysql"), ("DB_ADDRESS", "school")]).unwrap_err();
        assert!(err.to_string().contains("DB_USER"));
        let err = load(&[("STUDENTS_BACKEND", "mysql"), ("DB_USER", "root")]).unwrap_err();
        assert!(err.to_string().contains("DB_ADDRESS"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = load(&[("STUDENTS_BACKEND", "postgres")]).unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn validation_rules_come_from_the_environment() {
        let config = load(&[
            ("STUDENTS_DB_PATH", "/tmp/s.sqlite"),
            ("STUDENTS_LOG_DIR", "/tmp/logs"),
            ("STUDENTS_NAME_MAX_LEN", "20"),
            ("STUDENTS_MOBILE_MAX_LEN", "12"),
            ("STUDENTS_MOBILE_PATTERN", r"^[0-9]+$"),
        ])
        .unwrap();
        assert_eq!(config.rules.name_max_len, 20);
        assert_eq!(config.rules.mobile_max_len, 12);
        assert_eq!(
            config.rules.mobile_pattern.as_ref().map(Regex::as_str),
            Some(r"^[0-9]+$")
        );
    }

    #[test]
    fn bad_limits_and_patterns_are_reported() {
        let err = load(&[
            ("STUDENTS_DB_PATH", "/tmp/s.sqlite"),
            ("STUDENTS_LOG_DIR", "/tmp/logs"),
            ("STUDENTS_NAME_MAX_LEN", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("STUDENTS_NAME_MAX_LEN"));

        let err = load(&[
            ("STUDENTS_DB_PATH", "/tmp/s.sqlite"),
            ("STUDENTS_LOG_DIR", "/tmp/logs"),
            ("STUDENTS_MOBILE_PATTERN", "(["),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("STUDENTS_MOBILE_PATTERN"));
    }
}
