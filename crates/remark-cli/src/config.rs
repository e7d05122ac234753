//! Configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/remark` |
//! | `REMARK_SETTINGS_PATH` | `$HOME/.remark/settings.json`, else `./remark-settings.json` |
//! | `REMARK_OFFLINE_PATH` | `offline.json` next to the settings file |
//! | `DB_MAX_CONNECTIONS`, `DB_CONNECT_TIMEOUT_SECS` | see [`PoolConfig`] |

use std::path::PathBuf;

use remark_core::defaults::{
    DATABASE_URL, FALLBACK_SETTINGS_FILE, OFFLINE_FILE_NAME, SETTINGS_DIR_NAME,
    SETTINGS_FILE_NAME,
};
use remark_db::PoolConfig;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: String,
    pub settings_path: PathBuf,
    pub offline_path: PathBuf,
    pub pool: PoolConfig,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());
        config.pool = PoolConfig::from_env();
        config
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL").unwrap_or_else(|| DATABASE_URL.to_string());
        let settings_path = match (non_empty("REMARK_SETTINGS_PATH"), non_empty("HOME")) {
            (Some(path), _) => PathBuf::from(path),
            (None, Some(home)) => PathBuf::from(home)
                .join(SETTINGS_DIR_NAME)
                .join(SETTINGS_FILE_NAME),
            (None, None) => PathBuf::from(FALLBACK_SETTINGS_FILE),
        };
        let offline_path = non_empty("REMARK_OFFLINE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| settings_path.with_file_name(OFFLINE_FILE_NAME));

        Self {
            database_url,
            settings_path,
            offline_path,
            pool: PoolConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_under_home() {
        let config = config(&[("HOME", "/home/alice")]);
        assert_eq!(config.database_url, "postgres://localhost/remark");
        assert_eq!(
            config.settings_path,
            PathBuf::from("/home/alice/.remark/settings.json")
        );
        assert_eq!(
            config.offline_path,
            PathBuf::from("/home/alice/.remark/offline.json")
        );
    }

    #[test]
    fn test_no_home_falls_back_to_working_directory() {
        let config = config(&[]);
        assert_eq!(config.settings_path, PathBuf::from("remark-settings.json"));
        assert_eq!(config.offline_path, PathBuf::from("offline.json"));
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = config(&[
            ("HOME", "/home/alice"),
            ("DATABASE_URL", "postgres://db/remark"),
            ("REMARK_SETTINGS_PATH", "/tmp/s.json"),
            ("REMARK_OFFLINE_PATH", "/tmp/o.json"),
        ]);
        assert_eq!(config.database_url, "postgres://db/remark");
        assert_eq!(config.settings_path, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.offline_path, PathBuf::from("/tmp/o.json"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = config(&[("DATABASE_URL", "  "), ("HOME", "/h")]);
        assert_eq!(config.database_url, "postgres://localhost/remark");
    }
}
