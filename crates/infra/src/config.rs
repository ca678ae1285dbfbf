//! Service configuration with multi-source merging.
//!
//! Priority (highest to lowest):
//! 1. Environment: `LESSONBOOK_*`, nested keys separated by `__`
//!    (e.g. `LESSONBOOK_INVENTORY__STRATEGY=optimistic`)
//! 2. Explicit config path (if provided)
//! 3. Project file: `./lessonbook.toml`
//! 4. Default values

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use lessonbook_observability::LogFormat;

use crate::inventory::{MutatorSettings, UpdateStrategy};

pub const PROJECT_CONFIG_FILE: &str = "lessonbook.toml";
pub const ENV_PREFIX: &str = "LESSONBOOK_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string. Absent means the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub store_timeout_ms: u64,
    /// JSON array of lessons inserted when the catalog is empty.
    pub seed_file: Option<PathBuf>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
    pub inventory: InventoryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub strategy: UpdateStrategy,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            database_max_connections: 10,
            store_timeout_ms: 5_000,
            seed_file: None,
            cors_origins: Vec::new(),
            inventory: InventoryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            strategy: UpdateStrategy::Atomic,
            max_attempts: 5,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources.
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        let project = Path::new(PROJECT_CONFIG_FILE);
        if project.exists() {
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms.max(1))
    }

    pub fn mutator_settings(&self) -> MutatorSettings {
        MutatorSettings {
            strategy: self.inventory.strategy,
            max_attempts: self.inventory.max_attempts,
            store_timeout: self.store_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load(path: Option<&Path>) -> figment::Result<AppConfig> {
        AppConfig::load(path).map_err(|e| *e)
    }

    #[test]
    fn defaults_apply_without_any_source() {
        Jail::expect_with(|_jail| {
            let config = load(None)?;
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.bind_addr.port(), 8080);
            assert_eq!(config.store_timeout(), Duration::from_secs(5));
            assert_eq!(config.mutator_settings().strategy, UpdateStrategy::Atomic);
            Ok(())
        });
    }

    #[test]
    fn project_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
                    bind_addr = "127.0.0.1:9000"
                    database_url = "postgres://localhost/lessons"
                    cors_origins = ["http://localhost:3000"]

                    [inventory]
                    strategy = "optimistic"
                    max_attempts = 3

                    [log]
                    format = "pretty"
                "#,
            )?;
            jail.set_env("LESSONBOOK_INVENTORY__MAX_ATTEMPTS", "9");
            jail.set_env("LESSONBOOK_STORE_TIMEOUT_MS", "250");

            let config = load(None)?;
            assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
            assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/lessons"));
            assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
            assert_eq!(config.inventory.strategy, UpdateStrategy::Optimistic);
            assert_eq!(config.inventory.max_attempts, 9);
            assert_eq!(config.log.format, LogFormat::Pretty);
            assert_eq!(config.log.filter, "info");
            assert_eq!(config.store_timeout(), Duration::from_millis(250));
            Ok(())
        });
    }

    #[test]
    fn explicit_path_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(PROJECT_CONFIG_FILE, "store_timeout_ms = 100")?;
            jail.create_file("other.toml", "store_timeout_ms = 700\nseed_file = \"seed.json\"")?;

            let config = load(Some(Path::new("other.toml")))?;
            assert_eq!(config.store_timeout_ms, 700);
            assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
            Ok(())
        });
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("LESSONBOOK_INVENTORY__STRATEGY", "pessimistic");
            assert!(load(None).is_err());
            Ok(())
        });
    }
}
