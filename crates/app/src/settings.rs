//! Handles settings for the application.
//!
//! Sources, later ones win:
//!
//! 1. built-in defaults;
//! 2. optional `settings.toml` in the working directory;
//! 3. environment variables (`DB_PATH`, `BCRYPT_ROUNDS`, `HISTORY_DAYS`,
//!    `LOG_LEVEL`).
use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

const SETTINGS_FILE: &str = "settings";
const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file, or `:memory:` for a throwaway database.
    pub db_path: String,
    pub bcrypt_rounds: u32,
    /// How far back "view recent transactions" looks.
    pub history_days: u32,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: "river_bank.db".to_string(),
            bcrypt_rounds: 12,
            history_days: 7,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(
            File::with_name(SETTINGS_FILE).required(false),
            Environment::default().try_parsing(true),
        )
    }

    fn load<F>(file: F, env: Environment) -> Result<Self, ConfigError>
    where
        F: Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::Message("db_path must not be empty".to_string()));
        }
        if !(engine::auth::MIN_COST..=engine::auth::MAX_COST).contains(&self.bcrypt_rounds) {
            return Err(ConfigError::Message(format!(
                "bcrypt_rounds must be between {} and {}, got {}",
                engine::auth::MIN_COST,
                engine::auth::MAX_COST,
                self.bcrypt_rounds
            )));
        }
        if self.history_days == 0 {
            return Err(ConfigError::Message(
                "history_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// sea-orm connection string for `db_path`.
    pub fn database_url(&self) -> String {
        if self.db_path == MEMORY_DB {
            String::from("sqlite::memory:")
        } else {
            format!("sqlite:{}?mode=rwc", self.db_path)
        }
    }
}
