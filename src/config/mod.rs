use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use crate::utils::time::parse_time;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Keys every configuration file is expected to carry.
pub const KNOWN_KEYS: [&str; 7] = [
    "database",
    "sweep_time",
    "backfill_fallback_days",
    "dedup_window_minutes",
    "max_schedules_per_scholar",
    "busy_timeout_ms",
    "log_level",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Daily local time at which the sweep fires (HH:MM).
    #[serde(default = "default_sweep_time")]
    pub sweep_time: String,
    #[serde(default = "default_fallback_days")]
    pub backfill_fallback_days: i64,
    #[serde(default = "default_dedup_window")]
    pub dedup_window_minutes: i64,
    #[serde(default = "default_max_schedules")]
    pub max_schedules_per_scholar: usize,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_sweep_time() -> String {
    "00:05".to_string()
}
fn default_fallback_days() -> i64 {
    90
}
fn default_dedup_window() -> i64 {
    5
}
fn default_max_schedules() -> usize {
    2
}
fn default_busy_timeout() -> u64 {
    5000
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            sweep_time: default_sweep_time(),
            backfill_fallback_days: default_fallback_days(),
            dedup_window_minutes: default_dedup_window(),
            max_schedules_per_scholar: default_max_schedules(),
            busy_timeout_ms: default_busy_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("dutytracker")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".dutytracker")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("dutytracker.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("dutytracker.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    /// Database path with `~/` expanded.
    pub fn database_path(&self) -> PathBuf {
        expand_tilde(&self.database)
    }

    pub fn sweep_at(&self) -> AppResult<NaiveTime> {
        parse_time(&self.sweep_time).ok_or_else(|| {
            AppError::Config(format!("sweep_time '{}' is not a valid time", self.sweep_time))
        })
    }

    /// Keys missing from the on-disk file (they fall back to defaults).
    pub fn missing_keys() -> AppResult<Vec<&'static str>> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(KNOWN_KEYS.to_vec());
        }
        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))?;

        let missing = KNOWN_KEYS
            .iter()
            .copied()
            .filter(|k| yaml.get(*k).is_none())
            .collect();
        Ok(missing)
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path).map_err(|e| {
                AppError::Io(io::Error::new(
                    e.kind(),
                    format!("cannot create {}: {}", db_path.display(), e),
                ))
            })?;
        }

        Ok(config)
    }
}
