use crate::errors::{AppError, AppResult};
use crate::utils::date::Calendar;
use crate::utils::path::expand_tilde;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,

    /// `local` or an IANA zone name, e.g. `Europe/Copenhagen`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Weeks shown by the worker dashboard and the overview.
    #[serde(default = "default_weeks")]
    pub default_weeks: u32,

    /// First Monday shown in site reports.
    #[serde(default = "default_report_epoch")]
    pub report_epoch: NaiveDate,

    #[serde(default = "default_company_name")]
    pub company_name: String,

    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

fn default_timezone() -> String {
    "local".to_string()
}
fn default_weeks() -> u32 {
    8
}
fn default_report_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).unwrap_or_default()
}
fn default_company_name() -> String {
    "Dansk Arbejdskraft".to_string()
}
fn default_documents_dir() -> String {
    Config::config_dir()
        .join("documents")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            timezone: default_timezone(),
            default_weeks: default_weeks(),
            report_epoch: default_report_epoch(),
            company_name: default_company_name(),
            documents_dir: default_documents_dir(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("sitehours")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".sitehours")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("sitehours.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("sitehours.sqlite")
    }

    /// Load configuration from file, or defaults if there is none.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> AppResult<()> {
        self.calendar()?;
        if self.default_weeks == 0 {
            return Err(AppError::Config("default_weeks must be at least 1".into()));
        }
        Ok(())
    }

    pub fn calendar(&self) -> AppResult<Calendar> {
        Calendar::parse(&self.timezone)
    }

    pub fn documents_root(&self) -> PathBuf {
        expand_tilde(&self.documents_dir)
    }

    /// Create the config directory, the config file (unless `is_test`)
    /// and an empty database file. Returns the configuration in effect.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Self::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            fs::write(Self::config_file(), yaml)?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(config)
    }
}
