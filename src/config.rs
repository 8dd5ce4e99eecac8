use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::audit::{ActionFilter, AuditFilter};
use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub snapshot_path: Option<PathBuf>,
    pub audit_start_date: Option<NaiveDate>,
    pub audit_end_date: Option<NaiveDate>,
    pub audit_action: String,
    pub audit_search: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            audit_start_date: parse_date_var("AUDIT_START_DATE")?,
            audit_end_date: parse_date_var("AUDIT_END_DATE")?,
            audit_action: env::var("AUDIT_ACTION").unwrap_or_else(|_| "all".to_string()),
            audit_search: env::var("AUDIT_SEARCH").unwrap_or_default(),
        };

        if config.database_url.is_none() && config.snapshot_path.is_none() {
            return Err(AppError::Config(
                "either DATABASE_URL or SNAPSHOT_PATH must be set".to_string(),
            ));
        }

        Ok(config)
    }

    /// Builds the audit filter described by the `AUDIT_*` variables.
    pub fn audit_filter(&self) -> AppResult<AuditFilter> {
        let action: ActionFilter = self.audit_action.parse()?;
        Ok(AuditFilter::default()
            .with_dates(self.audit_start_date, self.audit_end_date)
            .with_action(action)
            .with_search(self.audit_search.clone()))
    }
}

fn parse_date_var(key: &str) -> AppResult<Option<NaiveDate>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            parse_date(value.trim()).map(Some).ok_or_else(|| {
                AppError::Config(format!("{} must be YYYY-MM-DD, got '{}'", key, value))
            })
        }
        _ => Ok(None),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
