//! Configuration management for the cinema admin tool.
//!
//! Loads the booking-sheet endpoint settings from environment variables with
//! sensible defaults. The sheet name and date wire format are owned by
//! whoever operates the sheet, so both are configuration rather than
//! constants.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use reqwest::Url;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default sheet (tab) holding bookings
pub const DEFAULT_SHEET_NAME: &str = "工作表1";

/// Default `chrono` format for dates sent to and written into the sheet
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default offset of the local calendar day from UTC, in hours
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Errors raised while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but unusable
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Settings for the spreadsheet-backed booking endpoint
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Base URL of the sheet API (`SHEETS_ENDPOINT`)
    pub endpoint: Url,
    /// Sheet selector sent with every request (`SHEETS_SHEET_NAME`)
    pub sheet_name: String,
    /// Date format on the wire (`SHEETS_DATE_FORMAT`)
    pub date_format: String,
    /// Request timeout (`SHEETS_TIMEOUT_SECS`)
    pub timeout: Duration,
    /// Offset used to decide which calendar day a timestamp falls on
    /// (`SHEETS_UTC_OFFSET_HOURS`)
    pub utc_offset: FixedOffset,
}

impl SheetsConfig {
    /// Configuration for `endpoint` with every other setting at its default
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
        }
    }

    /// Set the sheet name
    #[must_use]
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `SHEETS_ENDPOINT` is missing or any
    /// variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SheetsConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("SHEETS_ENDPOINT").ok_or(ConfigError::Missing("SHEETS_ENDPOINT"))?;
        let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
            key: "SHEETS_ENDPOINT",
            reason: e.to_string(),
        })?;

        let mut config = Self::new(endpoint);

        if let Some(sheet_name) = lookup("SHEETS_SHEET_NAME") {
            // Some exports prefix the tab name with a BOM; it never belongs in the query
            let sheet_name = sheet_name.trim_start_matches('\u{feff}').trim().to_string();
            if sheet_name.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "SHEETS_SHEET_NAME",
                    reason: "must not be empty".to_string(),
                });
            }
            config.sheet_name = sheet_name;
        }

        if let Some(format) = lookup("SHEETS_DATE_FORMAT") {
            validate_date_format(&format)?;
            config.date_format = format;
        }

        if let Some(secs) = lookup("SHEETS_TIMEOUT_SECS") {
            let secs: u64 = parse(&secs, "SHEETS_TIMEOUT_SECS")?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "SHEETS_TIMEOUT_SECS",
                    reason: "must be at least 1".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(hours) = lookup("SHEETS_UTC_OFFSET_HOURS") {
            let hours: i32 = parse(&hours, "SHEETS_UTC_OFFSET_HOURS")?;
            config.utc_offset = hours
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "SHEETS_UTC_OFFSET_HOURS",
                    reason: format!("{hours} is out of range"),
                })?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

/// A format is usable if a date written with it reads back unchanged
fn validate_date_format(format: &str) -> Result<(), ConfigError> {
    use std::fmt::Write;

    let invalid = || ConfigError::Invalid {
        key: "SHEETS_DATE_FORMAT",
        reason: format!("{format:?} cannot round-trip a calendar date"),
    };

    let sample = NaiveDate::from_ymd_opt(2025, 1, 20).ok_or_else(invalid)?;
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(format)).map_err(|_| invalid())?;

    match NaiveDate::parse_from_str(&rendered, format) {
        Ok(parsed) if parsed == sample => Ok(()),
        _ => Err(invalid()),
    }
}
