//! Runtime settings for the recurrence service binary.
//!
//! Read from an optional `recurrence.json` next to the working directory,
//! overridable through `RECURRENCE_*` environment variables, with compiled
//! in defaults for everything. The session bounds here are only defaults:
//! each opened session may narrow them in its own configuration.

use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{RecurrenceError, Result};
use crate::rule::DEFAULT_MAX_COUNT;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the HTTP surface binds to.
    pub listen: String,
    /// Default cap on "after N occurrences" terminations.
    pub max_count: u32,
    /// Default cap on "until date" terminations, if any.
    #[serde(default)]
    pub max_until: Option<NaiveDate>,
    /// Suppress the advanced options (week start) in opened sessions.
    pub hide_advanced: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("listen", "127.0.0.1:4599")
            .map_err(|e| RecurrenceError::Config(e.to_string()))?
            .set_default("max_count", DEFAULT_MAX_COUNT as i64)
            .map_err(|e| RecurrenceError::Config(e.to_string()))?
            .set_default("hide_advanced", false)
            .map_err(|e| RecurrenceError::Config(e.to_string()))?
            .add_source(File::with_name("recurrence").required(false))
            .add_source(Environment::with_prefix("RECURRENCE"))
            .build()
            .map_err(|e| RecurrenceError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RecurrenceError::Config(e.to_string()))
    }
}
