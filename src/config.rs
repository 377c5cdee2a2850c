//! Run configuration
//!
//! The CLI collects a [`RawConfig`]; validation turns it into a
//! [`QueryConfig`] before any relation is touched.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::ConfigError;
use crate::utils::{date_to_days, parse_date};

/// Unvalidated parameters as they arrive from the command line
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub region_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub thread_count: Option<i64>,
    pub input_dir: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl RawConfig {
    pub fn validate(self) -> Result<QueryConfig, ConfigError> {
        let region_name = non_empty(self.region_name, "r_name")?;
        let start_date = non_empty(self.start_date, "start_date")?;
        let end_date = non_empty(self.end_date, "end_date")?;
        let thread_count = self.thread_count.ok_or(ConfigError::MissingParameter("threads"))?;
        let input_dir = self
            .input_dir
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingParameter("table_path"))?;
        let output_path = self
            .output_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingParameter("result_path"))?;

        let workers = usize::try_from(thread_count)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::InvalidThreadCount(thread_count))?;

        Ok(QueryConfig {
            region_name,
            start_date: date_param(&start_date, "start_date")?,
            end_date: date_param(&end_date, "end_date")?,
            workers,
            input_dir,
            output_path,
        })
    }
}

fn non_empty(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingParameter(name))
}

fn date_param(value: &str, name: &'static str) -> Result<NaiveDate, ConfigError> {
    parse_date(value).ok_or_else(|| ConfigError::InvalidDate {
        name,
        value: value.to_string(),
    })
}

/// A validated run configuration
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub region_name: String,
    /// Inclusive
    pub start_date: NaiveDate,
    /// Exclusive
    pub end_date: NaiveDate,
    pub workers: NonZeroUsize,
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
}

impl QueryConfig {
    pub fn params(&self) -> QueryParams {
        QueryParams {
            region_name: self.region_name.clone(),
            dates: DateRange::new(self.start_date, self.end_date),
            workers: self.workers,
        }
    }
}

/// Half-open `[start, end)` range of Date32 day numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i32,
    pub end: i32,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: date_to_days(start),
            end: date_to_days(end),
        }
    }

    #[inline]
    pub fn contains(&self, days: i32) -> bool {
        self.start <= days && days < self.end
    }
}

/// The part of the configuration the query core consumes
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub region_name: String,
    pub dates: DateRange,
    pub workers: NonZeroUsize,
}
