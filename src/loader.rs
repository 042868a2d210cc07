//! Observation loading
//!
//! The engine never reads storage itself: a [`RowLoader`] fetches the raw rows
//! for one selection and hands back adapted, chronologically sorted
//! observations. Dropping the returned future cancels the load.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;

use serde_json::Value;

use crate::adapters::adapt_rows;
use crate::error::util::{describe_io_error, validate_input_file};
use crate::error::{Result, SurveillanceError};
use crate::models::Observation;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Which observations a request covers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Reporting scope; `None` takes every scope
    pub scope_id: Option<String>,
    /// Laboratory test code
    pub test_code: String,
}

impl Selection {
    /// Selection of one test across every scope
    pub fn test(test_code: impl Into<String>) -> Self {
        Self {
            scope_id: None,
            test_code: test_code.into(),
        }
    }

    /// Restrict the selection to one scope
    #[must_use]
    pub fn in_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    /// Scope label used as the series scope; `*` when every scope is pooled
    #[must_use]
    pub fn scope_label(&self) -> &str {
        self.scope_id.as_deref().unwrap_or("*")
    }

    /// Whether an observation falls inside the selection
    #[must_use]
    pub fn matches(&self, observation: &Observation) -> bool {
        observation.test_code.eq_ignore_ascii_case(&self.test_code)
            && self
                .scope_id
                .as_deref()
                .is_none_or(|scope| observation.scope_id == scope)
    }
}

/// Source of observations for a selection
pub trait RowLoader: Send + Sync {
    /// Load observations for `selection`, oldest first
    fn load<'a>(
        &'a self,
        selection: &'a Selection,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Observation>>> + Send + 'a>>;
}

/// Loader over a JSON file holding either an array of rows or one row per line
#[derive(Debug, Clone)]
pub struct JsonRowLoader {
    path: PathBuf,
}

impl JsonRowLoader {
    /// Loader reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the loader reads
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a JSON array of rows, or newline-delimited rows.
///
/// In newline-delimited input a line that is not valid JSON is skipped with a
/// warning; a malformed array fails as a whole.
pub fn parse_rows(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let mut rows = Vec::new();
    for (line_no, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(row) => rows.push(row),
            Err(err) => log_warning(
                "Skipping unreadable line",
                Some(&format!("{}: {err}", line_no + 1)),
            ),
        }
    }
    Ok(rows)
}

impl RowLoader for JsonRowLoader {
    fn load<'a>(
        &'a self,
        selection: &'a Selection,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Observation>>> + Send + 'a>> {
        Box::pin(async move {
            let start = Instant::now();
            let label = self.path.display().to_string();
            log_operation_start("Loading rows from", &label);

            validate_input_file(&self.path, "observation rows")?;
            let content = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| describe_io_error(&self.path, "observation rows", &e))?;

            let rows = parse_rows(&content)?;
            let adapted = adapt_rows(&rows);
            if adapted.rejected > 0 {
                log_warning(
                    &format!("Rejected {} malformed rows", adapted.rejected),
                    Some(&label),
                );
            }

            let mut observations: Vec<Observation> = adapted
                .observations
                .into_iter()
                .filter(|obs| selection.matches(obs))
                .collect();
            observations.sort_by_key(|obs| obs.collected_at);

            log_operation_complete("loaded", &label, observations.len(), Some(start.elapsed()));
            Ok(observations)
        })
    }
}

impl From<JsonRowLoader> for Box<dyn RowLoader> {
    fn from(loader: JsonRowLoader) -> Self {
        Box::new(loader)
    }
}

/// Error for a selection that matched no observations
#[must_use]
pub fn empty_selection(selection: &Selection) -> SurveillanceError {
    SurveillanceError::ContractViolation(format!(
        "no observations for {} in scope {}",
        selection.test_code,
        selection.scope_label()
    ))
}
