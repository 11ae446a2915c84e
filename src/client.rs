//! The query engine: pattern resolution, retrieval orchestration, and
//! dataset shaping.
//!
//! [`ExtractionClient`] wraps an injected [`ExtractionService`] handle and
//! exposes the three retrieval modes:
//!
//! - [`ExtractionClient::get`] — plain time-window retrieval; per-variable
//!   timestamp sequences. With an absent end bound it degenerates to a
//!   last-value-before-start lookup.
//! - [`ExtractionClient::get_last`] — the explicit last-value form; at most
//!   one sample per variable.
//! - [`ExtractionClient::get_aligned`] — master-aligned retrieval; the
//!   first resolved variable's timestamps become the common grid every
//!   other variable is resampled onto.
//!
//! All modes resolve their variable set the same way and share the same
//! edge policy: an empty resolved set (or an absent fundamental match) is
//! an empty result, not an error. Malformed input — an empty name list, a
//! fundamental filter on an open-ended window, a beam-mode filter with no
//! valid modes — fails the call with a [`QueryError`] before any retrieval
//! is issued.

pub mod error;
mod fill;
mod fundamental;

use chrono::Utc;
use log::{info, warn};
use snafu::prelude::*;

use crate::client::error::{
    EmptyNameListSnafu, MisalignedSeriesSnafu, OpenEndedFundamentalWindowSnafu, QueryResult,
    ServiceSnafu, TimestampSnafu,
};
use crate::service::{ExtractionService, FundamentalSet, RawSample};
use crate::timestamp::{self, ServiceTimestamp, TimeFormat, TimeInput, Timestamps};
use crate::value::{normalize_series, Series, Value};
use crate::variable::{DataTypeFilter, Variable, VariableSelector};

pub use crate::client::error::QueryError;

/// Per-variable result of a plain time-window query.
///
/// Ordered `(name, Series)` entries preserving the resolution order; each
/// series carries its own timestamp sequence (timestamps are not shared
/// across variables in this mode).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    entries: Vec<(String, Series)>,
}

impl Dataset {
    /// The series for `name`, if the query resolved that variable.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// All `(name, series)` entries in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of variables in the result.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the result holds no variables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, name: String, series: Series) {
        self.entries.push((name, series));
    }
}

/// Result of a master-aligned query: one shared timestamp sequence plus one
/// value column per variable, every column exactly as long as the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedDataset {
    timestamps: Timestamps,
    columns: Vec<(String, Vec<Value>)>,
}

impl AlignedDataset {
    fn empty(format: TimeFormat) -> Self {
        AlignedDataset { timestamps: Timestamps::with_format(format), columns: Vec::new() }
    }

    /// The shared (master) timestamp sequence.
    pub fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    /// The value column for `name`, if present.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    /// All `(name, values)` columns in resolution order (master first).
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Number of variable columns (the timestamp grid is not counted).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the result holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn push_column(&mut self, name: String, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.timestamps.len());
        self.columns.push((name, values));
    }
}

/// Synchronous client over an injected extraction-service handle.
///
/// The handle is assumed already connected and shared for the process's
/// lifetime; the client never manages its lifecycle. Every query method is
/// a blocking round-trip that runs to completion or fails before returning.
#[derive(Clone, Debug)]
pub struct ExtractionClient<S> {
    service: S,
}

impl<S> ExtractionClient<S> {
    /// Wrap an already-initialized service handle.
    pub fn new(service: S) -> Self {
        ExtractionClient { service }
    }

    pub(crate) fn service(&self) -> &S {
        &self.service
    }
}

impl<S: ExtractionService> ExtractionClient<S> {
    /// Resolve a selector into the concrete variable set, preserving the
    /// service's ordering. An empty result is valid; an empty *name list*
    /// is malformed input.
    fn resolve_variables(&self, selector: &VariableSelector) -> QueryResult<Vec<Variable>> {
        match selector {
            VariableSelector::Pattern(pattern) => self
                .service
                .find_variables_by_pattern(pattern, DataTypeFilter::All)
                .context(ServiceSnafu),
            VariableSelector::Names(names) => {
                ensure!(!names.is_empty(), EmptyNameListSnafu);
                self.service.find_variables_by_names(names).context(ServiceSnafu)
            }
        }
    }

    /// Names of all variables matching `pattern`. Wildcard is `%`.
    pub fn search(&self, pattern: &str) -> QueryResult<Vec<String>> {
        let variables = self
            .service
            .find_variables_by_pattern(pattern, DataTypeFilter::All)
            .context(ServiceSnafu)?;
        Ok(variables.into_iter().map(|v| v.name).collect())
    }

    /// Names of the fundamental markers matching `pattern` in the window.
    /// An absent `t2` means "up to now". Returns an empty list when nothing
    /// qualifies.
    pub fn search_fundamentals(
        &self,
        pattern: &str,
        t1: impl Into<TimeInput>,
        t2: Option<TimeInput>,
    ) -> QueryResult<Vec<String>> {
        let ts1 = timestamp::encode(t1.into()).context(TimestampSnafu)?;
        let ts2 = timestamp::encode(t2.unwrap_or_else(|| Utc::now().into()))
            .context(TimestampSnafu)?;
        let fundamentals = self.resolve_fundamentals(ts1, ts2, pattern)?;
        Ok(fundamentals.map(|set| set.variable_names().to_vec()).unwrap_or_default())
    }

    /// Plain time-window retrieval.
    ///
    /// Resolves `selector`, then per variable fetches either all samples in
    /// `[t1, t2]` or, when `t2` is absent, the single most recent sample
    /// before `t1` (within the service's own default lookback). A
    /// fundamental pattern pre-filters the fetched ranges and requires both
    /// window bounds. Timestamps are per variable.
    pub fn get(
        &self,
        selector: impl Into<VariableSelector>,
        t1: impl Into<TimeInput>,
        t2: Option<TimeInput>,
        fundamental: Option<&str>,
        format: TimeFormat,
    ) -> QueryResult<Dataset> {
        let selector = selector.into();
        let ts1 = timestamp::encode(t1.into()).context(TimestampSnafu)?;
        let ts2 = timestamp::encode_opt(t2).context(TimestampSnafu)?;
        ensure!(
            fundamental.is_none() || ts2.is_some(),
            OpenEndedFundamentalWindowSnafu
        );

        let variables = self.resolve_variables(&selector)?;
        if variables.is_empty() {
            warn!("no variables found");
            return Ok(Dataset::default());
        }
        info!(
            "list of variables to be queried: {}",
            variables.iter().map(|v| v.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let fundamentals = match (fundamental, ts2) {
            (Some(pattern), Some(end)) => match self.resolve_fundamentals(ts1, end, pattern)? {
                Some(set) => Some(set),
                // No qualifying markers: nothing can match, skip retrieval.
                None => return Ok(Dataset::default()),
            },
            _ => None,
        };

        let mut out = Dataset::default();
        for variable in &variables {
            let samples = self.fetch_samples(variable, ts1, ts2, fundamentals.as_ref())?;
            info!("retrieved {} values for {}", samples.len(), variable.name);
            let series = normalize_series(samples, &variable.data_type, format)
                .context(TimestampSnafu)?;
            out.push(variable.name.clone(), series);
        }
        Ok(out)
    }

    /// The most recent sample of each resolved variable before `t1`.
    ///
    /// Each series has length 1, or 0 when no prior sample exists within
    /// the service's lookback interval.
    pub fn get_last(
        &self,
        selector: impl Into<VariableSelector>,
        t1: impl Into<TimeInput>,
        format: TimeFormat,
    ) -> QueryResult<Dataset> {
        self.get(selector, t1, None, None, format)
    }

    /// Master-aligned retrieval.
    ///
    /// The first resolved variable is the master: its series over
    /// `[t1, t2]` (optionally fundamental-filtered) defines the shared
    /// timestamp grid, and every other variable is fetched resampled onto
    /// that grid. Short-circuits to an empty dataset when resolution finds
    /// no variables or a requested fundamental pattern matches nothing.
    pub fn get_aligned(
        &self,
        selector: impl Into<VariableSelector>,
        t1: impl Into<TimeInput>,
        t2: impl Into<TimeInput>,
        fundamental: Option<&str>,
        format: TimeFormat,
    ) -> QueryResult<AlignedDataset> {
        let selector = selector.into();
        let ts1 = timestamp::encode(t1.into()).context(TimestampSnafu)?;
        let ts2 = timestamp::encode(t2.into()).context(TimestampSnafu)?;

        let fundamentals = match fundamental {
            Some(pattern) => match self.resolve_fundamentals(ts1, ts2, pattern)? {
                Some(set) => Some(set),
                None => return Ok(AlignedDataset::empty(format)),
            },
            None => None,
        };

        let variables = self.resolve_variables(&selector)?;
        let Some((master, rest)) = variables.split_first() else {
            warn!("no variables found");
            return Ok(AlignedDataset::empty(format));
        };
        info!(
            "list of variables to be queried: {}",
            variables
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    if i == 0 {
                        format!("{} (using as master)", v.name)
                    } else {
                        v.name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        );

        let master_samples = self
            .service
            .fetch_range(master, ts1, ts2, fundamentals.as_ref())
            .context(ServiceSnafu)?;
        info!("retrieved {} values for {} (master)", master_samples.len(), master.name);

        let master_stamps: Vec<ServiceTimestamp> =
            master_samples.iter().map(|s| s.stamp).collect();
        let master_series = normalize_series(master_samples, &master.data_type, format)
            .context(TimestampSnafu)?;

        let mut out = AlignedDataset { timestamps: master_series.timestamps, columns: Vec::new() };
        out.push_column(master.name.clone(), master_series.values);

        for variable in rest {
            if variable.name == master.name {
                continue;
            }
            let samples = self
                .service
                .fetch_aligned_to(variable, &master_stamps)
                .context(ServiceSnafu)?;
            info!("retrieved {} values for {}", samples.len(), variable.name);
            ensure!(
                samples.len() == master_stamps.len(),
                MisalignedSeriesSnafu {
                    variable: variable.name.clone(),
                    expected: master_stamps.len(),
                    actual: samples.len(),
                }
            );
            let series = normalize_series(samples, &variable.data_type, format)
                .context(TimestampSnafu)?;
            out.push_column(variable.name.clone(), series.values);
        }
        Ok(out)
    }

    fn fetch_samples(
        &self,
        variable: &Variable,
        ts1: ServiceTimestamp,
        ts2: Option<ServiceTimestamp>,
        fundamentals: Option<&FundamentalSet>,
    ) -> QueryResult<Vec<RawSample>> {
        match ts2 {
            Some(ts2) => self
                .service
                .fetch_range(variable, ts1, ts2, fundamentals)
                .context(ServiceSnafu),
            None => {
                let last = self.service.fetch_last_before(variable, ts1).context(ServiceSnafu)?;
                Ok(last.into_iter().collect())
            }
        }
    }
}
