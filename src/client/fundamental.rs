//! Resolution of fundamental-event filters.
//!
//! A fundamental filter restricts a time-windowed retrieval to samples
//! temporally associated with matching event markers. Resolution happens
//! once per query; an empty match is a normal outcome that the query modes
//! translate into an empty result, never an error.

use log::info;
use snafu::prelude::*;

use crate::client::error::{QueryResult, ServiceSnafu};
use crate::client::ExtractionClient;
use crate::service::{ExtractionService, FundamentalSet};
use crate::timestamp::ServiceTimestamp;

impl<S: ExtractionService> ExtractionClient<S> {
    /// Resolve the fundamental markers matching `pattern` inside the closed
    /// window `[start, end]`. `None` means nothing qualified and the caller
    /// should skip fundamental filtering (or short-circuit, per mode).
    pub(crate) fn resolve_fundamentals(
        &self,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        pattern: &str,
    ) -> QueryResult<Option<FundamentalSet>> {
        info!("querying fundamentals (pattern: {pattern})");
        let fundamentals = self
            .service()
            .find_fundamentals_in_window(start, end, pattern)
            .context(ServiceSnafu)?;
        match &fundamentals {
            None => info!("no fundamental found in time window"),
            Some(set) => {
                info!("list of fundamentals found: {}", set.variable_names().join(", "));
            }
        }
        Ok(fundamentals)
    }
}
