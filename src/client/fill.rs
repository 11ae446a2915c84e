//! Fill and beam-mode queries.
//!
//! A narrower read path than the sample queries: fetch one fill (by number
//! or the latest completed one) or every fill intersecting a window,
//! optionally restricted to fills containing given beam modes. Fill and
//! interval bounds are decoded with the timestamp codec into structured
//! UTC instants.

use snafu::prelude::*;

use crate::client::error::{NoValidBeamModesSnafu, QueryResult, ServiceSnafu, TimestampSnafu};
use crate::client::ExtractionClient;
use crate::fill::{BeamModeInterval, BeamModeSelector, Fill};
use crate::service::{ExtractionService, RawFill};
use crate::timestamp::{self, TimeInput};

fn decode_fill(raw: RawFill) -> QueryResult<Fill> {
    let beam_modes = raw
        .beam_modes
        .into_iter()
        .map(|interval| {
            let decoded = BeamModeInterval {
                start_time: timestamp::decode(interval.start).context(TimestampSnafu)?,
                end_time: timestamp::decode(interval.end).context(TimestampSnafu)?,
            };
            Ok((interval.mode, decoded))
        })
        .collect::<QueryResult<Vec<_>>>()?;

    Ok(Fill {
        fill_number: raw.fill_number,
        start_time: timestamp::decode(raw.start).context(TimestampSnafu)?,
        end_time: timestamp::decode(raw.end).context(TimestampSnafu)?,
        beam_modes,
    })
}

impl<S: ExtractionService> ExtractionClient<S> {
    /// Times and beam modes for one fill.
    ///
    /// `Some(n)` fetches fill `n`; `None` fetches the most recent completed
    /// fill. A fill number the service does not know yields `Ok(None)`.
    pub fn get_fill_data(&self, fill_number: Option<u32>) -> QueryResult<Option<Fill>> {
        let raw = match fill_number {
            Some(n) => self.service().fetch_fill_by_number(n).context(ServiceSnafu)?,
            None => Some(self.service().fetch_latest_completed_fill().context(ServiceSnafu)?),
        };
        raw.map(decode_fill).transpose()
    }

    /// All fills whose span intersects `[t1, t2]`.
    ///
    /// With a beam-mode filter, the filter is validated against the fixed
    /// recognized mode set first — a filter with no valid entries is an
    /// input error — and only fills containing at least one matching mode
    /// are returned.
    pub fn get_fills_by_time(
        &self,
        t1: impl Into<TimeInput>,
        t2: impl Into<TimeInput>,
        beam_modes: Option<BeamModeSelector>,
    ) -> QueryResult<Vec<Fill>> {
        let ts1 = timestamp::encode(t1.into()).context(TimestampSnafu)?;
        let ts2 = timestamp::encode(t2.into()).context(TimestampSnafu)?;

        let modes = match &beam_modes {
            None => None,
            Some(selector) => {
                let valid = selector.valid_modes();
                ensure!(
                    !valid.is_empty(),
                    NoValidBeamModesSnafu { input: selector.to_string() }
                );
                Some(valid)
            }
        };

        let fills = self
            .service()
            .fetch_fills_in_window(ts1, ts2, modes.as_deref())
            .context(ServiceSnafu)?;
        fills.into_iter().map(decode_fill).collect()
    }
}
