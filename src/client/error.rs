//! Error taxonomy for query calls.
//!
//! Only malformed input and service failures are errors. "Nothing found"
//! outcomes — an empty pattern match, an absent fundamental set, an absent
//! fill — are normal empty results and short-circuit the remaining work of
//! the same call instead of failing it.

use snafu::prelude::*;

use crate::service::ServiceError;
use crate::timestamp::TimestampError;

/// Result alias for query-engine calls.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by query calls.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum QueryError {
    /// An explicit variable-name list with no entries (malformed input).
    #[snafu(display("Variable name list is empty"))]
    EmptyNameList,

    /// Fundamental filtering requested on an open-ended window; both window
    /// bounds are required to resolve fundamentals.
    #[snafu(display("Fundamental filtering requires a closed time window (end bound is absent)"))]
    OpenEndedFundamentalWindow,

    /// A beam-mode filter validated to zero recognized modes.
    #[snafu(display("No valid beam modes in filter {input:?}"))]
    NoValidBeamModes {
        /// The filter text as given by the caller.
        input: String,
    },

    /// A caller-supplied time bound could not be encoded, or a service
    /// timestamp could not be decoded.
    #[snafu(display("Invalid time bound: {source}"))]
    Timestamp {
        /// Underlying conversion error.
        source: TimestampError,
    },

    /// An aligned retrieval returned a different sample count than the
    /// master grid, violating the alignment invariant.
    #[snafu(display(
        "Aligned response for {variable} has {actual} samples, expected {expected}"
    ))]
    MisalignedSeries {
        /// The variable whose aligned response was the wrong length.
        variable: String,
        /// Master sample count.
        expected: usize,
        /// Sample count actually returned.
        actual: usize,
    },

    /// The external service failed; propagated unchanged, no retry.
    #[snafu(display("{source}"))]
    Service {
        /// The service's own failure.
        source: ServiceError,
    },
}
