//! The external extraction-service boundary.
//!
//! This client does not talk to the archive itself; it orchestrates calls
//! against an already-connected service handle that the embedding
//! application injects at construction time. The two traits here are that
//! boundary:
//!
//! - [`ExtractionService`] — metadata lookup, time-windowed retrieval,
//!   alignment-by-timestamp retrieval, and fill bookkeeping.
//! - [`HierarchyService`] — the variable-discovery namespace tree.
//!
//! Every call is a synchronous, blocking round-trip. The client performs no
//! retry, caching, or suppression: a [`ServiceError`] propagates to the
//! caller unchanged. Connection setup and teardown are the service
//! implementation's responsibility; the handle is assumed live for the
//! process's lifetime.
//!
//! The raw record types in this module mirror the service's wire records
//! before any shaping. Decoding them into analysis-ready values is the
//! job of [`crate::value`].

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fill::BeamMode;
use crate::timestamp::ServiceTimestamp;
use crate::variable::{DataTypeFilter, Variable};

/// Result alias for service-boundary calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// An opaque failure reported by the external service.
///
/// The client attaches no interpretation; whatever the service said is
/// carried verbatim to the caller.
#[derive(Clone, Debug)]
pub struct ServiceError {
    message: String,
}

impl ServiceError {
    /// Wrap a service-side failure message.
    pub fn new(message: impl Into<String>) -> Self {
        ServiceError { message: message.into() }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extraction service failure: {}", self.message)
    }
}

impl Error for ServiceError {}

/// One undecoded sample payload, as the service returned it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    /// Scalar double.
    Double(f64),
    /// 1-D double array.
    DoubleVector(Vec<f64>),
    /// 2-D double array, row by row.
    DoubleMatrix(Vec<Vec<f64>>),
    /// 1-D string array.
    StringVector(Vec<String>),
    /// Free text.
    Varchar(String),
    /// Payload-less event marker.
    Marker,
}

/// One undecoded (timestamp, payload) record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// When the sample was recorded.
    pub stamp: ServiceTimestamp,
    /// The sample's payload.
    pub payload: RawValue,
}

/// A resolved set of fundamental event markers.
///
/// Opaque to callers beyond the marker names; it is consumed only by
/// retrieval calls inside the same query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSet {
    names: Vec<String>,
}

impl FundamentalSet {
    /// Build a set from resolved marker names.
    pub fn new(names: Vec<String>) -> Self {
        FundamentalSet { names }
    }

    /// Names of the qualifying markers, in service order.
    pub fn variable_names(&self) -> &[String] {
        &self.names
    }
}

/// One undecoded beam-mode interval inside a fill record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawBeamModeInterval {
    /// Service-side beam-mode tag (for example `"STABLE"`).
    pub mode: String,
    /// Interval start.
    pub start: ServiceTimestamp,
    /// Interval end.
    pub end: ServiceTimestamp,
}

/// One undecoded fill record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFill {
    /// The fill number.
    pub fill_number: u32,
    /// Fill start.
    pub start: ServiceTimestamp,
    /// Fill end.
    pub end: ServiceTimestamp,
    /// Beam-mode intervals, ordered by time as the service returned them.
    pub beam_modes: Vec<RawBeamModeInterval>,
}

/// Metadata lookup and sample retrieval against the archive.
///
/// Implementations are expected to preserve their own result ordering; the
/// client never re-sorts what comes back.
pub trait ExtractionService {
    /// All variables whose name matches `pattern` (wildcard `%`), optionally
    /// restricted by datatype.
    fn find_variables_by_pattern(
        &self,
        pattern: &str,
        filter: DataTypeFilter,
    ) -> ServiceResult<Vec<Variable>>;

    /// Variables named exactly any of `names`.
    fn find_variables_by_names(&self, names: &[String]) -> ServiceResult<Vec<Variable>>;

    /// Fundamental markers matching `pattern` inside `[start, end]`, or
    /// `None` when nothing qualifies.
    fn find_fundamentals_in_window(
        &self,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        pattern: &str,
    ) -> ServiceResult<Option<FundamentalSet>>;

    /// All samples of `variable` in `[start, end]`, optionally pre-filtered
    /// by a resolved fundamental set.
    fn fetch_range(
        &self,
        variable: &Variable,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        fundamentals: Option<&FundamentalSet>,
    ) -> ServiceResult<Vec<RawSample>>;

    /// The most recent sample of `variable` before `start`, if one exists
    /// within the service's own default lookback interval. That bound is
    /// entirely service-defined and invisible to this client.
    fn fetch_last_before(
        &self,
        variable: &Variable,
        start: ServiceTimestamp,
    ) -> ServiceResult<Option<RawSample>>;

    /// `variable`'s data resampled onto exactly `master_stamps`.
    fn fetch_aligned_to(
        &self,
        variable: &Variable,
        master_stamps: &[ServiceTimestamp],
    ) -> ServiceResult<Vec<RawSample>>;

    /// One fill by number, or `None` if no such fill exists.
    fn fetch_fill_by_number(&self, fill_number: u32) -> ServiceResult<Option<RawFill>>;

    /// The most recent completed fill.
    fn fetch_latest_completed_fill(&self) -> ServiceResult<RawFill>;

    /// All fills whose span intersects `[start, end]`; with `modes`, only
    /// fills containing at least one of the given beam modes.
    fn fetch_fills_in_window(
        &self,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        modes: Option<&[BeamMode]>,
    ) -> ServiceResult<Vec<RawFill>>;
}

impl<T: ExtractionService + ?Sized> ExtractionService for &T {
    fn find_variables_by_pattern(
        &self,
        pattern: &str,
        filter: DataTypeFilter,
    ) -> ServiceResult<Vec<Variable>> {
        (**self).find_variables_by_pattern(pattern, filter)
    }

    fn find_variables_by_names(&self, names: &[String]) -> ServiceResult<Vec<Variable>> {
        (**self).find_variables_by_names(names)
    }

    fn find_fundamentals_in_window(
        &self,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        pattern: &str,
    ) -> ServiceResult<Option<FundamentalSet>> {
        (**self).find_fundamentals_in_window(start, end, pattern)
    }

    fn fetch_range(
        &self,
        variable: &Variable,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        fundamentals: Option<&FundamentalSet>,
    ) -> ServiceResult<Vec<RawSample>> {
        (**self).fetch_range(variable, start, end, fundamentals)
    }

    fn fetch_last_before(
        &self,
        variable: &Variable,
        start: ServiceTimestamp,
    ) -> ServiceResult<Option<RawSample>> {
        (**self).fetch_last_before(variable, start)
    }

    fn fetch_aligned_to(
        &self,
        variable: &Variable,
        master_stamps: &[ServiceTimestamp],
    ) -> ServiceResult<Vec<RawSample>> {
        (**self).fetch_aligned_to(variable, master_stamps)
    }

    fn fetch_fill_by_number(&self, fill_number: u32) -> ServiceResult<Option<RawFill>> {
        (**self).fetch_fill_by_number(fill_number)
    }

    fn fetch_latest_completed_fill(&self) -> ServiceResult<RawFill> {
        (**self).fetch_latest_completed_fill()
    }

    fn fetch_fills_in_window(
        &self,
        start: ServiceTimestamp,
        end: ServiceTimestamp,
        modes: Option<&[BeamMode]>,
    ) -> ServiceResult<Vec<RawFill>> {
        (**self).fetch_fills_in_window(start, end, modes)
    }
}

/// One node of the variable-discovery namespace tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Service-side node identifier.
    pub node_id: u64,
    /// Raw (unsanitized) node name.
    pub name: String,
    /// Human-readable description, when the service has one.
    pub description: Option<String>,
}

/// The hierarchical namespace used for variable discovery.
pub trait HierarchyService {
    /// The top-level nodes of the tree.
    fn top_level_nodes(&self) -> ServiceResult<Vec<HierarchyNode>>;

    /// Direct children of `node`.
    fn children_of(&self, node: &HierarchyNode) -> ServiceResult<Vec<HierarchyNode>>;

    /// Names of the variables attached to `node`.
    fn variables_attached_to(&self, node: &HierarchyNode) -> ServiceResult<Vec<String>>;
}
