//! Client-side access layer for an accelerator measurement archive.
//!
//! This crate turns user-level queries — variable name patterns, time
//! windows, fundamental-event filters — into calls against a remote
//! data-extraction service, and shapes the returned records into
//! array-oriented, timestamped datasets:
//!
//! - The `timestamp` module converts between caller time representations
//!   (text, `DateTime<Utc>`, fractional epoch seconds) and the service's
//!   seconds-plus-nanoseconds encoding.
//! - The `variable` module models archive variables, their datatype tags,
//!   and the pattern/name-list selectors used to resolve them.
//! - The `value` module decodes heterogeneous sample payloads into uniform
//!   `(timestamp, value)` series.
//! - The `client` module is the query engine: plain time-window retrieval,
//!   last-value lookup, and master-aligned multi-variable retrieval, plus
//!   fill/beam-mode queries.
//! - The `hierarchy` module browses the variable-discovery namespace tree.
//!
//! The crate does not talk to the archive itself: the embedding application
//! injects an already-connected [`ExtractionService`] implementation, and
//! every retrieval is a synchronous, blocking round-trip against it.
//!
//! ```no_run
//! use cals_client::{ExtractionClient, ExtractionService, TimeFormat};
//!
//! fn demo(service: impl ExtractionService) -> Result<(), cals_client::QueryError> {
//!     let db = ExtractionClient::new(service);
//!     let data = db.get_aligned(
//!         "LHC.BCTDC.%",
//!         "2018-05-01 12:00:00",
//!         "2018-05-01 13:00:00",
//!         None,
//!         TimeFormat::UnixSeconds,
//!     )?;
//!     for (name, values) in data.columns() {
//!         println!("{name}: {} samples", values.len());
//!     }
//!     Ok(())
//! }
//! ```
#![deny(missing_docs)]

pub mod client;
pub mod fill;
pub mod hierarchy;
pub mod service;
pub mod timestamp;
pub mod value;
pub mod variable;

pub use client::{AlignedDataset, Dataset, ExtractionClient, QueryError};
pub use client::error::QueryResult;
pub use fill::{BeamMode, BeamModeInterval, BeamModeSelector, Fill};
pub use hierarchy::{sanitize, HierarchyBrowser};
pub use service::{
    ExtractionService, FundamentalSet, HierarchyNode, HierarchyService, RawBeamModeInterval,
    RawFill, RawSample, RawValue, ServiceError, ServiceResult,
};
pub use timestamp::{ServiceTimestamp, TimeFormat, TimeInput, TimestampError, Timestamps};
pub use value::{Series, Value};
pub use variable::{DataTypeFilter, Variable, VariableDataType, VariableSelector};
