//! blpd-core
//!
//! Request construction and response reassembly for a session-oriented
//! reference-data service.
//!
//! - `security`: canonical security strings from identifiers and namespaces.
//! - `request`: validated point-in-time and historical [`Request`] values.
//! - `session`: the [`SessionGateway`] contract and its event model.
//! - `aggregate`: folding correlated events into a data table and an
//!   exception table.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The aggregation loop bounds each poll and the optional request deadline
//! with `tokio::time`, so callers must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

pub mod aggregate;
pub mod request;
pub mod security;
pub mod session;

pub use aggregate::{
    Accumulator, AggregationState, Cell, CellKey, PollConfig, aggregate, collect,
};
pub use request::{
    DateBound, HistoricalOptions, HistoricalRequestBuilder, Overrides, ReferenceOptions,
    ReferenceRequestBuilder, Request, RequestKind,
};
pub use security::{PrefixSpec, StringList, format_securities, format_security, format_security_str};
pub use session::{
    CorrelationId, Event, EventKind, FieldData, FieldException, Message, SecurityData, SeriesRow,
    SessionGateway,
};

pub use blpd_types::*;
