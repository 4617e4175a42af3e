//! blpd turns reference-data requests against a Bloomberg session into tables.
//!
//! Overview
//! - One call builds one request, sends it on the registered session, folds
//!   every correlated response event, and returns a [`Tables`] pair: a data
//!   table and an exception table.
//! - Partial failure is data: an unknown security, an invalid field, or a
//!   field not applicable to a security becomes an exception row, never an
//!   error. Only validation, session, and protocol failures abort a call.
//! - Point-in-time requests yield one row per security and one column per
//!   field. Historical requests yield one row per date and one column per
//!   (security, field) pair. `swap(true)` transposes either.
//!
//! Examples
//! A point-in-time request for two securities:
//! ```rust,ignore
//! use std::sync::Arc;
//! use blpd::Blp;
//! use blpd_mock::MockSession;
//!
//! let blp = Blp::builder()
//!     .with_session(Arc::new(MockSession::new()))
//!     .build()?;
//! let tables = blp
//!     .reference_data(["UCG IM Equity", "ISP IM Equity"], ["NAME", "COUNTRY_FULL_NAME"])
//!     .run()
//!     .await?;
//! println!("{}", tables.data);
//! println!("{}", tables.exceptions);
//! ```
//!
//! Fiscal-year fundamentals with an ISIN identifier:
//! ```rust,ignore
//! let tables = blp
//!     .historical_data("IT0005239360", ["NET_REV", "NET_INCOME"], "FY2016")
//!     .end("FY2017")
//!     .prefix("isin")
//!     .periodicity("FY")
//!     .run()
//!     .await?;
//! ```
#![warn(missing_docs)]

mod core;
mod router;

pub use crate::core::{Blp, BlpBuilder};
pub use router::historical::HistoricalDataBuilder;
pub use router::reference::ReferenceDataBuilder;

pub use blpd_core::{
    CorrelationId, DateBound, Overrides, PollConfig, PrefixSpec, Request, SessionGateway,
    StringList,
};
pub use blpd_types::{
    BlpConfig, BlpError, ConnectionConfig, DataTable, ErrorInfo, ExceptionRow, ExceptionTable,
    Label, Prefix, Tables, Value,
};
