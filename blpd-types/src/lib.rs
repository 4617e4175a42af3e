//! blpd-specific data transfer objects and configuration primitives shared by every crate.
#![warn(missing_docs)]

mod config;
mod error;
mod options;
mod prefix;
mod tables;
mod value;

pub use config::{BlpConfig, ConnectionConfig};
pub use error::{BlpError, ErrorInfo};
pub use options::{
    FillMethod, NonTradingDayFill, OverrideOption, Periodicity, PeriodicityAdjustment,
    PeriodicitySelection, PricingOption, ShortCode,
};
pub use prefix::Prefix;
pub use tables::{DataTable, ExceptionRow, ExceptionTable, Label, Tables};
pub use value::Value;
