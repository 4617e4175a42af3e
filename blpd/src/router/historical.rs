use blpd_core::{HistoricalRequestBuilder, Overrides, PrefixSpec, Request, StringList, Tables};
use blpd_types::BlpError;

use crate::Blp;

/// Builder for one historical request issued through a [`Blp`] facade.
///
/// Option setters take the provider's short codes; an unknown code fails
/// `run()` with `InvalidOption` naming its group, before anything is sent.
pub struct HistoricalDataBuilder<'a> {
    pub(crate) blp: &'a Blp,
    pub(crate) request: HistoricalRequestBuilder,
    pub(crate) swap: bool,
}

macro_rules! forward {
    ($(#[$doc:meta] $name:ident($arg:ident: $ty:ty);)+) => {
        $(
            #[$doc]
            #[must_use]
            pub fn $name(mut self, $arg: $ty) -> Self {
                self.request = self.request.$name($arg);
                self
            }
        )+
    };
}

impl<'a> HistoricalDataBuilder<'a> {
    /// Create a new builder bound to a `Blp` instance.
    ///
    /// Validation is deferred until `run()`.
    pub fn new(
        blp: &'a Blp,
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
        start: impl Into<String>,
    ) -> Self {
        Self {
            blp,
            request: Request::historical(securities, fields, start),
            swap: false,
        }
    }

    forward! {
        /// Last date of the series; the latest available when unset.
        end(end: impl Into<String>);
        /// Namespace of the identifiers: one for all, or one per security.
        prefix(prefix: impl Into<PrefixSpec>);
        /// Replace the override set.
        overrides(overrides: Overrides);
        /// Two-letter periodicity code, adjustment then selection (`"CD"`, `"FY"`).
        periodicity(code: impl Into<String>);
        /// Non-trading day fill: `A`, `T`, or `W`.
        fill_days(code: impl Into<String>);
        /// Fill method: `N` or `P`.
        fill_method(code: impl Into<String>);
        /// Pricing option: `P` or `Y`.
        pricing(code: impl Into<String>);
        /// Override option: `C` or `G`.
        override_option(code: impl Into<String>);
        /// Calendar code override.
        calendar(code: impl Into<String>);
        /// Currency the values are converted to.
        currency(currency: impl Into<String>);
        /// Cap on the number of points per security.
        max_data_points(n: u32);
        /// Adjust for abnormal cash dividends.
        adjustment_abnormal(on: bool);
        /// Adjust for splits.
        adjustment_split(on: bool);
        /// Adjust for normal cash dividends.
        adjustment_normal(on: bool);
        /// Follow the terminal's default adjustment settings.
        adjustment_follow_dpdf(on: bool);
        /// Return relative dates alongside values.
        return_relative_date(on: bool);
    }

    /// Add or replace one override.
    #[must_use]
    pub fn override_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.override_field(field, value);
        self
    }

    /// Put (security, field) pairs in rows and dates in columns.
    #[must_use]
    pub const fn swap(mut self, yes: bool) -> Self {
        self.swap = yes;
        self
    }

    /// Validate, send, and aggregate the request.
    ///
    /// # Errors
    /// Validation errors before anything is sent, then those of [`Blp::execute`].
    pub async fn run(self) -> Result<Tables, BlpError> {
        let request = self.request.build()?;
        self.blp.execute(&request, self.swap).await
    }
}
