use blpd_core::{Overrides, PrefixSpec, ReferenceRequestBuilder, Request, StringList, Tables};
use blpd_types::BlpError;

use crate::Blp;

/// Builder for one point-in-time request issued through a [`Blp`] facade.
pub struct ReferenceDataBuilder<'a> {
    pub(crate) blp: &'a Blp,
    pub(crate) request: ReferenceRequestBuilder,
    pub(crate) swap: bool,
}

impl<'a> ReferenceDataBuilder<'a> {
    /// Create a new builder bound to a `Blp` instance.
    ///
    /// Validation is deferred until `run()`.
    pub fn new(
        blp: &'a Blp,
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
    ) -> Self {
        Self {
            blp,
            request: Request::reference(securities, fields),
            swap: false,
        }
    }

    /// Namespace of the identifiers: one for all, or one per security.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<PrefixSpec>) -> Self {
        self.request = self.request.prefix(prefix);
        self
    }

    /// Replace the override set.
    #[must_use]
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.request = self.request.overrides(overrides);
        self
    }

    /// Add or replace one override.
    #[must_use]
    pub fn override_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.override_field(field, value);
        self
    }

    /// Return entitlement ids alongside values.
    #[must_use]
    pub fn return_eids(mut self, on: bool) -> Self {
        self.request = self.request.return_eids(on);
        self
    }

    /// Return every value as its formatted string.
    #[must_use]
    pub fn return_formatted_value(mut self, on: bool) -> Self {
        self.request = self.request.return_formatted_value(on);
        self
    }

    /// Return times in UTC.
    #[must_use]
    pub fn use_utc_time(mut self, on: bool) -> Self {
        self.request = self.request.use_utc_time(on);
        self
    }

    /// Force delayed exchange data.
    #[must_use]
    pub fn forced_delay(mut self, on: bool) -> Self {
        self.request = self.request.forced_delay(on);
        self
    }

    /// Put fields in rows and securities in columns.
    #[must_use]
    pub const fn swap(mut self, yes: bool) -> Self {
        self.swap = yes;
        self
    }

    /// Validate, send, and aggregate the request.
    ///
    /// Per-security and per-field failures end up in the exception table;
    /// only the failures listed below abort the call.
    ///
    /// # Errors
    /// Validation errors before anything is sent, then those of [`Blp::execute`].
    pub async fn run(self) -> Result<Tables, BlpError> {
        let request = self.request.build()?;
        self.blp.execute(&request, self.swap).await
    }
}
