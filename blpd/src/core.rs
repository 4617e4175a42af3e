use std::sync::Arc;
use std::time::Duration;

use blpd_core::{PollConfig, Request, SessionGateway, StringList, Tables, aggregate};
use blpd_types::{BlpConfig, BlpError, ConnectionConfig};

use crate::router::historical::HistoricalDataBuilder;
use crate::router::reference::ReferenceDataBuilder;

/// Request facade bound to one session gateway.
///
/// Each call builds one request, sends it, folds its events, and returns the
/// data and exception tables. Nothing is kept between calls apart from the
/// session itself.
pub struct Blp {
    pub(crate) session: Arc<dyn SessionGateway>,
    pub(crate) cfg: BlpConfig,
}

/// Builder for constructing a `Blp` facade with custom configuration.
pub struct BlpBuilder {
    session: Option<Arc<dyn SessionGateway>>,
    cfg: BlpConfig,
}

impl Default for BlpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlpBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Starts without a session; register one via [`Self::with_session`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: None,
            cfg: BlpConfig::default(),
        }
    }

    /// Register the session gateway every call goes through.
    ///
    /// A later call replaces an earlier one.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionGateway>) -> Self {
        self.session = Some(session);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: BlpConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the connection target handed to the gateway when the session opens.
    #[must_use]
    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.cfg.connection = connection;
        self
    }

    /// Open the session on first use instead of failing with `NotConnected`.
    ///
    /// Behavior and trade-offs:
    /// - Enabled by default, so a fresh facade works without an explicit `open()`.
    /// - Disable it to surface a closed session as an error rather than a reconnect.
    #[must_use]
    pub const fn auto_open(mut self, yes: bool) -> Self {
        self.cfg.auto_open = yes;
        self
    }

    /// Set the bounded wait of a single poll (default 500 ms).
    ///
    /// Shorter waits notice cancellation sooner at the cost of more polls.
    #[must_use]
    pub const fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.poll_timeout = timeout;
        self
    }

    /// Set an overall deadline for each request.
    ///
    /// When exceeded, the call fails with `RequestTimeout` and the request's
    /// remaining events are left on the session.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Build the `Blp` facade.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no session has been registered via [`Self::with_session`].
    pub fn build(self) -> Result<Blp, BlpError> {
        let Some(session) = self.session else {
            return Err(BlpError::InvalidArg(
                "no session registered; add one via with_session(...)".to_string(),
            ));
        };
        Ok(Blp {
            session,
            cfg: self.cfg,
        })
    }
}

impl Blp {
    /// Start building a new `Blp` facade.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use blpd::Blp;
    /// use blpd_mock::MockSession;
    ///
    /// let blp = Blp::builder()
    ///     .with_session(Arc::new(MockSession::new()))
    ///     .build()?;
    /// let tables = blp.reference_data("UCG IM Equity", "NAME").run().await?;
    /// ```
    #[must_use]
    pub fn builder() -> BlpBuilder {
        BlpBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BlpConfig {
        &self.cfg
    }

    /// The session gateway calls go through.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionGateway> {
        &self.session
    }

    /// Open the session against the configured connection. A no-op when already open.
    ///
    /// # Errors
    /// `ConnectionFailed` or `ServiceUnavailable` from the gateway.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "blpd::core::open", skip(self), fields(gateway = self.session.name()))
    )]
    pub async fn open(&self) -> Result<(), BlpError> {
        self.session.open(&self.cfg.connection).await
    }

    /// Close the session. A no-op when already closed.
    ///
    /// # Errors
    /// Errors reported by the gateway.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "blpd::core::close", skip(self), fields(gateway = self.session.name()))
    )]
    pub async fn close(&self) -> Result<(), BlpError> {
        self.session.close().await
    }

    /// Whether the session is open.
    pub async fn is_open(&self) -> bool {
        self.session.is_active().await
    }

    /// Start a point-in-time request, like a spreadsheet `BDP` call.
    pub fn reference_data(
        &self,
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
    ) -> ReferenceDataBuilder<'_> {
        ReferenceDataBuilder::new(self, securities, fields)
    }

    /// Start a historical request from `start`, like a spreadsheet `BDH` call.
    ///
    /// `start` accepts `YYYYMMDD`, `YYYY-MM-DD`, `FYyyyy`, or `CYyyyy`.
    pub fn historical_data(
        &self,
        securities: impl Into<StringList>,
        fields: impl Into<StringList>,
        start: impl Into<String>,
    ) -> HistoricalDataBuilder<'_> {
        HistoricalDataBuilder::new(self, securities, fields, start)
    }

    /// Run a prebuilt request and return its tables, transposed when `swap` is set.
    ///
    /// # Errors
    /// `NotConnected` when the session is closed and auto-open is disabled,
    /// session errors from opening, and the fatal aggregation errors
    /// (`UnexpectedMessageShape`, `RequestFailed`, `RequestTimeout`).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "blpd::core::execute",
            skip(self, request),
            fields(
                gateway = self.session.name(),
                operation = request.operation(),
                swap = swap,
            ),
        )
    )]
    pub async fn execute(&self, request: &Request, swap: bool) -> Result<Tables, BlpError> {
        self.ensure_open().await?;
        let poll = PollConfig {
            poll_timeout: self.cfg.poll_timeout,
            request_timeout: self.cfg.request_timeout,
        };
        let tables = aggregate(self.session.as_ref(), request, &poll).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = tables.data.shape().0,
            columns = tables.data.shape().1,
            exceptions = tables.exceptions.len(),
            "request aggregated"
        );
        Ok(if swap { tables.swapped() } else { tables })
    }

    async fn ensure_open(&self) -> Result<(), BlpError> {
        if self.session.is_active().await {
            return Ok(());
        }
        if !self.cfg.auto_open {
            return Err(BlpError::NotConnected);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(gateway = self.session.name(), "auto-opening session");
        self.session.open(&self.cfg.connection).await
    }
}
