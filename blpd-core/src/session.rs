//! The session gateway contract and the event model it delivers.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use blpd_types::{BlpError, ConnectionConfig, ErrorInfo, Value};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::request::Request;

/// Opaque token binding a sent request to the events that answer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(u64);

impl CorrelationId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cid:{}", self.0)
    }
}

/// Type of an event delivered by [`SessionGateway::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// More messages will follow for the requests it answers.
    PartialResponse,
    /// Final event for the requests it answers.
    Response,
    /// Nothing arrived within the poll timeout.
    Timeout,
    /// Session or service status notification.
    Status,
}

/// One event from the session's stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type.
    pub kind: EventKind,
    /// Messages carried by the event, possibly none.
    pub messages: Vec<Message>,
}

impl Event {
    /// A non-final response event.
    #[must_use]
    pub const fn partial(messages: Vec<Message>) -> Self {
        Self {
            kind: EventKind::PartialResponse,
            messages,
        }
    }

    /// A final response event.
    #[must_use]
    pub const fn response(messages: Vec<Message>) -> Self {
        Self {
            kind: EventKind::Response,
            messages,
        }
    }

    /// The marker returned when a poll timed out.
    #[must_use]
    pub const fn timeout() -> Self {
        Self {
            kind: EventKind::Timeout,
            messages: Vec::new(),
        }
    }

    /// A status notification.
    #[must_use]
    pub const fn status(messages: Vec<Message>) -> Self {
        Self {
            kind: EventKind::Status,
            messages,
        }
    }

    /// Whether this is a final response with a message answering `cid`.
    #[must_use]
    pub fn is_terminal_for(&self, cid: CorrelationId) -> bool {
        self.kind == EventKind::Response && self.messages.iter().any(|m| m.answers(cid))
    }

    /// Whether this is a final response carrying no messages.
    ///
    /// Such an event names no request; see [`crate::Accumulator::absorb_event`]
    /// for when it ends one.
    #[must_use]
    pub fn is_bare_response(&self) -> bool {
        self.kind == EventKind::Response && self.messages.is_empty()
    }
}

/// One message of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Requests this message answers.
    pub correlation_ids: Vec<CorrelationId>,
    /// Provider message type, e.g. `ReferenceDataResponse`.
    pub message_type: String,
    /// Per-security results; absent on status and error messages.
    pub security_data: Option<Vec<SecurityData>>,
    /// Request-level failure.
    pub response_error: Option<ErrorInfo>,
}

impl Message {
    /// A point-in-time response message.
    #[must_use]
    pub fn reference(cid: CorrelationId, data: Vec<SecurityData>) -> Self {
        Self {
            correlation_ids: vec![cid],
            message_type: "ReferenceDataResponse".into(),
            security_data: Some(data),
            response_error: None,
        }
    }

    /// A historical response message.
    #[must_use]
    pub fn historical(cid: CorrelationId, data: Vec<SecurityData>) -> Self {
        Self {
            correlation_ids: vec![cid],
            message_type: "HistoricalDataResponse".into(),
            security_data: Some(data),
            response_error: None,
        }
    }

    /// A request-level failure.
    #[must_use]
    pub fn response_error(cid: CorrelationId, info: ErrorInfo) -> Self {
        Self {
            correlation_ids: vec![cid],
            message_type: "ResponseError".into(),
            security_data: None,
            response_error: Some(info),
        }
    }

    /// An uncorrelated status message such as `SessionStarted`.
    #[must_use]
    pub fn status(message_type: impl Into<String>) -> Self {
        Self {
            correlation_ids: Vec::new(),
            message_type: message_type.into(),
            security_data: None,
            response_error: None,
        }
    }

    /// True when this message is tagged with `cid`.
    #[must_use]
    pub fn answers(&self, cid: CorrelationId) -> bool {
        self.correlation_ids.contains(&cid)
    }
}

/// Results for one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityData {
    /// Canonical security string as echoed by the provider.
    pub security: String,
    /// Field values.
    pub field_data: FieldData,
    /// Field-level failures.
    pub field_exceptions: Vec<FieldException>,
    /// Security-level failure.
    pub security_error: Option<ErrorInfo>,
}

impl SecurityData {
    /// Point-in-time values for `security`.
    pub fn point<F: Into<String>>(
        security: impl Into<String>,
        values: impl IntoIterator<Item = (F, Value)>,
    ) -> Self {
        Self {
            security: security.into(),
            field_data: FieldData::Point(values.into_iter().map(|(f, v)| (f.into(), v)).collect()),
            field_exceptions: Vec::new(),
            security_error: None,
        }
    }

    /// Dated rows for `security`.
    pub fn series(security: impl Into<String>, rows: Vec<SeriesRow>) -> Self {
        Self {
            security: security.into(),
            field_data: FieldData::Series(rows),
            field_exceptions: Vec::new(),
            security_error: None,
        }
    }

    /// Attach a field-level failure.
    #[must_use]
    pub fn with_field_exception(mut self, field: impl Into<String>, error: ErrorInfo) -> Self {
        self.field_exceptions.push(FieldException {
            field: field.into(),
            error,
        });
        self
    }

    /// Attach a security-level failure.
    #[must_use]
    pub fn with_security_error(mut self, error: ErrorInfo) -> Self {
        self.security_error = Some(error);
        self
    }
}

/// Field values of one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldData {
    /// Current value per field.
    Point(Vec<(String, Value)>),
    /// One row per reported date.
    Series(Vec<SeriesRow>),
}

impl FieldData {
    /// True when no value was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(v) => v.is_empty(),
            Self::Series(rows) => rows.is_empty(),
        }
    }
}

/// Values of one date in a historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Observation date.
    pub date: NaiveDate,
    /// Field values observed on `date`.
    pub values: Vec<(String, Value)>,
}

impl SeriesRow {
    /// A row of `values` on `date`.
    pub fn new<F: Into<String>>(
        date: NaiveDate,
        values: impl IntoIterator<Item = (F, Value)>,
    ) -> Self {
        Self {
            date,
            values: values.into_iter().map(|(f, v)| (f.into(), v)).collect(),
        }
    }
}

/// A failure for one field of an otherwise valid security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldException {
    /// Field id; empty when the provider did not name one.
    pub field: String,
    /// Reported error block.
    pub error: ErrorInfo,
}

/// A session with the provider's reference-data service.
///
/// Implementations keep their own connection state behind `&self`. One
/// session carries one outstanding request at a time: the caller that sent a
/// request owns the event stream until its terminal event.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// A stable label used in logs and connection errors.
    fn name(&self) -> &'static str;

    /// Start a session against `connection` and open its service.
    ///
    /// A no-op when already active; the target only matters for the call
    /// that actually starts the session.
    ///
    /// # Errors
    /// `ConnectionFailed` if the session cannot start and
    /// `ServiceUnavailable` if the service cannot be opened. The gateway
    /// stays inactive in both cases.
    async fn open(&self, connection: &ConnectionConfig) -> Result<(), BlpError>;

    /// Stop the session. A no-op when inactive.
    async fn close(&self) -> Result<(), BlpError>;

    /// Whether the session is started and the service open.
    async fn is_active(&self) -> bool;

    /// Dispatch `request` and return the id its events will carry.
    ///
    /// # Errors
    /// `NotConnected` when the session is not active.
    async fn send(&self, request: &Request) -> Result<CorrelationId, BlpError>;

    /// Wait at most `timeout` for the next event.
    ///
    /// Returns an [`EventKind::Timeout`] event if none arrived.
    ///
    /// # Errors
    /// `NotConnected` when the session is not active.
    async fn poll(&self, timeout: Duration) -> Result<Event, BlpError>;
}
