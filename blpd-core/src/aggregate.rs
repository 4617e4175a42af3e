//! Folding correlated response events into result tables.
//!
//! [`Accumulator`] is the pure part: it absorbs messages for one request and
//! projects what it collected into a [`Tables`] pair. [`aggregate`] drives it
//! from a [`SessionGateway`], polling until the terminal event arrives.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use blpd_types::{
    BlpError, DataTable, ErrorInfo, ExceptionRow, ExceptionTable, Label, Tables, Value,
};
use chrono::NaiveDate;

use crate::request::Request;
use crate::session::{CorrelationId, Event, FieldData, Message, SecurityData, SessionGateway};

/// What was reported for one (security, field, date) slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A field value.
    Value(Value),
    /// The field failed for this security.
    FieldError(ErrorInfo),
    /// The security itself failed.
    SecurityError(ErrorInfo),
}

/// Slot of a [`Cell`].
///
/// Security errors have neither field nor date; field errors have no date;
/// point values have no date; series values have both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    /// Canonical security string.
    pub security: String,
    /// Field mnemonic.
    pub field: Option<String>,
    /// Observation date of a series value.
    pub date: Option<NaiveDate>,
}

impl CellKey {
    fn new(security: &str, field: Option<&str>, date: Option<NaiveDate>) -> Self {
        Self {
            security: security.to_string(),
            field: field.map(str::to_string),
            date,
        }
    }
}

/// Progress of one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationState {
    /// Sent, nothing received yet.
    Awaiting,
    /// At least one matching message was absorbed.
    Accumulating,
    /// The terminal event arrived.
    Complete,
}

/// Accumulated results of one request.
///
/// Writes follow these rules, whatever order messages arrive in:
/// a later value for the same slot replaces the earlier one; a field error
/// removes the values of that (security, field) pair and a later value
/// removes the field error; a security error and field values coexist.
#[derive(Debug, Clone)]
pub struct Accumulator {
    cid: CorrelationId,
    historical: bool,
    securities: Vec<String>,
    fields: Vec<String>,
    cells: BTreeMap<CellKey, Cell>,
    state: AggregationState,
}

impl Accumulator {
    /// An empty accumulator for `request`, sent under `cid`.
    #[must_use]
    pub fn new(request: &Request, cid: CorrelationId) -> Self {
        Self {
            cid,
            historical: request.is_historical(),
            securities: dedup(request.securities()),
            fields: dedup(request.fields()),
            cells: BTreeMap::new(),
            state: AggregationState::Awaiting,
        }
    }

    /// Correlation id this accumulator listens to.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.cid
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> AggregationState {
        self.state
    }

    /// The cell stored for a slot.
    #[must_use]
    pub fn get(&self, security: &str, field: Option<&str>, date: Option<NaiveDate>) -> Option<&Cell> {
        self.cells.get(&CellKey::new(security, field, date))
    }

    /// All stored cells in key order.
    pub fn cells(&self) -> impl Iterator<Item = (&CellKey, &Cell)> {
        self.cells.iter()
    }

    /// Absorb every message of `event` and report whether it ended the request.
    ///
    /// A final response ends the request when one of its messages answers it.
    /// A final response with no messages ends it only once at least one of
    /// its own messages has been absorbed; before that it may be the tail of
    /// an abandoned earlier request and is skipped. A bare final response for
    /// an abandoned request that arrives after this request's first message
    /// still ends it early.
    ///
    /// # Errors
    /// See [`Self::absorb`].
    pub fn absorb_event(&mut self, event: &Event) -> Result<bool, BlpError> {
        for message in &event.messages {
            self.absorb(message)?;
        }
        let bare_end = event.is_bare_response() && self.state == AggregationState::Accumulating;
        if bare_end || event.is_terminal_for(self.cid) {
            self.state = AggregationState::Complete;
            return Ok(true);
        }
        #[cfg(feature = "tracing")]
        if event.kind == crate::session::EventKind::Response {
            tracing::warn!(
                cid = %self.cid,
                messages = event.messages.len(),
                "final response for another request"
            );
        }
        Ok(false)
    }

    /// Absorb one message. Messages for other requests are ignored.
    ///
    /// Returns whether the message answered this request. A message is
    /// absorbed whole or not at all.
    ///
    /// # Errors
    /// `RequestFailed` when the message carries a request-level error, and
    /// `UnexpectedMessageShape` when it has no security data or data of the
    /// wrong kind for the request. Both carry nothing from this message.
    pub fn absorb(&mut self, message: &Message) -> Result<bool, BlpError> {
        if !message.answers(self.cid) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                cid = %self.cid,
                message_type = %message.message_type,
                "ignoring message for another request"
            );
            return Ok(false);
        }
        if let Some(info) = &message.response_error {
            return Err(BlpError::RequestFailed(info.clone()));
        }
        let Some(entries) = &message.security_data else {
            return Err(self.shape_error(format!(
                "{} message has no security data",
                message.message_type
            )));
        };
        for entry in entries {
            let wrong_kind = match &entry.field_data {
                FieldData::Point(v) => self.historical && !v.is_empty(),
                FieldData::Series(rows) => !self.historical && !rows.is_empty(),
            };
            if wrong_kind {
                let expected = if self.historical { "series" } else { "point" };
                return Err(self.shape_error(format!(
                    "expected {expected} data for '{}' in {} message",
                    entry.security, message.message_type
                )));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            cid = %self.cid,
            message_type = %message.message_type,
            securities = entries.len(),
            "absorbing message"
        );
        for entry in entries {
            self.absorb_security(entry);
        }
        self.state = AggregationState::Accumulating;
        Ok(true)
    }

    fn absorb_security(&mut self, entry: &SecurityData) {
        let security = entry.security.as_str();
        match &entry.field_data {
            FieldData::Point(values) => {
                for (field, value) in values {
                    self.write_value(security, field, None, value);
                }
            }
            FieldData::Series(rows) => {
                for row in rows {
                    for (field, value) in &row.values {
                        self.write_value(security, field, Some(row.date), value);
                    }
                }
            }
        }
        if let Some(info) = &entry.security_error {
            self.cells.insert(
                CellKey::new(security, None, None),
                Cell::SecurityError(info.clone()),
            );
        }
        for exception in &entry.field_exceptions {
            if exception.field.trim().is_empty() {
                continue;
            }
            self.write_field_error(security, &exception.field, &exception.error);
        }
    }

    fn write_value(&mut self, security: &str, field: &str, date: Option<NaiveDate>, value: &Value) {
        if date.is_some() {
            let error_key = CellKey::new(security, Some(field), None);
            if matches!(self.cells.get(&error_key), Some(Cell::FieldError(_))) {
                self.cells.remove(&error_key);
            }
        }
        self.cells.insert(
            CellKey::new(security, Some(field), date),
            Cell::Value(value.clone()),
        );
    }

    fn write_field_error(&mut self, security: &str, field: &str, info: &ErrorInfo) {
        if self.historical {
            self.cells.retain(|k, _| {
                !(k.date.is_some() && k.security == security && k.field.as_deref() == Some(field))
            });
        }
        self.cells.insert(
            CellKey::new(security, Some(field), None),
            Cell::FieldError(info.clone()),
        );
    }

    fn shape_error(&self, detail: String) -> BlpError {
        BlpError::UnexpectedMessageShape {
            detail,
            partial: Box::new(self.snapshot()),
        }
    }

    /// Freeze into the data and exception tables.
    #[must_use]
    pub fn finish(self) -> Tables {
        self.snapshot()
    }

    /// Project what has been collected so far.
    #[must_use]
    pub fn snapshot(&self) -> Tables {
        let data = if self.historical {
            self.series_table()
        } else {
            self.point_table()
        };
        Tables {
            data,
            exceptions: self.exception_table(),
        }
    }

    fn values(&self) -> impl Iterator<Item = (&str, &str, Option<NaiveDate>, &Value)> {
        self.cells.iter().filter_map(|(k, c)| match (c, &k.field) {
            (Cell::Value(v), Some(f)) => Some((k.security.as_str(), f.as_str(), k.date, v)),
            _ => None,
        })
    }

    fn value_at(&self, security: &str, field: &str, date: Option<NaiveDate>) -> Option<Value> {
        match self.get(security, Some(field), date) {
            Some(Cell::Value(v)) => Some(v.clone()),
            _ => None,
        }
    }

    fn point_table(&self) -> DataTable {
        let present_securities: BTreeSet<&str> = self.values().map(|(s, ..)| s).collect();
        let present_fields: BTreeSet<&str> = self.values().map(|(_, f, ..)| f).collect();
        let rows = arrange(&self.securities, &present_securities);
        let columns = arrange(&self.fields, &present_fields);

        DataTable::from_fn(
            rows.iter().map(|s| Label::from(s.as_str())).collect(),
            columns.iter().map(|f| Label::from(f.as_str())).collect(),
            |r, c| self.value_at(&rows[r], &columns[c], None),
        )
    }

    fn series_table(&self) -> DataTable {
        let mut pairs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
        for (security, field, date, _) in self.values() {
            pairs.entry(security).or_default().insert(field);
            if let Some(d) = date {
                dates.insert(d);
            }
        }
        let present_securities: BTreeSet<&str> = pairs.keys().copied().collect();
        let mut columns: Vec<(String, String)> = Vec::new();
        for security in arrange(&self.securities, &present_securities) {
            if let Some(fields) = pairs.get(security.as_str()) {
                for field in arrange(&self.fields, fields) {
                    columns.push((security.clone(), field));
                }
            }
        }

        let dates: Vec<NaiveDate> = dates.into_iter().collect();
        DataTable::from_fn(
            dates.iter().copied().map(Label::Date).collect(),
            columns.iter().map(|(s, f)| Label::pair(s.as_str(), f.as_str())).collect(),
            |r, c| {
                let (security, field) = &columns[c];
                self.value_at(security, field, Some(dates[r]))
            },
        )
    }

    fn exception_table(&self) -> ExceptionTable {
        let mut by_security: BTreeMap<&str, (Option<&ErrorInfo>, BTreeMap<&str, &ErrorInfo>)> =
            BTreeMap::new();
        for (key, cell) in &self.cells {
            match (cell, &key.field) {
                (Cell::SecurityError(info), _) => {
                    by_security.entry(key.security.as_str()).or_default().0 = Some(info);
                }
                (Cell::FieldError(info), Some(field)) => {
                    by_security
                        .entry(key.security.as_str())
                        .or_default()
                        .1
                        .insert(field.as_str(), info);
                }
                _ => {}
            }
        }

        let present: BTreeSet<&str> = by_security.keys().copied().collect();
        let mut rows = Vec::new();
        for security in arrange(&self.securities, &present) {
            let Some((security_error, field_errors)) = by_security.get(security.as_str()) else {
                continue;
            };
            if let Some(info) = security_error {
                rows.push(ExceptionRow::new(security.clone(), None, (*info).clone()));
            }
            let fields: BTreeSet<&str> = field_errors.keys().copied().collect();
            for field in arrange(&self.fields, &fields) {
                if let Some(info) = field_errors.get(field.as_str()) {
                    rows.push(ExceptionRow::new(security.clone(), Some(field), (*info).clone()));
                }
            }
        }
        ExceptionTable::from_rows(rows)
    }
}

fn dedup(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Requested items that are present, in request order, then unrequested ones sorted.
fn arrange(requested: &[String], present: &BTreeSet<&str>) -> Vec<String> {
    let mut out: Vec<String> = requested
        .iter()
        .filter(|r| present.contains(r.as_str()))
        .cloned()
        .collect();
    out.extend(
        present
            .iter()
            .filter(|p| !requested.iter().any(|r| r == *p))
            .map(|p| (*p).to_string()),
    );
    out
}

/// Polling parameters of [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Bounded wait of one poll.
    pub poll_timeout: Duration,
    /// Deadline for the whole request.
    pub request_timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(500),
            request_timeout: None,
        }
    }
}

/// Send `request` on `session` and fold its events into tables.
///
/// # Errors
/// Errors from `send`/`poll`, those of [`Accumulator::absorb`], and
/// `RequestTimeout` when `config.request_timeout` elapses first.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "blpd_core::aggregate",
        skip(session, request, config),
        fields(
            gateway = session.name(),
            operation = request.operation(),
            securities = request.securities().len(),
            fields = request.fields().len(),
        ),
    )
)]
pub async fn aggregate(
    session: &dyn SessionGateway,
    request: &Request,
    config: &PollConfig,
) -> Result<Tables, BlpError> {
    let cid = session.send(request).await?;
    collect(session, request, cid, config).await
}

/// Fold the events of an already sent request into tables.
///
/// # Errors
/// As [`aggregate`], minus send errors.
pub async fn collect(
    session: &dyn SessionGateway,
    request: &Request,
    cid: CorrelationId,
    config: &PollConfig,
) -> Result<Tables, BlpError> {
    let drain = drain(session, Accumulator::new(request, cid), config.poll_timeout);
    match config.request_timeout {
        Some(deadline) => tokio::time::timeout(deadline, drain)
            .await
            .unwrap_or_else(|_| Err(BlpError::request_timeout(request.operation()))),
        None => drain.await,
    }
}

async fn drain(
    session: &dyn SessionGateway,
    mut acc: Accumulator,
    poll_timeout: Duration,
) -> Result<Tables, BlpError> {
    loop {
        let event = session.poll(poll_timeout).await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            cid = %acc.correlation_id(),
            kind = ?event.kind,
            messages = event.messages.len(),
            "event received"
        );
        if acc.absorb_event(&event)? {
            #[cfg(feature = "tracing")]
            tracing::debug!(cid = %acc.correlation_id(), "request complete");
            return Ok(acc.finish());
        }
    }
}
