//! Deterministic session gateways for tests and examples.
//!
//! - [`MockSession`] answers requests from a small static universe of Italian
//!   banks and one bond, including the provider's per-security and per-field
//!   failures.
//! - [`ScriptedSession`] delivers whatever events a test pushes through its
//!   [`ScriptedSessionController`].
#![warn(missing_docs)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use blpd_core::{
    BlpError, ConnectionConfig, CorrelationId, ErrorInfo, Event, HistoricalOptions, Message,
    Request, RequestKind, SecurityData, SeriesRow, SessionGateway, Value,
};
use chrono::NaiveDate;
use tokio::sync::Mutex;

mod fixtures;
mod scripted;

pub use scripted::{OpenBehavior, ScriptedSession, ScriptedSessionController};

/// Securities per response message; larger requests are split across events.
const SECURITIES_PER_MESSAGE: usize = 2;

/// Mock gateway for CI-safe tests and examples. Answers from static fixtures.
///
/// Opening fails with `ConnectionFailed` when the target host is empty or the
/// port is zero, and with `ServiceUnavailable` for any service other than
/// `//blp/refdata`.
pub struct MockSession {
    active: AtomicBool,
    next_cid: AtomicU64,
    queue: Mutex<VecDeque<Event>>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    /// A closed mock gateway.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            next_cid: AtomicU64::new(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn respond(&self, cid: CorrelationId, request: &Request) -> Vec<Event> {
        let messages = match request.kind() {
            RequestKind::Reference(_) => reference_messages(cid, request),
            RequestKind::Historical(opts) => match validate_historical(opts) {
                Ok(()) => historical_messages(cid, request, opts),
                Err(info) => vec![Message::response_error(cid, info)],
            },
        };
        let last = messages.len().saturating_sub(1);
        messages
            .into_iter()
            .enumerate()
            .map(|(i, m)| {
                if i == last {
                    Event::response(vec![m])
                } else {
                    Event::partial(vec![m])
                }
            })
            .collect()
    }
}

fn point_entry(security: &str, request: &Request) -> SecurityData {
    if fixtures::reference::canonical(security).is_none() {
        return SecurityData::point(security, Vec::<(String, Value)>::new())
            .with_security_error(fixtures::invalid_security());
    }
    let mut values: Vec<(String, Value)> = Vec::new();
    let mut exceptions: Vec<(String, ErrorInfo)> = Vec::new();
    for field in request.fields() {
        match fixtures::reference::value(security, field, request.overrides()) {
            Some(v) => values.push((field.clone(), v)),
            None if fixtures::is_known_field(field) => {
                exceptions.push((field.clone(), fixtures::not_applicable()));
            }
            None => exceptions.push((field.clone(), fixtures::invalid_field())),
        }
    }
    exceptions
        .into_iter()
        .fold(SecurityData::point(security, values), |d, (f, e)| {
            d.with_field_exception(f, e)
        })
}

fn reference_messages(cid: CorrelationId, request: &Request) -> Vec<Message> {
    request
        .securities()
        .chunks(SECURITIES_PER_MESSAGE)
        .map(|chunk| {
            Message::reference(
                cid,
                chunk.iter().map(|s| point_entry(s, request)).collect(),
            )
        })
        .collect()
}

fn validate_historical(opts: &HistoricalOptions) -> Result<(), ErrorInfo> {
    if let Some(cal) = &opts.calendar {
        if !fixtures::history::is_known_calendar(cal) {
            return Err(ErrorInfo::new(
                "BAD_ARGS",
                "INVALID_CALENDAR",
                format!("Invalid calendar code: {cal}"),
            ));
        }
    }
    if let Some(ccy) = &opts.currency {
        if fixtures::history::fx_rate(ccy).is_none() {
            return Err(ErrorInfo::new(
                "BAD_ARGS",
                "INVALID_CURRENCY",
                format!("Invalid currency: {ccy}"),
            ));
        }
    }
    Ok(())
}

fn series_entry(security: &str, request: &Request, opts: &HistoricalOptions) -> SecurityData {
    if fixtures::reference::canonical(security).is_none() {
        return SecurityData::series(security, Vec::new())
            .with_security_error(fixtures::invalid_security());
    }
    let from = opts.start.first_day();
    let to = opts.end.map_or(NaiveDate::MAX, |e| e.last_day());
    let rate = opts
        .currency
        .as_deref()
        .and_then(fixtures::history::fx_rate)
        .unwrap_or(1.0);

    let mut by_date: std::collections::BTreeMap<NaiveDate, Vec<(String, Value)>> =
        std::collections::BTreeMap::new();
    let mut exceptions: Vec<(String, ErrorInfo)> = Vec::new();
    for field in request.fields() {
        match fixtures::history::series(security, field, from, to) {
            Some(points) => {
                let scale = if fixtures::history::is_monetary(field) {
                    rate
                } else {
                    1.0
                };
                for (date, v) in points {
                    by_date
                        .entry(date)
                        .or_default()
                        .push((field.clone(), Value::Float(v * scale)));
                }
            }
            None if fixtures::is_known_field(field) => {
                exceptions.push((field.clone(), fixtures::not_applicable()));
            }
            None => exceptions.push((field.clone(), fixtures::invalid_field())),
        }
    }
    if let Some(limit) = opts.max_data_points {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let skip = by_date.len().saturating_sub(limit);
        by_date = by_date.into_iter().skip(skip).collect();
    }
    let rows = by_date
        .into_iter()
        .map(|(date, values)| SeriesRow::new(date, values))
        .collect();
    exceptions
        .into_iter()
        .fold(SecurityData::series(security, rows), |d, (f, e)| {
            d.with_field_exception(f, e)
        })
}

fn historical_messages(
    cid: CorrelationId,
    request: &Request,
    opts: &HistoricalOptions,
) -> Vec<Message> {
    request
        .securities()
        .iter()
        .map(|s| Message::historical(cid, vec![series_entry(s, request, opts)]))
        .collect()
}

#[async_trait]
impl SessionGateway for MockSession {
    fn name(&self) -> &'static str {
        "blpd-mock"
    }

    async fn open(&self, connection: &ConnectionConfig) -> Result<(), BlpError> {
        if self.active.load(Ordering::SeqCst) {
            return Ok(());
        }
        if connection.host.is_empty() || connection.port == 0 {
            return Err(BlpError::connection_failed(
                self.name(),
                format!("cannot reach {}", connection.address()),
            ));
        }
        if connection.service != "//blp/refdata" {
            return Err(BlpError::service_unavailable(&connection.service));
        }
        self.queue.lock().await.push_back(Event::status(vec![
            Message::status("SessionStarted"),
            Message::status("ServiceOpened"),
        ]));
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), BlpError> {
        if self.active.swap(false, Ordering::SeqCst) {
            self.queue.lock().await.clear();
        }
        Ok(())
    }

    async fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn send(&self, request: &Request) -> Result<CorrelationId, BlpError> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(BlpError::NotConnected);
        }
        let cid = CorrelationId::new(self.next_cid.fetch_add(1, Ordering::SeqCst));
        let events = self.respond(cid, request);
        self.queue.lock().await.extend(events);
        Ok(cid)
    }

    async fn poll(&self, timeout: Duration) -> Result<Event, BlpError> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(BlpError::NotConnected);
        }
        let next = self.queue.lock().await.pop_front();
        match next {
            Some(event) => Ok(event),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Event::timeout())
            }
        }
    }
}
