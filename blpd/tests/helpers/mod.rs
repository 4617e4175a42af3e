// Shared fixtures and builders so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use blpd::{Blp, BlpBuilder, ErrorInfo, Value};
use blpd_core::{CorrelationId, Message, SecurityData, SessionGateway};
use blpd_mock::{MockSession, ScriptedSession, ScriptedSessionController};

/// Security constants of the mock universe.
pub const UCG: &str = "UCG IM Equity";
pub const ISP: &str = "ISP IM Equity";
pub const BOND: &str = "EI643289@BGN Corp";
pub const UCG_ISIN: &str = "IT0005239360";
pub const BAD_SEC: &str = "UCT IM Equity";

/// Short poll so scripted tests do not wait out the default 500 ms.
pub const FAST_POLL: Duration = Duration::from_millis(10);

/// A facade over a fresh fixture-backed mock session.
pub fn mock_blp() -> Blp {
    Blp::builder()
        .with_session(Arc::new(MockSession::new()))
        .poll_timeout(FAST_POLL)
        .build()
        .expect("mock facade")
}

/// A facade builder over a scripted session, with its controller.
pub fn scripted() -> (BlpBuilder, ScriptedSessionController, Arc<dyn SessionGateway>) {
    let (session, controller) = ScriptedSession::new_with_controller("scripted");
    let builder = Blp::builder()
        .with_session(Arc::clone(&session))
        .poll_timeout(FAST_POLL);
    (builder, controller, session)
}

/// A point-in-time message with string values for one security.
///
/// The correlation id is a placeholder for `push_for_current`.
pub fn point_message(security: &str, values: &[(&str, &str)]) -> Message {
    Message::reference(
        CorrelationId::new(0),
        vec![SecurityData::point(
            security,
            values.iter().map(|(f, v)| (*f, Value::from(*v))),
        )],
    )
}

/// A point-in-time message carrying a security-level error.
pub fn bad_security_message(security: &str) -> Message {
    Message::reference(
        CorrelationId::new(0),
        vec![
            SecurityData::point(security, Vec::<(String, Value)>::new()).with_security_error(
                ErrorInfo::new("BAD_SEC", "INVALID_SECURITY", "Unknown/Invalid security"),
            ),
        ],
    )
}

/// Read a cell as text, panicking with context when it is missing.
pub fn text(t: &blpd::DataTable, row: &str, col: &str) -> String {
    t.get(row, col)
        .unwrap_or_else(|| panic!("missing cell {row}/{col}"))
        .to_string()
}
