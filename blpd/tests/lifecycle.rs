mod helpers;

use std::sync::Arc;
use std::time::Duration;

use blpd::{Blp, BlpError, ConnectionConfig, Value};
use blpd_core::{CorrelationId, ErrorInfo, Event, EventKind, Message};
use blpd_mock::{MockSession, OpenBehavior};
use helpers::*;

#[test]
fn build_requires_a_session() {
    let err = Blp::builder().build().err().expect("no session");
    assert!(matches!(err, BlpError::InvalidArg(_)));
}

#[tokio::test]
async fn auto_open_connects_on_first_call() {
    let blp = mock_blp();
    assert!(!blp.is_open().await);
    let t = blp.reference_data(UCG, "NAME").run().await.unwrap();
    assert_eq!(t.data.get(UCG, "NAME"), Some(&Value::from("UNICREDIT SPA")));
    assert!(blp.is_open().await);

    blp.close().await.unwrap();
    blp.close().await.unwrap();
    assert!(!blp.is_open().await);
}

#[tokio::test]
async fn closed_session_without_auto_open_is_not_connected() {
    let blp = Blp::builder()
        .with_session(Arc::new(MockSession::new()))
        .auto_open(false)
        .build()
        .unwrap();
    let err = blp.reference_data(UCG, "NAME").run().await.unwrap_err();
    assert_eq!(err, BlpError::NotConnected);

    blp.open().await.unwrap();
    blp.open().await.unwrap();
    assert!(blp.reference_data(UCG, "NAME").run().await.is_ok());
}

#[tokio::test]
async fn open_failures_surface_and_leave_the_session_closed() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    controller
        .set_open_behavior(OpenBehavior::ConnectionFailed("connection refused".into()))
        .await;

    let err = blp.reference_data("AAA", "NAME").run().await.unwrap_err();
    assert!(matches!(err, BlpError::ConnectionFailed { .. }));
    assert!(err.is_session());
    assert!(!blp.is_open().await);
    assert!(controller.sent_requests().await.is_empty());
}

#[tokio::test]
async fn configured_connection_reaches_the_gateway() {
    let unreachable = Blp::builder()
        .with_session(Arc::new(MockSession::new()))
        .connection(ConnectionConfig {
            host: String::new(),
            port: 0,
            service: "//blp/refdata".into(),
        })
        .build()
        .unwrap();
    let err = unreachable.open().await.unwrap_err();
    assert!(matches!(err, BlpError::ConnectionFailed { .. }));
    assert!(!unreachable.is_open().await);

    let wrong_service = Blp::builder()
        .with_session(Arc::new(MockSession::new()))
        .connection(ConnectionConfig {
            service: "//blp/nope".into(),
            ..ConnectionConfig::default()
        })
        .build()
        .unwrap();
    let err = wrong_service.reference_data(UCG, "NAME").run().await.unwrap_err();
    assert_eq!(err, BlpError::service_unavailable("//blp/nope"));

    let target = ConnectionConfig {
        host: "bbcomm.internal".into(),
        port: 8196,
        ..ConnectionConfig::default()
    };
    let (builder, controller, _session) = scripted();
    let blp = builder.connection(target.clone()).build().unwrap();
    blp.open().await.unwrap();
    assert_eq!(controller.opened_with().await, Some(target));
}

#[tokio::test]
async fn foreign_and_status_traffic_is_ignored() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    let foreign = CorrelationId::new(999);

    controller
        .push_event(Event::status(vec![Message::status("SessionStarted")]))
        .await;
    controller.push_event(Event::timeout()).await;
    controller
        .push_event(Event::response(vec![Message::reference(
            foreign,
            vec![blpd_core::SecurityData::point("AAA", [("NAME", Value::from("WRONG"))])],
        )]))
        .await;
    controller
        .push_for_current(EventKind::PartialResponse, vec![point_message("AAA", &[("NAME", "ACME")])])
        .await;
    controller
        .push_for_current(EventKind::Response, vec![point_message("BBB", &[("NAME", "BETA")])])
        .await;

    let t = blp.reference_data(["AAA", "BBB"], "NAME").run().await.unwrap();
    assert_eq!(text(&t.data, "AAA", "NAME"), "ACME");
    assert_eq!(text(&t.data, "BBB", "NAME"), "BETA");
    assert_eq!(controller.pending_events().await, 0);
}

#[tokio::test]
async fn empty_final_response_ends_the_request() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    controller
        .push_for_current(EventKind::PartialResponse, vec![point_message("AAA", &[("NAME", "ACME")])])
        .await;
    controller.push_event(Event::response(Vec::new())).await;

    let t = blp.reference_data("AAA", "NAME").run().await.unwrap();
    assert_eq!(text(&t.data, "AAA", "NAME"), "ACME");
}

#[tokio::test]
async fn leftover_empty_final_response_does_not_cut_the_next_request_short() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    controller.push_event(Event::response(Vec::new())).await;
    controller
        .push_for_current(EventKind::PartialResponse, vec![point_message("AAA", &[("NAME", "ACME")])])
        .await;
    controller
        .push_for_current(EventKind::Response, vec![point_message("BBB", &[("NAME", "BETA")])])
        .await;

    let t = blp.reference_data(["AAA", "BBB"], "NAME").run().await.unwrap();
    assert_eq!(t.data.shape(), (2, 1));
    assert_eq!(text(&t.data, "BBB", "NAME"), "BETA");
    assert_eq!(controller.pending_events().await, 0);
}

#[tokio::test]
async fn security_error_from_the_session_becomes_an_exception_row() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    controller
        .push_for_current(
            EventKind::Response,
            vec![point_message("AAA", &[("NAME", "ACME")]), bad_security_message("BBB")],
        )
        .await;

    let t = blp.reference_data(["AAA", "BBB"], "NAME").run().await.unwrap();
    assert!(!t.data.has_row("BBB"));
    let row = t.exceptions.get("BBB", None).unwrap();
    assert_eq!(row.subcategory, "INVALID_SECURITY");
}

#[tokio::test]
async fn malformed_message_aborts_with_partial_tables() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    let mut broken = point_message("BBB", &[]);
    broken.security_data = None;
    controller
        .push_for_current(EventKind::PartialResponse, vec![point_message("AAA", &[("NAME", "ACME")])])
        .await;
    controller.push_for_current(EventKind::Response, vec![broken]).await;

    let err = blp.reference_data(["AAA", "BBB"], "NAME").run().await.unwrap_err();
    let partial = err.partial().expect("partial tables");
    assert_eq!(text(&partial.data, "AAA", "NAME"), "ACME");
}

#[tokio::test]
async fn request_level_error_is_fatal() {
    let (builder, controller, _session) = scripted();
    let blp = builder.build().unwrap();
    let info = ErrorInfo::new("BAD_ARGS", "INVALID_REQUEST", "Request not valid");
    controller
        .push_for_current(
            EventKind::Response,
            vec![Message::response_error(CorrelationId::new(0), info.clone())],
        )
        .await;

    let err = blp.reference_data("AAA", "NAME").run().await.unwrap_err();
    assert_eq!(err, BlpError::RequestFailed(info));
}

#[tokio::test(start_paused = true)]
async fn silent_session_hits_the_request_deadline() {
    let (builder, controller, _session) = scripted();
    let blp = builder.request_timeout(Duration::from_secs(2)).build().unwrap();

    let err = blp.reference_data("AAA", "NAME").run().await.unwrap_err();
    assert_eq!(err, BlpError::request_timeout("ReferenceDataRequest"));
    assert!(controller.poll_count().await > 1);
}

#[tokio::test]
async fn prebuilt_requests_run_through_execute() {
    let blp = mock_blp();
    let req = blpd::Request::reference([UCG, ISP], "NAME").build().unwrap();
    let t = blp.execute(&req, true).await.unwrap();
    assert_eq!(text(&t.data, "NAME", ISP), "INTESA SANPAOLO");
}
