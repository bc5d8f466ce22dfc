use super::adapter::{self, RequestError, StatusClass, build_event};
use super::message::{ClientRequest, ServerResponse};
use crate::broker::event::{Action, META_TIMEOUT};
use crate::broker::{Broker, EventKind};
use crate::config::BrokerSettings;
use serde_json::json;

fn request(value: serde_json::Value) -> ClientRequest {
    serde_json::from_value(value).expect("valid request json")
}

fn frame(broker: &Broker, value: serde_json::Value) -> ServerResponse {
    adapter::handle_frame(broker, &value.to_string())
}

#[test]
fn test_status_codes() {
    assert_eq!(StatusClass::Ok.code(), 200);
    assert_eq!(StatusClass::Accepted.code(), 202);
    assert_eq!(StatusClass::BadRequest.code(), 400);
    assert_eq!(StatusClass::NotFound.code(), 404);
    assert_eq!(StatusClass::NotAcceptable.code(), 406);
    assert_eq!(StatusClass::from_code(406), Some(StatusClass::NotAcceptable));
    assert_eq!(StatusClass::from_code(418), None);
}

#[test]
fn test_timeout_accepts_string_or_number() {
    let as_number = request(json!({ "method": "POST", "type": "Topic", "to": "t", "timeout": 7 }));
    let as_string = request(json!({ "method": "POST", "type": "Topic", "to": "t", "timeout": "7" }));
    assert_eq!(as_number.timeout.as_deref(), Some("7"));
    assert_eq!(as_string.timeout.as_deref(), Some("7"));
}

#[test]
fn test_build_event_validation() {
    let cases = [
        (json!({ "type": "Personal", "to": "bob" }), RequestError::MissingMethod),
        (
            json!({ "method": "DELETE", "type": "Personal", "to": "bob" }),
            RequestError::UnsupportedMethod("DELETE".to_string()),
        ),
        (json!({ "method": "GET", "to": "bob" }), RequestError::MissingType),
        (
            json!({ "method": "GET", "type": "Group", "to": "bob" }),
            RequestError::InvalidType("Group".to_string()),
        ),
        (json!({ "method": "GET", "type": "Personal" }), RequestError::MissingTarget),
        (
            json!({ "method": "POST", "type": "Personal", "to": "   " }),
            RequestError::MissingTarget,
        ),
        (
            json!({ "method": "POST", "type": "Topic", "to": "news", "body": "x" }),
            RequestError::MissingTimeout,
        ),
    ];

    for (value, expected) in cases {
        let err = build_event(&request(value.clone())).unwrap_err();
        assert_eq!(err, expected, "request {value}");
    }
}

#[test]
fn test_build_event_shapes() {
    let write = build_event(&request(
        json!({ "method": "put", "type": "topic", "to": "news", "timeout": "soon", "body": "x" }),
    ))
    .unwrap();
    assert_eq!(write.kind(), EventKind::Topic);
    assert_eq!(write.action(), Action::Write);
    // unparsable timeouts travel through; the queue applies its default
    assert_eq!(write.meta(META_TIMEOUT), Some("soon"));

    let read = build_event(&request(json!({ "method": "GET", "type": "PERSONAL", "to": "bob" }))).unwrap();
    assert_eq!(read.kind(), EventKind::Personal);
    assert_eq!(read.action(), Action::Read);

    let read_all = build_event(&request(
        json!({ "method": "GET", "type": "Personal", "to": "bob", "all": true }),
    ))
    .unwrap();
    assert_eq!(read_all.action(), Action::ReadAll);

    // topic reads do not need a timeout
    assert!(build_event(&request(json!({ "method": "GET", "type": "Topic", "to": "news" }))).is_ok());
}

#[test]
fn test_personal_round_trip_status_classes() {
    let broker = Broker::default();

    let accepted = frame(
        &broker,
        json!({ "method": "POST", "type": "Personal", "to": "bob", "body": "hi" }),
    );
    assert_eq!(accepted.status, 202);
    assert_eq!(
        accepted.body,
        "202 : StatusAccepted :: Message successfully added for 'bob'."
    );

    let read = json!({ "method": "GET", "type": "Personal", "to": "bob" });
    let delivered = frame(&broker, read.clone());
    assert_eq!(delivered, ServerResponse { status: 200, body: "hi".to_string() });

    let empty = frame(&broker, read);
    assert_eq!(empty.status, 404);
    assert_eq!(empty.body, "404 : ErrorMissing :: No message in queue for 'bob'.");
}

#[test]
fn test_full_mailbox_is_not_acceptable() {
    let broker = Broker::new(BrokerSettings {
        personal_capacity: 1,
        ..BrokerSettings::default()
    });
    let write = json!({ "method": "POST", "type": "Personal", "to": "amy", "body": "x" });

    assert_eq!(frame(&broker, write.clone()).status, 202);
    let rejected = frame(&broker, write);
    assert_eq!(rejected.status, 406);
    assert!(rejected.body.starts_with("406 : ErrorUnacceptable :: "));
}

#[test]
fn test_bad_requests() {
    let broker = Broker::default();

    let missing_type = frame(&broker, json!({ "method": "GET", "to": "bob" }));
    assert_eq!(missing_type.status, 400);
    assert_eq!(missing_type.body, "400 : BadRequest :: No 'Type' field provided.");

    let bad_verb = frame(&broker, json!({ "method": "PATCH", "type": "Personal", "to": "bob" }));
    assert_eq!(bad_verb.status, 400);

    let garbage = adapter::handle_frame(&broker, "not json");
    assert_eq!(garbage.status, 400);
    assert!(garbage.body.contains("Malformed request"));

    // rejected requests never provision anything
    assert!(broker.handlers().is_empty());
}

#[test]
fn test_bulk_read_body_is_json_array() {
    let broker = Broker::default();
    for body in ["one", "two"] {
        frame(
            &broker,
            json!({ "method": "POST", "type": "Personal", "to": "bob", "body": body }),
        );
    }

    let all = frame(
        &broker,
        json!({ "method": "GET", "type": "Personal", "to": "bob", "all": true }),
    );
    assert_eq!(all.status, 200);
    let payloads: Vec<String> = serde_json::from_str(&all.body).unwrap();
    assert_eq!(payloads, vec!["one", "two"]);
}

#[tokio::test]
async fn test_topic_write_with_unparsable_timeout_is_accepted() {
    let broker = Broker::default();
    let accepted = frame(
        &broker,
        json!({ "method": "POST", "type": "Topic", "to": "news", "timeout": "abc", "body": "x" }),
    );
    assert_eq!(accepted.status, 202);

    let read = frame(&broker, json!({ "method": "GET", "type": "Topic", "to": "news" }));
    assert_eq!(read, ServerResponse { status: 200, body: "x".to_string() });
}

#[test]
fn test_respond_maps_broker_errors() {
    use crate::utils::error::{BrokerError, QueueError};

    let not_found = adapter::respond(Err(BrokerError::TargetNotProvisioned {
        kind: EventKind::Topic,
        target: "t".to_string(),
    }));
    assert_eq!(not_found.status, 404);

    let empty = adapter::respond(Err(BrokerError::Queue(QueueError::Empty {
        target: "t".to_string(),
    })));
    assert_eq!(empty.status, 404);

    let internal = adapter::respond(Err(BrokerError::NoHandler {
        kind: EventKind::Personal,
        target: "t".to_string(),
    }));
    assert_eq!(internal.status, 500);
}
