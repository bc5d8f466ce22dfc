use super::{ClientError, MessagingClient};
use crate::broker::EventKind;
use crate::transport::ClientRequest;
use serde_json::json;

#[test]
fn test_client_new() {
    let client = MessagingClient::new("ws://127.0.0.1:8989");
    assert_eq!(client.url(), "ws://127.0.0.1:8989");
}

#[test]
fn test_write_request_frame() {
    let request = ClientRequest::write(EventKind::Topic, "news", "hello", Some(5));
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "method": "POST",
            "type": "Topic",
            "to": "news",
            "timeout": "5",
            "body": "hello"
        })
    );
}

#[test]
fn test_read_request_frame() {
    let request = ClientRequest::read(EventKind::Personal, "bob", true);
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({ "method": "GET", "type": "Personal", "to": "bob", "all": true })
    );

    let single = serde_json::to_value(ClientRequest::read(EventKind::Personal, "bob", false)).unwrap();
    assert!(single.get("all").is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    // port 1 is reserved and nothing listens there in test environments
    let client = MessagingClient::new("ws://127.0.0.1:1");
    let err = client
        .fetch(EventKind::Personal, "bob", false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::WebSocket(_)));
}
