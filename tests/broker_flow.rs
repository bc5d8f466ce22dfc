//! End-to-end flows through the public broker API.

use std::sync::Arc;
use std::time::Duration;

use postbox::broker::{Broker, Event, EventKind, Outcome};
use postbox::config::BrokerSettings;
use postbox::transport::{ClientRequest, StatusClass, adapter};

fn broker(capacity: usize, sweep_interval_ms: u64) -> Arc<Broker> {
    Arc::new(Broker::new(BrokerSettings {
        personal_capacity: capacity,
        max_timeout_secs: 30,
        sweep_interval_ms,
    }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn producers_and_consumers_across_targets() {
    let broker = broker(50, 5_000);
    let names = ["ana", "ben", "cy", "dee"];

    let producers: Vec<_> = names
        .iter()
        .map(|name| {
            let broker = broker.clone();
            let name = name.to_string();
            tokio::spawn(async move {
                for i in 0..25 {
                    let event = Event::write(EventKind::Personal, name.clone(), format!("{name}-{i}"));
                    broker.dispatch(&event).expect("write accepted");
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(broker.handlers().len(), names.len());
    for name in names {
        let drained = broker
            .dispatch(&Event::read_all(EventKind::Personal, name))
            .unwrap();
        let expected: Vec<String> = (0..25).map(|i| format!("{name}-{i}")).collect();
        // per-recipient order is insertion order
        assert_eq!(drained, Outcome::Batch(expected));
    }
}

#[tokio::test]
async fn topic_broadcast_is_seen_by_every_reader_until_expiry() {
    let broker = broker(10, 50);
    broker
        .dispatch(&Event::topic_write("alerts", "disk full", 1))
        .unwrap();

    for _ in 0..5 {
        let seen = broker
            .dispatch(&Event::read(EventKind::Topic, "alerts"))
            .unwrap();
        assert_eq!(seen, Outcome::Delivered("disk full".to_string()));
    }

    tokio::time::sleep(Duration::from_millis(1_200)).await;
    assert_eq!(broker.pending(EventKind::Topic, "alerts"), Ok(0));
}

#[tokio::test]
async fn adapter_preserves_the_four_way_status_split() {
    let broker = broker(1, 5_000);

    let write = ClientRequest::write(EventKind::Personal, "max", "hello", None);
    let read = ClientRequest::read(EventKind::Personal, "max", false);
    let bad = ClientRequest {
        kind: Some("Broadcast".to_string()),
        ..ClientRequest::read(EventKind::Personal, "max", false)
    };

    let classes: Vec<_> = [&write, &write, &read, &read, &bad]
        .into_iter()
        .map(|request| adapter::handle_request(&broker, request).status)
        .map(|code| StatusClass::from_code(code).expect("known status"))
        .collect();

    assert_eq!(
        classes,
        vec![
            StatusClass::Accepted,
            StatusClass::NotAcceptable,
            StatusClass::Ok,
            StatusClass::NotFound,
            StatusClass::BadRequest,
        ]
    );
}
