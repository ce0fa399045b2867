//! Wire format of the WebSocket signals: tagged JSON in both directions.

use chrono::Utc;
use message_relay_service::websocket::message_types::{WsInboundEvent, WsOutboundEvent};
use uuid::Uuid;

#[test]
fn identify_parses_from_tagged_json() {
    let user_id = Uuid::new_v4();
    let raw = format!(r#"{{"type":"identify","user_id":"{user_id}"}}"#);

    let event: WsInboundEvent = serde_json::from_str(&raw).unwrap();
    assert!(matches!(event, WsInboundEvent::Identify { user_id: id } if id == user_id));
}

#[test]
fn send_parses_from_tagged_json() {
    let recipient_id = Uuid::new_v4();
    let raw = format!(r#"{{"type":"send","recipient_id":"{recipient_id}","body":"hello"}}"#);

    let event: WsInboundEvent = serde_json::from_str(&raw).unwrap();
    match event {
        WsInboundEvent::Send {
            recipient_id: id,
            body,
        } => {
            assert_eq!(id, recipient_id);
            assert_eq!(body, "hello");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn unknown_or_malformed_events_are_rejected() {
    assert!(serde_json::from_str::<WsInboundEvent>(r#"{"type":"typing"}"#).is_err());
    assert!(serde_json::from_str::<WsInboundEvent>("not json").is_err());
    // A send without a recipient is not a send
    assert!(serde_json::from_str::<WsInboundEvent>(r#"{"type":"send","body":"x"}"#).is_err());
}

#[test]
fn deliver_serializes_with_tag_and_timestamp() {
    let event = WsOutboundEvent::Deliver {
        sender_id: Uuid::new_v4(),
        body: "hey".to_string(),
        created_at: Utc::now(),
    };

    let value: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "deliver");
    assert_eq!(value["body"], "hey");
    assert!(value["sender_id"].is_string());
    assert!(value["created_at"].is_string());
}
