//! End-to-end conversation flow over the in-memory archive: both users
//! online, one disconnects, then history retrieval in creation order.

use message_relay_service::services::archive::{InMemoryMessageArchive, MessageArchive};
use message_relay_service::services::relay::RelayService;
use message_relay_service::websocket::PresenceRegistry;
use uuid::Uuid;

#[tokio::test]
async fn relay_then_disconnect_then_history() {
    let registry = PresenceRegistry::new();
    let archive = InMemoryMessageArchive::new();
    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();

    // Both users identify
    let (_c1, _rx1) = registry.register(u1).await;
    let (c2, mut rx2) = registry.register(u2).await;

    // U1 -> U2 "hi" while U2 is online
    RelayService::relay(&archive, &registry, u1, u2, "hi")
        .await
        .unwrap();
    assert_eq!(archive.len().await, 1);

    let payload = rx2.recv().await.expect("live delivery to U2");
    let delivered: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(delivered["type"], "deliver");
    assert_eq!(delivered["sender_id"], u1.to_string());
    assert_eq!(delivered["body"], "hi");

    // U2 disconnects
    registry.remove(u2, c2).await;
    drop(rx2);

    // U1 -> U2 "bye" while U2 is offline
    RelayService::relay(&archive, &registry, u1, u2, "bye")
        .await
        .unwrap();
    assert_eq!(archive.len().await, 2);

    // History returns both, oldest first, regardless of argument order
    let history = archive.list_conversation(u1, u2).await.unwrap();
    let bodies: Vec<_> = history.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["hi", "bye"]);

    let reversed = archive.list_conversation(u2, u1).await.unwrap();
    assert_eq!(reversed.len(), 2);
}

#[tokio::test]
async fn history_is_scoped_to_the_user_pair() {
    let registry = PresenceRegistry::new();
    let archive = InMemoryMessageArchive::new();
    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();
    let u3 = Uuid::new_v4();

    RelayService::relay(&archive, &registry, u1, u2, "first")
        .await
        .unwrap();
    RelayService::relay(&archive, &registry, u2, u1, "second")
        .await
        .unwrap();
    RelayService::relay(&archive, &registry, u1, u3, "elsewhere")
        .await
        .unwrap();

    let history = archive.list_conversation(u1, u2).await.unwrap();
    let bodies: Vec<_> = history.iter().map(|m| m.body.as_str()).collect();

    // Both directions of the pair, in creation order; the U1-U3 exchange
    // stays out
    assert_eq!(bodies, ["first", "second"]);
}
