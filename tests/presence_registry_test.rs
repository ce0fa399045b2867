//! Presence registry binding semantics: at most one binding per user,
//! last-register-wins, and removal keyed by connection identity.

use message_relay_service::websocket::PresenceRegistry;
use uuid::Uuid;

#[tokio::test]
async fn lookup_resolves_most_recent_register() {
    let registry = PresenceRegistry::new();
    let user = Uuid::new_v4();

    let (_c1, mut rx1) = registry.register(user).await;
    let (_c2, mut rx2) = registry.register(user).await;

    let handle = registry.lookup(user).await.expect("user is bound");
    handle
        .send("hello".to_string())
        .expect("current binding accepts sends");

    assert_eq!(rx2.recv().await.as_deref(), Some("hello"));
    // The superseded binding's channel closed with the overwrite
    assert!(rx1.recv().await.is_none());
}

#[tokio::test]
async fn stale_remove_does_not_evict_newer_binding() {
    let registry = PresenceRegistry::new();
    let user = Uuid::new_v4();

    let (c1, _rx1) = registry.register(user).await;
    let (_c2, mut rx2) = registry.register(user).await;

    // C1's disconnect is observed only after the user reconnected as C2
    registry.remove(user, c1).await;

    let handle = registry
        .lookup(user)
        .await
        .expect("newer binding survives the stale remove");
    handle.send("still here".to_string()).unwrap();
    assert_eq!(rx2.recv().await.as_deref(), Some("still here"));
}

#[tokio::test]
async fn remove_clears_current_binding() {
    let registry = PresenceRegistry::new();
    let user = Uuid::new_v4();

    let (c1, _rx1) = registry.register(user).await;
    registry.remove(user, c1).await;

    assert!(registry.lookup(user).await.is_none());
    assert_eq!(registry.online_count().await, 0);
}

#[tokio::test]
async fn lookup_unknown_user_is_absent() {
    let registry = PresenceRegistry::new();
    assert!(registry.lookup(Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn bindings_are_independent_per_user() {
    let registry = PresenceRegistry::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let (alice_id, _alice_rx) = registry.register(alice).await;
    let (_bob_id, _bob_rx) = registry.register(bob).await;
    assert_eq!(registry.online_count().await, 2);

    registry.remove(alice, alice_id).await;

    assert!(registry.lookup(alice).await.is_none());
    assert!(registry.lookup(bob).await.is_some());
    assert_eq!(registry.online_count().await, 1);
}
