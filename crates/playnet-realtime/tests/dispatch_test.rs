//! Integration tests for the dispatch router, presence registry, socket
//! authenticator, and event bridge, driven against in-memory store fakes
//! with channel receivers standing in for sockets.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use playnet_auth::jwt::{JwtDecoder, JwtEncoder};
use playnet_core::config::auth::AuthConfig;
use playnet_core::config::realtime::RealtimeConfig;
use playnet_core::error::ErrorKind;
use playnet_core::events::SocialEvent;
use playnet_core::result::AppResult;
use playnet_core::types::id::UserId;
use playnet_core::AppError;
use playnet_entity::message::Message;
use playnet_entity::notification::{Notification, NotificationKind};
use playnet_entity::user::{PresenceState, UserRef};
use playnet_realtime::event::{ClientEvent, ServerEvent};
use playnet_realtime::store::{MessageStore, NotificationStore, UserStore};
use playnet_realtime::{ConnectionHandle, RealtimeEngine, SocketAuthenticator};

/// In-memory stand-in for all three durable stores.
#[derive(Default)]
struct MemoryStores {
    messages: Mutex<Vec<Message>>,
    notifications: Mutex<Vec<Notification>>,
    users: Mutex<HashMap<Uuid, (UserRef, PresenceState)>>,
    fail_messages: AtomicBool,
    fail_notifications: AtomicBool,
}

impl MemoryStores {
    fn add_user(&self, username: &str) -> UserRef {
        let user = UserRef {
            id: Uuid::new_v4(),
            username: username.to_string(),
            avatar: None,
        };
        self.users
            .lock()
            .unwrap()
            .insert(user.id, (user.clone(), PresenceState::Offline));
        user
    }

    fn remove_user(&self, user_id: Uuid) {
        self.users.lock().unwrap().remove(&user_id);
    }

    fn presence_of(&self, user_id: Uuid) -> PresenceState {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|(_, presence)| *presence)
            .expect("user exists")
    }

    fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageStore for MemoryStores {
    async fn create(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        content: &str,
    ) -> AppResult<Message> {
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(AppError::database("message store unavailable"));
        }
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: sender_id.into_uuid(),
            recipient_id: recipient_id.into_uuid(),
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }
}

#[async_trait]
impl NotificationStore for MemoryStores {
    async fn create(
        &self,
        user_id: UserId,
        sender_id: UserId,
        kind: NotificationKind,
        related_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::database("notification store unavailable"));
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: user_id.into_uuid(),
            sender_id: sender_id.into_uuid(),
            kind,
            related_id,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }
}

#[async_trait]
impl UserStore for MemoryStores {
    async fn find_ref(&self, user_id: UserId) -> AppResult<Option<UserRef>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(user_id.as_uuid())
            .map(|(user, _)| user.clone()))
    }

    async fn set_presence(
        &self,
        user_id: UserId,
        presence: PresenceState,
        _last_seen: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(entry) = self.users.lock().unwrap().get_mut(user_id.as_uuid()) {
            entry.1 = presence;
        }
        Ok(())
    }
}

/// Engine plus fakes, with a convenience connect flow.
struct TestBed {
    stores: Arc<MemoryStores>,
    engine: RealtimeEngine,
}

impl TestBed {
    fn new() -> Self {
        let stores = Arc::new(MemoryStores::default());
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            stores.clone(),
            stores.clone(),
            stores.clone(),
        );
        Self { stores, engine }
    }

    /// Register a user and run the full connect flow for them.
    async fn connect(
        &self,
        user: &UserRef,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (handle, rx) = self.engine.open_connection(user.clone());
        self.engine.router.handle_connect(handle.clone()).await;
        (handle, rx)
    }
}

/// Pull every event currently buffered on a receiver.
fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// =========================================================================
// Connect / presence
// =========================================================================

#[tokio::test]
async fn test_single_connect_registers_and_flips_durable_presence() {
    // Scenario 1: alice connects alone.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");

    let (_handle, mut rx) = bed.connect(&alice).await;

    assert_eq!(bed.engine.registry.online_count(), 1);
    assert!(bed.engine.is_user_online(UserId::from(alice.id)));
    assert_eq!(bed.stores.presence_of(alice.id), PresenceState::Online);
    // No other users online, so nobody (including alice) observes a broadcast.
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_connect_broadcasts_online_to_each_other_user_once() {
    // P6, online half: every other user sees exactly one user:online.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let carol = bed.stores.add_user("carol");
    let (_ha, mut rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    let (_hc, mut rx_c) = bed.connect(&carol).await;

    for rx in [&mut rx_a, &mut rx_b] {
        let events = drain(rx);
        let online: Vec<_> = events
            .iter()
            .filter(|e| {
                matches!(e, ServerEvent::UserOnline { user_id, .. } if *user_id == UserId::from(carol.id))
            })
            .collect();
        assert_eq!(online.len(), 1, "expected exactly one user:online for carol");
    }
    // The connecting user does not receive their own announcement.
    assert!(drain(&mut rx_c).is_empty());
}

#[tokio::test]
async fn test_disconnect_broadcasts_offline_and_flips_durable_presence() {
    // P6, offline half.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, _rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_b);

    bed.engine.router.handle_disconnect(&ha).await;

    assert!(!bed.engine.is_user_online(UserId::from(alice.id)));
    assert_eq!(bed.stores.presence_of(alice.id), PresenceState::Offline);
    let events = drain(&mut rx_b);
    let offline: Vec<_> = events
        .iter()
        .filter(|e| {
            matches!(e, ServerEvent::UserOffline { user_id, .. } if *user_id == UserId::from(alice.id))
        })
        .collect();
    assert_eq!(offline.len(), 1, "expected exactly one user:offline for alice");
}

#[tokio::test]
async fn test_stale_disconnect_keeps_reconnected_user_online() {
    // P2: H1 connects, H2 supersedes it, H1's disconnect arrives late.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (h1, _rx1) = bed.connect(&alice).await;
    let (h2, _rx2) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_b);

    bed.engine.router.handle_disconnect(&h1).await;

    // The registry still holds H2 and durable presence stays online.
    let current = bed
        .engine
        .registry
        .lookup(UserId::from(alice.id))
        .expect("alice still online");
    assert_eq!(current.id, h2.id);
    assert_eq!(bed.stores.presence_of(alice.id), PresenceState::Online);
    // No user:offline is broadcast for a stale disconnect.
    assert!(
        drain(&mut rx_b)
            .iter()
            .all(|e| !matches!(e, ServerEvent::UserOffline { .. }))
    );
}

#[tokio::test]
async fn test_at_most_one_handle_per_user() {
    // P1: repeated reconnects leave exactly one registry entry, the
    // most recent one.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");

    let mut last_conn_id = None;
    for _ in 0..5 {
        let (handle, _rx) = bed.connect(&alice).await;
        last_conn_id = Some(handle.id);
    }

    assert_eq!(bed.engine.registry.online_count(), 1);
    let current = bed
        .engine
        .registry
        .lookup(UserId::from(alice.id))
        .expect("online");
    assert_eq!(Some(current.id), last_conn_id);
}

// =========================================================================
// Private messages
// =========================================================================

#[tokio::test]
async fn test_message_flow_persists_and_delivers_both_events() {
    // Scenario 2: alice sends "gg" to bob while both are online.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, mut rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::MessagePrivate {
                recipient_id: UserId::from(bob.id),
                content: "gg".to_string(),
            },
        )
        .await;

    // P3: the durable record exists with matching fields.
    let stored = bed.stores.messages.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender_id, alice.id);
    assert_eq!(stored[0].recipient_id, bob.id);
    assert_eq!(stored[0].content, "gg");
    assert!(!stored[0].is_read);

    // Bob receives the message and its companion notification.
    let bob_events = drain(&mut rx_b);
    let receive = bob_events
        .iter()
        .find_map(|e| match e {
            ServerEvent::MessageReceive {
                id,
                sender_id,
                sender_name,
                content,
                ..
            } => Some((*id, *sender_id, sender_name.clone(), content.clone())),
            _ => None,
        })
        .expect("bob got message:receive");
    assert_eq!(receive.0.into_uuid(), stored[0].id);
    assert_eq!(receive.1, UserId::from(alice.id));
    assert_eq!(receive.2, "alice");
    assert_eq!(receive.3, "gg");

    let notification = bob_events
        .iter()
        .find_map(|e| match e {
            ServerEvent::NotificationNew {
                notification,
                sender,
            } => Some((notification.clone(), sender.clone())),
            _ => None,
        })
        .expect("bob got notification:new");
    assert_eq!(notification.0.kind, NotificationKind::Message);
    assert_eq!(notification.0.sender_id, alice.id);
    assert_eq!(notification.0.related_id, Some(stored[0].id));
    assert_eq!(notification.1.username, "alice");

    // Alice gets the echo confirmation with the durable id and timestamp.
    let alice_events = drain(&mut rx_a);
    let sent = alice_events
        .iter()
        .find_map(|e| match e {
            ServerEvent::MessageSent {
                id, recipient_id, ..
            } => Some((*id, *recipient_id)),
            _ => None,
        })
        .expect("alice got message:sent");
    assert_eq!(sent.0.into_uuid(), stored[0].id);
    assert_eq!(sent.1, UserId::from(bob.id));
}

#[tokio::test]
async fn test_message_to_offline_recipient_persists_without_error() {
    // Scenario 3: push-to-offline is not an error; durable storage is
    // the retry mechanism.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let offline = bed.stores.add_user("offline-user");
    let (ha, mut rx_a) = bed.connect(&alice).await;
    drain(&mut rx_a);

    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::MessagePrivate {
                recipient_id: UserId::from(offline.id),
                content: "you there?".to_string(),
            },
        )
        .await;

    assert_eq!(bed.stores.message_count(), 1);
    assert_eq!(bed.stores.notification_count(), 1);

    let alice_events = drain(&mut rx_a);
    assert!(
        alice_events
            .iter()
            .all(|e| !matches!(e, ServerEvent::Error { .. })),
        "offline recipient must not surface an error"
    );
    assert!(
        alice_events
            .iter()
            .any(|e| matches!(e, ServerEvent::MessageSent { .. })),
        "echo confirmation is still delivered"
    );
}

#[tokio::test]
async fn test_empty_content_is_silently_ignored() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, mut rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::MessagePrivate {
                recipient_id: UserId::from(bob.id),
                content: "   \n\t ".to_string(),
            },
        )
        .await;

    assert_eq!(bed.stores.message_count(), 0);
    assert_eq!(bed.stores.notification_count(), 0);
    assert!(drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_b).is_empty());
}

#[tokio::test]
async fn test_messages_arrive_in_send_order() {
    // P4: per-pair ordering on a single connection.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, _rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_b);

    for content in ["first", "second", "third"] {
        bed.engine
            .router
            .handle_event(
                &ha,
                ClientEvent::MessagePrivate {
                    recipient_id: UserId::from(bob.id),
                    content: content.to_string(),
                },
            )
            .await;
    }

    let received: Vec<String> = drain(&mut rx_b)
        .into_iter()
        .filter_map(|e| match e {
            ServerEvent::MessageReceive { content, .. } => Some(content),
            _ => None,
        })
        .collect();
    assert_eq!(received, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_message_store_failure_reports_error_to_origin_only() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, mut rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    bed.stores.fail_messages.store(true, Ordering::SeqCst);
    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::MessagePrivate {
                recipient_id: UserId::from(bob.id),
                content: "gg".to_string(),
            },
        )
        .await;

    // Nothing persisted, nothing pushed to the recipient.
    assert_eq!(bed.stores.message_count(), 0);
    assert_eq!(bed.stores.notification_count(), 0);
    assert!(drain(&mut rx_b).is_empty());

    // The origin is told nothing happened; no echo either.
    let alice_events = drain(&mut rx_a);
    assert!(
        alice_events
            .iter()
            .any(|e| matches!(e, ServerEvent::Error { .. }))
    );
    assert!(
        alice_events
            .iter()
            .all(|e| !matches!(e, ServerEvent::MessageSent { .. }))
    );
}

#[tokio::test]
async fn test_notification_store_failure_still_delivers_message() {
    // The message and its companion notification are independent
    // writes; losing the second leaves the first durable and delivered.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, mut rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    bed.stores.fail_notifications.store(true, Ordering::SeqCst);
    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::MessagePrivate {
                recipient_id: UserId::from(bob.id),
                content: "gg".to_string(),
            },
        )
        .await;

    assert_eq!(bed.stores.message_count(), 1);
    assert_eq!(bed.stores.notification_count(), 0);

    let bob_events = drain(&mut rx_b);
    assert!(
        bob_events
            .iter()
            .any(|e| matches!(e, ServerEvent::MessageReceive { .. }))
    );
    assert!(
        bob_events
            .iter()
            .all(|e| !matches!(e, ServerEvent::NotificationNew { .. }))
    );

    let alice_events = drain(&mut rx_a);
    assert!(
        alice_events
            .iter()
            .any(|e| matches!(e, ServerEvent::Error { .. }))
    );
}

#[tokio::test]
async fn test_second_device_orphans_first_handle() {
    // Scenario 5: after alice reconnects, only the new handle receives.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (_h1, mut rx1) = bed.connect(&alice).await;
    let (_h2, mut rx2) = bed.connect(&alice).await;
    let (hb, _rx_b) = bed.connect(&bob).await;
    drain(&mut rx1);
    drain(&mut rx2);

    bed.engine
        .router
        .handle_event(
            &hb,
            ClientEvent::MessagePrivate {
                recipient_id: UserId::from(alice.id),
                content: "hello".to_string(),
            },
        )
        .await;

    assert!(
        drain(&mut rx1).is_empty(),
        "orphaned handle must receive nothing"
    );
    assert!(
        drain(&mut rx2)
            .iter()
            .any(|e| matches!(e, ServerEvent::MessageReceive { .. }))
    );
}

// =========================================================================
// Typing indicators
// =========================================================================

#[tokio::test]
async fn test_typing_relays_to_online_recipient() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, _rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_b);

    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::TypingStart {
                recipient_id: UserId::from(bob.id),
            },
        )
        .await;
    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::TypingStop {
                recipient_id: UserId::from(bob.id),
            },
        )
        .await;

    let states: Vec<bool> = drain(&mut rx_b)
        .into_iter()
        .filter_map(|e| match e {
            ServerEvent::TypingIndicator {
                user_id,
                username,
                is_typing,
            } => {
                assert_eq!(user_id, UserId::from(alice.id));
                assert_eq!(username, "alice");
                Some(is_typing)
            }
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![true, false]);
}

#[tokio::test]
async fn test_typing_leaves_no_persisted_record() {
    // P5 and scenario 4: typing is ephemeral, and a sender disconnect
    // does not auto-emit typing:stop (documented current behavior).
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (ha, _rx_a) = bed.connect(&alice).await;
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_b);

    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::TypingStart {
                recipient_id: UserId::from(bob.id),
            },
        )
        .await;
    bed.engine.router.handle_disconnect(&ha).await;

    assert_eq!(bed.stores.message_count(), 0);
    assert_eq!(bed.stores.notification_count(), 0);

    let events = drain(&mut rx_b);
    let typing: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            ServerEvent::TypingIndicator { is_typing, .. } => Some(*is_typing),
            _ => None,
        })
        .collect();
    // Exactly one indicator (true); no synthesized stop on disconnect.
    assert_eq!(typing, vec![true]);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, ServerEvent::UserOffline { .. }))
    );
}

#[tokio::test]
async fn test_typing_to_offline_recipient_is_dropped() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let offline = bed.stores.add_user("offline-user");
    let (ha, mut rx_a) = bed.connect(&alice).await;
    drain(&mut rx_a);

    bed.engine
        .router
        .handle_event(
            &ha,
            ClientEvent::TypingStart {
                recipient_id: UserId::from(offline.id),
            },
        )
        .await;

    // Best-effort: no queue, no error.
    assert!(drain(&mut rx_a).is_empty());
}

// =========================================================================
// Event bridge (connection requests, enchantments)
// =========================================================================

#[tokio::test]
async fn test_connection_request_event_persists_and_pushes() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");
    let (_hb, mut rx_b) = bed.connect(&bob).await;
    drain(&mut rx_b);

    let request_id = Uuid::new_v4();
    bed.engine
        .bridge
        .apply(SocialEvent::ConnectionRequestCreated {
            request_id,
            from: alice.id,
            to: bob.id,
        })
        .await
        .unwrap();

    let stored = bed.stores.notifications.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, NotificationKind::ConnectionRequest);
    assert_eq!(stored[0].user_id, bob.id);
    assert_eq!(stored[0].related_id, Some(request_id));

    let pushed = drain(&mut rx_b);
    let notification = pushed
        .iter()
        .find_map(|e| match e {
            ServerEvent::NotificationNew { sender, .. } => Some(sender.clone()),
            _ => None,
        })
        .expect("bob got notification:new");
    assert_eq!(notification.username, "alice");
}

#[tokio::test]
async fn test_connection_accepted_for_offline_recipient_only_persists() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let bob = bed.stores.add_user("bob");

    bed.engine
        .bridge
        .apply(SocialEvent::ConnectionRequestAccepted {
            request_id: Uuid::new_v4(),
            from: bob.id,
            to: alice.id,
        })
        .await
        .unwrap();

    let stored = bed.stores.notifications.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, NotificationKind::ConnectionAccepted);
    assert_eq!(stored[0].user_id, alice.id);
}

#[tokio::test]
async fn test_enchantment_update_pushes_to_live_handle() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let (_ha, mut rx_a) = bed.connect(&alice).await;
    drain(&mut rx_a);

    bed.engine
        .bridge
        .apply(SocialEvent::EnchantmentChanged {
            user_id: alice.id,
            count: 42,
        })
        .await
        .unwrap();

    let events = drain(&mut rx_a);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::EnchantmentUpdate { count: 42, .. }]
    ));
}

// =========================================================================
// Socket authenticator
// =========================================================================

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "dispatch-test-secret".to_string(),
        jwt_access_ttl_minutes: 15,
        jwt_refresh_ttl_hours: 24,
    }
}

#[tokio::test]
async fn test_authenticate_valid_token_resolves_user() {
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let config = auth_config();
    let authenticator = SocketAuthenticator::new(
        Arc::new(JwtDecoder::new(&config)),
        bed.stores.clone(),
    );

    let pair = JwtEncoder::new(&config)
        .generate_token_pair(alice.id, "alice")
        .unwrap();

    let user = authenticator
        .authenticate(Some(&pair.access_token))
        .await
        .unwrap();
    assert_eq!(user.id, alice.id);
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_authenticate_missing_token_is_rejected() {
    let bed = TestBed::new();
    let authenticator = SocketAuthenticator::new(
        Arc::new(JwtDecoder::new(&auth_config())),
        bed.stores.clone(),
    );

    let err = authenticator.authenticate(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_authenticate_malformed_token_is_rejected() {
    let bed = TestBed::new();
    let authenticator = SocketAuthenticator::new(
        Arc::new(JwtDecoder::new(&auth_config())),
        bed.stores.clone(),
    );

    let err = authenticator
        .authenticate(Some("not.a.token"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_authenticate_deleted_user_is_rejected() {
    // The token is valid but the referenced user no longer exists.
    let bed = TestBed::new();
    let alice = bed.stores.add_user("alice");
    let config = auth_config();
    let authenticator = SocketAuthenticator::new(
        Arc::new(JwtDecoder::new(&config)),
        bed.stores.clone(),
    );

    let pair = JwtEncoder::new(&config)
        .generate_token_pair(alice.id, "alice")
        .unwrap();
    bed.stores.remove_user(alice.id);

    let err = authenticator
        .authenticate(Some(&pair.access_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}
