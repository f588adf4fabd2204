//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use playnet_core::config::realtime::RealtimeConfig;
use playnet_core::error::AppError;
use playnet_core::types::id::UserId;
use playnet_entity::user::UserRef;

use crate::bridge::EventBridge;
use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::PresenceRegistry;
use crate::dispatcher::DispatchRouter;
use crate::event::ServerEvent;
use crate::store::{MessageStore, NotificationStore, UserStore};

/// Central real-time engine that coordinates the registry, router, and
/// event bridge.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Presence registry.
    pub registry: Arc<PresenceRegistry>,
    /// Dispatch router.
    pub router: Arc<DispatchRouter>,
    /// Domain-event bridge.
    pub bridge: Arc<EventBridge>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine over the given stores.
    pub fn new(
        config: RealtimeConfig,
        messages: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let registry = Arc::new(PresenceRegistry::new());
        let router = Arc::new(DispatchRouter::new(
            registry.clone(),
            messages,
            notifications,
            users.clone(),
        ));
        let bridge = Arc::new(EventBridge::new(router.clone(), users));

        info!("Real-time engine initialized");

        Self {
            registry,
            router,
            bridge,
            config,
            shutdown_tx,
        }
    }

    /// Allocate a handle and outbound queue for an authenticated user.
    ///
    /// The handle is not yet registered; the caller passes it to
    /// [`DispatchRouter::handle_connect`] once the transport is ready to
    /// drain the receiver.
    pub fn open_connection(
        &self,
        user: UserRef,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        (Arc::new(ConnectionHandle::new(user, tx)), rx)
    }

    /// Whether a user currently has a live registered connection.
    pub fn is_user_online(&self, user_id: UserId) -> bool {
        self.registry.is_online(user_id)
    }

    /// The transport keep-alive ping interval.
    pub fn ping_interval_seconds(&self) -> u64 {
        self.config.ping_interval_seconds
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());

        for user_id in self.registry.connected_user_ids() {
            if let Some(handle) = self.registry.lookup(user_id) {
                handle.mark_closed();
                self.registry.deregister(user_id, handle.id);
            }
        }

        info!("Real-time engine shut down");
        Ok(())
    }
}
