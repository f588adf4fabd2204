//! Event bridge — domain events from the HTTP layer into the router.
//!
//! The connection-management and enchantment flows live outside this
//! crate; they hand a [`SocialEvent`] to the bridge, which resolves the
//! acting user's display identity and drives the dispatch router.

use std::sync::Arc;

use playnet_core::AppError;
use playnet_core::events::SocialEvent;
use playnet_core::types::id::{ConnectionRequestId, UserId};

use crate::dispatcher::DispatchRouter;
use crate::store::UserStore;

/// Applies domain events to the dispatch router.
pub struct EventBridge {
    /// The router that persists and pushes.
    router: Arc<DispatchRouter>,
    /// User directory for populating sender identities.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge").finish()
    }
}

impl EventBridge {
    /// Creates a new event bridge.
    pub fn new(router: Arc<DispatchRouter>, users: Arc<dyn UserStore>) -> Self {
        Self { router, users }
    }

    /// Apply one domain event: persist what it implies and push to the
    /// target's live connection if present.
    pub async fn apply(&self, event: SocialEvent) -> Result<(), AppError> {
        match event {
            SocialEvent::ConnectionRequestCreated {
                request_id,
                from,
                to,
            } => {
                let sender = self.resolve(from).await?;
                self.router
                    .notify_connection_request(
                        &sender,
                        UserId::from(to),
                        ConnectionRequestId::from(request_id),
                    )
                    .await
            }
            SocialEvent::ConnectionRequestAccepted {
                request_id,
                from,
                to,
            } => {
                let sender = self.resolve(from).await?;
                self.router
                    .notify_connection_accepted(
                        &sender,
                        UserId::from(to),
                        ConnectionRequestId::from(request_id),
                    )
                    .await
            }
            SocialEvent::EnchantmentChanged { user_id, count } => {
                self.router
                    .push_enchantment_update(UserId::from(user_id), count);
                Ok(())
            }
        }
    }

    async fn resolve(&self, user_id: uuid::Uuid) -> Result<playnet_entity::user::UserRef, AppError> {
        self.users
            .find_ref(UserId::from(user_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}
