//! Application state shared across all handlers.

use std::sync::Arc;

use tracing::info;

use playnet_auth::jwt::JwtDecoder;
use playnet_core::config::AppConfig;
use playnet_core::result::AppResult;
use playnet_database::DatabasePool;
use playnet_database::repositories::{MessageRepository, NotificationRepository, UserRepository};
use playnet_realtime::{RealtimeEngine, SocketAuthenticator};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheaply cloneable across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db: DatabasePool,
    /// User repository.
    pub users: Arc<UserRepository>,
    /// Message repository.
    pub messages: Arc<MessageRepository>,
    /// Notification repository.
    pub notifications: Arc<NotificationRepository>,
    /// Real-time engine.
    pub realtime: RealtimeEngine,
    /// Socket authenticator.
    pub authenticator: SocketAuthenticator,
}

impl AppState {
    /// Connect to the database, run migrations, and wire all subsystems.
    pub async fn initialize(config: AppConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(&config.database).await?;
        playnet_database::migration::run_migrations(db.pool()).await?;

        let users = Arc::new(UserRepository::new(db.pool().clone()));
        let messages = Arc::new(MessageRepository::new(db.pool().clone()));
        let notifications = Arc::new(NotificationRepository::new(db.pool().clone()));

        // The registry rebuilds from empty on restart, so any row still
        // marked online is a leftover from an unclean shutdown.
        let reset = users.reset_all_presence().await?;
        if reset > 0 {
            info!(count = reset, "reset stale online presence rows");
        }

        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            messages.clone(),
            notifications.clone(),
            users.clone(),
        );

        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let authenticator = SocketAuthenticator::new(decoder, users.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            users,
            messages,
            notifications,
            realtime,
            authenticator,
        })
    }
}
