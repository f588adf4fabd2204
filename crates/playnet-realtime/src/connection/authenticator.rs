//! Socket authentication — validates the bearer JWT presented at
//! connection time and resolves it to a live user record.
//!
//! Authentication completes before the connection is admitted to any
//! event handling; no presence or status mutation happens here.

use std::sync::Arc;

use playnet_auth::jwt::JwtDecoder;
use playnet_core::error::AppError;
use playnet_core::types::id::UserId;
use playnet_entity::user::UserRef;

use crate::store::UserStore;

/// Authenticates socket connections using JWT access tokens.
#[derive(Clone)]
pub struct SocketAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// User directory for existence checks.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for SocketAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketAuthenticator").finish()
    }
}

impl SocketAuthenticator {
    /// Creates a new socket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>, users: Arc<dyn UserStore>) -> Self {
        Self { decoder, users }
    }

    /// Authenticates a connection attempt.
    ///
    /// Fails with an authentication error when the token is missing,
    /// malformed, expired, or references a user that no longer exists.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<UserRef, AppError> {
        let token = token.ok_or_else(|| AppError::authentication("Missing credential token"))?;

        let claims = self.decoder.decode_access_token(token)?;

        let user = self
            .users
            .find_ref(UserId::from(claims.user_id()))
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        Ok(user)
    }
}
