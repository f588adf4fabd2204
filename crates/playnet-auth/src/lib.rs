//! # playnet-auth
//!
//! JWT credential handling for Playnet: typed claims, token issuance,
//! and validation. The HTTP layer mints token pairs at login; the
//! real-time core validates the access token presented at WebSocket
//! connection time.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
