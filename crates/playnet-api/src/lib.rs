//! # playnet-api
//!
//! HTTP layer for Playnet's real-time core, built on Axum.
//!
//! Provides the WebSocket upgrade endpoint, the health endpoint, the
//! shared application state, and `AppError` → HTTP response mapping. The
//! platform's CRUD surface (profiles, posts, tournaments) lives in a
//! separate service and is not part of this repository.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
