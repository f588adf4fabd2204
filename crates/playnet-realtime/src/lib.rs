//! # playnet-realtime
//!
//! Real-time core for Playnet. Provides:
//!
//! - Presence registry: who is online right now, one live handle per user
//! - Socket authentication: bearer JWT resolved to a live user record
//!   before any event is processed
//! - Dispatch router: inbound events become durable writes plus
//!   best-effort pushes to connected targets
//! - Event bridge: the typed entry point the HTTP layer uses to deliver
//!   connection-request and enchantment updates
//!
//! Single-process by design: the registry is in-memory and rebuilt empty
//! on restart, so durable presence is reset at startup.

pub mod bridge;
pub mod connection;
pub mod dispatcher;
pub mod event;
pub mod server;
pub mod store;

pub use bridge::EventBridge;
pub use connection::authenticator::SocketAuthenticator;
pub use connection::handle::ConnectionHandle;
pub use connection::registry::PresenceRegistry;
pub use dispatcher::DispatchRouter;
pub use event::{ClientEvent, ServerEvent};
pub use server::RealtimeEngine;
