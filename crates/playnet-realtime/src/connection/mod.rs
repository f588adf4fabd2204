//! Connection lifecycle: handles, the presence registry, and socket
//! authentication.

pub mod authenticator;
pub mod handle;
pub mod registry;

pub use authenticator::SocketAuthenticator;
pub use handle::ConnectionHandle;
pub use registry::PresenceRegistry;
