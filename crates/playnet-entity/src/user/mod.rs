//! User domain entities.

pub mod model;
pub mod presence;

pub use model::{User, UserRef};
pub use presence::PresenceState;
