//! Private message domain entities.

pub mod model;

pub use model::Message;
