//! Token value types owned by the coordinator.

pub mod cached;
pub mod secret;
