//! Domain layer - Pure data models.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod server;

pub use server::{Server, LISTEN_STATE};
