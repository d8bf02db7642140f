//! Typed bindings for the backend's order endpoints.

pub mod order_client;

pub use order_client::*;
