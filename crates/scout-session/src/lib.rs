//! # scout-session
//!
//! Streaming session connection manager for the research backend.
//!
//! A [`SessionManager`] owns one WebSocket channel per session: it resolves
//! the endpoint from the client origin, sends the `"start {json}"` request,
//! classifies the streamed events into an ordered log, an answer buffer and
//! a human-feedback gate, keeps the channel alive with `"ping"` frames,
//! reconnects with bounded linear backoff, and closes the channel once the
//! session duration ceiling is reached.
//!
//! Updates reach the UI layer through a [`SessionObserver`] and through the
//! snapshot accessors on the manager.

#![deny(unsafe_code)]

pub mod config;
mod driver;
pub mod endpoint;
pub mod errors;
mod manager;
pub mod observer;
pub mod state;
pub mod store;

pub use config::SessionConfig;
pub use endpoint::{EndpointPurpose, EndpointResolver};
pub use errors::SessionError;
pub use manager::SessionManager;
pub use observer::{NullObserver, SessionObserver};
pub use state::ConnectionState;
pub use store::{Dispatch, classify};
