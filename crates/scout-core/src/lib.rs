//! # scout-core
//!
//! Shared vocabulary for the Scout research client:
//!
//! - **Protocol**: the `"start {json}"` envelope, credential headers, and
//!   the tagged inbound events the backend streams back
//! - **Constants**: keep-alive, duration ceiling, and reconnect defaults
//! - **Errors**: [`ProtocolError`] via `thiserror`
//! - **Logging**: `tracing` subscriber setup and a capture layer for tests

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod logging;
pub mod protocol;

pub use errors::ProtocolError;
pub use protocol::{
    CredentialHeaders, EventKind, InboundEvent, LoggedEvent, ReportSettings, StartRequest,
};
