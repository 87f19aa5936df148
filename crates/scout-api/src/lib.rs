//! # scout-api
//!
//! HTTP side of the research backend:
//!
//! - **Documents**: list, upload and delete the files a research task can
//!   draw on ([`ApiClient`])
//! - **Reachability**: `HEAD /health` probes and selection of the API base
//!   URL among configured candidates ([`HealthProber`])

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod health;

pub use client::{ApiClient, FileList, UploadedFile};
pub use errors::ApiError;
pub use health::HealthProber;
