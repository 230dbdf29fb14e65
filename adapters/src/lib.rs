//! # Conduit Adapters
//!
//! Protocol connectivity layer of the bus. One adapter per wire protocol,
//! all satisfying the same send/authenticate contract:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Adapter Registry               │
//! └──────┬───────────────┬───────────────┬──────┘
//!        │               │               │
//!   ┌────▼────┐     ┌────▼────┐     ┌────▼────┐
//!   │  REST   │     │  SOAP   │     │  Queue  │
//!   │ Adapter │     │ Adapter │     │ (AMQP)  │
//!   └────┬────┘     └────┬────┘     └────┬────┘
//!        │               │               │
//!     HTTP verb      HTTP POST      basic.publish
//! ```
//!
//! Adapters are stateless apart from their network clients and are safe to
//! share across concurrent dispatches.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod amqp;
pub mod auth;
pub mod connector;
pub mod error;
pub mod registry;
pub mod rest;
pub mod soap;

pub use connector::{Headers, ProtocolAdapter, SendOutcome};
pub use error::{Error, Result};
pub use registry::{AdapterConfig, AdapterRegistry};

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Queue used when a dispatch names no endpoint
pub const DEFAULT_QUEUE: &str = "default";
