//! # Conduit Routing
//!
//! The dispatch engine of the bus:
//! - [`MessageRouter`] resolves a thread to its configured routes for a
//!   direction, converts the payload per route, and fans out through the
//!   protocol adapters, isolating per-route failures
//! - [`Orchestrator`] sequences declarative multi-system flows with payload
//!   transformation between steps and per-step timeouts
//!
//! Routing is best-effort fan-out, not a transaction: the router attempts
//! every route and reports per-route outcomes; partial failure is the
//! normal case.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod router;

pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, ProcessFlow, ProcessStep};
pub use router::{MessageRouter, RouteDispatch, RouterConfig};

/// Default per-dispatch timeout (seconds)
pub const DEFAULT_DISPATCH_TIMEOUT_SECONDS: u64 = 30;

/// Default per-step timeout for orchestrated flows (seconds)
pub const DEFAULT_STEP_TIMEOUT_SECONDS: u64 = 5;
