//! # Conduit Core
//!
//! Configuration model shared by every part of the bus:
//! - Entities: systems, routes, connection settings, threads, thread groups
//! - The [`ConfigStore`] contract the routing engine reads through
//! - An in-memory store for tests and demos
//!
//! The bus never mutates configuration while routing; all writes happen
//! through the administrative operations on [`ConfigStore`].

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use model::*;
pub use store::ConfigStore;
