//! In-memory reference implementation of the `TaskGrid` task service.
//!
//! Exposes the server for use in tests and embedding. The board lives in
//! a [`store::MemoryBoard`]; [`server`] maps the HTTP routes onto it.

pub mod config;
pub mod server;
pub mod store;
