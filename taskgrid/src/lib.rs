//! `TaskGrid` — Kanban board client for a remote task service.
//!
//! [`api`] talks to the service, [`board`] keeps the local mirror in step
//! with it, and [`cli`] is the command-line front end built on both.

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
