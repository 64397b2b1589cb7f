//! DDM Core - Shared types library.
//!
//! This crate provides common types used across all DDM components:
//! - `market` - Headless marketplace service (HTTP surface + external clients)
//! - `cli` - Command-line tools over the same flows
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no RPC
//! clients, no HTTP. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog pagination arithmetic, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
