//! Tillpoint Core - Shared domain types for the point-of-sale terminal.
//!
//! This crate provides the types and pure logic used across all Tillpoint
//! components:
//! - `terminal` - Catalog cache, cart store, backend client, daily counters
//! - `cli` - Command-line front end for the cashier
//!
//! # Architecture
//!
//! The core crate contains only types and in-memory logic - no I/O, no
//! storage access, no HTTP clients. Cart stock rules live here so they can
//! be exercised without a backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, products, payment methods and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
