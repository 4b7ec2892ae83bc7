//! Tillpoint terminal library.
//!
//! Everything a single till does between the cashier and the sales backend:
//! configuration, local storage, the product catalog, the persistent cart,
//! sale submission, daily counters and receipts. [`Terminal`] ties the pieces
//! into one session object.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod counters;
pub mod error;
pub mod receipt;
pub mod storage;
pub mod terminal;

pub use error::{Result, TerminalError};
pub use terminal::{CompletedSale, Terminal};
