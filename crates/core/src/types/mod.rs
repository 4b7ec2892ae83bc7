//! Core types for Tillpoint.
//!
//! This module provides type-safe wrappers for the point-of-sale domain.

pub mod cart;
pub mod id;
pub mod money;
pub mod payment;
pub mod product;

pub use cart::{Cart, CartError, CartLine, QuantityChange, StockConflict, parse_quantity};
pub use id::*;
pub use money::Money;
pub use payment::{PaymentMethod, PaymentMethodError};
pub use product::{DEFAULT_CATEGORY, Product};
