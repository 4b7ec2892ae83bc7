//! In-progress sale: cart lines and their stock rules.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s, at most one per product.
//! Every mutation either succeeds completely or leaves the cart untouched.
//!
//! Invariants held by every `Cart` value:
//! - no line has a quantity of zero
//! - a line's quantity never exceeds its `stock_ceiling`
//! - product IDs are unique across lines

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Money;
use super::product::Product;

/// Errors raised by cart operations.
///
/// All of them are local validation failures: the cart is never modified
/// when one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product is not in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product has no stock at all.
    #[error("no stock available for {0}")]
    OutOfStock(String),

    /// The quantity is not a whole number of at least 1.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The requested (or combined) quantity exceeds live stock.
    #[error(
        "insufficient stock for {product}: requested {requested}, available {available} ({in_cart} already in cart)"
    )]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
        in_cart: u32,
    },

    /// An increment would exceed the stock snapshot taken when the line was added.
    #[error("maximum stock for {product} is {ceiling} units")]
    StockCeilingExceeded { product: String, ceiling: u32 },

    /// The line index does not exist.
    #[error("cart line {index} out of range (cart has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Persisted cart data violates a cart invariant.
    #[error("invalid cart line: {0}")]
    InvalidLine(String),
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    /// Stock available when the line was created or last merged into.
    pub stock_ceiling: u32,
}

impl CartLine {
    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.price.times(self.quantity)
    }

    /// Whether one more unit fits under the ceiling.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.stock_ceiling
    }
}

/// Result of [`Cart::change_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds this quantity.
    Updated(u32),
    /// The quantity dropped to zero or below and the line was removed.
    Removed(CartLine),
}

/// A cart line whose quantity no longer fits the catalog's current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockConflict {
    pub product_id: ProductId,
    pub name: String,
    pub requested: u32,
    /// Current stock, or `None` if the product is no longer listed.
    pub available: Option<u32>,
}

impl std::fmt::Display for StockConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.available {
            Some(available) => write!(
                f,
                "{} (requested {}, available {available})",
                self.name, self.requested
            ),
            None => write!(f, "{} (no longer available)", self.name),
        }
    }
}

/// The in-progress sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from previously stored lines, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidLine`] if a line has a zero quantity or a
    /// negative price, exceeds its ceiling, or repeats a product.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, CartError> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.quantity == 0 {
                return Err(CartError::InvalidLine(format!(
                    "{} has zero quantity",
                    line.name
                )));
            }
            if line.price.is_negative() {
                return Err(CartError::InvalidLine(format!(
                    "{} has negative price {}",
                    line.name, line.price
                )));
            }
            if line.quantity > line.stock_ceiling {
                return Err(CartError::InvalidLine(format!(
                    "{} quantity {} exceeds ceiling {}",
                    line.name, line.quantity, line.stock_ceiling
                )));
            }
            if !seen.insert(line.product_id) {
                return Err(CartError::InvalidLine(format!(
                    "product {} appears more than once",
                    line.product_id
                )));
            }
        }
        Ok(Self { lines })
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Quantity of `product_id` already reserved in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.position(product_id)
            .and_then(|i| self.lines.get(i))
            .map_or(0, |l| l.quantity)
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// The combined quantity is checked against the product's live stock.
    /// A merge refreshes the line's ceiling to that stock so the line never
    /// holds more than its ceiling.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] if the product has no stock
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero
    /// - [`CartError::InsufficientStock`] if the (combined) quantity exceeds stock
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<u32, CartError> {
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }

        let in_cart = self.quantity_of(product.id);
        let combined = in_cart.saturating_add(quantity);
        if combined > product.stock {
            return Err(CartError::InsufficientStock {
                product: product.name.clone(),
                requested: quantity,
                available: product.stock,
                in_cart,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = combined;
            line.stock_ceiling = product.stock;
        } else {
            self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity,
                stock_ceiling: product.stock,
            });
        }
        Ok(combined)
    }

    /// Apply a signed change to the quantity of the line at `index`.
    ///
    /// Dropping to zero or below removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::IndexOutOfRange`] if there is no such line
    /// - [`CartError::StockCeilingExceeded`] if the result exceeds the line's ceiling
    pub fn change_quantity(
        &mut self,
        index: usize,
        delta: i64,
    ) -> Result<QuantityChange, CartError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;

        let next = i64::from(line.quantity).saturating_add(delta);
        if next <= 0 {
            return self.remove_item(index).map(QuantityChange::Removed);
        }
        if next > i64::from(line.stock_ceiling) {
            return Err(CartError::StockCeilingExceeded {
                product: line.name.clone(),
                ceiling: line.stock_ceiling,
            });
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;
        // next is in 1..=stock_ceiling, so it fits in u32
        line.quantity = u32::try_from(next).unwrap_or(line.stock_ceiling);
        Ok(QuantityChange::Updated(line.quantity))
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn remove_item(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Compare each line against current catalog stock.
    #[must_use]
    pub fn stock_conflicts(&self, products: &[Product]) -> Vec<StockConflict> {
        self.lines
            .iter()
            .filter_map(|line| {
                let available = products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|p| p.stock);
                match available {
                    Some(stock) if stock >= line.quantity => None,
                    _ => Some(StockConflict {
                        product_id: line.product_id,
                        name: line.name.clone(),
                        requested: line.quantity,
                        available,
                    }),
                }
            })
            .collect()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Parse a quantity typed by the cashier.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] if the text is not a whole number
/// or is below 1.
pub fn parse_quantity(text: &str) -> Result<u32, CartError> {
    let trimmed = text.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| CartError::InvalidQuantity(format!("'{trimmed}' is not a number")))?;
    if value < 1 {
        return Err(CartError::InvalidQuantity(
            "quantity must be at least 1".to_string(),
        ));
    }
    u32::try_from(value).map_err(|_| CartError::InvalidQuantity(format!("{value} is too large")))
}
