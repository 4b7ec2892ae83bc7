//! Persistent cart store.
//!
//! Wraps a [`Cart`] with local storage: every successful mutation writes the
//! whole cart back under [`CART_KEY`]. Storage failures are logged and never
//! undo or fail the mutation itself.

use tracing::{debug, instrument, warn};

use tillpoint_core::{Cart, CartError, CartLine, Money, ProductId, QuantityChange};

use crate::catalog::Catalog;
use crate::storage::{CART_KEY, SharedStore, StorageError, load_json, save_json};

/// The session's cart, persisted after every change.
pub struct CartStore {
    cart: Cart,
    store: SharedStore,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Rehydrate the cart from storage.
    ///
    /// Missing data yields an empty cart. Unreadable or malformed data is
    /// logged and also yields an empty cart.
    #[must_use]
    pub fn restore(store: SharedStore) -> Self {
        let cart = match load_json::<Cart>(store.as_ref(), CART_KEY) {
            Ok(Some(cart)) => {
                debug!(lines = cart.line_count(), "Cart restored from storage");
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Stored cart is unreadable, starting with an empty cart");
                Cart::new()
            }
        };
        Self { cart, store }
    }

    /// Read-only view of the cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add `quantity` units of a catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] if the product is not in the
    /// catalog, or any error from [`Cart::add_item`].
    #[instrument(skip(self, catalog))]
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<u32, CartError> {
        let product = catalog
            .find(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;
        let total = self.cart.add_item(product, quantity)?;
        self.persist_or_log();
        Ok(total)
    }

    /// Change the quantity of the line at `index` by `delta`.
    ///
    /// # Errors
    ///
    /// See [`Cart::change_quantity`].
    #[instrument(skip(self))]
    pub fn change_quantity(
        &mut self,
        index: usize,
        delta: i64,
    ) -> Result<QuantityChange, CartError> {
        let change = self.cart.change_quantity(index, delta)?;
        self.persist_or_log();
        Ok(change)
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, index: usize) -> Result<CartLine, CartError> {
        let line = self.cart.remove_item(index)?;
        self.persist_or_log();
        Ok(line)
    }

    /// Empty the cart. Confirming with the cashier is the caller's job.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist_or_log();
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn compute_total(&self) -> Money {
        self.cart.total()
    }

    /// Write the cart to storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        save_json(self.store.as_ref(), CART_KEY, &self.cart)
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}
