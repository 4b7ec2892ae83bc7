//! Terminal session.
//!
//! A [`Terminal`] owns everything one till needs: configuration, local
//! storage, the catalog, the cart, the backend client and the daily
//! counters. Front ends drive the till exclusively through it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use tillpoint_core::{Cart, CartLine, PaymentMethod, ProductId, QuantityChange};

use crate::backend::{
    BackendClient, BackendError, ClosingOutcome, ClosingStatus, SaleConfirmation, SaleError,
};
use crate::cart_store::CartStore;
use crate::catalog::Catalog;
use crate::config::TerminalConfig;
use crate::counters::{CountersStore, DailyCounters, spawn_rollover_watch};
use crate::error::Result;
use crate::receipt::{ReceiptConfig, render_receipt};
use crate::storage::{FileStore, SharedStore, StorageError};

/// A sale the backend confirmed, with the lines that were sold.
#[derive(Debug, Clone)]
pub struct CompletedSale {
    pub confirmation: SaleConfirmation,
    /// Cart lines at the moment of submission.
    pub lines: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub donation_reason: Option<String>,
}

/// One till's session state.
pub struct Terminal {
    config: TerminalConfig,
    store: SharedStore,
    backend: BackendClient,
    catalog: Catalog,
    cart: CartStore,
    counters: Arc<Mutex<CountersStore>>,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("backend", &self.backend)
            .field("catalog_len", &self.catalog.len())
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Open a terminal backed by files in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created or the backend
    /// client cannot be built.
    pub fn open(config: TerminalConfig) -> Result<Self> {
        let store: SharedStore = Arc::new(FileStore::open(&config.data_dir)?);
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self::with_parts(config, store, backend))
    }

    /// Start a session: restore the cart and load today's counters.
    #[must_use]
    pub fn with_parts(config: TerminalConfig, store: SharedStore, backend: BackendClient) -> Self {
        let cart = CartStore::restore(store.clone());
        let counters = CountersStore::load_or_reset_for_today(store.clone());
        info!(
            cart_lines = cart.cart().line_count(),
            sales_today = counters.counters().sale_count,
            "Terminal started"
        );

        Self {
            config,
            store,
            backend,
            catalog: Catalog::default(),
            cart,
            counters: Arc::new(Mutex::new(counters)),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TerminalConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replace the catalog with the backend's products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns error if the fetch fails; the catalog is left as it was.
    pub async fn refresh_catalog(
        &mut self,
        query: &str,
    ) -> std::result::Result<&Catalog, BackendError> {
        let products = self.backend.fetch_products(query).await?;
        self.catalog.replace(products);
        Ok(&self.catalog)
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // =========================================================================
    // Cart
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    /// Add `quantity` units of a product, loading the catalog first if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the catalog cannot be loaded or the cart rejects the
    /// quantity.
    pub async fn add_to_cart(&mut self, product_id: ProductId, quantity: u32) -> Result<u32> {
        if self.catalog.is_empty() {
            self.refresh_catalog("").await?;
        }
        Ok(self.cart.add_item(&self.catalog, product_id, quantity)?)
    }

    /// Change the quantity of the line at `index` by `delta`.
    ///
    /// # Errors
    ///
    /// Returns error if the line does not exist or the ceiling would be exceeded.
    pub fn change_quantity(&mut self, index: usize, delta: i64) -> Result<QuantityChange> {
        Ok(self.cart.change_quantity(index, delta)?)
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns error if the line does not exist.
    pub fn remove_item(&mut self, index: usize) -> Result<CartLine> {
        Ok(self.cart.remove_item(index)?)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Sell the cart.
    ///
    /// The cart is checked against a freshly fetched catalog first; any line
    /// exceeding current stock aborts the sale with `SaleError::StaleStock`.
    /// On confirmation the cart is cleared, the counters are updated and the
    /// catalog is refreshed. On any failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// See [`SaleError`].
    #[instrument(skip(self))]
    pub async fn checkout(
        &mut self,
        payment_method: Option<PaymentMethod>,
    ) -> std::result::Result<CompletedSale, SaleError> {
        if self.cart.cart().is_empty() {
            return Err(SaleError::EmptyCart);
        }
        let payment_method = payment_method.ok_or(SaleError::MissingPaymentMethod)?;

        self.verify_stock().await?;
        let confirmation = self
            .backend
            .submit_sale(self.cart.cart(), Some(payment_method))
            .await?;
        Ok(self.finish_sale(confirmation, payment_method, None).await)
    }

    /// Give the cart away as a donation.
    ///
    /// # Errors
    ///
    /// See [`SaleError`].
    #[instrument(skip(self))]
    pub async fn donate(&mut self, reason: &str) -> std::result::Result<CompletedSale, SaleError> {
        if self.cart.cart().is_empty() {
            return Err(SaleError::EmptyCart);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SaleError::MissingReason);
        }

        self.verify_stock().await?;
        let confirmation = self
            .backend
            .submit_donation(self.cart.cart(), reason)
            .await?;
        Ok(self
            .finish_sale(confirmation, PaymentMethod::Cash, Some(reason.to_string()))
            .await)
    }

    async fn verify_stock(&mut self) -> std::result::Result<(), SaleError> {
        self.backend.invalidate_products();
        self.refresh_catalog("").await?;

        let conflicts = self.cart.cart().stock_conflicts(self.catalog.products());
        if conflicts.is_empty() {
            Ok(())
        } else {
            warn!(conflicts = conflicts.len(), "Cart exceeds current stock");
            Err(SaleError::StaleStock(conflicts))
        }
    }

    async fn finish_sale(
        &mut self,
        confirmation: SaleConfirmation,
        payment_method: PaymentMethod,
        donation_reason: Option<String>,
    ) -> CompletedSale {
        let lines = self.cart.cart().lines().to_vec();
        self.cart.clear();

        let recorded = self
            .lock_counters()
            .record_sale(confirmation.total)
            .map(|_| ());
        if let Err(e) = recorded {
            warn!(error = %e, "Daily counters not updated");
        }

        self.backend.invalidate_products();
        if let Err(e) = self.refresh_catalog("").await {
            warn!(error = %e, "Catalog refresh after sale failed, adjusting stock locally");
            self.catalog.apply_sale(&lines);
        }

        CompletedSale {
            confirmation,
            lines,
            payment_method,
            donation_reason,
        }
    }

    // =========================================================================
    // Daily counters and closing
    // =========================================================================

    /// Today's counters, rolled over first if the date changed.
    #[must_use]
    pub fn counters(&self) -> DailyCounters {
        let mut counters = self.lock_counters();
        counters.check_rollover(crate::counters::today());
        counters.counters().clone()
    }

    /// Zero today's counters.
    pub fn reset_counters(&self) {
        self.lock_counters().reset();
    }

    /// Start the periodic date-change check.
    #[must_use]
    pub fn watch_rollover(&self) -> JoinHandle<()> {
        spawn_rollover_watch(self.counters.clone(), self.config.rollover_check_interval)
    }

    /// Backend view of the trading day.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn closing_status(&self) -> std::result::Result<ClosingStatus, BackendError> {
        self.backend.closing_status().await
    }

    /// Close the trading day and zero the local counters.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses or the request fails; the
    /// counters are left as they were.
    pub async fn close_day(&self) -> std::result::Result<ClosingOutcome, BackendError> {
        let outcome = self.backend.process_closing().await?;
        self.reset_counters();
        Ok(outcome)
    }

    fn lock_counters(&self) -> MutexGuard<'_, CountersStore> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Receipts
    // =========================================================================

    #[must_use]
    pub fn receipt_config(&self) -> ReceiptConfig {
        ReceiptConfig::load(self.store.as_ref())
    }

    /// Persist new receipt settings.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    pub fn set_receipt_config(
        &self,
        config: &ReceiptConfig,
    ) -> std::result::Result<(), StorageError> {
        config.save(self.store.as_ref())
    }

    /// Render a completed sale with the stored receipt settings.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render.
    pub fn render_receipt(&self, sale: &CompletedSale) -> Result<String> {
        let link = sale
            .confirmation
            .invoice_id
            .and_then(|id| self.backend.receipt_url(id).ok());
        Ok(render_receipt(
            &self.receipt_config(),
            sale,
            link.as_ref(),
            Local::now().naive_local(),
        )?)
    }
}
