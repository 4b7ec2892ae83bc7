//! Integration tests for state that survives a terminal restart.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use tillpoint_core::{Money, PaymentMethod, ProductId, QuantityChange};
use tillpoint_integration_tests::{MockBackend, bakery};
use tillpoint_terminal::Terminal;
use tillpoint_terminal::backend::BackendClient;
use tillpoint_terminal::counters::{DailyCounters, today};
use tillpoint_terminal::receipt::ReceiptConfig;
use tillpoint_terminal::storage::{
    CART_KEY, DAILY_COUNTERS_KEY, FileStore, KeyValueStore, MemoryStore, SharedStore, save_json,
};

#[tokio::test]
async fn test_cart_survives_restart() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();

    {
        let mut terminal = backend.terminal(dir.path());
        terminal.add_to_cart(ProductId::new(1), 2).await.unwrap();
        terminal.add_to_cart(ProductId::new(3), 5).await.unwrap();
        assert_eq!(
            terminal.change_quantity(1, -1).unwrap(),
            QuantityChange::Updated(4)
        );
    }

    let terminal = backend.terminal(dir.path());
    let cart = terminal.cart();
    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.lines()[0].quantity, 2);
    assert_eq!(cart.lines()[0].stock_ceiling, 3);
    assert_eq!(cart.lines()[1].quantity, 4);
    assert_eq!(cart.total(), Money::from_units(11_000));
}

#[tokio::test]
async fn test_cart_is_stored_under_its_key() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    terminal.add_to_cart(ProductId::new(2), 1).await.unwrap();

    let store = FileStore::open(dir.path()).unwrap();
    let raw = store.get(CART_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["productId"], 2);
    assert_eq!(json[0]["quantity"], 1);
    assert_eq!(json[0]["stockCeiling"], 10);
}

#[tokio::test]
async fn test_corrupt_cart_starts_empty() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    FileStore::open(dir.path())
        .unwrap()
        .set(CART_KEY, "{{{ not json")
        .unwrap();

    let terminal = backend.terminal(dir.path());
    assert!(terminal.cart().is_empty());
}

#[tokio::test]
async fn test_counters_survive_restart_same_day() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();

    {
        let mut terminal = backend.terminal(dir.path());
        terminal.add_to_cart(ProductId::new(1), 1).await.unwrap();
        terminal.checkout(Some(PaymentMethod::Cash)).await.unwrap();
    }

    let terminal = backend.terminal(dir.path());
    let counters = terminal.counters();
    assert_eq!(counters.sale_count, 1);
    assert_eq!(counters.total_revenue, Money::from_units(2500));
}

#[tokio::test]
async fn test_stale_counters_reset_on_startup() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let store: SharedStore = Arc::new(MemoryStore::new());
    let yesterday = today().pred_opt().unwrap();
    save_json(
        store.as_ref(),
        DAILY_COUNTERS_KEY,
        &DailyCounters {
            date: yesterday,
            sale_count: 40,
            total_revenue: Money::from_units(900_000),
        },
    )
    .unwrap();

    let config = backend.config(dir.path(), None);
    let client = BackendClient::new(&config.backend).unwrap();
    let terminal = Terminal::with_parts(config, store, client);

    assert_eq!(terminal.counters(), DailyCounters::zeroed(today()));
}

#[tokio::test]
async fn test_receipt_config_persists() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();

    let terminal = backend.terminal(dir.path());
    assert_eq!(terminal.receipt_config(), ReceiptConfig::default());
    terminal
        .set_receipt_config(&ReceiptConfig {
            company_name: "Panaderia Central".to_string(),
            show_qr: true,
            ..ReceiptConfig::default()
        })
        .unwrap();
    drop(terminal);

    let reopened = backend.terminal(dir.path());
    assert_eq!(reopened.receipt_config().company_name, "Panaderia Central");
    assert!(reopened.receipt_config().show_qr);
}
