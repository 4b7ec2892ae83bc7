//! Integration tests for daily counters and closing.

#![allow(clippy::unwrap_used)]

use tillpoint_core::{Money, PaymentMethod, ProductId};
use tillpoint_integration_tests::{MockBackend, bakery};
use tillpoint_terminal::backend::BackendError;
use tillpoint_terminal::counters::today;

#[tokio::test]
async fn test_closing_status_reflects_backend() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    terminal.add_to_cart(ProductId::new(3), 2).await.unwrap();
    terminal.checkout(Some(PaymentMethod::Cash)).await.unwrap();

    let status = terminal.closing_status().await.unwrap();
    assert_eq!(status.date, today());
    assert!(status.day_active);
    assert!(!status.closed);
    assert_eq!(status.transaction_count, 1);
    assert_eq!(status.total_sales, Money::from_units(3000));
}

#[tokio::test]
async fn test_close_day_resets_counters() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    terminal.add_to_cart(ProductId::new(2), 2).await.unwrap();
    terminal.checkout(Some(PaymentMethod::Card)).await.unwrap();
    assert_eq!(terminal.counters().sale_count, 1);

    let outcome = terminal.close_day().await.unwrap();

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.transaction_count, 1);
    assert_eq!(summary.total_sales, Money::from_units(8000));
    assert_eq!(outcome.message.as_deref(), Some("Daily closing processed"));

    let counters = terminal.counters();
    assert_eq!(counters.date, today());
    assert_eq!(counters.sale_count, 0);
    assert_eq!(counters.total_revenue, Money::ZERO);
}

#[tokio::test]
async fn test_rejected_closing_keeps_counters() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());
    terminal.close_day().await.unwrap();

    terminal.add_to_cart(ProductId::new(1), 1).await.unwrap();
    terminal.checkout(Some(PaymentMethod::Cash)).await.unwrap();

    let err = terminal.close_day().await.unwrap_err();

    assert!(matches!(err, BackendError::Rejected(ref m) if m.contains("already closed")));
    assert_eq!(terminal.counters().sale_count, 1);
    assert_eq!(terminal.counters().total_revenue, Money::from_units(2500));
}

#[tokio::test]
async fn test_reset_counters() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());
    terminal.add_to_cart(ProductId::new(1), 1).await.unwrap();
    terminal.checkout(Some(PaymentMethod::Cash)).await.unwrap();

    terminal.reset_counters();

    assert_eq!(terminal.counters().sale_count, 0);
    assert!(backend.requests_to("daily-closing/process").is_empty());
}
