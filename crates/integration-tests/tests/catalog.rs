//! Integration tests for catalog fetching and caching.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use tillpoint_core::{Money, PaymentMethod, ProductId};
use tillpoint_integration_tests::{MockBackend, MockProduct, bakery};
use tillpoint_terminal::backend::{BackendClient, BackendError};
use tillpoint_terminal::catalog::ALL_CATEGORIES;

#[tokio::test]
async fn test_fetch_products_sends_query_parameter() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = BackendClient::new(&backend.config(dir.path(), None).backend).unwrap();

    let products = client.fetch_products("pan de").await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new(3));
    assert_eq!(products[0].price, Money::from_units(1500));

    let requests = backend.requests_to("products");
    assert_eq!(requests[0].query.get("query").map(String::as_str), Some("pan de"));
}

#[tokio::test]
async fn test_products_are_cached_per_query() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let client = BackendClient::new(&backend.config(dir.path(), None).backend).unwrap();

    client.fetch_products("").await.unwrap();
    client.fetch_products("").await.unwrap();
    client.fetch_products("pan").await.unwrap();
    assert_eq!(backend.requests_to("products").len(), 2);

    client.invalidate_products();
    client.fetch_products("").await.unwrap();
    assert_eq!(backend.requests_to("products").len(), 3);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = backend.config(dir.path(), Some("till-7-secret"));
    let client = BackendClient::new(&config.backend).unwrap();

    client.fetch_products("").await.unwrap();

    let request = &backend.requests_to("products")[0];
    assert_eq!(
        request.headers.get("authorization").map(String::as_str),
        Some("Bearer till-7-secret")
    );
}

#[tokio::test]
async fn test_terminal_catalog_filters_and_categories() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    let catalog = terminal.refresh_catalog("").await.unwrap();

    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.categories(), [ALL_CATEGORIES, "Bakery", "Drinks", "Cakes"]);
    assert_eq!(catalog.filter("pan", Some("Bakery")).len(), 2);
    assert_eq!(catalog.filter("", Some("Cakes")).len(), 1);
}

#[tokio::test]
async fn test_missing_category_defaults() {
    let backend = MockBackend::start(vec![MockProduct::new(9, "Agua", 1200.0, 6, "  ")]).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    let catalog = terminal.refresh_catalog("").await.unwrap();
    assert_eq!(catalog.products()[0].category, tillpoint_core::DEFAULT_CATEGORY);
}

#[tokio::test]
async fn test_out_of_stock_product_cannot_be_added() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    let err = terminal.add_to_cart(ProductId::new(4), 1).await.unwrap_err();

    assert!(err.to_string().contains("no stock available"));
    assert!(terminal.cart().is_empty());
}

#[tokio::test]
async fn test_cache_invalidated_after_sale() {
    let backend = MockBackend::start(bakery()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = backend.terminal(dir.path());

    terminal.add_to_cart(ProductId::new(2), 4).await.unwrap();
    terminal.checkout(Some(PaymentMethod::Cash)).await.unwrap();

    assert_eq!(backend.stock_of(2), Some(6));
    assert_eq!(terminal.catalog().find(ProductId::new(2)).unwrap().stock, 6);
}

#[tokio::test]
async fn test_catalog_refresh_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::start(bakery()).await;
    let mut config = backend.config(dir.path(), None);
    config.backend.base_url = config.backend.base_url.join("missing/").unwrap();
    let mut terminal = tillpoint_terminal::Terminal::open(config).unwrap();

    let err = terminal.refresh_catalog("").await.unwrap_err();

    assert!(matches!(err, BackendError::Api { status: 404, .. }));
    assert!(terminal.catalog().is_empty());
}
