//! Integration tests for Tillpoint.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tillpoint-integration-tests
//! ```
//!
//! Every test starts its own [`MockBackend`], an in-process axum server on
//! an ephemeral port that speaks the sales backend's JSON API and records
//! every request it receives.
//!
//! # Test Categories
//!
//! - `catalog` - product fetching, query parameters, caching
//! - `checkout` - sales, donations, failures, duplicate submissions
//! - `closing` - daily closing and counters
//! - `persistence` - state surviving a terminal restart

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use tillpoint_terminal::Terminal;
use tillpoint_terminal::config::TerminalConfig;

/// Product as the mock backend stores and serves it.
#[derive(Debug, Clone, Serialize)]
pub struct MockProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub category: String,
}

impl MockProduct {
    #[must_use]
    pub fn new(id: i64, name: &str, price: f64, stock: u32, category: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            stock,
            category: category.to_string(),
        }
    }
}

/// How `POST /sales` answers.
#[derive(Debug, Clone, Default)]
pub enum SaleMode {
    /// Confirm the sale and decrement stock.
    #[default]
    Accept,
    /// Confirm after a delay.
    Slow(Duration),
    /// `200 {"success": false, "error": ...}`.
    Reject(String),
    /// `500 {"error": "Internal server error"}`.
    ServerError,
    /// `200 {"success": true}` with no sale data.
    Malformed,
}

/// One request received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: &'static str,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    products: Mutex<Vec<MockProduct>>,
    sale_mode: Mutex<SaleMode>,
    requests: Mutex<Vec<RecordedRequest>>,
    next_sale_id: AtomicI64,
    sales_total: Mutex<f64>,
    sales_count: AtomicI64,
    closed: Mutex<bool>,
}

impl MockState {
    fn record(
        &self,
        method: &'static str,
        path: &'static str,
        query: HashMap<String, String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            query,
            headers,
            body,
        });
    }
}

/// In-process sales backend.
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend serving `products`.
    pub async fn start(products: Vec<MockProduct>) -> Self {
        let state = Arc::new(MockState {
            products: Mutex::new(products),
            next_sale_id: AtomicI64::new(1),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/sales", post(create_sale))
            .route("/api/daily-closing/status", get(closing_status))
            .route("/api/daily-closing/process", post(process_closing))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            server,
        }
    }

    /// Terminal configuration pointing at this backend.
    #[must_use]
    pub fn config(&self, data_dir: &Path, token: Option<&str>) -> TerminalConfig {
        let data_dir = data_dir.display().to_string();
        TerminalConfig::from_source(|key| match key {
            "TILLPOINT_BACKEND_URL" => Some(self.base_url.clone()),
            "TILLPOINT_DATA_DIR" => Some(data_dir.clone()),
            "TILLPOINT_API_TOKEN" => token.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    /// Open a file-backed terminal in `data_dir`.
    #[must_use]
    pub fn terminal(&self, data_dir: &Path) -> Terminal {
        Terminal::open(self.config(data_dir, None)).unwrap()
    }

    pub fn set_sale_mode(&self, mode: SaleMode) {
        *self.state.sale_mode.lock().unwrap() = mode;
    }

    pub fn set_stock(&self, id: i64, stock: u32) {
        let mut products = self.state.products.lock().unwrap();
        if let Some(product) = products.iter_mut().find(|p| p.id == id) {
            product.stock = stock;
        }
    }

    #[must_use]
    pub fn stock_of(&self, id: i64) -> Option<u32> {
        self.state
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests received for `path` (relative to `/api`).
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Catalog used by most tests.
#[must_use]
pub fn bakery() -> Vec<MockProduct> {
    vec![
        MockProduct::new(1, "Pan Rollo", 2500.0, 3, "Bakery"),
        MockProduct::new(2, "Cafe con Leche", 4000.0, 10, "Drinks"),
        MockProduct::new(3, "Pan de Queso", 1500.0, 20, "Bakery"),
        MockProduct::new(4, "Torta de Chocolate", 45000.0, 0, "Cakes"),
    ]
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_products(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<MockProduct>> {
    let needle = query.get("query").cloned().unwrap_or_default().to_lowercase();
    state.record("GET", "products", query, &headers, None);

    let products = state.products.lock().unwrap();
    Json(
        products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

async fn create_sale(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("POST", "sales", HashMap::new(), &headers, Some(body.clone()));

    let mode = state.sale_mode.lock().unwrap().clone();
    match mode {
        SaleMode::Accept => accept_sale(&state, &body),
        SaleMode::Slow(delay) => {
            tokio::time::sleep(delay).await;
            accept_sale(&state, &body)
        }
        SaleMode::Reject(error) => (
            StatusCode::OK,
            Json(json!({ "success": false, "error": error })),
        ),
        SaleMode::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        ),
        SaleMode::Malformed => (StatusCode::OK, Json(json!({ "success": true }))),
    }
}

fn accept_sale(state: &MockState, body: &Value) -> (StatusCode, Json<Value>) {
    let is_donation = body["isDonation"].as_bool().unwrap_or(false);
    let mut total = 0.0;
    {
        let mut products = state.products.lock().unwrap();
        for line in body["cart"].as_array().into_iter().flatten() {
            let id = line["productId"].as_i64().unwrap_or_default();
            let quantity = u32::try_from(line["quantity"].as_u64().unwrap_or_default()).unwrap();
            total += line["price"].as_f64().unwrap_or_default() * f64::from(quantity);
            if let Some(product) = products.iter_mut().find(|p| p.id == id) {
                product.stock = product.stock.saturating_sub(quantity);
            }
        }
    }
    if is_donation {
        total = 0.0;
    }

    let sale_id = state.next_sale_id.fetch_add(1, Ordering::SeqCst);
    state.sales_count.fetch_add(1, Ordering::SeqCst);
    *state.sales_total.lock().unwrap() += total;

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "saleId": sale_id,
            "invoiceId": sale_id + 1000,
            "invoiceNumber": format!("POS{sale_id:06}"),
            "total": total,
            "documentType": "POS",
            "message": "Receipt generated",
            "isDonation": is_donation,
            "reason": body.get("reason"),
        })),
    )
}

async fn closing_status(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Json<Value> {
    state.record("GET", "daily-closing/status", HashMap::new(), &headers, None);
    Json(json!({
        "date": chrono::Local::now().date_naive(),
        "dayActive": true,
        "totalSales": *state.sales_total.lock().unwrap(),
        "transactionCount": state.sales_count.load(Ordering::SeqCst),
        "closed": *state.closed.lock().unwrap(),
    }))
}

async fn process_closing(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Json<Value> {
    state.record("POST", "daily-closing/process", HashMap::new(), &headers, None);

    let mut closed = state.closed.lock().unwrap();
    if *closed {
        return Json(json!({ "success": false, "error": "The day is already closed" }));
    }
    *closed = true;
    Json(json!({
        "success": true,
        "message": "Daily closing processed",
        "closing": {
            "date": chrono::Local::now().date_naive(),
            "totalSales": *state.sales_total.lock().unwrap(),
            "transactionCount": state.sales_count.load(Ordering::SeqCst),
        },
    }))
}
