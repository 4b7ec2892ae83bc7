//! Product catalog endpoint.

use tracing::{debug, instrument};

use tillpoint_core::Product;

use super::{BackendClient, BackendError};

impl BackendClient {
    /// Fetch products matching `query` (empty for all).
    ///
    /// Results are cached per query until the TTL expires or
    /// [`invalidate_products`](Self::invalidate_products) is called.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, query: &str) -> Result<Vec<Product>, BackendError> {
        let key = query.trim().to_string();
        if let Some(products) = self.inner.products.get(&key).await {
            debug!(count = products.len(), "Product list served from cache");
            return Ok(products);
        }

        let mut url = self.endpoint("products")?;
        url.query_pairs_mut().append_pair("query", &key);

        let response = self.inner.client.get(url).send().await?;
        let products: Vec<Product> = Self::read_json(response, "products").await?;
        debug!(count = products.len(), "Product list fetched");

        self.inner.products.insert(key, products.clone()).await;
        Ok(products)
    }

    /// Drop every cached product list.
    pub fn invalidate_products(&self) {
        self.inner.products.invalidate_all();
    }
}
