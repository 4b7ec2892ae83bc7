//! In-session product catalog.
//!
//! Holds the product list last fetched from the backend. The list is
//! replaced wholesale on every refresh; the only local change is the stock
//! decrement applied after a sale when a refresh is not possible.

use tillpoint_core::{CartLine, Product, ProductId};

/// Pseudo-category that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Cached product list with text and category filtering.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Replace the whole product list.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.products.len()
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products whose name contains `text` (case-insensitive) in `category`.
    ///
    /// A `None` category, an empty one, or [`ALL_CATEGORIES`] matches every
    /// category.
    #[must_use]
    pub fn filter(&self, text: &str, category: Option<&str>) -> Vec<&Product> {
        let needle = text.trim().to_lowercase();
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

        self.products
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .filter(|p| category.is_none_or(|c| p.category == c))
            .collect()
    }

    /// Distinct categories in first-seen order, led by [`ALL_CATEGORIES`].
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        categories
    }

    /// Decrement local stock for units just sold.
    pub fn apply_sale(&mut self, lines: &[CartLine]) {
        for line in lines {
            if let Some(product) = self.products.iter_mut().find(|p| p.id == line.product_id) {
                product.stock = product.stock.saturating_sub(line.quantity);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use tillpoint_core::{Cart, Money};

    use super::*;

    fn product(id: i64, name: &str, category: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Money::from_units(1000),
            stock,
            category: category.to_string(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product(1, "Pan Rollo", "Bakery", 10),
            product(2, "Cafe con Leche", "Drinks", 5),
            product(3, "Pan de Queso", "Bakery", 4),
            product(10_001, "Gaseosa", "Drinks", 24),
        ])
    }

    #[test]
    fn test_find() {
        let catalog = catalog();
        assert_eq!(catalog.find(ProductId::new(3)).unwrap().name, "Pan de Queso");
        assert!(catalog.find(ProductId::new(99)).is_none());
    }

    #[test]
    fn test_filter_by_text_is_case_insensitive() {
        let catalog = catalog();
        let names: Vec<_> = catalog
            .filter("PAN", None)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Pan Rollo", "Pan de Queso"]);
    }

    #[test]
    fn test_filter_by_category() {
        let catalog = catalog();
        assert_eq!(catalog.filter("", Some("Drinks")).len(), 2);
        assert_eq!(catalog.filter("", Some(ALL_CATEGORIES)).len(), 4);
        assert_eq!(catalog.filter("", Some("")).len(), 4);
        assert_eq!(catalog.filter("queso", Some("Bakery")).len(), 1);
        assert!(catalog.filter("queso", Some("Drinks")).is_empty());
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(catalog().categories(), ["All", "Bakery", "Drinks"]);
        assert_eq!(Catalog::default().categories(), ["All"]);
    }

    #[test]
    fn test_apply_sale_decrements_stock() {
        let mut catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(&catalog.products()[0], 4).unwrap();
        cart.add_item(&catalog.products()[2], 4).unwrap();

        catalog.apply_sale(cart.lines());

        assert_eq!(catalog.find(ProductId::new(1)).unwrap().stock, 6);
        assert_eq!(catalog.find(ProductId::new(3)).unwrap().stock, 0);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut catalog = catalog();
        catalog.replace(vec![product(7, "Torta", "Cakes", 1)]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find(ProductId::new(1)).is_none());
    }
}
