//! Catalog products.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Money;

/// Category shown for products the backend sends without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A product as listed by the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(deserialize_with = "non_negative_price")]
    pub price: Money,
    /// Units currently available for sale.
    pub stock: u32,
    #[serde(default = "default_category", deserialize_with = "category_or_default")]
    pub category: String,
}

impl Product {
    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn category_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(default_category))
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let price = Money::deserialize(deserializer)?;
    if price.is_negative() {
        return Err(serde::de::Error::custom(format!(
            "price cannot be negative: {price}"
        )));
    }
    Ok(price)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_product() {
        let json = r#"{"id": 3, "name": "Pan Rollo", "price": 2500, "stock": 12, "category": "Bakery"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Money::from_units(2500));
        assert_eq!(product.stock, 12);
        assert_eq!(product.category, "Bakery");
    }

    #[test]
    fn test_missing_or_blank_category_falls_back() {
        let missing: Product =
            serde_json::from_str(r#"{"id": 1, "name": "A", "price": 1, "stock": 1}"#).unwrap();
        assert_eq!(missing.category, DEFAULT_CATEGORY);

        let null: Product = serde_json::from_str(
            r#"{"id": 1, "name": "A", "price": 1, "stock": 1, "category": null}"#,
        )
        .unwrap();
        assert_eq!(null.category, DEFAULT_CATEGORY);

        let blank: Product = serde_json::from_str(
            r#"{"id": 1, "name": "A", "price": 1, "stock": 1, "category": "  "}"#,
        )
        .unwrap();
        assert_eq!(blank.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let result: Result<Product, _> =
            serde_json::from_str(r#"{"id": 1, "name": "A", "price": 1, "stock": -4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let number: Result<Product, _> =
            serde_json::from_str(r#"{"id": 1, "name": "A", "price": -2500, "stock": 5}"#);
        assert!(number.is_err());

        let string: Result<Product, _> =
            serde_json::from_str(r#"{"id": 1, "name": "A", "price": "-0.01", "stock": 5}"#);
        assert!(string.is_err());
    }

    #[test]
    fn test_free_product_is_accepted() {
        let product: Product =
            serde_json::from_str(r#"{"id": 1, "name": "Sample", "price": 0, "stock": 5}"#)
                .unwrap();
        assert_eq!(product.price, Money::ZERO);
    }
}
