//! Receipt settings and plain-text receipt rendering.

use askama::Template;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::storage::{KeyValueStore, RECEIPT_CONFIG_KEY, StorageError, load_json, save_json};
use crate::terminal::CompletedSale;

/// Shop details printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptConfig {
    pub company_name: String,
    /// Footer line.
    pub message: String,
    pub logo_url: Option<String>,
    pub show_qr: bool,
    /// QR payload; falls back to the invoice number when empty.
    pub qr_text: Option<String>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            company_name: "Tillpoint".to_string(),
            message: "Thank you for your purchase!".to_string(),
            logo_url: None,
            show_qr: false,
            qr_text: None,
        }
    }
}

impl ReceiptConfig {
    /// Stored settings, or the defaults if none are stored or they are unreadable.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json(store, RECEIPT_CONFIG_KEY) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Stored receipt settings are unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Persist these settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, RECEIPT_CONFIG_KEY, self)
    }
}

struct ReceiptLine {
    name: String,
    quantity: u32,
    unit_price: String,
    subtotal: String,
}

#[derive(Template)]
#[template(path = "receipt.txt")]
struct ReceiptTemplate {
    company_name: String,
    document_label: String,
    invoice_number: String,
    printed_at: String,
    lines: Vec<ReceiptLine>,
    total: String,
    payment_method: String,
    donation_reason: String,
    receipt_link: String,
    qr_text: String,
    message: String,
}

/// Render a completed sale as a plain-text receipt.
///
/// # Errors
///
/// Returns `askama::Error` if the template fails to render.
pub fn render_receipt(
    config: &ReceiptConfig,
    sale: &CompletedSale,
    receipt_link: Option<&Url>,
    printed_at: NaiveDateTime,
) -> Result<String, askama::Error> {
    let confirmation = &sale.confirmation;
    let qr_text = if config.show_qr {
        config
            .qr_text
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| confirmation.invoice_number.clone())
    } else {
        String::new()
    };

    ReceiptTemplate {
        company_name: config.company_name.clone(),
        document_label: confirmation.document_type.to_string(),
        invoice_number: confirmation.invoice_number.clone(),
        printed_at: printed_at.format("%Y-%m-%d %H:%M").to_string(),
        lines: sale
            .lines
            .iter()
            .map(|line| ReceiptLine {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.price.to_string(),
                subtotal: line.subtotal().to_string(),
            })
            .collect(),
        total: confirmation.total.to_string(),
        payment_method: sale.payment_method.to_string(),
        donation_reason: sale.donation_reason.clone().unwrap_or_default(),
        receipt_link: receipt_link.map(Url::to_string).unwrap_or_default(),
        qr_text,
        message: config.message.clone(),
    }
    .render()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use tillpoint_core::{Cart, Money, PaymentMethod, Product, ProductId, SaleId};

    use super::*;
    use crate::backend::{DocumentType, SaleConfirmation};
    use crate::storage::MemoryStore;

    fn sale(donation_reason: Option<&str>) -> CompletedSale {
        let mut cart = Cart::new();
        cart.add_item(
            &Product {
                id: ProductId::new(1),
                name: "Pan Rollo".to_string(),
                price: Money::from_units(2500),
                stock: 10,
                category: "Bakery".to_string(),
            },
            3,
        )
        .unwrap();

        CompletedSale {
            confirmation: SaleConfirmation {
                sale_id: SaleId::new(81),
                invoice_id: None,
                invoice_number: "POS000081".to_string(),
                total: Money::from_units(7500),
                document_type: DocumentType::Pos,
                message: None,
                is_donation: donation_reason.is_some(),
                reason: donation_reason.map(str::to_string),
            },
            lines: cart.lines().to_vec(),
            payment_method: PaymentMethod::Cash,
            donation_reason: donation_reason.map(str::to_string),
        }
    }

    fn printed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_config_defaults_when_missing_or_malformed() {
        let store = MemoryStore::new();
        assert_eq!(ReceiptConfig::load(&store), ReceiptConfig::default());

        store.set(RECEIPT_CONFIG_KEY, "not json").unwrap();
        assert_eq!(ReceiptConfig::load(&store), ReceiptConfig::default());
    }

    #[test]
    fn test_config_roundtrip_and_partial_documents() {
        let store = MemoryStore::new();
        let config = ReceiptConfig {
            company_name: "Panaderia Central".to_string(),
            show_qr: true,
            ..ReceiptConfig::default()
        };
        config.save(&store).unwrap();
        assert_eq!(ReceiptConfig::load(&store), config);

        store
            .set(RECEIPT_CONFIG_KEY, r#"{"companyName": "Corner Shop"}"#)
            .unwrap();
        let partial = ReceiptConfig::load(&store);
        assert_eq!(partial.company_name, "Corner Shop");
        assert_eq!(partial.message, ReceiptConfig::default().message);
    }

    #[test]
    fn test_render_sale_receipt() {
        let text =
            render_receipt(&ReceiptConfig::default(), &sale(None), None, printed_at()).unwrap();

        assert!(text.starts_with("Tillpoint\n"));
        assert!(text.contains("POS receipt POS000081"));
        assert!(text.contains("2025-11-17 09:30"));
        assert!(text.contains("3 x Pan Rollo @ $2500.00  $7500.00"));
        assert!(text.contains("TOTAL $7500.00"));
        assert!(text.contains("Payment: cash"));
        assert!(!text.contains("Donation"));
        assert!(!text.contains("[QR]"));
        assert!(text.contains("Thank you for your purchase!"));
    }

    #[test]
    fn test_render_donation_with_qr_and_link() {
        let config = ReceiptConfig {
            show_qr: true,
            ..ReceiptConfig::default()
        };
        let link = Url::parse("http://pos.local/invoices/80/print").unwrap();

        let text = render_receipt(
            &config,
            &sale(Some("Food bank")),
            Some(&link),
            printed_at(),
        )
        .unwrap();

        assert!(text.contains("Donation: Food bank"));
        assert!(text.contains("[QR] POS000081"));
        assert!(text.contains("http://pos.local/invoices/80/print"));
    }
}
