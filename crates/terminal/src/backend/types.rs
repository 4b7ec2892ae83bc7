//! Request and response schemas for the sales backend.
//!
//! Responses are deserialized into lenient wire structs and then validated
//! into the strict types the rest of the terminal uses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tillpoint_core::{CartLine, InvoiceId, Money, PaymentMethod, ProductId, SaleId};

use super::BackendError;

// =============================================================================
// Sales
// =============================================================================

/// One cart line as sent to `POST /sales`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&CartLine> for SaleLineRequest {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            price: line.price.amount(),
            quantity: line.quantity,
        }
    }
}

/// Body of `POST /sales`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub cart: Vec<SaleLineRequest>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_donation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Per-attempt key, also sent as the `Idempotency-Key` header.
    pub submission_id: Uuid,
}

/// Kind of fiscal document the backend issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Point-of-sale receipt.
    #[default]
    Pos,
    /// Electronic invoice.
    Electronic,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pos => write!(f, "POS receipt"),
            Self::Electronic => write!(f, "Electronic invoice"),
            Self::Other => write!(f, "Document"),
        }
    }
}

/// Raw body returned by `POST /sales`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    #[serde(default)]
    pub success: bool,
    pub sale_id: Option<SaleId>,
    pub invoice_id: Option<InvoiceId>,
    pub invoice_number: Option<String>,
    pub total: Option<Money>,
    pub document_type: Option<DocumentType>,
    pub message: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub is_donation: bool,
    pub reason: Option<String>,
}

/// A sale the backend confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleConfirmation {
    pub sale_id: SaleId,
    pub invoice_id: Option<InvoiceId>,
    pub invoice_number: String,
    pub total: Money,
    pub document_type: DocumentType,
    pub message: Option<String>,
    pub is_donation: bool,
    pub reason: Option<String>,
}

impl TryFrom<SaleResponse> for SaleConfirmation {
    type Error = BackendError;

    fn try_from(response: SaleResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(BackendError::Rejected(
                response
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "sale was not accepted".to_string()),
            ));
        }

        let sale_id = response
            .sale_id
            .ok_or_else(|| BackendError::Malformed("missing saleId".to_string()))?;
        let invoice_number = response
            .invoice_number
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| BackendError::Malformed("missing invoiceNumber".to_string()))?;
        let total = response
            .total
            .ok_or_else(|| BackendError::Malformed("missing total".to_string()))?;
        if total.is_negative() {
            return Err(BackendError::Malformed(format!("negative total {total}")));
        }

        Ok(Self {
            sale_id,
            invoice_id: response.invoice_id,
            invoice_number,
            total,
            document_type: response.document_type.unwrap_or_default(),
            message: response.message,
            is_donation: response.is_donation,
            reason: response.reason,
        })
    }
}

// =============================================================================
// Daily closing
// =============================================================================

/// Body of `GET /daily-closing/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingStatus {
    pub date: NaiveDate,
    #[serde(default)]
    pub day_active: bool,
    pub total_sales: Money,
    pub transaction_count: u64,
    /// Whether today's closing was already processed.
    #[serde(default)]
    pub closed: bool,
}

/// Totals recorded by a processed closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingSummary {
    pub date: NaiveDate,
    pub total_sales: Money,
    pub transaction_count: u64,
}

/// Raw body returned by `POST /daily-closing/process`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub closing: Option<ClosingSummary>,
    pub error: Option<String>,
}

/// A closing the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingOutcome {
    pub message: Option<String>,
    pub summary: Option<ClosingSummary>,
}

impl TryFrom<ClosingResponse> for ClosingOutcome {
    type Error = BackendError;

    fn try_from(response: ClosingResponse) -> Result<Self, Self::Error> {
        if !response.success {
            return Err(BackendError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "closing was not accepted".to_string()),
            ));
        }
        Ok(Self {
            message: response.message,
            summary: response.closing,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn accepted() -> SaleResponse {
        SaleResponse {
            success: true,
            sale_id: Some(SaleId::new(81)),
            invoice_id: Some(InvoiceId::new(80)),
            invoice_number: Some("POS000081".to_string()),
            total: Some(Money::from_units(15_000)),
            document_type: Some(DocumentType::Pos),
            ..SaleResponse::default()
        }
    }

    #[test]
    fn test_sale_request_wire_shape() {
        let request = SaleRequest {
            cart: vec![SaleLineRequest {
                product_id: ProductId::new(3),
                name: "Pan Rollo".to_string(),
                price: Decimal::new(250_050, 2),
                quantity: 2,
            }],
            payment_method: PaymentMethod::Card,
            is_donation: false,
            reason: None,
            submission_id: Uuid::nil(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["paymentMethod"], "card");
        assert_eq!(json["cart"][0]["productId"], 3);
        assert_eq!(json["cart"][0]["price"], 2500.5);
        assert_eq!(json["cart"][0]["quantity"], 2);
        assert!(json.get("isDonation").is_none());
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_donation_request_flags() {
        let request = SaleRequest {
            cart: vec![],
            payment_method: PaymentMethod::Cash,
            is_donation: true,
            reason: Some("Food bank".to_string()),
            submission_id: Uuid::nil(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["isDonation"], true);
        assert_eq!(json["reason"], "Food bank");
    }

    #[test]
    fn test_sale_response_parses_backend_body() {
        let body = r#"{
            "success": true, "saleId": 12, "invoiceId": 11,
            "invoiceNumber": "POS000012", "total": 15000.0,
            "documentType": "POS", "message": "Receipt generated"
        }"#;
        let response: SaleResponse = serde_json::from_str(body).unwrap();
        let confirmation = SaleConfirmation::try_from(response).unwrap();

        assert_eq!(confirmation.sale_id, SaleId::new(12));
        assert_eq!(confirmation.invoice_number, "POS000012");
        assert_eq!(confirmation.total, Money::from_units(15_000));
        assert_eq!(confirmation.document_type, DocumentType::Pos);
    }

    #[test]
    fn test_unknown_document_type() {
        let response: SaleResponse =
            serde_json::from_str(r#"{"documentType": "CREDIT_NOTE"}"#).unwrap();
        assert_eq!(response.document_type, Some(DocumentType::Other));
    }

    #[test]
    fn test_rejected_sale() {
        let response = SaleResponse {
            success: false,
            error: Some("Insufficient stock: Pan Rollo".to_string()),
            ..SaleResponse::default()
        };
        let err = SaleConfirmation::try_from(response).unwrap_err();
        assert!(matches!(err, BackendError::Rejected(ref m) if m.contains("Pan Rollo")));

        let silent = SaleConfirmation::try_from(SaleResponse::default()).unwrap_err();
        assert!(matches!(silent, BackendError::Rejected(_)));
    }

    #[test]
    fn test_success_missing_fields_is_malformed() {
        let mut response = accepted();
        response.invoice_number = None;
        assert!(matches!(
            SaleConfirmation::try_from(response),
            Err(BackendError::Malformed(_))
        ));

        let mut response = accepted();
        response.sale_id = None;
        assert!(matches!(
            SaleConfirmation::try_from(response),
            Err(BackendError::Malformed(_))
        ));

        let mut response = accepted();
        response.total = Some(Money::from_units(-5));
        assert!(matches!(
            SaleConfirmation::try_from(response),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_document_type_defaults_to_pos() {
        let mut response = accepted();
        response.document_type = None;
        assert_eq!(
            SaleConfirmation::try_from(response).unwrap().document_type,
            DocumentType::Pos
        );
    }

    #[test]
    fn test_closing_response() {
        let body = r#"{"success": true, "message": "Day closed",
            "closing": {"date": "2025-11-17", "totalSales": 245000, "transactionCount": 31}}"#;
        let outcome = ClosingOutcome::try_from(
            serde_json::from_str::<ClosingResponse>(body).unwrap(),
        )
        .unwrap();
        assert_eq!(outcome.summary.unwrap().transaction_count, 31);

        let rejected = ClosingResponse {
            success: false,
            error: Some("No active day".to_string()),
            ..ClosingResponse::default()
        };
        assert!(matches!(
            ClosingOutcome::try_from(rejected),
            Err(BackendError::Rejected(_))
        ));
    }
}
