//! Sale and donation submission.
//!
//! Validation runs before any network activity. Only one submission may be
//! in flight per client; a concurrent attempt fails fast instead of racing
//! the first one into a duplicate sale.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tillpoint_core::{Cart, PaymentMethod, StockConflict};

use super::types::{SaleConfirmation, SaleLineRequest, SaleRequest, SaleResponse};
use super::{BackendClient, BackendError};

/// Errors from submitting a sale or donation.
#[derive(Debug, Error)]
pub enum SaleError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("No payment method selected")]
    MissingPaymentMethod,

    #[error("A donation needs a reason")]
    MissingReason,

    /// Another submission from this terminal has not finished yet.
    #[error("A sale is already being submitted")]
    SubmissionInFlight,

    /// Cart quantities exceed the stock the backend currently reports.
    #[error("Stock changed for: {}", join_conflicts(.0))]
    StaleStock(Vec<StockConflict>),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

fn join_conflicts(conflicts: &[StockConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Releases the in-flight flag when the submission ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Result<Self, SaleError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SaleError::SubmissionInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BackendClient {
    /// Submit the cart as a sale.
    ///
    /// The cart is never modified; clearing it after a confirmed sale is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// - `SaleError::EmptyCart` / `MissingPaymentMethod` before any request
    /// - `SaleError::SubmissionInFlight` if another submission is running
    /// - `SaleError::Backend` for transport, status, rejection or parse failures
    #[instrument(skip(self, cart), fields(lines = cart.line_count()))]
    pub async fn submit_sale(
        &self,
        cart: &Cart,
        payment_method: Option<PaymentMethod>,
    ) -> Result<SaleConfirmation, SaleError> {
        if cart.is_empty() {
            return Err(SaleError::EmptyCart);
        }
        let payment_method = payment_method.ok_or(SaleError::MissingPaymentMethod)?;

        self.submit(sale_request(cart, payment_method, None)).await
    }

    /// Submit the cart as a donation: paid "in cash", flagged, with a reason.
    ///
    /// # Errors
    ///
    /// Same as [`submit_sale`](Self::submit_sale), with
    /// `SaleError::MissingReason` for a blank reason.
    #[instrument(skip(self, cart), fields(lines = cart.line_count()))]
    pub async fn submit_donation(
        &self,
        cart: &Cart,
        reason: &str,
    ) -> Result<SaleConfirmation, SaleError> {
        if cart.is_empty() {
            return Err(SaleError::EmptyCart);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SaleError::MissingReason);
        }

        self.submit(sale_request(cart, PaymentMethod::Cash, Some(reason.to_string())))
            .await
    }

    async fn submit(&self, request: SaleRequest) -> Result<SaleConfirmation, SaleError> {
        let _guard = InFlightGuard::claim(&self.inner.in_flight)?;

        let url = self.endpoint("sales").map_err(SaleError::from)?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Idempotency-Key", request.submission_id.to_string())
            .json(&request)
            .send()
            .await
            .map_err(BackendError::from)?;

        let body: SaleResponse = Self::read_json(response, "sale").await?;
        match SaleConfirmation::try_from(body) {
            Ok(confirmation) => {
                info!(
                    sale_id = %confirmation.sale_id,
                    invoice_number = %confirmation.invoice_number,
                    total = %confirmation.total,
                    "Sale confirmed"
                );
                Ok(confirmation)
            }
            Err(e) => {
                warn!(error = %e, "Sale not confirmed");
                Err(e.into())
            }
        }
    }

    /// Whether a submission is currently in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }
}

fn sale_request(cart: &Cart, payment_method: PaymentMethod, reason: Option<String>) -> SaleRequest {
    SaleRequest {
        cart: cart.lines().iter().map(SaleLineRequest::from).collect(),
        payment_method,
        is_donation: reason.is_some(),
        reason,
        submission_id: Uuid::new_v4(),
    }
}
