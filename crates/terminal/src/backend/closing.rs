//! Daily closing endpoints.

use tracing::{info, instrument};

use super::types::{ClosingOutcome, ClosingResponse, ClosingStatus};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// Backend view of today's trading day.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn closing_status(&self) -> Result<ClosingStatus, BackendError> {
        let url = self.endpoint("daily-closing/status")?;
        let response = self.inner.client.get(url).send().await?;
        Self::read_json(response, "closing status").await
    }

    /// Close today's trading day.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` if the backend refuses the closing,
    /// or any transport and parse error.
    #[instrument(skip(self))]
    pub async fn process_closing(&self) -> Result<ClosingOutcome, BackendError> {
        let url = self.endpoint("daily-closing/process")?;
        let response = self.inner.client.post(url).send().await?;
        let body: ClosingResponse = Self::read_json(response, "closing").await?;

        let outcome = ClosingOutcome::try_from(body)?;
        if let Some(summary) = &outcome.summary {
            info!(
                date = %summary.date,
                total_sales = %summary.total_sales,
                transactions = summary.transaction_count,
                "Daily closing processed"
            );
        }
        Ok(outcome)
    }
}
