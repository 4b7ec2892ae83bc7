//! Checkout.

use tillpoint_core::PaymentMethod;
use tillpoint_terminal::backend::SaleError;
use tillpoint_terminal::{CompletedSale, Terminal, TerminalError};

use super::output;

/// Sell the cart and print the receipt.
///
/// # Errors
///
/// Returns error if the sale is not confirmed. The cart is kept in that case.
pub async fn sell(
    terminal: &mut Terminal,
    payment_method: Option<PaymentMethod>,
) -> Result<(), TerminalError> {
    let sale = terminal.checkout(payment_method).await.inspect_err(report)?;
    print_receipt(terminal, &sale)
}

/// Donate the cart and print the receipt.
///
/// # Errors
///
/// Returns error if the donation is not confirmed.
pub async fn donate(terminal: &mut Terminal, reason: &str) -> Result<(), TerminalError> {
    let sale = terminal.donate(reason).await.inspect_err(report)?;
    print_receipt(terminal, &sale)
}

fn report(error: &SaleError) {
    if let SaleError::StaleStock(conflicts) = error {
        for conflict in conflicts {
            output::message(&format!("  {conflict}"));
        }
        output::message("Adjust the cart and try again.");
    }
}

fn print_receipt(terminal: &Terminal, sale: &CompletedSale) -> Result<(), TerminalError> {
    let receipt = terminal.render_receipt(sale)?;
    output::text(&receipt);
    if let Some(message) = &sale.confirmation.message {
        output::message(message);
    }
    Ok(())
}
