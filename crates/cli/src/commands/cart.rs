//! Cart commands. Every change is persisted by the terminal before returning.

use std::io::{BufRead, Write};

use tillpoint_core::{ProductId, QuantityChange};
use tillpoint_terminal::Terminal;

use super::{line_index, output};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub fn show(terminal: &Terminal) {
    output::cart(terminal.cart());
}

/// Add `quantity` units of a product.
///
/// # Errors
///
/// Returns error if the product is unknown or the stock is insufficient.
pub async fn add(terminal: &mut Terminal, product_id: ProductId, quantity: u32) -> CommandResult {
    let total = terminal.add_to_cart(product_id, quantity).await?;
    output::message(&format!("Product {product_id}: {total} in cart"));
    output::cart(terminal.cart());
    Ok(())
}

/// Change the quantity of a line by `delta`.
///
/// # Errors
///
/// Returns error if the line does not exist or the stock ceiling is reached.
pub fn change(terminal: &mut Terminal, line: usize, delta: i64) -> CommandResult {
    let index = line_index(line, terminal.cart().line_count())?;
    match terminal.change_quantity(index, delta)? {
        QuantityChange::Updated(quantity) => {
            output::message(&format!("Line {line}: quantity {quantity}"));
        }
        QuantityChange::Removed(removed) => {
            output::message(&format!("Removed {}", removed.name));
        }
    }
    output::cart(terminal.cart());
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns error if the line does not exist.
pub fn remove(terminal: &mut Terminal, line: usize) -> CommandResult {
    let index = line_index(line, terminal.cart().line_count())?;
    let removed = terminal.remove_item(index)?;
    output::message(&format!("Removed {}", removed.name));
    output::cart(terminal.cart());
    Ok(())
}

/// Empty the cart after confirmation.
///
/// # Errors
///
/// Returns error if the confirmation prompt cannot be read.
pub fn clear(terminal: &mut Terminal, yes: bool) -> CommandResult {
    if terminal.cart().is_empty() {
        output::message("Cart is already empty");
        return Ok(());
    }
    if !yes && !confirm(&format!("Clear {} lines from the cart?", terminal.cart().line_count()))? {
        output::message("Cart kept");
        return Ok(());
    }
    terminal.clear_cart();
    output::message("Cart cleared");
    Ok(())
}

fn confirm(question: &str) -> std::io::Result<bool> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{question} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
