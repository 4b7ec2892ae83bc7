//! Terminal output. Results go to stdout, notices and errors to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use tillpoint_core::{Cart, Product};
use tillpoint_terminal::backend::{ClosingOutcome, ClosingStatus};
use tillpoint_terminal::counters::DailyCounters;
use tillpoint_terminal::receipt::ReceiptConfig;

pub fn message(text: &str) {
    eprintln!("{text}");
}

pub fn failure(error: &dyn std::error::Error) {
    eprintln!("error: {error}");
}

pub fn text(text: &str) {
    println!("{text}");
}

pub fn lines(items: &[String]) {
    for item in items {
        println!("{item}");
    }
}

/// Product table. Units already in the cart are shown next to stock.
pub fn products(products: &[&Product], cart: &Cart) {
    if products.is_empty() {
        message("No products found");
        return;
    }
    println!("{:>6}  {:<32} {:>12} {:>7}  CATEGORY", "ID", "NAME", "PRICE", "STOCK");
    for product in products {
        let in_cart = cart.quantity_of(product.id);
        let stock = if product.in_stock() {
            product.stock.to_string()
        } else {
            "out".to_string()
        };
        let marker = if in_cart > 0 {
            format!(" ({in_cart} in cart)")
        } else {
            String::new()
        };
        println!(
            "{:>6}  {:<32} {:>12} {:>7}  {}{marker}",
            product.id.to_string(),
            product.name,
            product.price.to_string(),
            stock,
            product.category
        );
    }
}

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for (number, line) in (1..).zip(cart) {
        println!(
            "{number:>3}. {:<32} {:>4} x {:>10} = {:>12}  (max {})",
            line.name,
            line.quantity,
            line.price.to_string(),
            line.subtotal().to_string(),
            line.stock_ceiling
        );
    }
    println!(
        "     {} items, {} lines. TOTAL {}",
        cart.item_count(),
        cart.line_count(),
        cart.total()
    );
}

pub fn counters(counters: &DailyCounters) {
    println!(
        "{}: {} sales, revenue {}",
        counters.date, counters.sale_count, counters.total_revenue
    );
}

pub fn closing_status(status: &ClosingStatus) {
    println!(
        "Backend {}: {} transactions, sales {}{}{}",
        status.date,
        status.transaction_count,
        status.total_sales,
        if status.day_active { ", day open" } else { "" },
        if status.closed { ", already closed" } else { "" },
    );
}

pub fn closing_outcome(outcome: &ClosingOutcome) {
    if let Some(summary) = &outcome.summary {
        println!(
            "Closed {}: {} transactions, sales {}",
            summary.date, summary.transaction_count, summary.total_sales
        );
    }
    if let Some(text) = &outcome.message {
        message(text);
    }
}

pub fn receipt_config(config: &ReceiptConfig) {
    println!("company_name: {}", config.company_name);
    println!("message:      {}", config.message);
    println!("logo_url:     {}", config.logo_url.as_deref().unwrap_or("-"));
    println!("show_qr:      {}", config.show_qr);
    println!("qr_text:      {}", config.qr_text.as_deref().unwrap_or("-"));
}
