//! Catalog browsing.

use tillpoint_terminal::{Terminal, TerminalError};

use super::output;

/// Fetch the catalog and list products matching `search` in `category`.
///
/// # Errors
///
/// Returns error if the catalog cannot be fetched.
pub async fn products(
    terminal: &mut Terminal,
    search: &str,
    category: Option<&str>,
) -> Result<(), TerminalError> {
    terminal.refresh_catalog("").await?;

    let matches = terminal.catalog().filter(search, category);
    tracing::debug!(
        total = terminal.catalog().len(),
        shown = matches.len(),
        "Catalog filtered"
    );
    output::products(&matches, terminal.cart());
    Ok(())
}

/// List the catalog's categories.
///
/// # Errors
///
/// Returns error if the catalog cannot be fetched.
pub async fn categories(terminal: &mut Terminal) -> Result<(), TerminalError> {
    let categories = terminal.refresh_catalog("").await?.categories();
    output::lines(&categories);
    Ok(())
}
