//! Receipt settings.

use tillpoint_terminal::{Terminal, TerminalError};

use super::output;

/// Settings to overwrite; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct Changes {
    pub company_name: Option<String>,
    pub message: Option<String>,
    pub logo_url: Option<String>,
    pub show_qr: Option<bool>,
    pub qr_text: Option<String>,
}

pub fn show(terminal: &Terminal) {
    output::receipt_config(&terminal.receipt_config());
}

/// Apply `changes` to the stored settings.
///
/// Empty strings clear the optional fields.
///
/// # Errors
///
/// Returns error if the settings cannot be written.
pub fn set(terminal: &Terminal, changes: Changes) -> Result<(), TerminalError> {
    let mut config = terminal.receipt_config();
    if let Some(company_name) = changes.company_name {
        config.company_name = company_name;
    }
    if let Some(message) = changes.message {
        config.message = message;
    }
    if let Some(logo_url) = changes.logo_url {
        config.logo_url = Some(logo_url).filter(|u| !u.trim().is_empty());
    }
    if let Some(show_qr) = changes.show_qr {
        config.show_qr = show_qr;
    }
    if let Some(qr_text) = changes.qr_text {
        config.qr_text = Some(qr_text).filter(|t| !t.trim().is_empty());
    }

    terminal.set_receipt_config(&config)?;
    output::receipt_config(&config);
    Ok(())
}
