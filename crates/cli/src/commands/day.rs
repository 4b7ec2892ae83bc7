//! Daily counters and closing.

use tillpoint_terminal::{Terminal, TerminalError};

use super::output;

pub fn counters(terminal: &Terminal, reset: bool) {
    if reset {
        terminal.reset_counters();
        output::message("Counters reset");
    }
    output::counters(&terminal.counters());
}

/// Print the backend's closing status next to the local counters.
///
/// # Errors
///
/// Returns error if the backend cannot be reached.
pub async fn closing_status(terminal: &Terminal) -> Result<(), TerminalError> {
    let status = terminal.closing_status().await?;
    output::closing_status(&status);
    output::counters(&terminal.counters());
    Ok(())
}

/// Close the day.
///
/// # Errors
///
/// Returns error if the backend refuses the closing.
pub async fn close(terminal: &Terminal) -> Result<(), TerminalError> {
    let outcome = terminal.close_day().await?;
    output::closing_outcome(&outcome);
    Ok(())
}

/// Run the date-change watcher until interrupted.
///
/// # Errors
///
/// Returns error if the interrupt signal cannot be awaited.
pub async fn watch(terminal: &Terminal) -> Result<(), std::io::Error> {
    let handle = terminal.watch_rollover();
    tracing::info!(
        period_secs = terminal.config().rollover_check_interval.as_secs(),
        "Watching for date change, press Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await?;
    handle.abort();
    output::counters(&terminal.counters());
    Ok(())
}
