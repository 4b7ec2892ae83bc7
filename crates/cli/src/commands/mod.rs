//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod day;
pub mod output;
pub mod receipt;
pub mod sale;

use thiserror::Error;

/// Errors from cashier input the library never sees.
#[derive(Debug, Error)]
pub enum InputError {
    /// Line numbers shown to the cashier start at 1.
    #[error("no line {line} in the cart (cart has {len} lines)")]
    NoSuchLine { line: usize, len: usize },
}

/// Convert a 1-based line number to a cart index.
fn line_index(line: usize, len: usize) -> Result<usize, InputError> {
    match line.checked_sub(1) {
        Some(index) if index < len => Ok(index),
        _ => Err(InputError::NoSuchLine { line, len }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        assert_eq!(line_index(1, 3).ok(), Some(0));
        assert_eq!(line_index(3, 3).ok(), Some(2));
        assert!(line_index(0, 3).is_err());
        assert!(line_index(4, 3).is_err());
        assert!(line_index(1, 0).is_err());
    }
}
