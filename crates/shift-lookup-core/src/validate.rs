//! Identifier validation.
//!
//! A searchable term is exactly [`TERM_LENGTH`] ASCII digits. Anything else
//! is rejected locally and never reaches the remote store.

use thiserror::Error;

/// Required number of digits in a search term.
pub const TERM_LENGTH: usize = 9;

/// Why a term was rejected. The `Display` text is the inline message shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Vui lòng nhập số cần tra cứu.")]
    Empty,
    #[error("Chỉ được nhập các chữ số.")]
    NonDigit,
    #[error("Vui lòng nhập đúng 9 chữ số.")]
    WrongLength { len: usize },
}

/// Check `term` for emptiness, then for non-digit characters, then length.
pub fn validate_term(term: &str) -> Result<(), ValidationError> {
    if term.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !term.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NonDigit);
    }
    let len = term.chars().count();
    if len != TERM_LENGTH {
        return Err(ValidationError::WrongLength { len });
    }
    Ok(())
}
