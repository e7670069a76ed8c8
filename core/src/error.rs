use thiserror::Error;

/// Errors raised by query validation.
///
/// Unknown nodes are never errors: they behave as degree-0 nodes. Only
/// malformed query parameters are rejected, and always before any
/// walking or searching starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject a zero-valued length parameter.
pub(crate) fn check_positive(value: usize, name: &'static str) -> Result<usize> {
    if value == 0 {
        return Err(Error::InvalidArgument {
            name,
            reason: "must be at least 1, got 0".to_string(),
        });
    }
    Ok(value)
}
