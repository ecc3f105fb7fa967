//! Error taxonomy for engine operations.

use crate::generator::GenerationError;

/// Errors surfaced by the roadmap, schedule, review and task services.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The row does not exist or is not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// The request itself is invalid (blank title, illegal transition).
    #[error("invalid request: {0}")]
    Validation(String),

    /// The caller referenced rows outside its ownership.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The content generator produced no usable items.
    #[error("content generator returned no {0}")]
    GenerationEmpty(&'static str),

    /// The content generator failed or its output could not be parsed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The storage layer failed.
    #[error("persistence failure: {0:#}")]
    Persistence(anyhow::Error),
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err)
    }
}

/// Result alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Map an affected-row count to `NotFound` when nothing was touched.
pub(crate) fn expect_rows(rows: u64, what: impl FnOnce() -> String) -> CoreResult<()> {
    if rows == 0 {
        return Err(CoreError::NotFound(what()));
    }
    Ok(())
}

/// Trim `value` and reject it when empty.
pub(crate) fn require_text<'a>(value: &'a str, field: &str) -> CoreResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}
