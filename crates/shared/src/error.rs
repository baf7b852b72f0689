//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every ledger operation runs inside one database transaction; any of
/// these aborts the whole unit of work and is surfaced to the caller for
/// display. None are retried automatically.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed required fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity absent, or owned by another dealer.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Gunny capacity conflicts with the value fixed by the first purchase.
    #[error("Gunny capacity mismatch: {0}")]
    ConfigurationMismatch(String),

    /// Sale quantity exceeds stock on hand.
    #[error("Not enough stock: {0}")]
    InsufficientStock(String),

    /// Payment or settlement amount exceeds the selected pending total.
    #[error("Paid amount exceeds total pending: {0}")]
    Overpayment(String),

    /// Delete blocked because a payment has already been applied.
    #[error("Payment already started: {0}")]
    PaymentAlreadyStarted(String),

    /// A reversal already exists for this payment or settlement.
    #[error("Already reversed: {0}")]
    AlreadyReversed(String),

    /// The payment was consumed by a settlement; settlements are terminal.
    #[error("Locked by settlement: {0}")]
    LockedBySettlement(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::ConfigurationMismatch(_)
            | Self::InsufficientStock(_)
            | Self::Overpayment(_)
            | Self::PaymentAlreadyStarted(_)
            | Self::AlreadyReversed(_)
            | Self::LockedBySettlement(_) => 422,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConfigurationMismatch(_) => "CONFIGURATION_MISMATCH",
            Self::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            Self::Overpayment(_) => "OVERPAYMENT",
            Self::PaymentAlreadyStarted(_) => "PAYMENT_ALREADY_STARTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::LockedBySettlement(_) => "LOCKED_BY_SETTLEMENT",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(
            AppError::ConfigurationMismatch(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::InsufficientStock(String::new()).status_code(), 422);
        assert_eq!(AppError::Overpayment(String::new()).status_code(), 422);
        assert_eq!(
            AppError::PaymentAlreadyStarted(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::AlreadyReversed(String::new()).status_code(), 422);
        assert_eq!(
            AppError::LockedBySettlement(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::ConfigurationMismatch(String::new()).error_code(),
            "CONFIGURATION_MISMATCH"
        );
        assert_eq!(
            AppError::InsufficientStock(String::new()).error_code(),
            "INSUFFICIENT_STOCK"
        );
        assert_eq!(
            AppError::Overpayment(String::new()).error_code(),
            "OVERPAYMENT"
        );
        assert_eq!(
            AppError::PaymentAlreadyStarted(String::new()).error_code(),
            "PAYMENT_ALREADY_STARTED"
        );
        assert_eq!(
            AppError::AlreadyReversed(String::new()).error_code(),
            "ALREADY_REVERSED"
        );
        assert_eq!(
            AppError::LockedBySettlement(String::new()).error_code(),
            "LOCKED_BY_SETTLEMENT"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::InsufficientStock("msg".into()).to_string(),
            "Not enough stock: msg"
        );
        assert_eq!(
            AppError::AlreadyReversed("msg".into()).to_string(),
            "Already reversed: msg"
        );
    }
}
