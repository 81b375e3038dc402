//! Error Types

use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// User-facing text for a failed charge.
///
/// Declines and transport failures collapse onto this one message so server
/// detail never reaches the error region.
pub const GENERIC_PAYMENT_FAILURE: &str = "Payment failed. Please try again.";

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Invalid or incomplete initialization options
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform capability query failed (non-fatal, falls back to the
    /// default capture strategy)
    #[error("Capability detection failed: {0}")]
    Capability(String),

    /// The capture strategy could not produce a credential
    #[error("Payment capture failed: {0}")]
    Capture(String),

    /// The tokenization provider rejected the credential
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    /// Worker-script registration failed
    #[error("Worker registration failed: {0}")]
    Install(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CheckoutError {
    /// Text safe to place in the component's error region.
    pub fn user_message(&self) -> String {
        match self {
            // Provider and capture messages are written for end users and
            // are shown verbatim.
            CheckoutError::Tokenization(msg) | CheckoutError::Capture(msg) => msg.clone(),
            CheckoutError::Config(_) => "The payment form is not configured correctly.".into(),
            _ => GENERIC_PAYMENT_FAILURE.into(),
        }
    }
}

impl From<anyhow::Error> for CheckoutError {
    fn from(err: anyhow::Error) -> Self {
        CheckoutError::Other(err.to_string())
    }
}
