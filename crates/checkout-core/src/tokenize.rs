//! Tokenization Port
//!
//! The external processor exchanges a raw credential for an opaque,
//! single-use token or a credential-level error. The core depends only on
//! this two-outcome contract, never on a concrete provider.

use async_trait::async_trait;

use crate::capture::PaymentCredential;

/// Opaque single-use token issued by the tokenization service.
///
/// Deliberately not `Clone`: [`crate::authorize::Authorizer::authorize`]
/// consumes the token, so it cannot survive past one authorization call.
#[derive(Debug, PartialEq, Eq)]
pub struct PaymentToken(String);

impl PaymentToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Outcome of one exchange: a token or a provider error, nothing else.
///
/// A provider error is terminal for the submission; its message is surfaced
/// to the user verbatim and no retry is attempted.
#[derive(Debug)]
pub enum TokenExchange {
    Token(PaymentToken),
    Error { message: String },
}

/// Port for the external tokenization service.
#[async_trait(?Send)]
pub trait Tokenizer {
    /// Exchange a credential for a token.
    ///
    /// Wallet credentials are already validated by the platform, so
    /// implementations pass their identifier through unchanged.
    async fn exchange(&self, credential: &PaymentCredential) -> TokenExchange;
}
