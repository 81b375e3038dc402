//! Authorization Client
//!
//! Submits the token and amount to the merchant-controlled endpoint and
//! classifies the HTTP outcome. Exactly one attempt per submission cycle;
//! no retry, no timeout.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GENERIC_PAYMENT_FAILURE;
use crate::tokenize::PaymentToken;

/// Classified result of one authorization attempt.
///
/// Both failure variants surface the same generic user text; the carried
/// detail exists for diagnostics only and must never reach the error
/// region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// The charge succeeded (any 2xx response)
    Authorized,

    /// The server answered with a non-success status
    Declined { detail: String },

    /// The request could not be sent or no response was received
    NetworkError { detail: String },
}

impl AuthorizationOutcome {
    /// Text safe to show in the error region, if this outcome is a failure.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            AuthorizationOutcome::Authorized => None,
            AuthorizationOutcome::Declined { .. } | AuthorizationOutcome::NetworkError { .. } => {
                Some(GENERIC_PAYMENT_FAILURE)
            }
        }
    }
}

/// Port for the merchant authorization call.
///
/// Consumes the token: a [`PaymentToken`] cannot be presented twice.
#[async_trait(?Send)]
pub trait Authorizer {
    async fn authorize(&self, token: PaymentToken, amount_minor_units: u64)
        -> AuthorizationOutcome;
}

/// JSON body posted to the authorization endpoint.
///
/// Identical shape regardless of which strategy produced the token.
#[derive(Debug, Serialize)]
pub struct ChargeRequest<'a> {
    pub token: &'a str,
    pub amount: u64,
}

/// HTTP implementation of [`Authorizer`].
pub struct HttpAuthorizationClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpAuthorizationClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait(?Send)]
impl Authorizer for HttpAuthorizationClient {
    async fn authorize(
        &self,
        token: PaymentToken,
        amount_minor_units: u64,
    ) -> AuthorizationOutcome {
        let body = ChargeRequest {
            token: token.as_str(),
            amount: amount_minor_units,
        };

        match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(response) => classify_status(response.status().as_u16()),
            Err(err) => {
                tracing::warn!(error = %err, "Authorization request failed in transport");
                AuthorizationOutcome::NetworkError {
                    detail: err.to_string(),
                }
            }
        }
    }
}

/// Map an HTTP status onto an outcome.
///
/// Any 2xx is authorized; everything else is a decline carrying only the
/// status for diagnostics, never the response body.
pub fn classify_status(status: u16) -> AuthorizationOutcome {
    if (200..300).contains(&status) {
        AuthorizationOutcome::Authorized
    } else {
        AuthorizationOutcome::Declined {
            detail: format!("authorization endpoint returned status {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_2xx_is_authorized() {
        for status in [200, 201, 204, 299] {
            assert_eq!(classify_status(status), AuthorizationOutcome::Authorized);
        }
    }

    #[test]
    fn test_non_2xx_is_declined() {
        for status in [301, 400, 402, 403, 500, 503] {
            assert!(matches!(
                classify_status(status),
                AuthorizationOutcome::Declined { .. }
            ));
        }
    }

    #[test]
    fn test_decline_and_network_failure_share_user_text() {
        let declined = AuthorizationOutcome::Declined {
            detail: "authorization endpoint returned status 402".into(),
        };
        let network = AuthorizationOutcome::NetworkError {
            detail: "connection refused".into(),
        };

        assert_eq!(declined.user_message(), network.user_message());
        assert_eq!(declined.user_message(), Some(GENERIC_PAYMENT_FAILURE));
        // Distinguishable internally for diagnostics.
        assert_ne!(declined, network);
    }

    #[test]
    fn test_charge_request_wire_shape() {
        let body = ChargeRequest {
            token: "tok_1",
            amount: 199,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "token": "tok_1", "amount": 199 })
        );
    }
}
