//! Payment intent creation.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Please enter amount")]
    InvalidAmount,
}

/// Creates payment intents and hands back the client secret the
/// frontend confirms the payment with.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// `amount` is in the smallest currency unit.
    async fn create_intent(&self, amount: u64, currency: &str) -> Result<String, PaymentError>;

    fn name(&self) -> &'static str;
}

/// Converts a decimal amount to the smallest currency unit.
pub fn to_minor_units(amount: f64) -> Result<u64, PaymentError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidAmount);
    }
    Ok((amount * 100.0).round() as u64)
}

/// Gateway used when no Stripe key is configured. Never moves money.
#[derive(Debug, Default)]
pub struct SandboxGateway;

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_intent(&self, amount: u64, currency: &str) -> Result<String, PaymentError> {
        if amount == 0 {
            return Err(PaymentError::InvalidAmount);
        }
        debug!(amount, currency, "Sandbox payment intent");
        Ok(format!("pi_sandbox_{}_secret", Uuid::new_v4().simple()))
    }

    fn name(&self) -> &'static str {
        "sandbox"
    }
}

pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct IntentResponse {
    client_secret: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeGateway {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self))]
    async fn create_intent(&self, amount: u64, currency: &str) -> Result<String, PaymentError> {
        let amount = amount.to_string();
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&[("amount", amount.as_str()), ("currency", currency)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let intent: IntentResponse = response.json().await?;
        Ok(intent.client_secret)
    }

    fn name(&self) -> &'static str {
        "stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_rounding() {
        assert_eq!(to_minor_units(199.99).unwrap(), 19_999);
        assert_eq!(to_minor_units(0.015).unwrap(), 2);
        assert!(matches!(to_minor_units(0.0), Err(PaymentError::InvalidAmount)));
        assert!(matches!(to_minor_units(-5.0), Err(PaymentError::InvalidAmount)));
        assert!(to_minor_units(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_sandbox_issues_distinct_secrets() {
        let gateway = SandboxGateway;
        let a = gateway.create_intent(500, "inr").await.unwrap();
        let b = gateway.create_intent(500, "inr").await.unwrap();
        assert!(a.starts_with("pi_sandbox_"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_stripe_base_is_normalized() {
        let gateway = StripeGateway::new("http://localhost:12111/", "sk_test");
        assert_eq!(gateway.api_base, "http://localhost:12111");
        assert_eq!(gateway.name(), "stripe");
    }
}
