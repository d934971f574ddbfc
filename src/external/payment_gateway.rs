use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::PaymentGatewayConfig;
use crate::error::{AppError, AppResult};
use crate::models::PaymentLink;

#[derive(Debug, Serialize)]
struct CreateLinksRequest<'a> {
    amount: i64,
    currency: &'a str,
    reference: &'a str,
    customer_phone: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateLinksResponse {
    links: Vec<PaymentLink>,
}

/// Payment aggregator boundary. Produces one link per payment rail enabled
/// for the merchant account (Wave, Orange Money, card). The ledger is never
/// touched here: callers treat every failure as a degraded, best-effort
/// result.
#[derive(Clone)]
pub struct PaymentGatewayService {
    client: Client,
    config: PaymentGatewayConfig,
}

impl PaymentGatewayService {
    pub fn new(config: PaymentGatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn create_payment_links(
        &self,
        amount: i64,
        currency: &str,
        reference: &str,
        customer_phone: &str,
    ) -> AppResult<Vec<PaymentLink>> {
        let url = format!("{}/v1/payment-links", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&CreateLinksRequest {
                amount,
                currency,
                reference,
                customer_phone,
            })
            .send()
            .await
            .map_err(|e| AppError::PaymentGatewayUnavailable(e.to_string()))?;

        if response.status().is_success() {
            let body: CreateLinksResponse = response
                .json()
                .await
                .map_err(|e| AppError::PaymentGatewayUnavailable(e.to_string()))?;
            Ok(body.links)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::PaymentGatewayUnavailable(format!(
                "Payment link creation failed: {}",
                error_text
            )))
        }
    }
}
