use reqwest::Client;

use crate::config::MailerConfig;
use crate::error::{AppError, AppResult};

/// Transactional mail boundary used to push payment links to participants.
/// Strictly best-effort: callers log failures and move on.
#[derive(Clone)]
pub struct MailerService {
    client: Client,
    config: MailerConfig,
}

impl MailerService {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn send_payment_link(
        &self,
        to: &str,
        product_name: &str,
        amount: i64,
        currency: &str,
        reference: &str,
        payment_url: Option<&str>,
    ) -> AppResult<()> {
        let url = format!("{}/messages", self.config.base_url);

        let subject = format!("Payment request for {}", product_name);
        let body = match payment_url {
            Some(link) => format!(
                "Your group purchase of {} is waiting for payment.\n\nAmount due: {} {}\nReference: {}\n\nPay online: {}",
                product_name, amount, currency, reference, link
            ),
            None => format!(
                "Your group purchase of {} is waiting for payment.\n\nAmount due: {} {}\nReference: {}\n\nOur team will contact you with payment instructions.",
                product_name, amount, currency, reference
            ),
        };

        let params = [
            ("from", self.config.from_address.as_str()),
            ("to", to),
            ("subject", &subject),
            ("text", &body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(&self.config.api_key))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Payment link email sent: {}", to);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Payment link email failed: {}, Error: {}", to, error_text);
            Err(AppError::ExternalApiError(format!(
                "Email sending failed: {}",
                error_text
            )))
        }
    }
}
