use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::participant::ParticipantResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeneratePaymentLinkRequest {
    pub phone: String,
    pub email: Option<String>,
    pub send_email: Option<bool>,
}

/// What the participant still owes, under the reference the gateway and
/// reconciliation flows will see.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSummary {
    pub amount: i64,
    pub reference: String,
    pub currency: String,
}

/// One payment rail offered by the aggregator (mobile money, card, ...).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentLink {
    pub provider: String,
    pub url: String,
    pub phone_number: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentLinkResponse {
    pub participant: ParticipantResponse,
    pub payment: PaymentSummary,
    pub payment_links: Vec<PaymentLink>,
    /// Set when the gateway was unreachable and no links could be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
