use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::group_order::GroupOrderSummary;

/// Payment tracking state. Any state is reachable from any other: the admin
/// flow corrects mistakes by overwriting, and `refunded` is an explicit
/// decision independent of the recorded amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Partial => write!(f, "partial"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// One buyer's commitment inside a group order. The phone number is the
/// ledger key: unique per group, normalized before every lookup.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub id: i64,
    pub group_order_id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub qty: i64,
    pub unit_price: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub admin_note: Option<String>,
    pub payment_updated_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinGroupRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub qty: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub phone: String,
    pub payment_status: PaymentStatus,
    pub paid_amount: Option<i64>,
    pub transaction_id: Option<String>,
    pub admin_note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub qty: i64,
    pub unit_price: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub outstanding_amount: i64,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub admin_note: Option<String>,
    pub payment_updated_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id,
            name: p.name,
            phone: p.phone,
            email: p.email,
            qty: p.qty,
            unit_price: p.unit_price,
            total_amount: p.total_amount,
            paid_amount: p.paid_amount,
            outstanding_amount: p.total_amount - p.paid_amount,
            payment_status: p.payment_status,
            payment_reference: p.payment_reference,
            transaction_id: p.transaction_id,
            admin_note: p.admin_note,
            payment_updated_at: p.payment_updated_at,
            joined_at: p.joined_at,
        }
    }
}

/// Join responses carry the refreshed aggregate so the storefront can show
/// the new price without a second round trip.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinGroupResponse {
    pub participant: ParticipantResponse,
    pub group: GroupOrderSummary,
}
