use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::participant::{Participant, ParticipantResponse};
use super::price_tier::{PriceTier, PriceTierInput, PriceTierResponse};

/// Campaign lifecycle. Transitions are checked with [`GroupStatus::can_transition_to`];
/// anything outside that table is rejected at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Draft,
    Open,
    Filled,
    Ordering,
    Ordered,
    Shipped,
    Delivered,
    Cancelled,
}

impl GroupStatus {
    /// The admin-facing transition table. Reaching the target quantity is
    /// advisory: `filled` is still entered by an explicit transition, and
    /// cancellation is only offered while a campaign is open.
    pub fn can_transition_to(self, next: GroupStatus) -> bool {
        use GroupStatus::*;
        matches!(
            (self, next),
            (Draft, Open)
                | (Open, Filled)
                | (Open, Cancelled)
                | (Filled, Ordering)
                | (Ordering, Ordered)
                | (Ordered, Shipped)
                | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GroupStatus::Delivered | GroupStatus::Cancelled)
    }
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupStatus::Draft => write!(f, "draft"),
            GroupStatus::Open => write!(f, "open"),
            GroupStatus::Filled => write!(f, "filled"),
            GroupStatus::Ordering => write!(f, "ordering"),
            GroupStatus::Ordered => write!(f, "ordered"),
            GroupStatus::Shipped => write!(f, "shipped"),
            GroupStatus::Delivered => write!(f, "delivered"),
            GroupStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One collective-purchase campaign. `current_qty` and `current_unit_price`
/// are denormalized from the participant ledger and refreshed in the same
/// transaction as every ledger write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GroupOrder {
    pub id: i64,
    pub status: GroupStatus,
    pub product_ref: String,
    pub product_name: String,
    pub base_price: i64, // whole CFA francs
    pub currency: String,
    pub min_qty: i64,
    pub target_qty: i64,
    pub current_qty: i64,
    pub current_unit_price: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub shipping_method: Option<String>,
    pub linked_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateGroupOrderRequest {
    pub product_ref: String,
    pub product_name: String,
    pub base_price: i64,
    pub currency: Option<String>,
    pub min_qty: i64,
    pub target_qty: i64,
    #[serde(default)]
    pub price_tiers: Vec<PriceTierInput>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateGroupStatusRequest {
    pub status: GroupStatus,
    pub shipping_method: Option<String>,
    pub linked_order_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupOrderQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<GroupStatus>,
}

/// Read-only catalog snapshot taken when the campaign was created.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub reference: String,
    pub name: String,
    pub base_price: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupOrderSummary {
    pub id: i64,
    pub status: GroupStatus,
    pub product_name: String,
    pub currency: String,
    pub min_qty: i64,
    pub target_qty: i64,
    pub current_qty: i64,
    pub current_unit_price: i64,
    pub progress_percent: i64,
    pub is_filled: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<GroupOrder> for GroupOrderSummary {
    fn from(g: GroupOrder) -> Self {
        Self {
            progress_percent: progress_percent(g.current_qty, g.target_qty),
            is_filled: g.current_qty >= g.target_qty,
            id: g.id,
            status: g.status,
            product_name: g.product_name,
            currency: g.currency,
            min_qty: g.min_qty,
            target_qty: g.target_qty,
            current_qty: g.current_qty,
            current_unit_price: g.current_unit_price,
            deadline: g.deadline,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupOrderDetail {
    pub id: i64,
    pub status: GroupStatus,
    pub product: ProductSnapshot,
    pub min_qty: i64,
    pub target_qty: i64,
    pub current_qty: i64,
    pub current_unit_price: i64,
    pub progress_percent: i64,
    pub is_filled: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub shipping_method: Option<String>,
    pub linked_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub price_tiers: Vec<PriceTierResponse>,
    pub participants: Vec<ParticipantResponse>,
}

impl GroupOrderDetail {
    pub fn assemble(
        group: GroupOrder,
        tiers: Vec<PriceTier>,
        participants: Vec<Participant>,
    ) -> Self {
        Self {
            id: group.id,
            status: group.status,
            progress_percent: progress_percent(group.current_qty, group.target_qty),
            is_filled: group.current_qty >= group.target_qty,
            product: ProductSnapshot {
                reference: group.product_ref,
                name: group.product_name,
                base_price: group.base_price,
                currency: group.currency,
            },
            min_qty: group.min_qty,
            target_qty: group.target_qty,
            current_qty: group.current_qty,
            current_unit_price: group.current_unit_price,
            deadline: group.deadline,
            shipping_method: group.shipping_method,
            linked_order_id: group.linked_order_id,
            created_at: group.created_at,
            updated_at: group.updated_at,
            price_tiers: tiers.into_iter().map(PriceTierResponse::from).collect(),
            participants: participants
                .into_iter()
                .map(ParticipantResponse::from)
                .collect(),
        }
    }
}

fn progress_percent(current_qty: i64, target_qty: i64) -> i64 {
    if target_qty <= 0 {
        return 0;
    }
    (((current_qty as f64 / target_qty as f64) * 100.0).round() as i64).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_the_lifecycle() {
        use GroupStatus::*;

        assert!(Draft.can_transition_to(Open));
        assert!(Open.can_transition_to(Filled));
        assert!(Open.can_transition_to(Cancelled));
        assert!(Filled.can_transition_to(Ordering));
        assert!(Ordering.can_transition_to(Ordered));
        assert!(Ordered.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn shortcuts_are_rejected() {
        use GroupStatus::*;

        // must go open -> filled -> ordering -> ordered
        assert!(!Open.can_transition_to(Ordered));
        assert!(!Open.can_transition_to(Ordering));
        assert!(!Draft.can_transition_to(Filled));
        assert!(!Filled.can_transition_to(Ordered));
    }

    #[test]
    fn cancellation_is_only_offered_while_open() {
        use GroupStatus::*;

        assert!(Open.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Cancelled));
        assert!(!Filled.can_transition_to(Cancelled));
        assert!(!Ordering.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        use GroupStatus::*;

        for next in [
            Draft, Open, Filled, Ordering, Ordered, Shipped, Delivered, Cancelled,
        ] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Open.is_terminal());
    }

    #[test]
    fn progress_rounds_and_caps_at_100() {
        assert_eq!(progress_percent(0, 100), 0);
        assert_eq!(progress_percent(70, 100), 70);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(150, 100), 100);
        assert_eq!(progress_percent(10, 0), 0);
    }
}
