use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{format_sn_phone, validate_sn_phone};

const GROUP_ORDER_COLUMNS: &str = "id, status, product_ref, product_name, base_price, currency, \
     min_qty, target_qty, current_qty, current_unit_price, deadline, \
     shipping_method, linked_order_id, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, group_order_id, name, phone, email, qty, unit_price, \
     total_amount, paid_amount, payment_status, payment_reference, \
     transaction_id, admin_note, payment_updated_at, joined_at";

/// The participant ledger. One group order is the unit of atomicity: every
/// mutation runs as a single transaction that also refreshes the group's
/// denormalized aggregate columns.
#[derive(Clone)]
pub struct ParticipantService {
    pool: SqlitePool,
}

impl ParticipantService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Join a campaign, or re-join to change the committed quantity.
    ///
    /// Re-joining with a phone already in the ledger replaces the quantity
    /// (it never accumulates) and reprices the entry at the unit price in
    /// effect now. Entries of other participants are left at the price they
    /// locked in when they joined.
    pub async fn join(&self, group_id: i64, request: JoinGroupRequest) -> AppResult<JoinGroupResponse> {
        if request.qty <= 0 {
            return Err(AppError::InvalidQuantity(format!(
                "qty must be a positive integer, got {}",
                request.qty
            )));
        }
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("name is required".to_string()));
        }
        let phone = format_sn_phone(&request.phone);
        validate_sn_phone(&phone)?;

        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupOrder>(&format!(
            "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders WHERE id = ?"
        ))
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Group order not found".to_string()))?;

        if group.status != GroupStatus::Open {
            return Err(AppError::GroupNotJoinable(format!(
                "group order {} is {}, joins are only accepted while open",
                group.id, group.status
            )));
        }
        if let Some(deadline) = group.deadline {
            if Utc::now() > deadline {
                return Err(AppError::GroupNotJoinable(format!(
                    "group order {} closed for joins on {}",
                    group.id, deadline
                )));
            }
        }

        let tiers = sqlx::query_as::<_, PriceTier>(
            "SELECT id, group_order_id, min_qty, max_qty, unit_price, discount_percent \
             FROM price_tiers WHERE group_order_id = ? ORDER BY min_qty ASC",
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM participants WHERE group_order_id = ? AND phone = ?")
                .bind(group_id)
                .bind(&phone)
                .fetch_optional(&mut *tx)
                .await?;

        let now = Utc::now();
        let participant_id = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE participants SET name = ?, email = COALESCE(?, email), qty = ? WHERE id = ?",
                )
                .bind(&request.name)
                .bind(&request.email)
                .bind(request.qty)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO participants (
                        group_order_id, name, phone, email, qty,
                        unit_price, total_amount, paid_amount, payment_status, joined_at
                    ) VALUES (?, ?, ?, ?, ?, 0, 0, 0, ?, ?)
                    "#,
                )
                .bind(group_id)
                .bind(&request.name)
                .bind(&phone)
                .bind(&request.email)
                .bind(request.qty)
                .bind(PaymentStatus::Pending)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                result.last_insert_rowid()
            }
        };

        // aggregate and joiner price derive from the ledger including this commitment
        let current_qty: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(qty), 0) FROM participants WHERE group_order_id = ?")
                .bind(group_id)
                .fetch_one(&mut *tx)
                .await?;
        let unit_price = resolve_unit_price(current_qty, &tiers, group.base_price);

        sqlx::query("UPDATE participants SET unit_price = ?, total_amount = ? WHERE id = ?")
            .bind(unit_price)
            .bind(request.qty * unit_price)
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE group_orders SET current_qty = ?, current_unit_price = ?, updated_at = ? WHERE id = ?",
        )
        .bind(current_qty)
        .bind(unit_price)
        .bind(now)
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?"
        ))
        .bind(participant_id)
        .fetch_one(&mut *tx)
        .await?;

        let group = sqlx::query_as::<_, GroupOrder>(&format!(
            "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders WHERE id = ?"
        ))
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Participant {} joined group order {} with qty {} at unit price {}",
            participant.phone,
            group_id,
            participant.qty,
            unit_price
        );

        Ok(JoinGroupResponse {
            participant: participant.into(),
            group: group.into(),
        })
    }

    /// Record a payment-tracking update against one ledger entry.
    ///
    /// `paid` with no explicit amount settles the full total; `refunded`
    /// with no explicit amount clears it. Other statuses keep the recorded
    /// amount unless one is given.
    pub async fn record_payment(
        &self,
        group_id: i64,
        request: UpdatePaymentRequest,
    ) -> AppResult<ParticipantResponse> {
        if let Some(amount) = request.paid_amount {
            if amount < 0 {
                return Err(AppError::ValidationError(
                    "paid_amount cannot be negative".to_string(),
                ));
            }
        }
        let phone = format_sn_phone(&request.phone);

        let mut tx = self.pool.begin().await?;

        let group_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM group_orders WHERE id = ?")
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?;
        if group_exists.is_none() {
            return Err(AppError::NotFound("Group order not found".to_string()));
        }

        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE group_order_id = ? AND phone = ?"
        ))
        .bind(group_id)
        .bind(&phone)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::ParticipantNotFound(format!(
                "no participant with phone {} in group order {}",
                phone, group_id
            ))
        })?;

        let paid_amount = match (request.paid_amount, request.payment_status) {
            (Some(amount), _) => amount,
            (None, PaymentStatus::Paid) => participant.total_amount,
            (None, PaymentStatus::Refunded) => 0,
            (None, _) => participant.paid_amount,
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE participants
            SET payment_status = ?,
                paid_amount = ?,
                transaction_id = COALESCE(?, transaction_id),
                admin_note = COALESCE(?, admin_note),
                payment_updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.payment_status)
        .bind(paid_amount)
        .bind(&request.transaction_id)
        .bind(&request.admin_note)
        .bind(now)
        .bind(participant.id)
        .execute(&mut *tx)
        .await?;

        let participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?"
        ))
        .bind(participant.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Payment update on group order {}: {} -> {} ({} paid)",
            group_id,
            participant.phone,
            participant.payment_status,
            participant.paid_amount
        );

        Ok(participant.into())
    }
}
