use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::*;

const GROUP_ORDER_COLUMNS: &str = "id, status, product_ref, product_name, base_price, currency, \
     min_qty, target_qty, current_qty, current_unit_price, deadline, \
     shipping_method, linked_order_id, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, group_order_id, name, phone, email, qty, unit_price, \
     total_amount, paid_amount, payment_status, payment_reference, \
     transaction_id, admin_note, payment_updated_at, joined_at";

#[derive(Clone)]
pub struct GroupOrderService {
    pool: SqlitePool,
}

impl GroupOrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a campaign in `draft` with a validated tier table. The tier
    /// table is rejected fail-closed before anything is written.
    pub async fn create_group_order(
        &self,
        request: CreateGroupOrderRequest,
    ) -> AppResult<GroupOrderDetail> {
        if request.product_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "product_name is required".to_string(),
            ));
        }
        if request.base_price <= 0 {
            return Err(AppError::ValidationError(
                "base_price must be positive".to_string(),
            ));
        }
        if request.min_qty <= 0 || request.target_qty <= 0 {
            return Err(AppError::ValidationError(
                "min_qty and target_qty must be positive".to_string(),
            ));
        }
        if request.min_qty > request.target_qty {
            return Err(AppError::ValidationError(
                "min_qty cannot exceed target_qty".to_string(),
            ));
        }
        validate_tiers(&request.price_tiers)?;

        let currency = request.currency.unwrap_or_else(|| "XOF".to_string());
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // an empty group resolves to the base price
        let result = sqlx::query(
            r#"
            INSERT INTO group_orders (
                status, product_ref, product_name, base_price, currency,
                min_qty, target_qty, current_qty, current_unit_price,
                deadline, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(GroupStatus::Draft)
        .bind(&request.product_ref)
        .bind(&request.product_name)
        .bind(request.base_price)
        .bind(&currency)
        .bind(request.min_qty)
        .bind(request.target_qty)
        .bind(request.base_price)
        .bind(request.deadline)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let group_id = result.last_insert_rowid();

        for tier in &request.price_tiers {
            sqlx::query(
                r#"
                INSERT INTO price_tiers (group_order_id, min_qty, max_qty, unit_price, discount_percent)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(group_id)
            .bind(tier.min_qty)
            .bind(tier.max_qty)
            .bind(tier.unit_price)
            .bind(tier.discount_percent)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        log::info!("Group order {} created for {}", group_id, request.product_name);

        self.get_group_order(group_id).await
    }

    pub async fn list_group_orders(
        &self,
        query: &GroupOrderQuery,
    ) -> AppResult<PaginatedResponse<GroupOrderSummary>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let (total, groups) = if let Some(status) = query.status {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_orders WHERE status = ?")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

            let groups = sqlx::query_as::<_, GroupOrder>(&format!(
                "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders WHERE status = ? \
                 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            ))
            .bind(status)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

            (total, groups)
        } else {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_orders")
                .fetch_one(&self.pool)
                .await?;

            let groups = sqlx::query_as::<_, GroupOrder>(&format!(
                "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders \
                 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            ))
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

            (total, groups)
        };

        let items: Vec<GroupOrderSummary> =
            groups.into_iter().map(GroupOrderSummary::from).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page(),
            params.limit(),
            total,
        ))
    }

    pub async fn get_group_order(&self, group_id: i64) -> AppResult<GroupOrderDetail> {
        let group = sqlx::query_as::<_, GroupOrder>(&format!(
            "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders WHERE id = ?"
        ))
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Group order not found".to_string()))?;

        let tiers = sqlx::query_as::<_, PriceTier>(
            "SELECT id, group_order_id, min_qty, max_qty, unit_price, discount_percent \
             FROM price_tiers WHERE group_order_id = ? ORDER BY min_qty ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        // insertion order is join order
        let participants = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE group_order_id = ? ORDER BY id ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        let derived_qty: i64 = participants.iter().map(|p| p.qty).sum();
        if derived_qty != group.current_qty {
            log::warn!(
                "Group order {} aggregate drift: stored current_qty {} != derived {}",
                group.id,
                group.current_qty,
                derived_qty
            );
        }

        Ok(GroupOrderDetail::assemble(group, tiers, participants))
    }

    /// Apply an admin status change, enforcing the lifecycle table.
    /// `shipping_method` / `linked_order_id` may ride along once the
    /// campaign moves into the supplier-order phase.
    pub async fn update_status(
        &self,
        group_id: i64,
        request: UpdateGroupStatusRequest,
    ) -> AppResult<GroupOrderDetail> {
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupOrder>(&format!(
            "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders WHERE id = ?"
        ))
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Group order not found".to_string()))?;

        if !group.status.can_transition_to(request.status) {
            return Err(AppError::InvalidStateTransition {
                from: group.status,
                to: request.status,
            });
        }

        sqlx::query(
            r#"
            UPDATE group_orders
            SET status = ?,
                shipping_method = COALESCE(?, shipping_method),
                linked_order_id = COALESCE(?, linked_order_id),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(request.status)
        .bind(&request.shipping_method)
        .bind(&request.linked_order_id)
        .bind(Utc::now())
        .bind(group_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!(
            "Group order {} moved {} -> {}",
            group_id,
            group.status,
            request.status
        );

        self.get_group_order(group_id).await
    }

    /// Delete a campaign together with its tier table and ledger. There is
    /// no standalone participant deletion anywhere else.
    pub async fn delete_group_order(&self, group_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM participants WHERE group_order_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM price_tiers WHERE group_order_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM group_orders WHERE id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Group order not found".to_string()));
        }

        tx.commit().await?;

        log::info!("Group order {} deleted", group_id);

        Ok(())
    }
}
