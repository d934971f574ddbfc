use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::external::{MailerService, PaymentGatewayService};
use crate::models::*;
use crate::utils::{format_sn_phone, generate_payment_reference};

const GROUP_ORDER_COLUMNS: &str = "id, status, product_ref, product_name, base_price, currency, \
     min_qty, target_qty, current_qty, current_unit_price, deadline, \
     shipping_method, linked_order_id, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, group_order_id, name, phone, email, qty, unit_price, \
     total_amount, paid_amount, payment_status, payment_reference, \
     transaction_id, admin_note, payment_updated_at, joined_at";

/// Issues payment links for a participant's outstanding balance through the
/// aggregator boundary. The reference is persisted before the gateway is
/// called, so a gateway outage never loses or corrupts ledger state.
#[derive(Clone)]
pub struct PaymentLinkService {
    pool: SqlitePool,
    gateway: PaymentGatewayService,
    mailer: MailerService,
}

impl PaymentLinkService {
    pub fn new(pool: SqlitePool, gateway: PaymentGatewayService, mailer: MailerService) -> Self {
        Self {
            pool,
            gateway,
            mailer,
        }
    }

    pub async fn generate(
        &self,
        group_id: i64,
        request: GeneratePaymentLinkRequest,
    ) -> AppResult<PaymentLinkResponse> {
        let phone = format_sn_phone(&request.phone);

        let group = sqlx::query_as::<_, GroupOrder>(&format!(
            "SELECT {GROUP_ORDER_COLUMNS} FROM group_orders WHERE id = ?"
        ))
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Group order not found".to_string()))?;

        let mut participant = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE group_order_id = ? AND phone = ?"
        ))
        .bind(group_id)
        .bind(&phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::ParticipantNotFound(format!(
                "no participant with phone {} in group order {}",
                phone, group_id
            ))
        })?;

        let outstanding = participant.total_amount - participant.paid_amount;
        if outstanding <= 0 {
            return Err(AppError::ValidationError(format!(
                "participant {} has no outstanding balance",
                participant.phone
            )));
        }

        // repeated calls reuse the reference already handed to the buyer
        let reference = participant
            .payment_reference
            .clone()
            .unwrap_or_else(|| generate_payment_reference(group_id));

        sqlx::query(
            "UPDATE participants SET payment_reference = ?, email = COALESCE(?, email) WHERE id = ?",
        )
        .bind(&reference)
        .bind(&request.email)
        .bind(participant.id)
        .execute(&self.pool)
        .await?;
        participant.payment_reference = Some(reference.clone());
        if request.email.is_some() {
            participant.email = request.email.clone();
        }

        let (payment_links, warning) = match self
            .gateway
            .create_payment_links(outstanding, &group.currency, &reference, &phone)
            .await
        {
            Ok(links) => (links, None),
            Err(e) => {
                log::error!(
                    "Payment link generation failed for group order {}: {}",
                    group_id,
                    e
                );
                (
                    Vec::new(),
                    Some("Payment gateway unavailable, no payment links were generated".to_string()),
                )
            }
        };

        if request.send_email.unwrap_or(false) {
            match participant.email.clone() {
                Some(to) => {
                    let first_url = payment_links.first().map(|l| l.url.as_str());
                    if let Err(e) = self
                        .mailer
                        .send_payment_link(
                            &to,
                            &group.product_name,
                            outstanding,
                            &group.currency,
                            &reference,
                            first_url,
                        )
                        .await
                    {
                        log::error!("Payment link email failed for {}: {}", to, e);
                    }
                }
                None => {
                    log::warn!(
                        "send_email requested but participant {} has no email address",
                        participant.phone
                    );
                }
            }
        }

        Ok(PaymentLinkResponse {
            participant: participant.into(),
            payment: PaymentSummary {
                amount: outstanding,
                reference,
                currency: group.currency,
            },
            payment_links,
            warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MailerConfig, PaymentGatewayConfig};
    use crate::services::{GroupOrderService, ParticipantService};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn link_service(pool: SqlitePool) -> PaymentLinkService {
        // nothing listens here: every gateway call fails fast
        let gateway = PaymentGatewayService::new(PaymentGatewayConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test-key".to_string(),
        });
        let mailer = MailerService::new(MailerConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test-key".to_string(),
            from_address: "ventes@example.sn".to_string(),
        });
        PaymentLinkService::new(pool, gateway, mailer)
    }

    async fn seed_joined_group(pool: &SqlitePool) -> i64 {
        let groups = GroupOrderService::new(pool.clone());
        let group_id = groups
            .create_group_order(CreateGroupOrderRequest {
                product_ref: "FW-100".to_string(),
                product_name: "UTM firewall appliance".to_string(),
                base_price: 1200,
                currency: None,
                min_qty: 10,
                target_qty: 100,
                price_tiers: vec![
                    PriceTierInput {
                        min_qty: 1,
                        max_qty: Some(9),
                        unit_price: 1000,
                        discount_percent: None,
                    },
                    PriceTierInput {
                        min_qty: 10,
                        max_qty: None,
                        unit_price: 900,
                        discount_percent: None,
                    },
                ],
                deadline: None,
            })
            .await
            .unwrap()
            .id;
        groups
            .update_status(
                group_id,
                UpdateGroupStatusRequest {
                    status: GroupStatus::Open,
                    shipping_method: None,
                    linked_order_id: None,
                },
            )
            .await
            .unwrap();
        ParticipantService::new(pool.clone())
            .join(
                group_id,
                JoinGroupRequest {
                    name: "Awa Ndiaye".to_string(),
                    phone: "771234567".to_string(),
                    email: None,
                    qty: 10,
                },
            )
            .await
            .unwrap();
        group_id
    }

    #[tokio::test]
    async fn degrades_gracefully_when_gateway_is_unreachable() {
        let pool = test_pool().await;
        let group_id = seed_joined_group(&pool).await;
        let service = link_service(pool);

        let response = service
            .generate(
                group_id,
                GeneratePaymentLinkRequest {
                    phone: "771234567".to_string(),
                    email: None,
                    send_email: None,
                },
            )
            .await
            .unwrap();

        // the ledger side of the response is intact, links are just absent
        assert_eq!(response.payment.amount, 9_000);
        assert_eq!(response.payment.currency, "XOF");
        assert!(response.payment_links.is_empty());
        assert!(response.warning.is_some());
        assert!(response.participant.payment_reference.is_some());
    }

    #[tokio::test]
    async fn repeated_calls_reuse_the_persisted_reference() {
        let pool = test_pool().await;
        let group_id = seed_joined_group(&pool).await;
        let service = link_service(pool);

        let request = || GeneratePaymentLinkRequest {
            phone: "771234567".to_string(),
            email: None,
            send_email: None,
        };
        let first = service.generate(group_id, request()).await.unwrap();
        let second = service.generate(group_id, request()).await.unwrap();

        assert_eq!(first.payment.reference, second.payment.reference);
        assert!(first.payment.reference.starts_with(&format!("GP{}-", group_id)));
    }

    #[tokio::test]
    async fn email_update_survives_gateway_failure() {
        let pool = test_pool().await;
        let group_id = seed_joined_group(&pool).await;
        let service = link_service(pool.clone());

        service
            .generate(
                group_id,
                GeneratePaymentLinkRequest {
                    phone: "771234567".to_string(),
                    email: Some("awa@example.sn".to_string()),
                    send_email: Some(true),
                },
            )
            .await
            .unwrap();

        let stored: Option<String> =
            sqlx::query_scalar("SELECT email FROM participants WHERE group_order_id = ?")
                .bind(group_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stored.as_deref(), Some("awa@example.sn"));
    }

    #[tokio::test]
    async fn rejects_when_nothing_is_outstanding() {
        let pool = test_pool().await;
        let group_id = seed_joined_group(&pool).await;
        ParticipantService::new(pool.clone())
            .record_payment(
                group_id,
                UpdatePaymentRequest {
                    phone: "771234567".to_string(),
                    payment_status: PaymentStatus::Paid,
                    paid_amount: None,
                    transaction_id: None,
                    admin_note: None,
                },
            )
            .await
            .unwrap();
        let service = link_service(pool);

        let err = service
            .generate(
                group_id,
                GeneratePaymentLinkRequest {
                    phone: "771234567".to_string(),
                    email: None,
                    send_email: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn unknown_participant_is_not_found() {
        let pool = test_pool().await;
        let group_id = seed_joined_group(&pool).await;
        let service = link_service(pool);

        let err = service
            .generate(
                group_id,
                GeneratePaymentLinkRequest {
                    phone: "781112233".to_string(),
                    email: None,
                    send_email: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ParticipantNotFound(_)));
    }
}
