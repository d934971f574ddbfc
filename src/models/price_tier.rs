use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// One quantity bracket of a group order's tier table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PriceTier {
    pub id: i64,
    pub group_order_id: i64,
    pub min_qty: i64,
    pub max_qty: Option<i64>,
    pub unit_price: i64,
    pub discount_percent: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceTierInput {
    pub min_qty: i64,
    pub max_qty: Option<i64>,
    pub unit_price: i64,
    pub discount_percent: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PriceTierResponse {
    pub min_qty: i64,
    pub max_qty: Option<i64>,
    pub unit_price: i64,
    pub discount_percent: Option<i64>,
}

impl From<PriceTier> for PriceTierResponse {
    fn from(t: PriceTier) -> Self {
        Self {
            min_qty: t.min_qty,
            max_qty: t.max_qty,
            unit_price: t.unit_price,
            discount_percent: t.discount_percent,
        }
    }
}

/// Applicable unit price for `quantity` under `tiers`.
///
/// Picks the tier with the highest `min_qty` not exceeding `quantity`.
/// Quantities below the smallest bracket fall back to the catalog base
/// price. Malformed tables resolve by the same highest-bracket rule.
pub fn resolve_unit_price(quantity: i64, tiers: &[PriceTier], base_price: i64) -> i64 {
    tiers
        .iter()
        .filter(|t| t.min_qty <= quantity)
        .max_by_key(|t| t.min_qty)
        .map(|t| t.unit_price)
        .unwrap_or(base_price)
}

/// Rejects tier tables that would make price resolution ambiguous.
/// Called before a group order is persisted, never at resolve time.
pub fn validate_tiers(tiers: &[PriceTierInput]) -> AppResult<()> {
    for (i, tier) in tiers.iter().enumerate() {
        if tier.min_qty < 1 {
            return Err(AppError::TierConfiguration(format!(
                "tier {} has min_qty {}, must be at least 1",
                i + 1,
                tier.min_qty
            )));
        }
        if tier.unit_price <= 0 {
            return Err(AppError::TierConfiguration(format!(
                "tier {} has non-positive unit_price {}",
                i + 1,
                tier.unit_price
            )));
        }
        if let Some(max_qty) = tier.max_qty {
            if max_qty < tier.min_qty {
                return Err(AppError::TierConfiguration(format!(
                    "tier {} has max_qty {} below min_qty {}",
                    i + 1,
                    max_qty,
                    tier.min_qty
                )));
            }
        }
        if let Some(discount) = tier.discount_percent {
            if !(0..=100).contains(&discount) {
                return Err(AppError::TierConfiguration(format!(
                    "tier {} has discount_percent {} outside 0..=100",
                    i + 1,
                    discount
                )));
            }
        }
    }

    for (i, pair) in tiers.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        if next.min_qty <= current.min_qty {
            return Err(AppError::TierConfiguration(format!(
                "tiers must be sorted by strictly ascending min_qty, tier {} starts at {} after {}",
                i + 2,
                next.min_qty,
                current.min_qty
            )));
        }
        match current.max_qty {
            None => {
                return Err(AppError::TierConfiguration(format!(
                    "tier {} is open-ended but is not the last tier",
                    i + 1
                )));
            }
            Some(max_qty) if max_qty >= next.min_qty => {
                return Err(AppError::TierConfiguration(format!(
                    "tier {} overlaps tier {}: max_qty {} >= next min_qty {}",
                    i + 1,
                    i + 2,
                    max_qty,
                    next.min_qty
                )));
            }
            Some(max_qty) if max_qty + 1 != next.min_qty => {
                return Err(AppError::TierConfiguration(format!(
                    "gap between tier {} (max_qty {}) and tier {} (min_qty {})",
                    i + 1,
                    max_qty,
                    i + 2,
                    next.min_qty
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}
