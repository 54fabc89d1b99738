//! # Settings Repository
//!
//! One pricing policy row per owner. An owner who never saved settings
//! gets [`PricingPolicy::default`].

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use vitrine_core::{PricingPolicy, Rate, SettingsStore, StoreResult};

use super::{decode_decimal, decode_quantity, encode_timestamp, now};
use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct SettingsRow {
    online_commission_rate: String,
    physical_profit_margin: String,
    low_stock_threshold: i64,
}

impl SettingsRow {
    fn into_policy(self) -> DbResult<PricingPolicy> {
        let commission = decode_rate("online_commission_rate", &self.online_commission_rate)?;
        let margin = decode_rate("physical_profit_margin", &self.physical_profit_margin)?;
        let threshold = decode_quantity("low_stock_threshold", self.low_stock_threshold)?;
        Ok(PricingPolicy::new(commission, margin, threshold))
    }
}

fn decode_rate(column: &str, raw: &str) -> DbResult<Rate> {
    let fraction = decode_decimal(column, raw)?;
    Rate::from_fraction(fraction).map_err(|e| DbError::decode(column, e))
}

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    owner_id: String,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool, owner_id: impl Into<String>) -> Self {
        SettingsRepository {
            pool,
            owner_id: owner_id.into(),
        }
    }

    /// Saved policy, or the defaults.
    pub async fn get(&self) -> DbResult<PricingPolicy> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r#"
            SELECT online_commission_rate, physical_profit_margin, low_stock_threshold
            FROM settings
            WHERE owner_id = ?1
            "#,
        )
        .bind(&self.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_policy(),
            None => {
                debug!(owner_id = %self.owner_id, "No saved settings, using defaults");
                Ok(PricingPolicy::default())
            }
        }
    }

    /// Inserts or replaces the owner's policy.
    pub async fn save(&self, policy: &PricingPolicy) -> DbResult<()> {
        info!(
            owner_id = %self.owner_id,
            commission = %policy.online_commission_rate().percentage(),
            margin = %policy.physical_profit_margin().percentage(),
            low_stock_threshold = policy.low_stock_threshold(),
            "Saving settings"
        );

        sqlx::query(
            r#"
            INSERT INTO settings (
                owner_id, online_commission_rate, physical_profit_margin,
                low_stock_threshold, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (owner_id) DO UPDATE SET
                online_commission_rate = excluded.online_commission_rate,
                physical_profit_margin = excluded.physical_profit_margin,
                low_stock_threshold = excluded.low_stock_threshold,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.owner_id)
        .bind(policy.online_commission_rate().fraction().normalize().to_string())
        .bind(policy.physical_profit_margin().fraction().normalize().to_string())
        .bind(i64::from(policy.low_stock_threshold()))
        .bind(encode_timestamp(now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get(&self) -> StoreResult<PricingPolicy> {
        Ok(SettingsRepository::get(self).await?)
    }

    async fn save(&self, policy: &PricingPolicy) -> StoreResult<()> {
        Ok(SettingsRepository::save(self, policy).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal::Decimal;
    use vitrine_core::SettingsUpdate;

    #[tokio::test]
    async fn test_defaults_when_nothing_saved() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let policy = db.settings("owner-a").get().await.unwrap();

        assert_eq!(policy, PricingPolicy::default());
        assert_eq!(policy.low_stock_threshold(), 3);
    }

    #[tokio::test]
    async fn test_save_then_overwrite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings("owner-a");

        let mut policy = PricingPolicy::default();
        policy
            .apply(&SettingsUpdate {
                commission_percent: Some(Decimal::from(20)),
                margin_percent: Some(Decimal::new(125, 1)),
                low_stock_threshold: Some(5),
            })
            .unwrap();
        repo.save(&policy).await.unwrap();
        assert_eq!(repo.get().await.unwrap(), policy);

        policy
            .apply(&SettingsUpdate {
                low_stock_threshold: Some(0),
                ..Default::default()
            })
            .unwrap();
        repo.save(&policy).await.unwrap();

        let loaded = repo.get().await.unwrap();
        assert_eq!(loaded.low_stock_threshold(), 0);
        assert_eq!(loaded.online_commission_rate().percentage(), Decimal::from(20));

        // other owners still see the defaults
        assert_eq!(db.settings("owner-b").get().await.unwrap(), PricingPolicy::default());
    }
}
