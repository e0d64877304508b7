use anyhow::{Context, Result};

use fanhub_types::SubscriptionTier;

use crate::db::rows::{format_timestamp, timestamp_at};
use crate::db::DbPool;

pub struct TierRepository {
    pool: DbPool,
}

impl TierRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, tier: &SubscriptionTier) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO subscription_tiers (id, creator_id, name, description, price_cents, duration_months, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                &tier.id,
                &tier.creator_id,
                &tier.name,
                &tier.description,
                tier.price_cents,
                tier.duration_months,
                format_timestamp(&tier.created_at),
            ),
        )
        .with_context(|| format!("Failed to create {} tier", tier.name))?;
        Ok(())
    }

    /// Tiers offered by a creator, cheapest first
    pub fn list_for_creator(&self, creator_id: &str) -> Result<Vec<SubscriptionTier>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, creator_id, name, description, price_cents, duration_months, created_at
             FROM subscription_tiers
             WHERE creator_id = ?
             ORDER BY price_cents, name",
        )?;

        let tiers = stmt
            .query_map([creator_id], |row| {
                Ok(SubscriptionTier {
                    id: row.get(0)?,
                    creator_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    price_cents: row.get(4)?,
                    duration_months: row.get(5)?,
                    created_at: timestamp_at(row, 6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tiers)
    }
}
