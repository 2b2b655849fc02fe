use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_CANCELED: &str = "canceled";

/// A plan's generation cap: -1 means unlimited, 0 means "use the
/// free-trial default".
pub const LIMIT_UNLIMITED: i32 = -1;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub account_id: Uuid,
    pub stripe_subscription_id: String,
    pub status: String,
    pub price_id: String,
    pub monthly_limit: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
