use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub price_id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub currency: String,
    pub interval: String,
    /// -1 = unlimited, 0 = free-trial default, >0 = hard monthly cap.
    pub monthly_limit: i32,
}
