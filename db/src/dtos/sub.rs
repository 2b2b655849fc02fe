use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SubscriptionUpsert {
    pub account_id: Uuid,
    pub stripe_subscription_id: String,
    pub status: String,
    pub price_id: String,
    pub monthly_limit: i32,
}
