use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub generation_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
