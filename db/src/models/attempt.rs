use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// Append-only audit record, one per generation request (successful or not).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct GenerationAttempt {
    pub id: Uuid,
    pub account_id: Uuid,
    pub prompt_chars: i32,
    pub duration_ms: i64,
    pub succeeded: bool,
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
}
