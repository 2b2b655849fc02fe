use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub account_id: Uuid,
    pub prompt_chars: i32,
    pub duration_ms: i64,
    pub succeeded: bool,
    pub error: Option<String>,
}
