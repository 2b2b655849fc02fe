use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::usage::{DenyReason, UsageStatus};

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub action: String,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UsageActionQuery {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct UsageActionBody {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct GenerationDeniedResponse {
    pub can_generate: bool,
    pub reason: DenyReason,
    pub message: &'static str,
    pub generation_count: i64,
    pub free_trial_limit: i64,
    pub monthly_limit: Option<i32>,
}

impl GenerationDeniedResponse {
    pub fn new(status: &UsageStatus, reason: DenyReason) -> Self {
        Self {
            can_generate: false,
            reason,
            message: reason.message(),
            generation_count: status.generation_count,
            free_trial_limit: status.free_trial_limit,
            monthly_limit: status.monthly_limit,
        }
    }
}
