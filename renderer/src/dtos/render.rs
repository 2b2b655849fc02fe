use api_usage::services::usage::UsageStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compose::{CompositionSpec, ImageRef};

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub user_id: Uuid,
    pub prompt: String,
    pub photo: ImageRef,
    pub fixture: ImageRef,
    #[serde(flatten)]
    pub composition: CompositionSpec,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub image_url: String,
    pub usage: UsageStatus,
}
