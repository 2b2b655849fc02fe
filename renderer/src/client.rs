use common::error::Res;
use serde::{Deserialize, Serialize};

use crate::compose::CompositePlan;

/// Thin pass-through to the hosted night-scene inpainting vendor. No
/// retries; callers observe the failure and re-issue the request.
#[derive(Debug, Clone)]
pub struct RenderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct RenderPayload<'a> {
    prompt: &'a str,
    image_url: &'a str,
    fixture_url: &'a str,
    #[serde(flatten)]
    plan: &'a CompositePlan,
}

#[derive(Debug, Deserialize)]
pub struct RenderOutput {
    pub image_url: String,
}

impl RenderClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Submits the composite/mask plan alongside the source images; the
    /// vendor rebuilds both and runs the inpainting pass.
    pub async fn render(
        &self,
        prompt: &str,
        photo_url: &str,
        fixture_url: &str,
        plan: &CompositePlan,
    ) -> Res<RenderOutput> {
        let output = self
            .http
            .post(format!("{}/render", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&RenderPayload {
                prompt,
                image_url: photo_url,
                fixture_url,
                plan,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<RenderOutput>()
            .await?;

        Ok(output)
    }
}
