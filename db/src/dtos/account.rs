use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AccountSyncRequest {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
}
