use common::error::{AppError, Res};
use db::{dtos::account::AccountSyncRequest, models::account::Account};
use sqlx::PgPool;

/// Maps an external auth-provider identity to an account row, creating it
/// on first sign-in. All other handlers scope their queries through the
/// account id returned here.
pub async fn sync(pool: &PgPool, req: AccountSyncRequest) -> Res<Account> {
    if req.external_id.trim().is_empty() {
        return Err(AppError::BadRequest("external_id is required".to_string()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()));
    }

    let account = db::account::upsert_account(pool, req).await?;
    log::debug!("Synced account {} ({})", account.id, account.external_id);
    Ok(account)
}

pub async fn get_by_external_id(pool: &PgPool, external_id: &str) -> Res<Account> {
    db::account::get_account_by_external_id(pool, external_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No account for identity {}", external_id)))
}
