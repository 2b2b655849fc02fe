use common::error::{AppError, Res};
use db::models::{account::Account, sub::Subscription};
use sqlx::PgPool;
use stripe::{Client, CustomerId};
use uuid::Uuid;

/// Resolves the account's Stripe customer, creating one on first checkout
/// and persisting the id on the account row.
pub async fn get_or_create_customer(
    pool: &PgPool,
    client: &Client,
    account: &Account,
) -> Res<CustomerId> {
    if let Some(existing) = &account.stripe_customer_id {
        return existing
            .parse::<CustomerId>()
            .map_err(|e| AppError::Internal(format!("Invalid customer id {}: {}", existing, e)));
    }

    let name = account.display_name.clone().unwrap_or_default();
    let customer = common::stripe::create_customer(client, &account.email, &name).await?;
    db::account::set_stripe_customer(pool, account.id, customer.id.as_str()).await?;

    Ok(customer.id)
}

/// The account's active subscription row, if any.
pub async fn current_subscription(pool: &PgPool, account_id: Uuid) -> Res<Option<Subscription>> {
    if db::account::get_account_by_id(pool, account_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "No account with id {}",
            account_id
        )));
    }
    db::sub::get_active_subscription(pool, account_id).await
}
