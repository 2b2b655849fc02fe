use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::account::AccountSyncRequest, models::account::Account};

pub async fn get_account_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    account_id: Uuid,
) -> Res<Option<Account>> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_account_by_external_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    external_id: &str,
) -> Res<Option<Account>> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE external_id = $1")
        .bind(external_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_account_by_stripe_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_customer_id: &str,
) -> Res<Option<Account>> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE stripe_customer_id = $1")
        .bind(stripe_customer_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// First-sign-in sync: creates the account row if the external identity is
/// new, otherwise refreshes the profile fields. `generation_count` is never
/// touched here.
pub async fn upsert_account<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AccountSyncRequest,
) -> Res<Account> {
    sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (external_id, email, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (external_id) DO UPDATE
        SET email = EXCLUDED.email,
            display_name = EXCLUDED.display_name,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(&data.external_id)
    .bind(&data.email)
    .bind(&data.display_name)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_stripe_customer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    account_id: Uuid,
    stripe_customer_id: &str,
) -> Res<()> {
    sqlx::query("UPDATE accounts SET stripe_customer_id = $2, updated_at = now() WHERE id = $1")
        .bind(account_id)
        .bind(stripe_customer_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Atomic counter bump, serialized at the database. Returns the
/// post-increment count, or None when the account does not exist.
pub async fn increment_generation_count<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    account_id: Uuid,
) -> Res<Option<i64>> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE accounts
        SET generation_count = generation_count + 1, updated_at = now()
        WHERE id = $1
        RETURNING generation_count
        "#,
    )
    .bind(account_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Billing-cycle reset: the only path that decreases the counter.
pub async fn reset_generation_count<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    account_id: Uuid,
) -> Res<()> {
    sqlx::query("UPDATE accounts SET generation_count = 0, updated_at = now() WHERE id = $1")
        .bind(account_id)
        .execute(executor)
        .await?;
    Ok(())
}
