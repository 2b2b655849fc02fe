use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::sub::SubscriptionUpsert,
    models::sub::{STATUS_ACTIVE, Subscription},
};

/// At most one active subscription per account is assumed but not enforced
/// at the data layer; when several exist we take the most recently updated.
pub async fn get_active_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    account_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        r#"
        SELECT * FROM subscriptions
        WHERE account_id = $1 AND status = $2
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(account_id)
    .bind(STATUS_ACTIVE)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_subscription_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        "SELECT * FROM subscriptions WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn upsert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionUpsert,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (account_id, stripe_subscription_id, status, price_id, monthly_limit)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (stripe_subscription_id) DO UPDATE
        SET status = EXCLUDED.status,
            price_id = EXCLUDED.price_id,
            monthly_limit = EXCLUDED.monthly_limit,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(data.account_id)
    .bind(&data.stripe_subscription_id)
    .bind(&data.status)
    .bind(&data.price_id)
    .bind(data.monthly_limit)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Status transition by provider id. Returns how many rows changed so the
/// caller can log a miss instead of failing the webhook.
pub async fn set_subscription_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
    status: &str,
) -> Res<u64> {
    let result = sqlx::query(
        "UPDATE subscriptions SET status = $2, updated_at = now() WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .bind(status)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
