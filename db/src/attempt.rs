use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::attempt::NewAttempt, models::attempt::GenerationAttempt};

pub async fn insert_attempt<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    attempt: NewAttempt,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO generation_attempts (account_id, prompt_chars, duration_ms, succeeded, error)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(attempt.account_id)
    .bind(attempt.prompt_chars)
    .bind(attempt.duration_ms)
    .bind(attempt.succeeded)
    .bind(&attempt.error)
    .execute(executor)
    .await
    .map_err(AppError::from)?;

    Ok(())
}

pub async fn list_attempts<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    account_id: Uuid,
    limit: i64,
) -> Res<Vec<GenerationAttempt>> {
    sqlx::query_as::<_, GenerationAttempt>(
        r#"
        SELECT * FROM generation_attempts
        WHERE account_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(account_id)
    .bind(limit)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
