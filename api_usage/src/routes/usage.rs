use std::sync::Arc;

use actix_web::{HttpResponse, get, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
};
use sqlx::PgPool;

use crate::{
    dtos::usage::{GenerationDeniedResponse, UsageActionBody, UsageActionQuery, UsageQuery},
    services,
};

/// Read side of the ledger, dispatched on `?action=`:
///
/// - `status`: usage snapshot for one account
/// - `history`: recent generation attempts from the audit log
#[get("")]
pub async fn get_usage(
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    query: web::Query<UsageQuery>,
) -> Res<HttpResponse> {
    let query = query.into_inner();
    let account_id = query
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))?;

    match query.action.as_str() {
        "status" => {
            let status =
                services::usage::get_status(&pool, account_id, config.free_trial_limit).await?;
            Ok(HttpResponse::Ok().json(status))
        }
        "history" => {
            let attempts =
                services::usage::history(&pool, account_id, query.limit.unwrap_or(25)).await?;
            Ok(HttpResponse::Ok().json(attempts))
        }
        other => Err(AppError::BadRequest(format!(
            "Unknown usage action: {}",
            other
        ))),
    }
}

/// Write side of the ledger, dispatched on `?action=`:
///
/// - `increment`: consume one generation (atomic), returns the new status
/// - `can-generate`: gate check; 403 with a machine-readable reason when the
///   account is out of quota. Never consumes quota itself.
#[post("")]
pub async fn post_usage(
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    query: web::Query<UsageActionQuery>,
    body: web::Json<UsageActionBody>,
) -> Res<HttpResponse> {
    let account_id = body.user_id;

    match query.action.as_str() {
        "increment" => {
            let status =
                services::usage::increment(&pool, account_id, config.free_trial_limit).await?;
            Ok(HttpResponse::Ok().json(status))
        }
        "can-generate" => {
            let decision =
                services::usage::can_generate(&pool, account_id, config.free_trial_limit).await?;
            match decision {
                services::usage::Decision::Allowed(status) => Ok(HttpResponse::Ok().json(status)),
                services::usage::Decision::Denied(status, reason) => Ok(HttpResponse::Forbidden()
                    .json(GenerationDeniedResponse::new(&status, reason))),
            }
        }
        other => Err(AppError::BadRequest(format!(
            "Unknown usage action: {}",
            other
        ))),
    }
}
