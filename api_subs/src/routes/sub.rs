use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{env_config::Config, error::Res, http::Success, stripe};
use sqlx::PgPool;

use crate::{dtos::pay::CurrentSubQuery, services};

/// Lists the subscription plans currently offered, straight from Stripe.
#[get("/plans")]
pub async fn get_plans(config: web::Data<Arc<Config>>) -> Res<impl Responder> {
    let client = stripe::create_client(&config.stripe_secret_key);
    let plans = services::catalog::fetch_plans(&client).await?;
    Success::ok(plans)
}

/// The account's active subscription row, or null when on the free trial.
#[get("/current")]
pub async fn get_current(
    pool: web::Data<Arc<PgPool>>,
    query: web::Query<CurrentSubQuery>,
) -> Res<impl Responder> {
    let subscription = services::sub::current_subscription(&pool, query.user_id).await?;
    Success::ok(subscription)
}
