use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    stripe,
};
use sqlx::PgPool;

use crate::{
    dtos::pay::{CheckoutRequest, CheckoutResponse},
    services::{self, catalog::PlanCatalog},
};

/// Starts a subscription checkout for an account. Creates the Stripe
/// customer on first use, then returns the hosted checkout url the web app
/// redirects to.
#[post("/checkout")]
pub async fn post_checkout(
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    req: web::Json<CheckoutRequest>,
) -> Res<impl Responder> {
    let req = req.into_inner();
    let client = stripe::create_client(&config.stripe_secret_key);

    let account = db::account::get_account_by_id(&***pool, req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No account with id {}", req.user_id)))?;

    let customer_id = services::sub::get_or_create_customer(&pool, &client, &account).await?;
    let session = services::pay::create_checkout_session(&client, customer_id, &req).await?;

    let url = session
        .url
        .ok_or_else(|| AppError::Internal("Checkout session has no url".to_string()))?;

    Success::ok(CheckoutResponse { url })
}

/// Stripe webhook endpoint. Verifies the signature, then translates
/// `checkout.session.completed`, `customer.subscription.updated`,
/// `customer.subscription.deleted` and `invoice.paid` into local
/// subscription rows and the renewal counter reset.
///
/// Called by Stripe's servers, not by the web app. Configure the endpoint
/// url and signing secret in the Stripe dashboard (STRIPE_WEBHOOK_SECRET).
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: actix_web::HttpRequest,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    catalog: web::Data<PlanCatalog>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event =
        services::pay::construct_event(&payload, signature, &config.stripe_webhook_secret)?;

    let client = stripe::create_client(&config.stripe_secret_key);
    services::pay::process_webhook_event(&pool, &client, &catalog, event).await?;

    Success::ok("Webhook processed successfully")
}
