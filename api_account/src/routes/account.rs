use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{error::Res, http::Success};
use db::dtos::account::AccountSyncRequest;
use sqlx::PgPool;

use crate::services;

/// Upserts the account row for an external identity. Called by the web app
/// after every sign-in; the first call creates the account.
#[post("/sync")]
pub async fn post_sync(
    pool: web::Data<Arc<PgPool>>,
    req: web::Json<AccountSyncRequest>,
) -> Res<impl Responder> {
    let account = services::account::sync(&pool, req.into_inner()).await?;
    Success::ok(account)
}

#[get("/{external_id}")]
pub async fn get_account(
    pool: web::Data<Arc<PgPool>>,
    path: web::Path<String>,
) -> Res<impl Responder> {
    let account = services::account::get_by_external_id(&pool, &path.into_inner()).await?;
    Success::ok(account)
}
