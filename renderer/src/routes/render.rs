use std::{sync::Arc, time::Instant};

use actix_web::{HttpResponse, post, web};
use api_usage::{
    dtos::usage::GenerationDeniedResponse,
    services::usage::{self, Decision},
};
use common::{
    env_config::Config,
    error::{AppError, Res},
};
use db::dtos::attempt::NewAttempt;
use sqlx::PgPool;

use crate::{
    client::RenderClient,
    compose,
    dtos::render::{RenderRequest, RenderResponse},
};

/// The metered operation. Plans the fixture composite and inpainting mask,
/// gates on the usage ledger, calls the generation vendor, records an audit
/// row either way, and consumes one generation only after the vendor
/// succeeds.
#[post("")]
pub async fn post_render(
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    render_client: web::Data<RenderClient>,
    req: web::Json<RenderRequest>,
) -> Res<HttpResponse> {
    let req = req.into_inner();

    if req.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt is required".to_string()));
    }
    if req.photo.url.trim().is_empty() || req.fixture.url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "photo and fixture urls are required".to_string(),
        ));
    }

    let plan = compose::build_plan(&req.photo, &req.fixture, &req.composition)?;

    let account = db::account::get_account_by_id(&***pool, req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No account with id {}", req.user_id)))?;

    let decision = usage::can_generate(&pool, account.id, config.free_trial_limit).await?;
    if let Decision::Denied(status, reason) = decision {
        return Ok(HttpResponse::Forbidden().json(GenerationDeniedResponse::new(&status, reason)));
    }

    let prompt_chars = req.prompt.chars().count() as i32;
    let started = Instant::now();
    let result = render_client
        .render(&req.prompt, &req.photo.url, &req.fixture.url, &plan)
        .await;
    let duration_ms = started.elapsed().as_millis() as i64;

    match result {
        Ok(output) => {
            db::attempt::insert_attempt(
                &***pool,
                NewAttempt {
                    account_id: account.id,
                    prompt_chars,
                    duration_ms,
                    succeeded: true,
                    error: None,
                },
            )
            .await?;

            let status = usage::increment(&pool, account.id, config.free_trial_limit).await?;

            Ok(HttpResponse::Ok().json(RenderResponse {
                image_url: output.image_url,
                usage: status,
            }))
        }
        Err(e) => {
            log::error!("Render failed for account {}: {}", account.id, e);
            db::attempt::insert_attempt(
                &***pool,
                NewAttempt {
                    account_id: account.id,
                    prompt_chars,
                    duration_ms,
                    succeeded: false,
                    error: Some(e.to_string()),
                },
            )
            .await?;
            Err(e)
        }
    }
}
