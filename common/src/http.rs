use actix_web::{HttpResponse, Responder};
use serde::Serialize;

use super::error::Res;

/// Shorthand for the happy path of a JSON handler.
pub struct Success;

impl Success {
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Ok(HttpResponse::Ok().json(body))
    }
}
