use actix_web::web;

pub mod client;
pub mod compose;

pub mod routes {
    pub mod render;
}

mod dtos {
    pub(crate) mod render;
}

pub fn mount_render() -> actix_web::Scope {
    web::scope("/render").service(routes::render::post_render)
}
