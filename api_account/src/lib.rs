use actix_web::web;

pub mod routes {
    pub mod account;
}

pub mod services {
    pub(crate) mod account;
}

pub fn mount_account() -> actix_web::Scope {
    web::scope("/account")
        .service(routes::account::post_sync)
        .service(routes::account::get_account)
}
