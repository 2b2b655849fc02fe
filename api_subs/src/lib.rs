use actix_web::web;

pub mod routes {
    pub mod pay;
    pub mod sub;
}

pub mod services {
    pub mod catalog;
    pub mod pay;
    pub(crate) mod sub;
}

pub mod models {
    pub mod plan;
}

mod dtos {
    pub(crate) mod pay;
}

pub fn mount_subs() -> actix_web::Scope {
    web::scope("/sub")
        .service(routes::sub::get_plans)
        .service(routes::sub::get_current)
}

pub fn mount_pay() -> actix_web::Scope {
    web::scope("/pay")
        .service(routes::pay::post_checkout)
        .service(routes::pay::post_webhook)
}
