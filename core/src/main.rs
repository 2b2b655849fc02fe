mod cors;
mod throttle;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_subs::services::catalog::PlanCatalog;
use common::env_config::Config;
use renderer::client::RenderClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // load the plan catalog from Stripe so webhook translation can resolve
    // each price's generation cap
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let plans = api_subs::services::catalog::fetch_plans(&client)
        .await
        .expect("Failed to fetch subscription plans from Stripe API");
    log::info!("Loaded {} subscription plans", plans.len());
    let catalog = PlanCatalog::new(plans);

    // vendor client for night-scene generations
    let render_client = RenderClient::new(&config.render_api_url, &config.render_api_key);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .app_data(web::Data::new(render_client.clone()))
            .wrap(throttle::IngressThrottle::new(10)) // max 10 requests per second
            .wrap(logger::middleware())
            .wrap(cors::middleware(&origin))
            .service(
                web::scope("/api")
                    .service(api_account::mount_account())
                    .service(api_usage::mount_usage())
                    .service(api_subs::mount_subs())
                    .service(api_subs::mount_pay())
                    .service(renderer::mount_render()),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
