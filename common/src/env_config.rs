use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to boot the service: database connection,
/// server binding, CORS, logging, the free-trial generation cap,
/// Stripe credentials, and the render-vendor endpoint.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Monthly generation cap for accounts without an active subscription.
    pub free_trial_limit: i64,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// Base URL of the hosted image-generation vendor.
    pub render_api_url: String,
    /// API key for the image-generation vendor.
    pub render_api_key: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Required:
    /// - `ENVIRONMENT`: "development" or "production"
    /// - `DATABASE_URL`: Connection string for the database
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `FREE_TRIAL_LIMIT`: Generation cap without a subscription (default: 25)
    /// - `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`: Stripe credentials
    /// - `RENDER_API_URL`, `RENDER_API_KEY`: image-generation vendor
    ///
    /// # Panics
    ///
    /// Panics if required environment variables are missing or if numeric
    /// values cannot be parsed.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            free_trial_limit: env::var("FREE_TRIAL_LIMIT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .expect("FREE_TRIAL_LIMIT must be a valid number"),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            render_api_url: env::var("RENDER_API_URL")
                .unwrap_or_else(|_| "https://api.lumascape.dev/v1".to_string()),
            render_api_key: env::var("RENDER_API_KEY").unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env mutations never race another test thread.
    #[test]
    fn defaults_and_overrides_from_env() {
        unsafe {
            env::set_var("ENVIRONMENT", "development");
            env::set_var("DATABASE_URL", "postgres://localhost/lumascape_test");
            env::remove_var("FREE_TRIAL_LIMIT");
            env::remove_var("PORT");
        }

        let config = Config::from_env();
        assert_eq!(config.free_trial_limit, 25);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert!(config.console_logging_enabled);

        unsafe {
            env::set_var("FREE_TRIAL_LIMIT", "10");
            env::set_var("PORT", "9090");
        }

        let config = Config::from_env();
        assert_eq!(config.free_trial_limit, 10);
        assert_eq!(config.server_port, 9090);

        unsafe {
            env::remove_var("FREE_TRIAL_LIMIT");
            env::remove_var("PORT");
        }
    }
}
