//! Test plan server: main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use testplan_lib::api::{self, ApiDoc};
use testplan_lib::auth::SessionSecret;
use testplan_lib::config::Config;
use testplan_lib::db::DbPool;
use testplan_lib::middleware;

const OPENAPI_PATH: &str = "/api/v1/openapi.json";

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and TP_JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Test Plan Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and TP_JWT_SECRET");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("{}", e);
        std::process::exit(1);
    }

    // Prepare shared state
    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let session_secret = SessionSecret::new(config.session.secret.clone(), config.session.ttl_secs);
    info!(
        "CSV import limit: {}MB, session lifetime: {} days",
        config.max_import_size / 1024 / 1024,
        config.session.ttl_secs / 86_400
    );

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let config_data = web::Data::new(config);
    let pool_data = web::Data::new(pool);
    let secret_data = web::Data::new(session_secret);

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                ])
                .supports_credentials()
                .max_age(3600)
        } else {
            // Same-origin only in production
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                ])
                .max_age(3600)
        };

        let app = App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(secret_data.clone())
            .configure(api::configure_extractors);

        // Registered ahead of the /api/v1 scope, which would otherwise claim the path
        let app = if is_development {
            app.service(SwaggerUi::new("/api/docs/{_:.*}").url(OPENAPI_PATH, ApiDoc::openapi()))
        } else {
            app.route(OPENAPI_PATH, web::get().to(openapi_json))
        };

        app.service(web::scope("/api/v1").configure(api::configure_api))
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
