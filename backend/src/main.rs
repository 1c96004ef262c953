use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use log::info;

use predictadh::config::ServerConfig;
use predictadh::routes::{self, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("🚀 Starting PredictADH");

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let bind_address = config.bind_address();
    let workers = config.workers;

    info!("🌐 Listening on: http://{}", bind_address);
    info!("👷 Workers: {}", workers);
    info!("📁 Static files: {}", config.static_dir.display());
    info!("🔧 API endpoints:");
    info!("   GET  /api/health         - liveness");
    info!("   GET  /api/model-info     - coefficients, thresholds, citation");
    info!("   GET  /api/defaults       - default form values");
    info!("   GET  /api/stats          - request counters");
    info!("   POST /api/predict        - single prediction");
    info!("   POST /api/batch-predict  - several predictions");

    let cors_origins = config.cors_origins.clone();
    let state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .configure(routes::configure(state.clone()))
    })
    .workers(workers)
    .bind(&bind_address)
    .with_context(|| format!("could not bind {}", bind_address))?
    .run()
    .await
    .context("server terminated with an error")
}
