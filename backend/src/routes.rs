use actix_files::{Files, NamedFile};
use actix_web::error::JsonPayloadError;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use std::time::Instant;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::inference;
use crate::models::{ApiResponse, ClinicalInput, PredictionReport};
use crate::stats::ServiceStats;

pub struct AppState {
    pub config: ServerConfig,
    pub stats: ServiceStats,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            config,
            stats: ServiceStats::default(),
        }
    }
}

#[get("/api/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("PredictADH scoring service is up"))
}

#[get("/api/model-info")]
async fn model_info() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(inference::model_info()))
}

#[get("/api/defaults")]
async fn defaults() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(ClinicalInput::default()))
}

#[get("/api/stats")]
async fn stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(state.stats.snapshot()))
}

#[post("/api/predict")]
async fn predict(state: web::Data<AppState>, req: web::Json<ClinicalInput>) -> impl Responder {
    let start_time = Instant::now();
    state.stats.record_request();

    let input = req.into_inner();
    if let Err(e) = input.validate() {
        warn!("Rejected prediction request: {}", e);
        state.stats.record_rejected();
        return HttpResponse::BadRequest()
            .json(ApiResponse::<PredictionReport>::error(&e.to_string()).timed(start_time));
    }

    let report = PredictionReport::new(&input);
    state.stats.record_prediction(report.category);
    info!(
        "Prediction: probability={:.3} category={}",
        report.probability, report.category
    );

    HttpResponse::Ok().json(ApiResponse::success(report).timed(start_time))
}

#[post("/api/batch-predict")]
async fn batch_predict(
    state: web::Data<AppState>,
    req: web::Json<Vec<ClinicalInput>>,
) -> impl Responder {
    let start_time = Instant::now();
    state.stats.record_request();

    let inputs = req.into_inner();
    info!("Batch prediction request: {} inputs", inputs.len());

    let rejection = if inputs.is_empty() {
        Some("Empty batch".to_string())
    } else if inputs.len() > state.config.max_batch {
        Some(format!(
            "Batch of {} inputs exceeds the limit of {}",
            inputs.len(),
            state.config.max_batch
        ))
    } else {
        inputs
            .iter()
            .enumerate()
            .find_map(|(i, input)| input.validate().err().map(|e| format!("Input {}: {}", i + 1, e)))
    };

    if let Some(message) = rejection {
        warn!("Rejected batch request: {}", message);
        state.stats.record_rejected();
        return HttpResponse::BadRequest()
            .json(ApiResponse::<Vec<PredictionReport>>::error(&message).timed(start_time));
    }

    let reports: Vec<PredictionReport> = inputs.iter().map(PredictionReport::new).collect();
    for report in &reports {
        state.stats.record_prediction(report.category);
    }
    info!("Batch prediction done: {} results", reports.len());

    HttpResponse::Ok().json(ApiResponse::success(reports).timed(start_time))
}

async fn index(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let path = state.config.static_dir.join("index.html");
    match NamedFile::open_async(&path).await {
        Ok(file) => file.into_response(&req),
        Err(e) => {
            error!("Could not open {}: {}", path.display(), e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<String>::error("Could not load the interface"))
        }
    }
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound(req.path().to_string()))
}

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    if let Some(state) = req.app_data::<web::Data<AppState>>() {
        state.stats.record_request();
        state.stats.record_rejected();
    }
    warn!("Malformed JSON on {}: {}", req.path(), err);
    ApiError::Validation(err.to_string()).into()
}

/// Registers the API, the UI and the JSON/404 fallbacks.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let json_limit = state.config.json_limit;
        let static_dir = state.config.static_dir.clone();

        cfg.app_data(state)
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(json_error),
            )
            .service(health_check)
            .service(model_info)
            .service(defaults)
            .service(stats)
            .service(predict)
            .service(batch_predict)
            .route("/", web::get().to(index))
            .service(Files::new("/static", static_dir).prefer_utf8(true))
            .default_service(web::route().to(not_found));
    }
}
