use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::error::JsonPayloadError;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, ResponseError, Result as ActixResult};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use wayfarer_travel::{Error as TravelError, TravelAssistant, TravelQuery};

const INTERNAL_ERROR_MESSAGE: &str = "Internal error while planning your trip";

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Errors surfaced to HTTP clients as `{"detail": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal,
}

impl From<TravelError> for ApiError {
    fn from(e: TravelError) -> Self {
        match e {
            TravelError::UnsafeQuery(rejection) => ApiError::BadRequest(rejection.message().to_string()),
            TravelError::UngroundedRecommendation(_) => {
                ApiError::BadRequest("Recommendations are not valid".to_string())
            }
            other => {
                error!(error = %other, "travel assistant failed");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Unprocessable(err.to_string()).into()
}

pub struct RestApi;

impl RestApi {
    pub async fn start(assistant: Arc<TravelAssistant>, port: u16) -> std::io::Result<()> {
        info!(port, "starting HTTP server");
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(assistant.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Routes, shared by the server and by tests
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/", web::get().to(root))
            .route("/health", web::get().to(health))
            .route("/travel-assistant", web::post().to(travel_assistant));
    }
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Travel Assistant API is running"
    })))
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" })))
}

async fn travel_assistant(
    assistant: web::Data<Arc<TravelAssistant>>,
    req: web::Json<TravelQuery>,
) -> Result<HttpResponse, ApiError> {
    let advice = assistant.plan_trip(&req.query).await?;
    Ok(HttpResponse::Ok().json(advice))
}
