use crate::application::CsvConversionUseCase;
use crate::domain::conversion::FailureResponse;
use crate::domain::error::AppError;
use crate::infrastructure::config::ServerConfig;
use actix_cors::Cors;
use actix_web::{dev::Server, error, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub struct HttpState {
    pub use_case: Arc<CsvConversionUseCase>,
}

#[post("/convert")]
async fn convert(data: web::Data<HttpState>, req: web::Json<Value>) -> impl Responder {
    match data.use_case.execute(req.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!(error = %e, "Request failed");
            error_response(&e)
        }
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Map a fatal error to a status code and a failure body
pub fn error_response(err: &AppError) -> HttpResponse {
    let body = FailureResponse::from(err);
    match err {
        AppError::InvalidRequest(_) | AppError::InvalidInput(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::FetchError(_) => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn json_config(max_payload_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_payload_bytes)
        .error_handler(|err, _req| {
            let app_err = AppError::InvalidRequest(format!("Malformed JSON body: {}", err));
            let response = error_response(&app_err);
            error::InternalError::from_response(err, response).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service(convert).service(health));
}

pub fn start_server(
    use_case: Arc<CsvConversionUseCase>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { use_case });
    let max_payload_bytes = config.max_payload_bytes;
    let permissive_cors = config.permissive_cors;

    let server = HttpServer::new(move || {
        let cors = if permissive_cors {
            Cors::permissive()
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(json_config(max_payload_bytes))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    info!(host = %config.host, port = config.port, "HTTP server listening");
    Ok(server)
}
