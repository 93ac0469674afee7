use std::time::Instant;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, ResponseError};
use futures_util::StreamExt;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{PingResponse, Prediction, PING_MESSAGE};
use crate::service::AppState;

/// Multipart field carrying the uploaded image.
pub const UPLOAD_FIELD: &str = "file";

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ping").route(web::get().to(ping)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(PingResponse {
        message: PING_MESSAGE,
    })
}

pub async fn predict(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);

    async move {
        let started = Instant::now();
        match run_prediction(state, payload).await {
            Ok(prediction) => {
                info!(
                    class = %prediction.class,
                    confidence = prediction.confidence,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "prediction served"
                );
                Ok(HttpResponse::Ok().json(prediction))
            }
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!(kind = e.kind(), "prediction failed: {}", e);
                } else {
                    warn!(kind = e.kind(), "rejected upload: {}", e);
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_prediction(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<Prediction> {
    let bytes = read_upload(&mut payload, state.max_upload_bytes()).await?;

    // Inference is CPU bound; keep it off the async workers.
    web::block(move || state.classify(&bytes))
        .await
        .map_err(|e| Error::Inference(e.to_string()))?
}

async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Vec<u8>> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| Error::Multipart(e.to_string()))?;
        if field.content_disposition().get_name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| Error::Multipart(e.to_string()))?;
            if data.len() + chunk.len() > limit {
                return Err(Error::PayloadTooLarge { limit });
            }
            data.extend_from_slice(&chunk);
        }
        return Ok(data);
    }

    Err(Error::MissingFile)
}
