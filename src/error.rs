use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ErrorBody, InputShape};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("upload is not a decodable image: {0}")]
    Decode(String),

    #[error("image shape {actual} does not match the model input {expected}")]
    ShapeMismatch {
        expected: InputShape,
        actual: InputShape,
    },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("request has no `file` field")]
    MissingFile,

    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("malformed multipart payload: {0}")]
    Multipart(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("{labels} class labels configured but the model has {outputs} outputs")]
    LabelMismatch { labels: usize, outputs: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Stable identifier sent to clients in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Decode(_) => "decode_error",
            Error::ShapeMismatch { .. } => "shape_mismatch",
            Error::Inference(_) => "inference_error",
            Error::MissingFile => "missing_file",
            Error::PayloadTooLarge { .. } => "payload_too_large",
            Error::Multipart(_) => "bad_multipart",
            Error::ModelLoad(_) => "model_load_error",
            Error::LabelMismatch { .. } => "label_mismatch",
            Error::Config(_) => "config_error",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Decode(_) | Error::MissingFile | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Inference(_)
            | Error::ModelLoad(_)
            | Error::LabelMismatch { .. }
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Server-side details stay in the logs.
        let message = if self.status_code().is_server_error() {
            "the model could not classify this image".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message,
        })
    }
}
