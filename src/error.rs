use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::models::ApiResponse;
use crate::service::AccountError;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")] BadRequest(String),
    #[error("{0}")] Conflict(String),
    #[error("invalid username or password")] Unauthorized,
    #[error("not found")] NotFound,
    #[error("internal server error")] Internal,
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::MissingFields | AccountError::WeakPassword(_) => {
                ApiError::BadRequest(e.to_string())
            }
            AccountError::Conflict { .. } => ApiError::Conflict(e.to_string()),
            AccountError::AuthFailure => ApiError::Unauthorized,
            // details stay in the server log
            AccountError::Storage(_) => ApiError::Internal,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ApiResponse::failure(self.to_string());
        let body = match self {
            ApiError::Conflict(_) => body.with_user_exists(),
            _ => body,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
