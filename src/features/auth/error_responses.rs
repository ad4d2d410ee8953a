use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::data::models::{AppError, LoginError, RegisterError};

const INTERNAL_MESSAGE: &str = "Something went wrong, please try again later";

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = json!({
        "error": code,
        "message": message,
        "status": status.as_u16()
    });

    (status, Json(body)).into_response()
}

fn internal_error(detail: &dyn std::fmt::Debug) -> Response {
    log::error!("Internal error: {:?}", detail);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PlanLimitExceeded(_) | AppError::ProtectedResource(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::PlanLimitExceeded(limit) => limit.code(),
            AppError::ProtectedResource(_) => "protected_resource",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Unauthorized => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) | AppError::Pool(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return internal_error(&self);
        }

        error_response(status, self.code(), self.to_string())
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            LoginError::InvalidCredentials => error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            LoginError::DatabaseError(e) => internal_error(&e),
            LoginError::HashingError(e) => internal_error(&e),
            LoginError::SessionError(e) => internal_error(&e),
        }
    }
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        match self {
            RegisterError::EmailTaken | RegisterError::LoginTaken => {
                error_response(StatusCode::CONFLICT, "conflict", self.to_string())
            }
            RegisterError::ValidationError(e) => {
                error_response(StatusCode::BAD_REQUEST, "invalid_input", e)
            }
            RegisterError::DatabaseError(e) => internal_error(&e),
            RegisterError::HashingError(e) => internal_error(&e),
            RegisterError::SessionError(e) => internal_error(&e),
        }
    }
}
