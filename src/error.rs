use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::models::Role;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mysql::Error),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Constraint(String),

    #[error("could not decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Admin access only")]
    AdminOnly { role: Role },

    #[error("Access denied. Admin privileges required.")]
    AdminLoginDenied { role: Role },

    #[error("{0}")]
    NotFound(String),

    #[error("Server error")]
    Server(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn server(err: impl std::fmt::Display) -> Self {
        AppError::Server(err.to_string())
    }

    fn body(&self) -> Value {
        match self {
            AppError::AdminOnly { role } => json!({
                "message": self.to_string(),
                "userRole": role,
            }),
            AppError::AdminLoginDenied { role } => json!({
                "message": self.to_string(),
                "role": role,
            }),
            AppError::Server(cause) => json!({
                "message": self.to_string(),
                "error": cause,
            }),
            _ => json!({ "message": self.to_string() }),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(message) | StoreError::Constraint(message) => {
                AppError::Validation(message)
            }
            other => AppError::server(other),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::server(err)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::server(err)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::AdminOnly { .. } | AppError::AdminLoginDenied { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Server(cause) = self {
            error!(%cause, "request failed");
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType(mime::APPLICATION_JSON))
            .body(self.body().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_constraints_become_validation_errors() {
        let err: AppError = StoreError::Constraint("Price cannot be less than minimum price".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = StoreError::Poisoned.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn forbidden_bodies_disclose_role() {
        let body = AppError::AdminOnly { role: Role::User }.body();
        assert_eq!(body["message"], "Admin access only");
        assert_eq!(body["userRole"], "user");

        let body = AppError::AdminLoginDenied { role: Role::User }.body();
        assert_eq!(body["role"], "user");
    }

    #[test]
    fn server_errors_carry_cause() {
        let body = AppError::server("connection refused").body();
        assert_eq!(body["message"], "Server error");
        assert_eq!(body["error"], "connection refused");
    }
}
