use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bcrypt::BcryptError;
use diesel::result::Error as DieselError;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_sessions::session::Error as SessionError;
use validator::{Validate, ValidationErrors};

// Login specific errors
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Database error")]
    DatabaseError(#[from] DieselError),
    #[error("Hashing error")]
    HashingError(#[from] BcryptError),
    #[error("Session error: {0}")]
    SessionError(String),
}

// Registration specific errors
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password too weak")]
    ValidationError(String),
    #[error("Database error")]
    DatabaseError(#[from] DieselError),
    #[error("Hashing error")]
    HashingError(#[from] BcryptError),
    #[error("Session error: {0}")]
    SessionError(String),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            LoginError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            LoginError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            LoginError::HashingError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Hashing error: {}", e),
            ),
            LoginError::SessionError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session error: {}", e),
            ),
        };

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RegisterError::EmailTaken => (StatusCode::CONFLICT, self.to_string()),
            RegisterError::ValidationError(e) => (StatusCode::BAD_REQUEST, e),
            RegisterError::DatabaseError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            RegisterError::HashingError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Hashing error: {}", e),
            ),
            RegisterError::SessionError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session error: {}", e),
            ),
        };

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<SessionError> for LoginError {
    fn from(err: SessionError) -> Self {
        LoginError::SessionError(err.to_string())
    }
}

impl From<SessionError> for RegisterError {
    fn from(err: SessionError) -> Self {
        RegisterError::SessionError(err.to_string())
    }
}

impl From<ValidationErrors> for RegisterError {
    fn from(err: ValidationErrors) -> Self {
        RegisterError::ValidationError(err.to_string())
    }
}

// Form structs
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}
