use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use diesel::result::Error as DieselError;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::schema::cards;

/// A flashcard row as stored. `tags` is a JSON-encoded string list.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Card {
    pub card_id: i32,
    pub user_id: i32,
    pub question: String,
    pub answer: String,
    pub language: String,
    pub tags: String,
    pub is_active: bool,
    pub review_count: i32,
    pub next_review_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = cards)]
pub struct NewCard<'a> {
    pub user_id: i32,
    pub question: &'a str,
    pub answer: &'a str,
    pub language: &'a str,
    pub tags: String,
    pub next_review_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update; fields left at `None` keep their stored value.
#[derive(AsChangeset)]
#[diesel(table_name = cards)]
pub struct CardChanges {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub language: Option<String>,
    pub tags: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Card as exposed over the API, with tags decoded back to a list.
#[derive(Serialize, Debug)]
pub struct CardResponse {
    pub card_id: i32,
    pub question: String,
    pub answer: String,
    pub language: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub review_count: i32,
    pub next_review_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        let tags = serde_json::from_str(&card.tags).unwrap_or_default();
        CardResponse {
            card_id: card.card_id,
            question: card.question,
            answer: card.answer,
            language: card.language,
            tags,
            is_active: card.is_active,
            review_count: card.review_count,
            next_review_at: card.next_review_at,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateCardRequest {
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
    #[validate(length(min = 1, message = "Language is required"))]
    pub language: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UpdateCardRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub was_correct: bool,
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

// Errors for the card API
#[derive(Error, Debug)]
pub enum CardError {
    #[error("Not logged in")]
    Unauthorized,
    #[error("Card not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Database error")]
    Database(#[from] DieselError),
    #[error("Connection pool error: {0}")]
    Pool(String),
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CardError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            CardError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            CardError::Validation(e) => (StatusCode::BAD_REQUEST, e),
            CardError::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            CardError::Pool(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Connection pool error: {}", e),
            ),
        };

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationErrors> for CardError {
    fn from(err: ValidationErrors) -> Self {
        CardError::Validation(err.to_string())
    }
}
