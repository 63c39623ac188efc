use axum::extract::{Json, Path, State};
use chrono::Utc;
use validator::Validate;

use super::{get_conn, require_user};
use crate::DbPool;
use crate::data::models::{
    ApiResponse, CardChanges, CardError, CardResponse, CreateCardRequest, UpdateCardRequest,
};
use crate::data::repositories::CardRepository;
use crate::data::repositories::card::encode_tags;

pub async fn list_cards(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<CardResponse>>, CardError> {
    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    let cards = CardRepository::list_for_user(&mut conn, user_id)?
        .into_iter()
        .map(CardResponse::from)
        .collect();

    Ok(Json(cards))
}

#[axum::debug_handler]
pub async fn create_card(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Json(payload): Json<CreateCardRequest>,
) -> Result<Json<CardResponse>, CardError> {
    payload.validate()?;

    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    let card = CardRepository::create(
        &mut conn,
        user_id,
        &payload.question,
        &payload.answer,
        &payload.language,
        payload.tags.as_deref().unwrap_or_default(),
        Utc::now().naive_utc(),
    )?;

    log::info!("Card {} created for user {}", card.card_id, user_id);
    Ok(Json(CardResponse::from(card)))
}

#[axum::debug_handler]
pub async fn update_card(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Path(card_id): Path<i32>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<CardResponse>, CardError> {
    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    let changes = CardChanges {
        question: payload.question,
        answer: payload.answer,
        language: payload.language,
        tags: payload.tags.map(|t| encode_tags(&t)),
        updated_at: Utc::now().naive_utc(),
    };

    let card = CardRepository::update(&mut conn, card_id, user_id, changes)?
        .ok_or(CardError::NotFound)?;

    Ok(Json(CardResponse::from(card)))
}

pub async fn delete_card(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Path(card_id): Path<i32>,
) -> Result<Json<ApiResponse>, CardError> {
    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    if !CardRepository::delete(&mut conn, card_id, user_id)? {
        return Err(CardError::NotFound);
    }

    Ok(Json(ApiResponse {
        success: true,
        message: "Card deleted successfully".to_string(),
    }))
}

pub async fn toggle_card_active(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Path(card_id): Path<i32>,
) -> Result<Json<CardResponse>, CardError> {
    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    let card =
        CardRepository::toggle_active(&mut conn, card_id, user_id, Utc::now().naive_utc())?
            .ok_or(CardError::NotFound)?;

    Ok(Json(CardResponse::from(card)))
}
