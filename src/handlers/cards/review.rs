use axum::extract::{Json, Path, State};
use chrono::Utc;

use super::{get_conn, require_user};
use crate::DbPool;
use crate::data::models::{CardError, CardResponse, ReviewRequest};
use crate::data::repositories::CardRepository;

/// Cards eligible for review right now, most overdue first.
pub async fn due_cards(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
) -> Result<Json<Vec<CardResponse>>, CardError> {
    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    let cards = CardRepository::due_for_review(&mut conn, user_id, Utc::now().naive_utc())?
        .into_iter()
        .map(CardResponse::from)
        .collect();

    Ok(Json(cards))
}

#[axum::debug_handler]
pub async fn mark_reviewed(
    State(pool): State<DbPool>,
    session: tower_sessions::Session,
    Path(card_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<CardResponse>, CardError> {
    let user_id = require_user(&session).await?;
    let mut conn = get_conn(&pool)?;

    let card = CardRepository::mark_reviewed(
        &mut conn,
        card_id,
        user_id,
        payload.was_correct,
        Utc::now().naive_utc(),
    )?
    .ok_or(CardError::NotFound)?;

    log::info!(
        "Card {} reviewed by user {} (correct: {}), next review {}",
        card_id,
        user_id,
        payload.was_correct,
        card.next_review_at
    );

    Ok(Json(CardResponse::from(card)))
}
