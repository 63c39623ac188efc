pub mod crud;
pub mod review;

use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use tower_sessions::Session;

use crate::DbPool;
use crate::data::models::CardError;
use crate::utils;

pub(crate) async fn require_user(session: &Session) -> Result<i32, CardError> {
    utils::get_current_user_id(session)
        .await
        .ok_or(CardError::Unauthorized)
}

pub(crate) fn get_conn(
    pool: &DbPool,
) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, CardError> {
    pool.get().map_err(|e| {
        log::error!("Failed to get DB connection: {}", e);
        CardError::Pool(e.to_string())
    })
}
