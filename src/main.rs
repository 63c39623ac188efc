use axum::{
    Router,
    extract::Extension,
    response::{IntoResponse, Redirect},
    routing::{get, get_service, post},
};
use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool},
};
use std::sync::Arc;
use tera::{Context, Tera};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

mod data;
mod handlers;
mod scheduler;
mod schema;
mod utils;

use handlers::{auth, cards};

type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[tokio::main]
async fn main() {
    // Database configuration
    dotenv::dotenv().ok();
    env_logger::init();
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://cards.db".into());

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .expect("Failed to create DB pool");

    // Templates configuration
    let templates = match Tera::new("templates/**/*.html") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    let templates = Arc::new(templates);

    // Sessions configuration
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_secure(false);

    // Card API router
    let card_api_router = Router::new()
        .route("/", get(cards::crud::list_cards))
        .route("/create", post(cards::crud::create_card))
        .route("/{card_id}/update", post(cards::crud::update_card))
        .route("/{card_id}/delete", post(cards::crud::delete_card))
        .route("/{card_id}/toggle", post(cards::crud::toggle_card_active))
        .route("/due", get(cards::review::due_cards))
        .route("/{card_id}/review", post(cards::review::mark_reviewed))
        .with_state(pool.clone());

    let api_router = Router::new().nest("/cards", card_api_router);

    // Auth router
    let auth_router = Router::new()
        .merge(auth::login::auth_router(pool.clone(), templates.clone()))
        .merge(auth::register::auth_router(pool.clone(), templates.clone()))
        .route("/logout", get(handle_logout));

    // Main application router
    let app = Router::new()
        // Static pages
        .route("/", get(home))
        // Dashboard
        .route("/dashboard", get(dashboard))
        .route("/dashboard/cards", get(cards_page))
        .route("/dashboard/practice", get(practice_page))
        // Auth routes
        .nest("/auth", auth_router)
        // API routes
        .nest("/api", api_router)
        // Static files
        .nest_service("/static", get_service(ServeDir::new("static")))
        // Shared state and layers
        .layer(Extension(templates))
        .layer(session_layer);

    // Start server
    let listener = match TcpListener::bind("127.0.0.1:5000").await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to address: {}", e);
            std::process::exit(1);
        }
    };

    println!("Server running on http://localhost:5000");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

// Handlers for static pages
async fn home(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "home.html", Context::new())
}

async fn dashboard(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "dashboard.html", Context::new())
}

async fn cards_page(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "cards.html", Context::new())
}

async fn practice_page(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "practice.html", Context::new())
}

// Auth handlers
async fn handle_logout(
    session: tower_sessions::Session,
) -> Result<Redirect, data::models::LoginError> {
    session.delete().await.map_err(|e| {
        log::error!("Failed to delete session: {}", e);
        data::models::LoginError::SessionError("Failed to logout".into())
    })?;
    Ok(Redirect::to("/"))
}
