use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod models;
mod query;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::AppConfig::from_env();
    tracing::info!("Starting Estate API in {:?} mode", config.environment);

    let pool = database::connect(&config.database)
        .await
        .context("database connection failed")?;
    database::migrate(&pool).await.context("database migration failed")?;

    let port = config.server.port;
    let state = AppState::new(pool, config);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Estate API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes(state.clone()))
        .merge(property_routes(state.clone()))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use handlers::auth;

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route_layer(axum::middleware::from_fn_with_state(state, middleware::require_auth));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
}

fn property_routes(state: AppState) -> Router<AppState> {
    use handlers::properties;

    // Creating a listing is gated on role as well as authentication
    let create = Router::new()
        .route("/api/properties", post(properties::create))
        .route_layer(axum::middleware::from_fn(middleware::require_listing_role));

    let mutate = Router::new()
        .route("/api/properties/:id", put(properties::update).delete(properties::remove));

    let protected = create
        .merge(mutate)
        .route_layer(axum::middleware::from_fn_with_state(state, middleware::require_auth));

    Router::new()
        .route("/api/properties", get(properties::list))
        .route("/api/properties/:id", get(properties::get_one))
        .route("/api/properties/user/:user_id", get(properties::list_by_user))
        .merge(protected)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Estate API",
        "endpoints": {
            "auth": {
                "register": "POST /api/auth/register",
                "login": "POST /api/auth/login",
                "me": "GET /api/auth/me"
            },
            "properties": {
                "list": "GET /api/properties",
                "get": "GET /api/properties/:id",
                "create": "POST /api/properties",
                "update": "PUT /api/properties/:id",
                "delete": "DELETE /api/properties/:id",
                "byUser": "GET /api/properties/user/:userId"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
