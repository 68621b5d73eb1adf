use axum::extract::State;
use axum::{http::Method, middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod config;
mod database;
mod errors;
mod handlers;
mod lifecycle;
mod middleware;
mod models;
mod routes;
mod state;

use config::AppConfig;
use database::{connection::get_db_client, indexes::ensure_indexes};
use middleware::auth::{auth_middleware, job_auth_middleware};
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let db = get_db_client(&config.database_url).await;
    ensure_indexes(&db).await;

    let app_state = AppState::new(db, config);

    let app = build_router(app_state.clone());
    start_server(app, &app_state).await;
}

fn build_router(app_state: AppState) -> Router {
    // Permissive CORS: the job scheduler and the SPA both call across
    // origins, and preflight OPTIONS must answer 200.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    let auth = from_fn_with_state(app_state.clone(), auth_middleware);
    let job_auth = from_fn_with_state(app_state.clone(), job_auth_middleware);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest(
            "/api/properties",
            routes::properties::public_routes()
                .merge(routes::properties::owner_routes().route_layer(auth.clone())),
        )
        .nest("/api/bookings", routes::bookings::routes().layer(auth.clone()))
        .nest("/api/profile", routes::profiles::routes().layer(auth.clone()))
        .nest("/api/ratings", routes::ratings::routes().layer(auth.clone()))
        .nest(
            "/api/notifications",
            routes::notifications::routes().layer(auth),
        )
        .nest("/api/jobs", routes::jobs::routes().layer(job_auth))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn start_server(app: Router, app_state: &AppState) {
    let addr = SocketAddr::from((
        app_state
            .config
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| [0, 0, 0, 0].into()),
        app_state.config.port,
    ));

    tracing::info!("Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.unwrap();
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn root_handler() -> &'static str {
    "Saknak student housing API"
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! {"ping": 1}).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
