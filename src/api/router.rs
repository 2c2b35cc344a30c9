use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Full application router; everything except `/` and `/health` lives under `/api`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .nest("/api", api_routes(state.clone()))
        .fallback(public::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
        .fallback(public::not_found)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(public::register))
        .route("/auth/login", post(public::login))
        .route("/tenders", get(public::list_tenders))
        .route("/tenders/search", get(public::search_tenders))
        .route("/tenders/filter", get(public::filter_tenders))
        .route("/tenders/:id", get(public::get_tender))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tenders", post(protected::create_tender))
        .route(
            "/tenders/:id",
            put(protected::update_tender).delete(protected::delete_tender),
        )
        .route(
            "/tenders/:id/subscribe",
            post(protected::subscribe).delete(protected::unsubscribe),
        )
        .route("/tenders/:id/subscriptions/:user_id", get(protected::is_subscribed))
        .route("/users/:id", get(protected::get_user).put(protected::update_user))
        .route("/users/:id/password", put(protected::change_password))
        .route("/users/:id/subscriptions", get(protected::user_subscriptions))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}
