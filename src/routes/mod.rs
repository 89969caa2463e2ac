use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{optional_auth, require_auth};
use crate::state::AppState;

/// Full application router, mounted under `/api/v1`
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(user_routes(state.clone()))
        .merge(article_routes(state))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health))
        .route("/users", post(public::create_user))
        .route("/users/login", post(public::login_user))
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            get(protected::get_current_user)
                .put(protected::update_user)
                .patch(protected::update_user),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

fn article_routes(state: AppState) -> Router<AppState> {
    let required = from_fn_with_state(state.clone(), require_auth);
    let optional = from_fn_with_state(state, optional_auth);

    Router::new()
        .route(
            "/articles",
            get(protected::list_articles)
                .route_layer(optional)
                .merge(post(protected::create_article).route_layer(required.clone())),
        )
        .route(
            "/articles/:slug",
            get(protected::get_article)
                .put(protected::update_article)
                .patch(protected::update_article)
                .delete(protected::delete_article)
                .route_layer(required),
        )
}

/// `*` in the configured origins allows any origin
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let allow_origin = if security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
