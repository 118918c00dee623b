//! mlw-api
//!
//! HTTP surface of the survey service.

use axum::middleware as axum_mw;
use axum::routing::{get, MethodRouter};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = [
        (
            "/surveys",
            get(routes::surveys::list_surveys).post(routes::surveys::create_survey),
        ),
        (
            "/surveys/{id}",
            get(routes::surveys::get_survey)
                .put(routes::surveys::replace_survey)
                .patch(routes::surveys::patch_survey)
                .delete(routes::surveys::delete_survey),
        ),
        (
            "/survey-comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        ),
        (
            "/survey-comments/{id}",
            get(routes::comments::get_comment)
                .put(routes::comments::replace_comment)
                .patch(routes::comments::patch_comment)
                .delete(routes::comments::delete_comment),
        ),
    ]
    .into_iter()
    .fold(Router::new(), |router, (path, methods)| with_trailing_slash(router, path, methods))
    .route_layer(axum_mw::from_fn_with_state(
        state.clone(),
        middleware::auth::require_auth,
    ));

    Router::new()
        // Health (no auth)
        .route("/health", get(routes::health::health_check))
        .merge(protected)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}

/// Register `methods` at `path` and `path/`; clients use both forms.
fn with_trailing_slash(
    router: Router<AppState>,
    path: &str,
    methods: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}
