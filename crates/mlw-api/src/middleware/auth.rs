use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use mlw_auth::error::AuthError;
use mlw_core::models::ids::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer token middleware.
///
/// Validates `Authorization: Bearer <token>` and inserts [`AuthUser`] into
/// the request extensions for handlers to use. The same value is copied to
/// the response so the audit log can name the requester.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;

    let id = state.verifier.verify(token).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected bearer token");
    })?;

    let user = AuthUser { id };
    req.extensions_mut().insert(user.clone());

    let mut response = next.run(req).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated requester.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: UserId,
}
