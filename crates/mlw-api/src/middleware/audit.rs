use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use super::auth::AuthUser;

/// Audit logging middleware.
///
/// Logs every API request as a structured `tracing` event, including the
/// requester once authentication has run.
pub async fn audit_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let requester = response
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.id.to_string());
    tracing::info!(
        method = %method,
        path = %uri,
        status = status,
        requester = requester.as_deref(),
        "api_request"
    );

    response
}
