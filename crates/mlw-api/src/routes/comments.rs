use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use mlw_core::filter::{CommentFilter, CommentQuery};
use mlw_core::models::comment::{CommentUpdate, NewComment, SurveyComment};
use mlw_storage::comments;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Comments of `?surveyId=`, for any authenticated requester.
pub async fn list_comments(
    State(state): State<AppState>,
    query: Result<Query<CommentQuery>, QueryRejection>,
) -> Result<Json<Vec<SurveyComment>>, ApiError> {
    let Query(query) = query?;
    let filter = CommentFilter::from_query(&query)?;
    let comments = comments::list_comments(&state.pool, filter).await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<SurveyComment>), ApiError> {
    let Json(comment) = payload?;
    let comment = comment.into_validated()?;

    let created = comments::create_comment(&state.pool, user.id, &comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CommentQuery>, QueryRejection>,
) -> Result<Json<SurveyComment>, ApiError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let scope = CommentFilter::optional_from_query(&query)?;
    let comment = comments::get_comment(&state.pool, id, scope).await?;
    Ok(Json(comment))
}

pub async fn replace_comment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CommentQuery>, QueryRejection>,
    payload: Result<Json<CommentUpdate>, JsonRejection>,
) -> Result<Json<SurveyComment>, ApiError> {
    update(state, path?.0, query?.0, payload, true).await
}

pub async fn patch_comment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CommentQuery>, QueryRejection>,
    payload: Result<Json<CommentUpdate>, JsonRejection>,
) -> Result<Json<SurveyComment>, ApiError> {
    update(state, path?.0, query?.0, payload, false).await
}

pub async fn delete_comment(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<CommentQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let scope = CommentFilter::optional_from_query(&query)?;
    comments::delete_comment(&state.pool, id, scope).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update(
    state: AppState,
    id: i64,
    query: CommentQuery,
    payload: Result<Json<CommentUpdate>, JsonRejection>,
    require_text: bool,
) -> Result<Json<SurveyComment>, ApiError> {
    let Json(update) = payload?;
    let scope = CommentFilter::optional_from_query(&query)?;

    let current = comments::get_comment(&state.pool, id, scope).await?;
    let text = update.resolve(&current, require_text)?;

    let comment = comments::update_comment(&state.pool, current, &text).await?;
    Ok(Json(comment))
}
