use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use mlw_core::filter::{SurveyFilter, SurveyQuery};
use mlw_core::media_paths;
use mlw_core::models::ids::SurveyId;
use mlw_core::models::page::{Page, PageRequest};
use mlw_core::models::survey::{Survey, SurveyInput, SurveyPatch};
use mlw_storage::surveys;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub async fn list_surveys(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<SurveyQuery>, QueryRejection>,
) -> Result<Json<Page<Survey>>, ApiError> {
    let Query(query) = query?;
    let filter = SurveyFilter::from_query(user.id, &query)?;
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.page_size.as_deref(),
        state.pagination.default_size,
        state.pagination.max_size,
    )?;

    let page = surveys::list_surveys(&state.pool, &filter, page).await?;
    Ok(Json(page))
}

pub async fn get_survey(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<SurveyId>, PathRejection>,
) -> Result<Json<Survey>, ApiError> {
    let Path(id) = path?;
    let survey = surveys::get_survey(&state.pool, user.id, id).await?;
    Ok(Json(survey))
}

/// The requester becomes the owner; a fresh media directory is created for
/// the survey's files.
pub async fn create_survey(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<SurveyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Survey>), ApiError> {
    let Json(input) = payload?;
    let input = input.into_validated()?;

    let directory = media_paths::new_survey_directory();
    state.media.create_dir(&directory).await?;

    match surveys::create_survey(&state.pool, user.id, &input, &directory).await {
        Ok(survey) => Ok((StatusCode::CREATED, Json(survey))),
        Err(e) => {
            // The row never existed, so the fresh directory is unreferenced.
            if let Ok((path, outcome)) = state.media.remove_dir(&directory).await
                && let Err(cleanup) = outcome.into_result(&path)
            {
                tracing::warn!(error = %cleanup, "orphaned survey directory left behind");
            }
            Err(e.into())
        }
    }
}

pub async fn replace_survey(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<SurveyId>, PathRejection>,
    payload: Result<Json<SurveyInput>, JsonRejection>,
) -> Result<Json<Survey>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let input = input.into_validated()?;

    let survey = surveys::update_survey(&state.pool, user.id, id, &input).await?;
    Ok(Json(survey))
}

pub async fn patch_survey(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<SurveyId>, PathRejection>,
    payload: Result<Json<SurveyPatch>, JsonRejection>,
) -> Result<Json<Survey>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = payload?;

    let current = surveys::get_survey(&state.pool, user.id, id).await?;
    let input = patch.merge_into(&current).into_validated()?;

    let survey = surveys::update_survey(&state.pool, user.id, id, &input).await?;
    Ok(Json(survey))
}

/// Remove the survey's directory tree, then its row. A missing directory is
/// fine; any other filesystem failure keeps the row.
pub async fn delete_survey(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<SurveyId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let survey = surveys::get_survey(&state.pool, user.id, id).await?;

    let (path, outcome) = state.media.remove_dir(&survey.directory).await?;
    outcome.into_result(&path)?;

    surveys::delete_survey(&state.pool, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
