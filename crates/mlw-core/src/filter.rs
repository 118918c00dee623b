//! Filter specifications built from list query parameters.
//!
//! These are plain values; `mlw_storage::query` turns them into SQL.

use serde::Deserialize;

use crate::error::CoreError;
use crate::models::ids::{PatientId, SurveyId, UserId};

/// Raw query string of `GET /surveys/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuery {
    pub search_text: Option<String>,
    pub patient_id: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Raw query string of the `/survey-comments/` routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub survey_id: Option<String>,
}

/// Which surveys a list or lookup may return.
///
/// A survey matches when the requester is its owner or one of its users,
/// AND (if `search_text` is set) its name or description contains the text
/// case-insensitively, AND (if `patient_id` is set) its patient matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyFilter {
    pub requester: UserId,
    pub search_text: Option<String>,
    pub patient_id: Option<PatientId>,
}

impl SurveyFilter {
    /// Only the visibility clause.
    pub fn visible_to(requester: UserId) -> Self {
        Self {
            requester,
            search_text: None,
            patient_id: None,
        }
    }

    pub fn from_query(requester: UserId, query: &SurveyQuery) -> Result<Self, CoreError> {
        let patient_id = query
            .patient_id
            .as_deref()
            .map(|raw| {
                raw.parse::<PatientId>().map_err(|_| CoreError::InvalidField {
                    field: "patientId".to_string(),
                    reason: format!("expected an integer, got {raw:?}"),
                })
            })
            .transpose()?;

        Ok(Self {
            requester,
            // An empty search text is still a filter; it matches everything.
            search_text: query.search_text.clone(),
            patient_id,
        })
    }
}

/// Which comments a list may return: those attached to one survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentFilter {
    pub survey_id: SurveyId,
}

impl CommentFilter {
    /// Listing requires `surveyId`; without it the request is rejected
    /// instead of returning an unscoped or empty list.
    pub fn from_query(query: &CommentQuery) -> Result<Self, CoreError> {
        let raw = query
            .survey_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::MissingField("surveyId".to_string()))?;

        Ok(Self {
            survey_id: parse_survey_id(raw)?,
        })
    }

    /// Optional scoping for comment detail routes.
    pub fn optional_from_query(query: &CommentQuery) -> Result<Option<Self>, CoreError> {
        match query.survey_id.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(Self {
                survey_id: parse_survey_id(raw)?,
            })),
            _ => Ok(None),
        }
    }
}

fn parse_survey_id(raw: &str) -> Result<SurveyId, CoreError> {
    raw.parse::<SurveyId>().map_err(|_| CoreError::InvalidField {
        field: "surveyId".to_string(),
        reason: format!("expected an integer, got {raw:?}"),
    })
}
