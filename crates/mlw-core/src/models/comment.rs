use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ids::{SurveyId, UserId};
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SurveyComment {
    pub id: i64,
    pub survey_id: SurveyId,
    pub owner_id: UserId,
    pub text: String,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// Payload for creating a comment. The owner always comes from the request
/// identity, never from the body.
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewComment {
    pub survey_id: SurveyId,
    pub text: String,
}

impl NewComment {
    pub fn into_validated(mut self) -> Result<Self, CoreError> {
        self.text = validate_text(&self.text)?;
        Ok(self)
    }
}

/// Payload for updating a comment. Only the body is mutable; `PATCH` may
/// omit it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentUpdate {
    #[serde(default)]
    pub text: Option<String>,
}

impl CommentUpdate {
    /// Resolve the new body against the existing comment. `require_text`
    /// is set for full updates (`PUT`).
    pub fn resolve(self, current: &SurveyComment, require_text: bool) -> Result<String, CoreError> {
        match self.text {
            Some(text) => validate_text(&text),
            None if require_text => Err(CoreError::MissingField("text".to_string())),
            None => Ok(current.text.clone()),
        }
    }
}

fn validate_text(text: &str) -> Result<String, CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::MissingField("text".to_string()));
    }
    Ok(text.to_string())
}
