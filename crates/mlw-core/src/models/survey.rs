use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use super::ids::{PatientId, SurveyId, UserId};
use crate::error::CoreError;

/// Longest accepted survey name, in characters.
pub const NAME_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Survey {
    pub id: SurveyId,
    pub name: String,
    pub description: Option<String>,
    pub patient_id: Option<PatientId>,
    pub owner_id: UserId,
    /// Identities granted access besides the owner. Sorted, no duplicates.
    pub user_ids: Vec<UserId>,
    /// Storage path relative to the media root.
    pub directory: String,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Survey {
    /// Whether `user` may see and modify this survey.
    pub fn is_visible_to(&self, user: UserId) -> bool {
        self.owner_id == user || self.user_ids.contains(&user)
    }
}

/// Client-writable survey fields, used for create and full update.
///
/// Any `ownerId`, `directory` or `id` sent by the client is not part of this
/// type and is dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SurveyInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub patient_id: Option<PatientId>,
    #[serde(default)]
    pub user_ids: Vec<UserId>,
}

impl SurveyInput {
    /// Validate and normalize: trims the name, collapses a blank description
    /// to `None`, and sorts/dedups `user_ids`.
    pub fn into_validated(mut self) -> Result<Self, CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::MissingField("name".to_string()));
        }
        if name.chars().count() > NAME_MAX_CHARS {
            return Err(CoreError::InvalidField {
                field: "name".to_string(),
                reason: format!("must be at most {NAME_MAX_CHARS} characters"),
            });
        }
        self.name = name.to_string();

        self.description = self
            .description
            .filter(|d| !d.trim().is_empty());

        self.user_ids.sort_unstable();
        self.user_ids.dedup();

        Ok(self)
    }
}

/// Partial survey update. Absent fields are left unchanged; an explicit
/// `null` clears `description` or `patientId`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub patient_id: Option<Option<PatientId>>,
    #[serde(default)]
    pub user_ids: Option<Vec<UserId>>,
}

impl SurveyPatch {
    /// Overlay this patch on the current state of `survey`.
    pub fn merge_into(self, survey: &Survey) -> SurveyInput {
        SurveyInput {
            name: self.name.unwrap_or_else(|| survey.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| survey.description.clone()),
            patient_id: self.patient_id.unwrap_or(survey.patient_id),
            user_ids: self.user_ids.unwrap_or_else(|| survey.user_ids.clone()),
        }
    }
}

/// Distinguishes a field sent as `null` (`Some(None)`) from one left out
/// (`None`, via `#[serde(default)]`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
