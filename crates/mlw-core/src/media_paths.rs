//! Media directory conventions.
//!
//! Pure path functions, no filesystem access. A survey's `directory` is
//! stored relative to the media root and resolved here.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::CoreError;

pub const SURVEYS_PREFIX: &str = "surveys";

pub fn survey_directory(key: Uuid) -> String {
    format!("{SURVEYS_PREFIX}/{key}")
}

/// A fresh, unique directory for a survey being created.
pub fn new_survey_directory() -> String {
    survey_directory(Uuid::new_v4())
}

/// Resolve a relative media directory to an absolute location under
/// `media_root`.
///
/// Rejects empty paths (which would name the media root itself), absolute
/// paths, and any `..` component.
pub fn resolve(media_root: &Path, directory: &str) -> Result<PathBuf, CoreError> {
    let relative = Path::new(directory);
    let mut has_normal = false;

    for component in relative.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(CoreError::UnsafeDirectory(directory.to_string()));
            }
        }
    }

    if !has_normal {
        return Err(CoreError::UnsafeDirectory(directory.to_string()));
    }

    Ok(media_root.join(relative))
}
