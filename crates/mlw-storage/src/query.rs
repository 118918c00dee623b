//! Translation of filter specifications into SQL.
//!
//! Every builder here is deterministic: the same filter always produces the
//! same SQL text, with values passed as bind parameters.

use mlw_core::filter::{CommentFilter, SurveyFilter};
use sqlx::{QueryBuilder, Sqlite};

pub const SURVEY_COLUMNS: &str = "s.id, s.name, s.description, s.patient_id, s.owner_id, \
                                  s.directory, s.created_at, s.updated_at";

pub const COMMENT_COLUMNS: &str = "c.id, c.survey_id, c.owner_id, c.text, c.created_at, c.updated_at";

/// `SELECT` over `surveys s` restricted to rows matching `filter`.
pub fn select_surveys(filter: &SurveyFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!("SELECT {SURVEY_COLUMNS} FROM surveys s"));
    push_survey_predicate(&mut builder, filter);
    builder
}

/// `SELECT COUNT(*)` over the rows `select_surveys` would return.
pub fn count_surveys(filter: &SurveyFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM surveys s");
    push_survey_predicate(&mut builder, filter);
    builder
}

/// Append the `WHERE` clause for `filter`. The query must alias the
/// surveys table as `s`.
pub fn push_survey_predicate(builder: &mut QueryBuilder<'_, Sqlite>, filter: &SurveyFilter) {
    let requester = filter.requester.0;
    builder
        .push(" WHERE (s.owner_id = ")
        .push_bind(requester)
        .push(
            " OR EXISTS (SELECT 1 FROM survey_users su \
             WHERE su.survey_id = s.id AND su.user_id = ",
        )
        .push_bind(requester)
        .push("))");

    if let Some(text) = &filter.search_text {
        let pattern = contains_pattern(&fold_case(text));
        builder
            .push(" AND (s.name_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR s.description_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(patient) = filter.patient_id {
        builder.push(" AND s.patient_id = ").push_bind(patient.0);
    }
}

/// `SELECT` over `survey_comments c` attached to the filtered survey.
pub fn select_comments(filter: CommentFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {COMMENT_COLUMNS} FROM survey_comments c WHERE c.survey_id = "
    ));
    builder.push_bind(filter.survey_id.0);
    builder
}

/// `SELECT` of a single comment, optionally required to belong to a survey.
pub fn select_comment(id: i64, scope: Option<CommentFilter>) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {COMMENT_COLUMNS} FROM survey_comments c WHERE c.id = "
    ));
    builder.push_bind(id);
    if let Some(scope) = scope {
        builder.push(" AND c.survey_id = ").push_bind(scope.survey_id.0);
    }
    builder
}

/// Case folding applied to stored `*_folded` columns and to `searchText`.
///
/// SQLite's LIKE folds ASCII case only, so both sides are lowercased here.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// A LIKE pattern matching any value that contains `text` literally.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
