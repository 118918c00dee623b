use mlw_core::filter::CommentFilter;
use mlw_core::models::comment::{NewComment, SurveyComment};
use mlw_core::models::ids::{SurveyId, UserId};
use sqlx::{FromRow, SqlitePool};

use crate::error::StorageError;
use crate::query;

#[derive(Debug, FromRow)]
struct CommentRow {
    id: i64,
    survey_id: i64,
    owner_id: i64,
    text: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CommentRow> for SurveyComment {
    type Error = StorageError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(SurveyComment {
            id: row.id,
            survey_id: SurveyId(row.survey_id),
            owner_id: UserId(row.owner_id),
            text: row.text,
            created_at: row.created_at.parse()?,
            updated_at: row.updated_at.parse()?,
        })
    }
}

/// All comments on one survey, oldest first. Visibility of the survey
/// itself is not checked.
pub async fn list_comments(
    pool: &SqlitePool,
    filter: CommentFilter,
) -> Result<Vec<SurveyComment>, StorageError> {
    let mut select = query::select_comments(filter);
    select.push(" ORDER BY c.id ASC");

    let rows: Vec<CommentRow> = select.build_query_as().fetch_all(pool).await?;
    rows.into_iter().map(SurveyComment::try_from).collect()
}

/// Insert a comment owned by `owner`. A reference to a missing survey is
/// reported as [`StorageError::DanglingSurvey`].
pub async fn create_comment(
    pool: &SqlitePool,
    owner: UserId,
    comment: &NewComment,
) -> Result<SurveyComment, StorageError> {
    let now = jiff::Timestamp::now();
    let stamp = now.to_string();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO survey_comments (survey_id, owner_id, text, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(comment.survey_id.0)
    .bind(owner.0)
    .bind(comment.text.as_str())
    .bind(stamp.as_str())
    .bind(stamp.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StorageError::DanglingSurvey {
                id: comment.survey_id,
            }
        }
        other => StorageError::Database(other),
    })?;

    tracing::info!(comment_id = id, survey_id = %comment.survey_id, owner = %owner, "comment created");

    Ok(SurveyComment {
        id,
        survey_id: comment.survey_id,
        owner_id: owner,
        text: comment.text.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Look up a comment by id. With a `scope`, it must also belong to that
/// survey.
pub async fn get_comment(
    pool: &SqlitePool,
    id: i64,
    scope: Option<CommentFilter>,
) -> Result<SurveyComment, StorageError> {
    let row: Option<CommentRow> = query::select_comment(id, scope)
        .build_query_as()
        .fetch_optional(pool)
        .await?;

    row.ok_or(StorageError::CommentNotFound { id })?.try_into()
}

/// Replace the body of `current`, as fetched by [`get_comment`]. A comment
/// deleted in between is reported as not found.
pub async fn update_comment(
    pool: &SqlitePool,
    current: SurveyComment,
    text: &str,
) -> Result<SurveyComment, StorageError> {
    let id = current.id;
    let now = jiff::Timestamp::now();

    let result = sqlx::query("UPDATE survey_comments SET text = ?, updated_at = ? WHERE id = ?")
        .bind(text)
        .bind(now.to_string())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::CommentNotFound { id });
    }

    Ok(SurveyComment {
        text: text.to_string(),
        updated_at: now,
        ..current
    })
}

pub async fn delete_comment(
    pool: &SqlitePool,
    id: i64,
    scope: Option<CommentFilter>,
) -> Result<(), StorageError> {
    let mut builder = sqlx::QueryBuilder::new("DELETE FROM survey_comments WHERE id = ");
    builder.push_bind(id);
    if let Some(scope) = scope {
        builder.push(" AND survey_id = ").push_bind(scope.survey_id.0);
    }

    let result = builder.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::CommentNotFound { id });
    }

    tracing::info!(comment_id = id, "comment deleted");
    Ok(())
}
