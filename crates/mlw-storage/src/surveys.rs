use std::collections::HashMap;

use mlw_core::filter::SurveyFilter;
use mlw_core::models::ids::{PatientId, SurveyId, UserId};
use mlw_core::models::page::{Page, PageRequest};
use mlw_core::models::survey::{Survey, SurveyInput};
use sqlx::{FromRow, QueryBuilder, SqliteConnection, SqlitePool};

use crate::error::StorageError;
use crate::query;

#[derive(Debug, FromRow)]
struct SurveyRow {
    id: i64,
    name: String,
    description: Option<String>,
    patient_id: Option<i64>,
    owner_id: i64,
    directory: String,
    created_at: String,
    updated_at: String,
}

impl SurveyRow {
    fn into_survey(self, user_ids: Vec<UserId>) -> Result<Survey, StorageError> {
        Ok(Survey {
            id: SurveyId(self.id),
            name: self.name,
            description: self.description,
            patient_id: self.patient_id.map(PatientId),
            owner_id: UserId(self.owner_id),
            user_ids,
            directory: self.directory,
            created_at: self.created_at.parse()?,
            updated_at: self.updated_at.parse()?,
        })
    }
}

/// One page of the surveys matching `filter`, newest first.
///
/// Asking for a page past the last one is an error, except page 1 of an
/// empty result.
pub async fn list_surveys(
    pool: &SqlitePool,
    filter: &SurveyFilter,
    page: PageRequest,
) -> Result<Page<Survey>, StorageError> {
    let mut conn = pool.acquire().await?;

    let count: i64 = query::count_surveys(filter)
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;
    let count = u64::try_from(count).unwrap_or_default();

    if page.is_out_of_range(count) {
        return Err(StorageError::PageOutOfRange { page: page.page });
    }

    let mut select = query::select_surveys(filter);
    select
        .push(" ORDER BY s.id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<SurveyRow> = select.build_query_as().fetch_all(&mut *conn).await?;
    let surveys = with_user_ids(&mut *conn, rows).await?;

    Ok(Page::new(surveys, count, page))
}

/// Look up a survey the requester may see. Surveys owned by and shared with
/// others are reported as not found.
pub async fn get_survey(
    pool: &SqlitePool,
    requester: UserId,
    id: SurveyId,
) -> Result<Survey, StorageError> {
    let mut conn = pool.acquire().await?;
    fetch_visible(&mut *conn, requester, id).await
}

/// Insert a survey owned by `owner`. `input` must already be validated.
pub async fn create_survey(
    pool: &SqlitePool,
    owner: UserId,
    input: &SurveyInput,
    directory: &str,
) -> Result<Survey, StorageError> {
    let now = jiff::Timestamp::now();
    let stamp = now.to_string();

    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO surveys (name, description, name_folded, description_folded,
                              patient_id, owner_id, directory, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(input.name.as_str())
    .bind(input.description.as_deref())
    .bind(query::fold_case(&input.name))
    .bind(input.description.as_deref().map(query::fold_case))
    .bind(input.patient_id.map(|p| p.0))
    .bind(owner.0)
    .bind(directory)
    .bind(stamp.as_str())
    .bind(stamp.as_str())
    .fetch_one(&mut *tx)
    .await?;

    replace_user_ids(&mut *tx, id, &input.user_ids).await?;
    tx.commit().await?;

    tracing::info!(survey_id = id, owner = %owner, directory, "survey created");

    Ok(Survey {
        id: SurveyId(id),
        name: input.name.clone(),
        description: input.description.clone(),
        patient_id: input.patient_id,
        owner_id: owner,
        user_ids: input.user_ids.clone(),
        directory: directory.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Replace the writable fields of a survey the requester may see.
pub async fn update_survey(
    pool: &SqlitePool,
    requester: UserId,
    id: SurveyId,
    input: &SurveyInput,
) -> Result<Survey, StorageError> {
    let mut tx = pool.begin().await?;

    let current = fetch_visible(&mut *tx, requester, id).await?;
    let now = jiff::Timestamp::now();

    sqlx::query(
        "UPDATE surveys SET name = ?, description = ?, name_folded = ?, description_folded = ?,
                            patient_id = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(input.name.as_str())
    .bind(input.description.as_deref())
    .bind(query::fold_case(&input.name))
    .bind(input.description.as_deref().map(query::fold_case))
    .bind(input.patient_id.map(|p| p.0))
    .bind(now.to_string())
    .bind(id.0)
    .execute(&mut *tx)
    .await?;

    replace_user_ids(&mut *tx, id.0, &input.user_ids).await?;
    tx.commit().await?;

    tracing::info!(survey_id = %id, requester = %requester, "survey updated");

    Ok(Survey {
        name: input.name.clone(),
        description: input.description.clone(),
        patient_id: input.patient_id,
        user_ids: input.user_ids.clone(),
        updated_at: now,
        ..current
    })
}

/// Delete the row of a survey the requester may see. Memberships and
/// comments go with it.
pub async fn delete_survey(
    pool: &SqlitePool,
    requester: UserId,
    id: SurveyId,
) -> Result<(), StorageError> {
    let mut builder = QueryBuilder::new("DELETE FROM surveys WHERE id IN (SELECT s.id FROM surveys s");
    query::push_survey_predicate(&mut builder, &SurveyFilter::visible_to(requester));
    builder.push(" AND s.id = ").push_bind(id.0).push(")");

    let result = builder.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::SurveyNotFound { id });
    }

    tracing::info!(survey_id = %id, requester = %requester, "survey deleted");
    Ok(())
}

async fn fetch_visible(
    conn: &mut SqliteConnection,
    requester: UserId,
    id: SurveyId,
) -> Result<Survey, StorageError> {
    let mut select = query::select_surveys(&SurveyFilter::visible_to(requester));
    select.push(" AND s.id = ").push_bind(id.0);

    let row: Option<SurveyRow> = select.build_query_as().fetch_optional(&mut *conn).await?;
    let row = row.ok_or(StorageError::SurveyNotFound { id })?;

    let mut surveys = with_user_ids(conn, vec![row]).await?;
    surveys.pop().ok_or(StorageError::SurveyNotFound { id })
}

/// Attach `user_ids` to each row, preserving row order.
async fn with_user_ids(
    conn: &mut SqliteConnection,
    rows: Vec<SurveyRow>,
) -> Result<Vec<Survey>, StorageError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder =
        QueryBuilder::new("SELECT survey_id, user_id FROM survey_users WHERE survey_id IN (");
    let mut ids = builder.separated(", ");
    for row in &rows {
        ids.push_bind(row.id);
    }
    ids.push_unseparated(") ORDER BY survey_id, user_id");

    let pairs: Vec<(i64, i64)> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut members: HashMap<i64, Vec<UserId>> = HashMap::new();
    for (survey_id, user_id) in pairs {
        members.entry(survey_id).or_default().push(UserId(user_id));
    }

    rows.into_iter()
        .map(|row| {
            let user_ids = members.remove(&row.id).unwrap_or_default();
            row.into_survey(user_ids)
        })
        .collect()
}

async fn replace_user_ids(
    conn: &mut SqliteConnection,
    survey_id: i64,
    user_ids: &[UserId],
) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM survey_users WHERE survey_id = ?")
        .bind(survey_id)
        .execute(&mut *conn)
        .await?;

    for user in user_ids {
        sqlx::query("INSERT OR IGNORE INTO survey_users (survey_id, user_id) VALUES (?, ?)")
            .bind(survey_id)
            .bind(user.0)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
