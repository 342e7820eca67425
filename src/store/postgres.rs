use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{duplicate_email, ApplicationStore};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationFilter, ApplicationPatch, ApplicationRecord, LookupKey, NewApplication,
    SurveyAnswers, TraitScores, STATUS_SURVEY_COMPLETED,
};

const COLUMNS: &str = r#"
    id, candidate_id, name, first_name, last_name, email, phone, location, position,
    position_id, passport_country, golf_handicap, message, resume_url, status,
    survey_completed, trait_scores, answers, survey_id, survey_completed_at,
    interview_id, interview_url, interview_status, interview_completed,
    interview_video_url, interview_share_url, interview_completed_at,
    interview_updated_at, created_at
"#;

// $1 is the row selector (id or lookup value); $2..$16 come from `bind_patch`.
const SET_PATCH: &str = r#"
    status = COALESCE($2, status),
    resume_url = COALESCE($3, resume_url),
    survey_completed = COALESCE($4, survey_completed),
    trait_scores = COALESCE($5, trait_scores),
    answers = COALESCE($6, answers),
    survey_id = COALESCE($7, survey_id),
    survey_completed_at = COALESCE($8, survey_completed_at),
    interview_id = COALESCE($9, interview_id),
    interview_url = COALESCE($10, interview_url),
    interview_status = COALESCE($11, interview_status),
    interview_completed = COALESCE($12, interview_completed),
    interview_video_url = COALESCE($13, interview_video_url),
    interview_share_url = COALESCE($14, interview_share_url),
    interview_completed_at = COALESCE(interview_completed_at, $15),
    interview_updated_at = COALESCE($16, interview_updated_at)
"#;

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    candidate_id: Option<String>,
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
    phone: Option<String>,
    location: Option<String>,
    position: Option<String>,
    position_id: Option<String>,
    passport_country: Option<String>,
    golf_handicap: Option<String>,
    message: Option<String>,
    resume_url: Option<String>,
    status: String,
    survey_completed: bool,
    trait_scores: Option<Json<TraitScores>>,
    answers: Option<Json<SurveyAnswers>>,
    survey_id: Option<String>,
    survey_completed_at: Option<DateTime<Utc>>,
    interview_id: Option<String>,
    interview_url: Option<String>,
    interview_status: Option<String>,
    interview_completed: bool,
    interview_video_url: Option<String>,
    interview_share_url: Option<String>,
    interview_completed_at: Option<DateTime<Utc>>,
    interview_updated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ApplicationRecord {
    fn from(row: ApplicationRow) -> Self {
        ApplicationRecord {
            id: row.id,
            candidate_id: row.candidate_id,
            name: row.name,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            position: row.position,
            position_id: row.position_id,
            passport_country: row.passport_country,
            golf_handicap: row.golf_handicap,
            message: row.message,
            resume_url: row.resume_url,
            status: row.status.into(),
            survey_completed: row.survey_completed,
            trait_scores: row.trait_scores.map(|j| j.0),
            answers: row.answers.map(|j| j.0),
            survey_id: row.survey_id,
            survey_completed_at: row.survey_completed_at,
            interview_id: row.interview_id,
            interview_url: row.interview_url,
            interview_status: row.interview_status,
            interview_completed: row.interview_completed,
            interview_video_url: row.interview_video_url,
            interview_share_url: row.interview_share_url,
            interview_completed_at: row.interview_completed_at,
            interview_updated_at: row.interview_updated_at,
            timestamp: row.created_at,
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";

fn insert_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            duplicate_email()
        }
        _ => err.into(),
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with its wildcards taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// Survey-only rows: see `ApplicationRecord::is_survey_only`.
const SURVEY_ONLY: &str =
    "email = $1 AND status = $2 AND phone IS NULL AND location IS NULL AND message IS NULL";

type RowQuery<'q> = QueryAs<'q, Postgres, ApplicationRow, PgArguments>;

fn bind_patch<'q>(query: RowQuery<'q>, patch: &ApplicationPatch) -> RowQuery<'q> {
    query
        .bind(patch.status.as_ref().map(|s| s.as_str().to_string()))
        .bind(patch.resume_url.clone())
        .bind(patch.survey_completed)
        .bind(patch.trait_scores.clone().map(Json))
        .bind(patch.answers.clone().map(Json))
        .bind(patch.survey_id.clone())
        .bind(patch.survey_completed_at)
        .bind(patch.interview_id.clone())
        .bind(patch.interview_url.clone())
        .bind(patch.interview_status.clone())
        .bind(patch.interview_completed)
        .bind(patch.interview_video_url.clone())
        .bind(patch.interview_share_url.clone())
        .bind(patch.interview_completed_at)
        .bind(patch.interview_updated_at)
}

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, app: NewApplication) -> Result<ApplicationRecord> {
        let sql = format!(
            r#"
            INSERT INTO applications (
                candidate_id, name, first_name, last_name, email, phone, location, position,
                position_id, passport_country, golf_handicap, message, resume_url, status,
                survey_completed, trait_scores, answers, survey_id, survey_completed_at,
                created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19,
                $20
            )
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(app.candidate_id)
            .bind(app.name)
            .bind(app.first_name)
            .bind(app.last_name)
            .bind(app.email)
            .bind(app.phone)
            .bind(app.location)
            .bind(app.position)
            .bind(app.position_id)
            .bind(app.passport_country)
            .bind(app.golf_handicap)
            .bind(app.message)
            .bind(app.resume_url)
            .bind(String::from(app.status))
            .bind(app.survey_completed)
            .bind(app.trait_scores.map(Json))
            .bind(app.answers.map(Json))
            .bind(app.survey_id)
            .bind(app.survey_completed_at)
            .bind(app.timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_error)?;
        Ok(row.into())
    }

    async fn merge_into_survey_only(
        &self,
        app: &NewApplication,
    ) -> Result<Option<ApplicationRecord>> {
        let sql = format!(
            r#"
            UPDATE applications SET
                candidate_id = COALESCE(candidate_id, $3),
                name = COALESCE($4, name),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                phone = COALESCE($7, phone),
                location = COALESCE($8, location),
                position = COALESCE($9, position),
                position_id = COALESCE($10, position_id),
                passport_country = COALESCE($11, passport_country),
                golf_handicap = COALESCE($12, golf_handicap),
                message = COALESCE($13, message),
                resume_url = COALESCE($14, resume_url)
            WHERE id = (
                SELECT id FROM applications
                WHERE {SURVEY_ONLY}
                ORDER BY created_at DESC, seq DESC
                LIMIT 1
            )
            AND {SURVEY_ONLY}
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(&app.email)
            .bind(STATUS_SURVEY_COMPLETED)
            .bind(&app.candidate_id)
            .bind(&app.name)
            .bind(&app.first_name)
            .bind(&app.last_name)
            .bind(&app.phone)
            .bind(&app.location)
            .bind(&app.position)
            .bind(&app.position_id)
            .bind(&app.passport_country)
            .bind(&app.golf_handicap)
            .bind(&app.message)
            .bind(&app.resume_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM applications WHERE id = $1");
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_latest_by(&self, key: &LookupKey) -> Result<Option<ApplicationRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM applications WHERE {} = $1 ORDER BY created_at DESC, seq DESC LIMIT 1",
            key.column()
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(key.value())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationRecord>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM applications WHERE TRUE"));
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(position) = &filter.position {
            qb.push(" AND position = ").push_bind(position.clone());
        }
        if let Some(country) = &filter.country {
            qb.push(" AND passport_country = ").push_bind(country.clone());
        }
        if let Some(search) = &filter.search {
            let pattern = contains_pattern(search);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR position ILIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
        qb.push(" ORDER BY created_at DESC, seq DESC");

        let rows = qb
            .build_query_as::<ApplicationRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ApplicationPatch,
    ) -> Result<Option<ApplicationRecord>> {
        let sql = format!("UPDATE applications SET {SET_PATCH} WHERE id = $1 RETURNING {COLUMNS}");
        let row = bind_patch(sqlx::query_as::<_, ApplicationRow>(&sql).bind(id), patch)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn update_latest_by(
        &self,
        key: &LookupKey,
        patch: &ApplicationPatch,
    ) -> Result<Option<ApplicationRecord>> {
        let sql = format!(
            r#"
            UPDATE applications SET {SET_PATCH}
            WHERE id = (
                SELECT id FROM applications
                WHERE {} = $1
                ORDER BY created_at DESC, seq DESC
                LIMIT 1
            )
            RETURNING {COLUMNS}
            "#,
            key.column()
        );
        let row = bind_patch(
            sqlx::query_as::<_, ApplicationRow>(&sql).bind(key.value().to_string()),
            patch,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM applications WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
