//! Application lifecycle tracker.
//!
//! Each funnel step (form submit, survey, interview invite, interview
//! completion) locates the candidate's record and writes only the fields that
//! step owns. Transitions are not guarded: any step may run in any order.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::application_dto::CreateApplicationPayload;
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationFilter, ApplicationPatch, ApplicationRecord, ApplicationStatus, LookupKey,
    NewApplication, SurveyAnswers, TraitScores, INTERVIEW_COMPLETED, INTERVIEW_PENDING,
};
use crate::store::ApplicationStore;
use crate::utils::time::now;

/// Result of a mutation addressed by secondary key.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleOutcome {
    Updated(ApplicationRecord),
    NotFound,
}

impl LifecycleOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, LifecycleOutcome::Updated(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurveyOutcome {
    /// Survey written onto an existing application.
    Attached(ApplicationRecord),
    /// No application matched; a record holding only the survey was created.
    FallbackCreated(ApplicationRecord),
}

impl SurveyOutcome {
    pub fn record(&self) -> &ApplicationRecord {
        match self {
            SurveyOutcome::Attached(r) | SurveyOutcome::FallbackCreated(r) => r,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveySubmission {
    pub candidate_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub answers: Option<SurveyAnswers>,
    pub trait_scores: TraitScores,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewCompletion {
    pub email: String,
    pub interview_id: Option<String>,
    pub video_url: Option<String>,
    pub share_url: Option<String>,
}

/// Fields the interview page may push for a candidate id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewUpdate {
    pub interview_id: Option<String>,
    pub interview_url: Option<String>,
    pub interview_status: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn ApplicationStore>,
}

impl LifecycleService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    /// Inserts a fresh application in the `Application Submitted` state.
    ///
    /// When the email already has a record created only by an earlier survey,
    /// the form's profile is merged into it instead. Any other existing record
    /// for the email is a conflict.
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_application(
        &self,
        payload: CreateApplicationPayload,
    ) -> Result<ApplicationRecord> {
        let application = NewApplication {
            candidate_id: non_blank(payload.candidate_id),
            name: non_blank(Some(payload.name)),
            first_name: non_blank(payload.first_name),
            last_name: non_blank(payload.last_name),
            email: normalize_email(&payload.email),
            phone: non_blank(payload.phone),
            location: non_blank(payload.location),
            position: non_blank(payload.position),
            position_id: non_blank(payload.position_id),
            passport_country: non_blank(payload.passport_country),
            golf_handicap: non_blank(payload.golf_handicap),
            message: non_blank(payload.message),
            resume_url: non_blank(payload.resume_url),
            status: ApplicationStatus::Submitted,
            survey_completed: false,
            trait_scores: None,
            answers: None,
            survey_id: None,
            survey_completed_at: None,
            timestamp: now(),
        };

        match self.store.insert(application.clone()).await {
            Ok(record) => {
                info!(application_id = %record.id, "application submitted");
                Ok(record)
            }
            Err(Error::Conflict(msg)) => {
                match self.store.merge_into_survey_only(&application).await? {
                    Some(record) => {
                        info!(application_id = %record.id, "application merged into survey record");
                        Ok(record)
                    }
                    None => {
                        warn!("application already exists for this email");
                        Err(Error::Conflict(msg))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Writes survey results onto the candidate's application, matching by
    /// email first and candidate id second. Without a match a fallback record
    /// carrying only the survey is created, which needs an email.
    #[instrument(skip(self, submission), fields(email = ?submission.email, candidate_id = ?submission.candidate_id))]
    pub async fn attach_survey(&self, submission: SurveySubmission) -> Result<SurveyOutcome> {
        let email = non_blank(submission.email).map(|e| normalize_email(&e));
        let candidate_id = non_blank(submission.candidate_id);
        let completed_at = now();
        let survey_id = Uuid::new_v4().to_string();

        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::SurveyCompleted),
            resume_url: submission.resume_url.clone(),
            survey_completed: Some(true),
            trait_scores: Some(submission.trait_scores.clone()),
            answers: submission.answers.clone(),
            survey_id: Some(survey_id.clone()),
            survey_completed_at: Some(completed_at),
            ..Default::default()
        };

        let mut keys = Vec::with_capacity(2);
        if let Some(email) = &email {
            keys.push(LookupKey::Email(email.clone()));
        }
        if let Some(candidate_id) = &candidate_id {
            keys.push(LookupKey::CandidateId(candidate_id.clone()));
        }

        for key in &keys {
            if let Some(record) = self.store.update_latest_by(key, &patch).await? {
                info!(application_id = %record.id, lookup = %key, "survey attached to application");
                return Ok(SurveyOutcome::Attached(record));
            }
        }

        let Some(email) = email else {
            warn!("no application for candidate id and no email to create one");
            return Err(Error::NotFound(
                "No application found for this candidate".to_string(),
            ));
        };

        warn!("no application matched survey; creating fallback record");
        let key = LookupKey::Email(email.clone());
        let inserted = self
            .store
            .insert(NewApplication {
                candidate_id,
                name: non_blank(submission.name),
                first_name: None,
                last_name: None,
                email,
                phone: None,
                location: None,
                position: non_blank(submission.position),
                position_id: None,
                passport_country: None,
                golf_handicap: None,
                message: None,
                resume_url: submission.resume_url,
                status: ApplicationStatus::SurveyCompleted,
                survey_completed: true,
                trait_scores: Some(submission.trait_scores),
                answers: submission.answers,
                survey_id: Some(survey_id),
                survey_completed_at: Some(completed_at),
                timestamp: completed_at,
            })
            .await;
        match inserted {
            Ok(record) => Ok(SurveyOutcome::FallbackCreated(record)),
            // an application for this email landed after the lookup above
            Err(Error::Conflict(_)) => self
                .store
                .update_latest_by(&key, &patch)
                .await?
                .map(SurveyOutcome::Attached)
                .ok_or_else(|| {
                    Error::NotFound("No application found for this candidate".to_string())
                }),
            Err(e) => Err(e),
        }
    }

    /// Records a freshly issued interview invite as pending.
    #[instrument(skip(self, interview_url))]
    pub async fn attach_interview_invite(
        &self,
        email: &str,
        interview_id: &str,
        interview_url: &str,
    ) -> Result<LifecycleOutcome> {
        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::InterviewPending),
            interview_id: Some(interview_id.to_string()),
            interview_url: Some(interview_url.to_string()),
            interview_status: Some(INTERVIEW_PENDING.to_string()),
            interview_completed: Some(false),
            ..Default::default()
        };
        let key = LookupKey::Email(normalize_email(email));
        match self.store.update_latest_by(&key, &patch).await? {
            Some(record) => {
                info!(application_id = %record.id, "interview invite attached");
                Ok(LifecycleOutcome::Updated(record))
            }
            None => {
                warn!("no application found; interview invite not recorded");
                Ok(LifecycleOutcome::NotFound)
            }
        }
    }

    /// Marks the candidate's interview completed. Replays leave the record
    /// unchanged, including the first completion time.
    #[instrument(skip(self, completion), fields(email = %completion.email))]
    pub async fn mark_interview_completed(
        &self,
        completion: InterviewCompletion,
    ) -> Result<LifecycleOutcome> {
        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::InterviewCompleted),
            interview_id: non_blank(completion.interview_id),
            interview_status: Some(INTERVIEW_COMPLETED.to_string()),
            interview_completed: Some(true),
            interview_video_url: non_blank(completion.video_url),
            interview_share_url: non_blank(completion.share_url),
            interview_completed_at: Some(now()),
            ..Default::default()
        };
        let key = LookupKey::Email(normalize_email(&completion.email));
        match self.store.update_latest_by(&key, &patch).await? {
            Some(record) => {
                info!(application_id = %record.id, "interview completed");
                Ok(LifecycleOutcome::Updated(record))
            }
            None => {
                warn!("no application found for completed interview");
                Ok(LifecycleOutcome::NotFound)
            }
        }
    }

    /// Applies whichever interview fields were supplied, keyed by candidate id.
    /// Returns the outcome with the names of the fields written.
    #[instrument(skip(self, update))]
    pub async fn update_interview_by_candidate(
        &self,
        candidate_id: &str,
        update: InterviewUpdate,
    ) -> Result<(LifecycleOutcome, Vec<&'static str>)> {
        let patch = ApplicationPatch {
            interview_id: update.interview_id,
            interview_url: update.interview_url,
            interview_status: update.interview_status,
            interview_updated_at: Some(now()),
            ..Default::default()
        };
        let fields = patch.field_names();
        let key = LookupKey::CandidateId(candidate_id.trim().to_string());
        match self.store.update_latest_by(&key, &patch).await? {
            Some(record) => {
                info!(application_id = %record.id, ?fields, "interview details updated");
                Ok((LifecycleOutcome::Updated(record), fields))
            }
            None => {
                warn!("no application found for candidate id");
                Ok((LifecycleOutcome::NotFound, fields))
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>> {
        self.store.get(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<ApplicationRecord>> {
        self.store
            .find_latest_by(&LookupKey::Email(normalize_email(email)))
            .await
    }

    pub async fn find_by_candidate_id(
        &self,
        candidate_id: &str,
    ) -> Result<Option<ApplicationRecord>> {
        self.store
            .find_latest_by(&LookupKey::CandidateId(candidate_id.trim().to_string()))
            .await
    }

    pub async fn list(&self, filter: ApplicationFilter) -> Result<Vec<ApplicationRecord>> {
        self.store.list(&filter.normalized()).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!("application deleted");
        }
        Ok(deleted)
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let deleted = self.store.delete_many(ids).await?;
        info!(deleted, "applications bulk-deleted");
        Ok(deleted)
    }
}
