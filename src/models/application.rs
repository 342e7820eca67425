use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Trait name → score on the 1–5 scale, stored exactly as submitted.
pub type TraitScores = BTreeMap<String, f64>;

/// Category → question index → score.
pub type SurveyAnswers = BTreeMap<String, BTreeMap<String, f64>>;

pub const STATUS_SUBMITTED: &str = "Application Submitted";
pub const STATUS_SURVEY_COMPLETED: &str = "Survey Completed";
pub const STATUS_INTERVIEW_PENDING: &str = "Interview Pending";
pub const STATUS_INTERVIEW_COMPLETED: &str = "Interview Completed";

pub const INTERVIEW_PENDING: &str = "pending";
pub const INTERVIEW_COMPLETED: &str = "completed";

/// Display label of an application. Labels written by older clients are kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Submitted,
    SurveyCompleted,
    InterviewPending,
    InterviewCompleted,
    Other(String),
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Submitted => STATUS_SUBMITTED,
            ApplicationStatus::SurveyCompleted => STATUS_SURVEY_COMPLETED,
            ApplicationStatus::InterviewPending => STATUS_INTERVIEW_PENDING,
            ApplicationStatus::InterviewCompleted => STATUS_INTERVIEW_COMPLETED,
            ApplicationStatus::Other(label) => label,
        }
    }
}

impl From<String> for ApplicationStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            STATUS_SUBMITTED => ApplicationStatus::Submitted,
            STATUS_SURVEY_COMPLETED => ApplicationStatus::SurveyCompleted,
            STATUS_INTERVIEW_PENDING => ApplicationStatus::InterviewPending,
            STATUS_INTERVIEW_COMPLETED => ApplicationStatus::InterviewCompleted,
            _ => ApplicationStatus::Other(label),
        }
    }
}

impl From<ApplicationStatus> for String {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub candidate_id: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub position: Option<String>,
    pub position_id: Option<String>,
    pub passport_country: Option<String>,
    pub golf_handicap: Option<String>,
    pub message: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub survey_completed: bool,
    pub trait_scores: Option<TraitScores>,
    pub answers: Option<SurveyAnswers>,
    pub survey_id: Option<String>,
    pub survey_completed_at: Option<DateTime<Utc>>,
    pub interview_id: Option<String>,
    pub interview_url: Option<String>,
    pub interview_status: Option<String>,
    pub interview_completed: bool,
    pub interview_video_url: Option<String>,
    pub interview_share_url: Option<String>,
    pub interview_completed_at: Option<DateTime<Utc>>,
    pub interview_updated_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl ApplicationRecord {
    /// An invite that was issued but not yet completed.
    pub fn pending_interview_url(&self) -> Option<&str> {
        if self.interview_completed {
            return None;
        }
        self.interview_url.as_deref().filter(|u| !u.is_empty())
    }

    /// Created by a survey that arrived before any application form: still in
    /// the survey state and without the contact fields only the form collects.
    pub fn is_survey_only(&self) -> bool {
        self.status == ApplicationStatus::SurveyCompleted
            && self.phone.is_none()
            && self.location.is_none()
            && self.message.is_none()
    }
}

/// Everything an insert needs; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub candidate_id: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub position: Option<String>,
    pub position_id: Option<String>,
    pub passport_country: Option<String>,
    pub golf_handicap: Option<String>,
    pub message: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub survey_completed: bool,
    pub trait_scores: Option<TraitScores>,
    pub answers: Option<SurveyAnswers>,
    pub survey_id: Option<String>,
    pub survey_completed_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl NewApplication {
    /// Copies the form's profile fields onto an existing record. Survey and
    /// interview state are left alone and a known candidate id is kept.
    pub fn fill_profile(&self, record: &mut ApplicationRecord) {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        if record.candidate_id.is_none() {
            record.candidate_id = self.candidate_id.clone();
        }
        fill(&mut record.name, &self.name);
        fill(&mut record.first_name, &self.first_name);
        fill(&mut record.last_name, &self.last_name);
        fill(&mut record.phone, &self.phone);
        fill(&mut record.location, &self.location);
        fill(&mut record.position, &self.position);
        fill(&mut record.position_id, &self.position_id);
        fill(&mut record.passport_country, &self.passport_country);
        fill(&mut record.golf_handicap, &self.golf_handicap);
        fill(&mut record.message, &self.message);
        fill(&mut record.resume_url, &self.resume_url);
    }

    pub fn into_record(self, id: Uuid) -> ApplicationRecord {
        ApplicationRecord {
            id,
            candidate_id: self.candidate_id,
            name: self.name,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            location: self.location,
            position: self.position,
            position_id: self.position_id,
            passport_country: self.passport_country,
            golf_handicap: self.golf_handicap,
            message: self.message,
            resume_url: self.resume_url,
            status: self.status,
            survey_completed: self.survey_completed,
            trait_scores: self.trait_scores,
            answers: self.answers,
            survey_id: self.survey_id,
            survey_completed_at: self.survey_completed_at,
            interview_id: None,
            interview_url: None,
            interview_status: None,
            interview_completed: false,
            interview_video_url: None,
            interview_share_url: None,
            interview_completed_at: None,
            interview_updated_at: None,
            timestamp: self.timestamp,
        }
    }
}

/// Partial update: `None` leaves the stored value untouched.
///
/// `interview_completed_at` is only written when the record has none yet, so
/// replaying a completion keeps the first completion time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub resume_url: Option<String>,
    pub survey_completed: Option<bool>,
    pub trait_scores: Option<TraitScores>,
    pub answers: Option<SurveyAnswers>,
    pub survey_id: Option<String>,
    pub survey_completed_at: Option<DateTime<Utc>>,
    pub interview_id: Option<String>,
    pub interview_url: Option<String>,
    pub interview_status: Option<String>,
    pub interview_completed: Option<bool>,
    pub interview_video_url: Option<String>,
    pub interview_share_url: Option<String>,
    pub interview_completed_at: Option<DateTime<Utc>>,
    pub interview_updated_at: Option<DateTime<Utc>>,
}

impl ApplicationPatch {
    /// Wire names of the fields this patch writes.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut push = |set: bool, name: &'static str| {
            if set {
                names.push(name);
            }
        };
        push(self.status.is_some(), "status");
        push(self.resume_url.is_some(), "resumeUrl");
        push(self.survey_completed.is_some(), "surveyCompleted");
        push(self.trait_scores.is_some(), "traitScores");
        push(self.answers.is_some(), "answers");
        push(self.survey_id.is_some(), "surveyId");
        push(self.survey_completed_at.is_some(), "surveyCompletedAt");
        push(self.interview_id.is_some(), "interviewId");
        push(self.interview_url.is_some(), "interviewUrl");
        push(self.interview_status.is_some(), "interviewStatus");
        push(self.interview_completed.is_some(), "interviewCompleted");
        push(self.interview_video_url.is_some(), "interviewVideoUrl");
        push(self.interview_share_url.is_some(), "interviewShareUrl");
        push(self.interview_completed_at.is_some(), "interviewCompletedAt");
        push(self.interview_updated_at.is_some(), "interviewUpdatedAt");
        names
    }

    pub fn apply_to(&self, record: &mut ApplicationRecord) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        set(&mut record.status, &self.status);
        set_opt(&mut record.resume_url, &self.resume_url);
        set(&mut record.survey_completed, &self.survey_completed);
        set_opt(&mut record.trait_scores, &self.trait_scores);
        set_opt(&mut record.answers, &self.answers);
        set_opt(&mut record.survey_id, &self.survey_id);
        set_opt(&mut record.survey_completed_at, &self.survey_completed_at);
        set_opt(&mut record.interview_id, &self.interview_id);
        set_opt(&mut record.interview_url, &self.interview_url);
        set_opt(&mut record.interview_status, &self.interview_status);
        set(&mut record.interview_completed, &self.interview_completed);
        set_opt(&mut record.interview_video_url, &self.interview_video_url);
        set_opt(&mut record.interview_share_url, &self.interview_share_url);
        if record.interview_completed_at.is_none() {
            set_opt(&mut record.interview_completed_at, &self.interview_completed_at);
        }
        set_opt(&mut record.interview_updated_at, &self.interview_updated_at);
    }
}

/// Secondary keys an application can be located by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Email(String),
    CandidateId(String),
}

impl LookupKey {
    pub fn column(&self) -> &'static str {
        match self {
            LookupKey::Email(_) => "email",
            LookupKey::CandidateId(_) => "candidate_id",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LookupKey::Email(v) | LookupKey::CandidateId(v) => v,
        }
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        match self {
            LookupKey::Email(email) => record.email == *email,
            LookupKey::CandidateId(id) => record.candidate_id.as_deref() == Some(id.as_str()),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column(), self.value())
    }
}

/// Dashboard listing filter. Empty strings count as "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationFilter {
    pub status: Option<String>,
    pub position: Option<String>,
    pub country: Option<String>,
    pub search: Option<String>,
}

impl ApplicationFilter {
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            status: clean(self.status),
            position: clean(self.position),
            country: clean(self.country),
            search: clean(self.search).map(|s| s.to_lowercase()),
        }
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        if let Some(status) = &self.status {
            if record.status.as_str() != status {
                return false;
            }
        }
        if let Some(position) = &self.position {
            if record.position.as_deref() != Some(position.as_str()) {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if record.passport_country.as_deref() != Some(country.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let hit = [
                record.name.as_deref(),
                Some(record.email.as_str()),
                record.position.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|hay| hay.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApplicationRecord {
        NewApplication {
            candidate_id: Some("1700000000000".into()),
            name: Some("John Smith".into()),
            first_name: None,
            last_name: None,
            email: "j@x.com".into(),
            phone: None,
            location: None,
            position: Some("Golf Operations Intern".into()),
            position_id: None,
            passport_country: Some("Scotland".into()),
            golf_handicap: None,
            message: None,
            resume_url: None,
            status: ApplicationStatus::Submitted,
            survey_completed: false,
            trait_scores: None,
            answers: None,
            survey_id: None,
            survey_completed_at: None,
            timestamp: Utc::now(),
        }
        .into_record(Uuid::new_v4())
    }

    #[test]
    fn status_labels_round_trip_through_strings() {
        assert_eq!(
            ApplicationStatus::from("Survey Completed".to_string()),
            ApplicationStatus::SurveyCompleted
        );
        let legacy = ApplicationStatus::from("Shortlisted".to_string());
        assert_eq!(legacy, ApplicationStatus::Other("Shortlisted".into()));
        assert_eq!(String::from(legacy), "Shortlisted");

        let json = serde_json::to_value(ApplicationStatus::Submitted).unwrap();
        assert_eq!(json, serde_json::json!("Application Submitted"));
    }

    #[test]
    fn patch_only_touches_carried_fields() {
        let mut rec = record();
        let patch = ApplicationPatch {
            interview_id: Some("iv_1".into()),
            interview_status: Some(INTERVIEW_PENDING.into()),
            ..Default::default()
        };
        patch.apply_to(&mut rec);
        assert_eq!(rec.interview_id.as_deref(), Some("iv_1"));
        assert_eq!(rec.position.as_deref(), Some("Golf Operations Intern"));
        assert_eq!(rec.status, ApplicationStatus::Submitted);
        assert_eq!(patch.field_names(), vec!["interviewId", "interviewStatus"]);
    }

    #[test]
    fn first_completion_time_wins() {
        let mut rec = record();
        let first = Utc::now();
        let later = first + chrono::Duration::minutes(5);
        ApplicationPatch {
            interview_completed_at: Some(first),
            ..Default::default()
        }
        .apply_to(&mut rec);
        ApplicationPatch {
            interview_completed_at: Some(later),
            ..Default::default()
        }
        .apply_to(&mut rec);
        assert_eq!(rec.interview_completed_at, Some(first));
    }

    #[test]
    fn profile_fill_keeps_survey_state() {
        let mut rec = record();
        rec.status = ApplicationStatus::SurveyCompleted;
        rec.survey_completed = true;
        assert!(rec.is_survey_only());

        let mut form = NewApplication {
            candidate_id: Some("1800000000000".into()),
            phone: Some("+44 1234".into()),
            ..form_from(&rec)
        };
        form.name = Some("John A Smith".into());
        form.fill_profile(&mut rec);

        assert_eq!(rec.candidate_id.as_deref(), Some("1700000000000"));
        assert_eq!(rec.name.as_deref(), Some("John A Smith"));
        assert_eq!(rec.phone.as_deref(), Some("+44 1234"));
        assert_eq!(rec.passport_country.as_deref(), Some("Scotland"));
        assert!(rec.survey_completed);
        assert_eq!(rec.status, ApplicationStatus::SurveyCompleted);
        assert!(!rec.is_survey_only());
    }

    fn form_from(rec: &ApplicationRecord) -> NewApplication {
        NewApplication {
            candidate_id: None,
            name: None,
            first_name: None,
            last_name: None,
            email: rec.email.clone(),
            phone: None,
            location: None,
            position: None,
            position_id: None,
            passport_country: None,
            golf_handicap: None,
            message: None,
            resume_url: None,
            status: ApplicationStatus::Submitted,
            survey_completed: false,
            trait_scores: None,
            answers: None,
            survey_id: None,
            survey_completed_at: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn filter_matches_status_country_and_search() {
        let rec = record();
        let filter = ApplicationFilter {
            status: Some(" Application Submitted ".into()),
            country: Some("Scotland".into()),
            search: Some("SMITH".into()),
            position: Some(String::new()),
        }
        .normalized();
        assert!(filter.matches(&rec));

        let miss = ApplicationFilter {
            search: Some("nobody".into()),
            ..Default::default()
        }
        .normalized();
        assert!(!miss.matches(&rec));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["status"], "Application Submitted");
        assert_eq!(json["surveyCompleted"], false);
        assert!(json.get("candidateId").is_some());
    }
}
