use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::application::{ApplicationFilter, ApplicationRecord, INTERVIEW_PENDING};
use crate::models::survey::SurveyScore;
use crate::store::ApplicationStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub surveys_completed: usize,
    pub interviews_pending: usize,
    pub interviews_completed: usize,
    /// Mean of the per-candidate survey averages.
    pub average_survey_score: Option<f64>,
}

impl DashboardStats {
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        let mut stats = DashboardStats {
            total: records.len(),
            ..Default::default()
        };
        let mut averages = Vec::new();

        for record in records {
            *stats
                .by_status
                .entry(record.status.as_str().to_string())
                .or_default() += 1;
            if record.survey_completed {
                stats.surveys_completed += 1;
            }
            if record.interview_completed {
                stats.interviews_completed += 1;
            } else if record.interview_status.as_deref() == Some(INTERVIEW_PENDING) {
                stats.interviews_pending += 1;
            }
            if let Some(avg) = record
                .trait_scores
                .as_ref()
                .and_then(|t| SurveyScore::from_traits(t).average)
            {
                averages.push(avg);
            }
        }

        if !averages.is_empty() {
            stats.average_survey_score = Some(averages.iter().sum::<f64>() / averages.len() as f64);
        }
        stats
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn ApplicationStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let records = self.store.list(&ApplicationFilter::default()).await?;
        Ok(DashboardStats::from_records(&records))
    }
}
