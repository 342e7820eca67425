use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_email, ApplicationStore};
use crate::error::Result;
use crate::models::application::{
    ApplicationFilter, ApplicationPatch, ApplicationRecord, LookupKey, NewApplication,
};

/// Process-local store. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryApplicationStore {
    records: RwLock<Vec<ApplicationRecord>>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn latest_index(records: &[ApplicationRecord], key: &LookupKey) -> Option<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| key.matches(r))
        // max_by_key returns the last maximum, so equal timestamps resolve to the later insert
        .max_by_key(|(_, r)| r.timestamp)
        .map(|(idx, _)| idx)
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, application: NewApplication) -> Result<ApplicationRecord> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.email == application.email) {
            return Err(duplicate_email());
        }
        let record = application.into_record(Uuid::new_v4());
        records.push(record.clone());
        Ok(record)
    }

    async fn merge_into_survey_only(
        &self,
        application: &NewApplication,
    ) -> Result<Option<ApplicationRecord>> {
        let mut records = self.records.write().await;
        let key = LookupKey::Email(application.email.clone());
        let Some(idx) = latest_index(&records, &key) else {
            return Ok(None);
        };
        let record = &mut records[idx];
        if !record.is_survey_only() {
            return Ok(None);
        }
        application.fill_profile(record);
        Ok(Some(record.clone()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_latest_by(&self, key: &LookupKey) -> Result<Option<ApplicationRecord>> {
        let records = self.records.read().await;
        Ok(latest_index(&records, key).map(|idx| records[idx].clone()))
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationRecord>> {
        let records = self.records.read().await;
        let mut matched: Vec<ApplicationRecord> = records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        // stable sort keeps reverse insertion order among equal timestamps
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matched)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ApplicationPatch,
    ) -> Result<Option<ApplicationRecord>> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
            patch.apply_to(record);
            record.clone()
        }))
    }

    async fn update_latest_by(
        &self,
        key: &LookupKey,
        patch: &ApplicationPatch,
    ) -> Result<Option<ApplicationRecord>> {
        let mut records = self.records.write().await;
        Ok(latest_index(&records, key).map(|idx| {
            let record = &mut records[idx];
            patch.apply_to(record);
            record.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        Ok((before - records.len()) as u64)
    }
}
