//! Record store adapter for application records.
//!
//! Lookups by secondary key (`email`, `candidate_id`) resolve duplicates to the
//! most recently created record; ties go to the later insert.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationFilter, ApplicationPatch, ApplicationRecord, LookupKey, NewApplication,
};

pub use memory::MemoryApplicationStore;
pub use postgres::PgApplicationStore;

pub(crate) fn duplicate_email() -> Error {
    Error::Conflict("An application with this email address already exists.".to_string())
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fails with `Error::Conflict` when a record for the same email exists.
    async fn insert(&self, application: NewApplication) -> Result<ApplicationRecord>;

    /// Fills the profile of the email's survey-only record from a later
    /// application form, in one store operation. `None` when there is no such
    /// record.
    async fn merge_into_survey_only(
        &self,
        application: &NewApplication,
    ) -> Result<Option<ApplicationRecord>>;

    async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>>;

    async fn find_latest_by(&self, key: &LookupKey) -> Result<Option<ApplicationRecord>>;

    /// Newest first.
    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationRecord>>;

    async fn update(&self, id: Uuid, patch: &ApplicationPatch)
        -> Result<Option<ApplicationRecord>>;

    /// Locates the record for `key` and applies `patch` as one store operation.
    async fn update_latest_by(
        &self,
        key: &LookupKey,
        patch: &ApplicationPatch,
    ) -> Result<Option<ApplicationRecord>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64>;
}
