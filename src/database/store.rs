use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{
    Contact, ContactChanges, NewContact, NewPhoneNumber, PhoneNumber, PhoneNumberChanges,
};
use crate::filter::FilterData;

pub type StoreResult<T> = Result<T, DatabaseError>;

/// One page of a filtered collection plus the unpaged match count
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage<T> {
    pub records: Vec<T>,
    pub total: i64,
}

/// Persistence collaborator for contacts and phone numbers.
///
/// Lookups report absence as `Ok(None)` / `Ok(false)`. Writes that name a
/// contact which does not exist fail with `DatabaseError::MissingReference`
/// and leave the store untouched.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> StoreResult<()>;

    async fn list_contacts(&self, query: FilterData) -> StoreResult<RecordPage<Contact>>;

    async fn find_contact(&self, id: i64) -> StoreResult<Option<Contact>>;

    /// Contacts with any of `ids`, ordered by id; missing ids are skipped
    async fn find_contacts(&self, ids: &[i64]) -> StoreResult<Vec<Contact>>;

    async fn create_contact(&self, new: NewContact) -> StoreResult<Contact>;

    async fn update_contact(&self, id: i64, changes: ContactChanges) -> StoreResult<Option<Contact>>;

    /// Deletes the contact and every phone number that belongs to it
    async fn delete_contact(&self, id: i64) -> StoreResult<bool>;

    async fn list_phone_numbers(&self, query: FilterData) -> StoreResult<RecordPage<PhoneNumber>>;

    async fn find_phone_number(&self, id: i64) -> StoreResult<Option<PhoneNumber>>;

    /// Every phone number owned by any of `contact_ids`, ordered by id
    async fn phone_numbers_for_contacts(&self, contact_ids: &[i64]) -> StoreResult<Vec<PhoneNumber>>;

    async fn create_phone_number(&self, new: NewPhoneNumber) -> StoreResult<PhoneNumber>;

    async fn update_phone_number(
        &self,
        id: i64,
        changes: PhoneNumberChanges,
    ) -> StoreResult<Option<PhoneNumber>>;

    async fn delete_phone_number(&self, id: i64) -> StoreResult<bool>;
}
