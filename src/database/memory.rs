use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::manager::DatabaseError;
use super::models::{
    Contact, ContactChanges, NewContact, NewPhoneNumber, PhoneNumber, PhoneNumberChanges,
};
use super::store::{RecordPage, Store, StoreResult};
use crate::filter::{Filter, FilterData};

#[derive(Debug, Default)]
struct Tables {
    contacts: BTreeMap<i64, Contact>,
    phone_numbers: BTreeMap<i64, PhoneNumber>,
    last_contact_id: i64,
    last_phone_number_id: i64,
}

/// Process-local store used for development and tests.
///
/// Every write takes the single write lock, so reference checks and the
/// mutation they guard are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_contacts(&self, query: FilterData) -> StoreResult<RecordPage<Contact>> {
        let mut filter = Filter::new("contacts")?;
        filter.assign(query)?;
        let tables = self.tables.read().await;
        let (records, total) = filter.apply(tables.contacts.values().cloned())?;
        Ok(RecordPage { records, total })
    }

    async fn find_contact(&self, id: i64) -> StoreResult<Option<Contact>> {
        Ok(self.tables.read().await.contacts.get(&id).cloned())
    }

    async fn find_contacts(&self, ids: &[i64]) -> StoreResult<Vec<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .values()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn create_contact(&self, new: NewContact) -> StoreResult<Contact> {
        let mut tables = self.tables.write().await;
        tables.last_contact_id += 1;
        let now = Utc::now();
        let contact = Contact {
            id: tables.last_contact_id,
            name_first: new.name_first,
            name_last: new.name_last,
            email: new.email,
            twitter: new.twitter,
            created_at: now,
            updated_at: now,
        };
        tables.contacts.insert(contact.id, contact.clone());
        debug!("memory: inserted contact {}", contact.id);
        Ok(contact)
    }

    async fn update_contact(&self, id: i64, changes: ContactChanges) -> StoreResult<Option<Contact>> {
        let mut tables = self.tables.write().await;
        let Some(contact) = tables.contacts.get_mut(&id) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            changes.apply_to(contact);
            contact.updated_at = Utc::now();
        }
        Ok(Some(contact.clone()))
    }

    async fn delete_contact(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.contacts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.phone_numbers.retain(|_, p| p.contact_id != id);
        Ok(true)
    }

    async fn list_phone_numbers(&self, query: FilterData) -> StoreResult<RecordPage<PhoneNumber>> {
        let mut filter = Filter::new("phone_numbers")?;
        filter.assign(query)?;
        let tables = self.tables.read().await;
        let (records, total) = filter.apply(tables.phone_numbers.values().cloned())?;
        Ok(RecordPage { records, total })
    }

    async fn find_phone_number(&self, id: i64) -> StoreResult<Option<PhoneNumber>> {
        Ok(self.tables.read().await.phone_numbers.get(&id).cloned())
    }

    async fn phone_numbers_for_contacts(&self, contact_ids: &[i64]) -> StoreResult<Vec<PhoneNumber>> {
        let tables = self.tables.read().await;
        Ok(tables
            .phone_numbers
            .values()
            .filter(|p| contact_ids.contains(&p.contact_id))
            .cloned()
            .collect())
    }

    async fn create_phone_number(&self, new: NewPhoneNumber) -> StoreResult<PhoneNumber> {
        let mut tables = self.tables.write().await;
        if !tables.contacts.contains_key(&new.contact_id) {
            return Err(DatabaseError::MissingReference { resource: "contacts", id: new.contact_id });
        }
        tables.last_phone_number_id += 1;
        let now = Utc::now();
        let phone = PhoneNumber {
            id: tables.last_phone_number_id,
            contact_id: new.contact_id,
            name: new.name,
            phone_number: new.phone_number,
            created_at: now,
            updated_at: now,
        };
        tables.phone_numbers.insert(phone.id, phone.clone());
        debug!("memory: inserted phone number {}", phone.id);
        Ok(phone)
    }

    async fn update_phone_number(
        &self,
        id: i64,
        changes: PhoneNumberChanges,
    ) -> StoreResult<Option<PhoneNumber>> {
        let mut tables = self.tables.write().await;
        if let Some(contact_id) = changes.contact_id {
            if !tables.contacts.contains_key(&contact_id) {
                return Err(DatabaseError::MissingReference { resource: "contacts", id: contact_id });
            }
        }
        let Some(phone) = tables.phone_numbers.get_mut(&id) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            changes.apply_to(phone);
            phone.updated_at = Utc::now();
        }
        Ok(Some(phone.clone()))
    }

    async fn delete_phone_number(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.phone_numbers.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FieldValue, FilterWhereInfo};

    fn joe() -> NewContact {
        NewContact {
            name_first: Some("Joe".into()),
            name_last: Some("Bloggs".into()),
            ..Default::default()
        }
    }

    fn phone(contact_id: i64, name: &str) -> NewPhoneNumber {
        NewPhoneNumber { contact_id, name: Some(name.into()), phone_number: Some("555-0000".into()) }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.create_contact(joe()).await.unwrap();
        let b = store.create_contact(joe()).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn rejects_phone_number_for_missing_contact() {
        let store = MemoryStore::new();
        let err = store.create_phone_number(phone(42, "mobile")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::MissingReference { id: 42, .. }));
        let page = store.list_phone_numbers(FilterData::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn filters_phone_numbers_by_contact() {
        let store = MemoryStore::new();
        let joe = store.create_contact(joe()).await.unwrap();
        let other = store.create_contact(NewContact::default()).await.unwrap();
        store.create_phone_number(phone(joe.id, "mobile")).await.unwrap();
        store.create_phone_number(phone(other.id, "home")).await.unwrap();
        store.create_phone_number(phone(joe.id, "work")).await.unwrap();

        let query = FilterData {
            where_clause: vec![FilterWhereInfo::equals_any("contact_id", vec![FieldValue::Int(joe.id)])],
            ..Default::default()
        };
        let page = store.list_phone_numbers(query).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.records.iter().all(|p| p.contact_id == joe.id));
    }

    #[tokio::test]
    async fn deleting_contact_cascades() {
        let store = MemoryStore::new();
        let joe = store.create_contact(joe()).await.unwrap();
        let p = store.create_phone_number(phone(joe.id, "mobile")).await.unwrap();
        assert!(store.delete_contact(joe.id).await.unwrap());
        assert!(store.find_phone_number(p.id).await.unwrap().is_none());
        assert!(!store.delete_contact(joe.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_applies_only_given_columns() {
        let store = MemoryStore::new();
        let joe = store.create_contact(joe()).await.unwrap();
        let changes = ContactChanges { email: Some(Some("joe@example.com".into())), ..Default::default() };
        let updated = store.update_contact(joe.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.email.as_deref(), Some("joe@example.com"));
        assert_eq!(updated.name_first.as_deref(), Some("Joe"));
        assert!(store.update_contact(99, ContactChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn moving_phone_number_checks_target_contact() {
        let store = MemoryStore::new();
        let joe = store.create_contact(joe()).await.unwrap();
        let p = store.create_phone_number(phone(joe.id, "mobile")).await.unwrap();
        let changes = PhoneNumberChanges { contact_id: Some(77), ..Default::default() };
        assert!(store.update_phone_number(p.id, changes).await.is_err());
        let unchanged = store.find_phone_number(p.id).await.unwrap().unwrap();
        assert_eq!(unchanged.contact_id, joe.id);
    }
}
