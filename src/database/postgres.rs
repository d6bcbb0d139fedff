use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, FromRow, PgPool, Postgres};
use tracing::debug;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Contact, ContactChanges, NewContact, NewPhoneNumber, PhoneNumber, PhoneNumberChanges,
};
use super::store::{RecordPage, Store, StoreResult};
use crate::filter::{FieldValue, Filter, FilterData, SqlResult};

const CONTACT_COLUMNS: &[&str] =
    &["id", "name_first", "name_last", "email", "twitter", "created_at", "updated_at"];
const PHONE_NUMBER_COLUMNS: &[&str] =
    &["id", "contact_id", "name", "phone_number", "created_at", "updated_at"];

/// SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_page<T>(&self, table: &str, columns: &[&str], query: FilterData) -> StoreResult<RecordPage<T>>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let mut filter = Filter::new(table)?;
        filter.select(columns)?.assign(query)?;

        let select = filter.to_sql()?;
        debug!("pg: {}", select.query);
        let records = bind_all(sqlx::query_as::<_, T>(&select.query), &select.params)
            .fetch_all(&self.pool)
            .await?;

        let count = filter.to_count_sql()?;
        let total = count_rows(&self.pool, &count).await?;

        Ok(RecordPage { records, total })
    }
}

fn bind_all<'q, T>(
    mut q: QueryAs<'q, Postgres, T, PgArguments>,
    params: &'q [FieldValue],
) -> QueryAs<'q, Postgres, T, PgArguments> {
    for p in params {
        q = match p {
            FieldValue::Int(i) => q.bind(*i),
            FieldValue::Text(s) => q.bind(s.as_str()),
            FieldValue::Null => q.bind(None::<String>),
        };
    }
    q
}

async fn count_rows(pool: &PgPool, sql: &SqlResult) -> StoreResult<i64> {
    let (total,) = bind_all(sqlx::query_as::<_, (i64,)>(&sql.query), &sql.params)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Translate a foreign key violation on `contact_id` into a missing reference
fn reference_error(err: sqlx::Error, contact_id: i64) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return DatabaseError::MissingReference { resource: "contacts", id: contact_id };
        }
    }
    err.into()
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list_contacts(&self, query: FilterData) -> StoreResult<RecordPage<Contact>> {
        self.select_page("contacts", CONTACT_COLUMNS, query).await
    }

    async fn find_contact(&self, id: i64) -> StoreResult<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT id, name_first, name_last, email, twitter, created_at, updated_at \
             FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn find_contacts(&self, ids: &[i64]) -> StoreResult<Vec<Contact>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, name_first, name_last, email, twitter, created_at, updated_at \
             FROM contacts WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    async fn create_contact(&self, new: NewContact) -> StoreResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (name_first, name_last, email, twitter) VALUES ($1, $2, $3, $4) \
             RETURNING id, name_first, name_last, email, twitter, created_at, updated_at",
        )
        .bind(new.name_first)
        .bind(new.name_last)
        .bind(new.email)
        .bind(new.twitter)
        .fetch_one(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn update_contact(&self, id: i64, changes: ContactChanges) -> StoreResult<Option<Contact>> {
        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query_as::<_, Contact>(
            "SELECT id, name_first, name_last, email, twitter, created_at, updated_at \
             FROM contacts WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut contact) = existing else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(contact));
        }
        changes.apply_to(&mut contact);

        let updated = sqlx::query_as::<_, Contact>(
            "UPDATE contacts SET name_first = $1, name_last = $2, email = $3, twitter = $4, \
             updated_at = now() WHERE id = $5 \
             RETURNING id, name_first, name_last, email, twitter, created_at, updated_at",
        )
        .bind(contact.name_first)
        .bind(contact.name_last)
        .bind(contact.email)
        .bind(contact.twitter)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_contact(&self, id: i64) -> StoreResult<bool> {
        // phone_numbers.contact_id cascades
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_phone_numbers(&self, query: FilterData) -> StoreResult<RecordPage<PhoneNumber>> {
        self.select_page("phone_numbers", PHONE_NUMBER_COLUMNS, query).await
    }

    async fn find_phone_number(&self, id: i64) -> StoreResult<Option<PhoneNumber>> {
        let phone = sqlx::query_as::<_, PhoneNumber>(
            "SELECT id, contact_id, name, phone_number, created_at, updated_at \
             FROM phone_numbers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(phone)
    }

    async fn phone_numbers_for_contacts(&self, contact_ids: &[i64]) -> StoreResult<Vec<PhoneNumber>> {
        if contact_ids.is_empty() {
            return Ok(vec![]);
        }
        let phones = sqlx::query_as::<_, PhoneNumber>(
            "SELECT id, contact_id, name, phone_number, created_at, updated_at \
             FROM phone_numbers WHERE contact_id = ANY($1) ORDER BY id",
        )
        .bind(contact_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(phones)
    }

    async fn create_phone_number(&self, new: NewPhoneNumber) -> StoreResult<PhoneNumber> {
        let contact_id = new.contact_id;
        sqlx::query_as::<_, PhoneNumber>(
            "INSERT INTO phone_numbers (contact_id, name, phone_number) VALUES ($1, $2, $3) \
             RETURNING id, contact_id, name, phone_number, created_at, updated_at",
        )
        .bind(new.contact_id)
        .bind(new.name)
        .bind(new.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| reference_error(e, contact_id))
    }

    async fn update_phone_number(
        &self,
        id: i64,
        changes: PhoneNumberChanges,
    ) -> StoreResult<Option<PhoneNumber>> {
        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query_as::<_, PhoneNumber>(
            "SELECT id, contact_id, name, phone_number, created_at, updated_at \
             FROM phone_numbers WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut phone) = existing else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(phone));
        }
        changes.apply_to(&mut phone);
        let contact_id = phone.contact_id;

        let updated = sqlx::query_as::<_, PhoneNumber>(
            "UPDATE phone_numbers SET contact_id = $1, name = $2, phone_number = $3, \
             updated_at = now() WHERE id = $4 \
             RETURNING id, contact_id, name, phone_number, created_at, updated_at",
        )
        .bind(phone.contact_id)
        .bind(phone.name)
        .bind(phone.phone_number)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| reference_error(e, contact_id))?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_phone_number(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM phone_numbers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
