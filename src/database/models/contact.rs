use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::filter::{FieldValue, FilterRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contact that has not been persisted yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContact {
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
}

/// Partial update; the outer `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactChanges {
    pub name_first: Option<Option<String>>,
    pub name_last: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub twitter: Option<Option<String>>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.name_first.is_none()
            && self.name_last.is_none()
            && self.email.is_none()
            && self.twitter.is_none()
    }

    pub fn apply_to(self, contact: &mut Contact) {
        if let Some(v) = self.name_first { contact.name_first = v; }
        if let Some(v) = self.name_last { contact.name_last = v; }
        if let Some(v) = self.email { contact.email = v; }
        if let Some(v) = self.twitter { contact.twitter = v; }
    }
}

impl FilterRow for Contact {
    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "name_first" => Some(self.name_first.as_deref().into()),
            "name_last" => Some(self.name_last.as_deref().into()),
            "email" => Some(self.email.as_deref().into()),
            "twitter" => Some(self.twitter.as_deref().into()),
            _ => None,
        }
    }
}
