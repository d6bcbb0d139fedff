use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::filter::{FieldValue, FilterRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PhoneNumber {
    pub id: i64,
    pub contact_id: i64,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A phone number that has not been persisted yet; this is the candidate
/// record handed to the create policy
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoneNumber {
    pub contact_id: i64,
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneNumberChanges {
    pub contact_id: Option<i64>,
    pub name: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
}

impl PhoneNumberChanges {
    pub fn is_empty(&self) -> bool {
        self.contact_id.is_none() && self.name.is_none() && self.phone_number.is_none()
    }

    pub fn apply_to(self, phone: &mut PhoneNumber) {
        if let Some(v) = self.contact_id { phone.contact_id = v; }
        if let Some(v) = self.name { phone.name = v; }
        if let Some(v) = self.phone_number { phone.phone_number = v; }
    }
}

impl FilterRow for PhoneNumber {
    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "contact_id" => Some(self.contact_id.into()),
            "name" => Some(self.name.as_deref().into()),
            "phone_number" => Some(self.phone_number.as_deref().into()),
            _ => None,
        }
    }
}
