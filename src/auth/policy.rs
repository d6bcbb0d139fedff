use std::sync::Arc;

use super::Actor;
use crate::config::SecurityConfig;
use crate::database::models::{NewContact, NewPhoneNumber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decides whether `actor` may create the candidate record. Runs before any
/// write reaches the store.
pub trait CreatePolicy<R>: Send + Sync {
    fn authorize_create(&self, candidate: &R, actor: &Actor) -> Decision;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl<R> CreatePolicy<R> for AllowAll {
    fn authorize_create(&self, _candidate: &R, _actor: &Actor) -> Decision {
        Decision::Allow
    }
}

/// Only actors on the allow-list may create phone numbers
#[derive(Debug, Clone)]
pub struct PhoneNumberPolicy {
    creators: Vec<String>,
}

impl PhoneNumberPolicy {
    pub fn new(creators: Vec<String>) -> Self {
        Self { creators }
    }
}

impl CreatePolicy<NewPhoneNumber> for PhoneNumberPolicy {
    fn authorize_create(&self, _candidate: &NewPhoneNumber, actor: &Actor) -> Decision {
        if self.creators.iter().any(|c| c == &actor.name) {
            Decision::Allow
        } else {
            Decision::Deny(format!("{} may not create phone numbers", actor.name))
        }
    }
}

/// Create policies for every resource type
#[derive(Clone)]
pub struct Policies {
    pub contacts: Arc<dyn CreatePolicy<NewContact>>,
    pub phone_numbers: Arc<dyn CreatePolicy<NewPhoneNumber>>,
}

impl Policies {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            contacts: Arc::new(AllowAll),
            phone_numbers: Arc::new(PhoneNumberPolicy::new(security.phone_number_creators.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> NewPhoneNumber {
        NewPhoneNumber { contact_id: 1, name: Some("home".into()), phone_number: None }
    }

    #[test]
    fn joe_may_create_phone_numbers() {
        let policy = PhoneNumberPolicy::new(vec!["Joe".into()]);
        assert!(policy.authorize_create(&candidate(), &Actor::new("Joe")).is_allowed());
    }

    #[test]
    fn others_are_denied() {
        let policy = PhoneNumberPolicy::new(vec!["Joe".into()]);
        assert_eq!(
            policy.authorize_create(&candidate(), &Actor::new("Jane")),
            Decision::Deny("Jane may not create phone numbers".into())
        );
        // Names are compared exactly
        assert!(!policy.authorize_create(&candidate(), &Actor::new("joe")).is_allowed());
    }

    #[test]
    fn contacts_allow_anyone() {
        let policies = Policies::from_config(&crate::config::AppConfig::development().security);
        assert!(policies.contacts.authorize_create(&NewContact::default(), &Actor::new("Jane")).is_allowed());
        assert!(!policies.phone_numbers.authorize_create(&candidate(), &Actor::new("Jane")).is_allowed());
    }
}
