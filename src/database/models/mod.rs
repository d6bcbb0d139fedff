pub mod contact;
pub mod phone_number;

pub use contact::{Contact, ContactChanges, NewContact};
pub use phone_number::{NewPhoneNumber, PhoneNumber, PhoneNumberChanges};
