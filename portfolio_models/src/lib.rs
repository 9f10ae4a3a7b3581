pub mod contact;
pub mod email;
pub mod email_address;
pub mod language;
