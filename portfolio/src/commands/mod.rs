pub mod contact;
pub mod email;
pub mod language;
pub mod serve;
