//! Client side of the contact form: the step by step form wizard, the HTTP
//! client submitting it and the persisted language preference.

pub mod preferences;
pub mod submission;
pub mod wizard;
