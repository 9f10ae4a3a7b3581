//! Three step contact form.
//!
//! The wizard asks for the name, the email address and the message one step
//! at a time, validates each step before moving on and finally yields a
//! [`ContactRequest`] to be submitted. It performs no I/O itself, except in
//! the [`ContactWizard::send`] convenience method.

use std::collections::BTreeMap;

use portfolio_models::contact::is_plausible_email;
use tracing::debug;

use crate::submission::{ContactRequest, SubmissionClient, SubmissionError, SubmissionReceipt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    #[default]
    Name = 1,
    Email = 2,
    Message = 3,
}

impl Step {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Name => Some(Self::Email),
            Self::Email => Some(Self::Message),
            Self::Message => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Name => None,
            Self::Email => Some(Self::Name),
            Self::Message => Some(Self::Email),
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|step| step.number() == value)
            .ok_or(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub message: String,
    pub honeypot: String,
}

/// A field an error message can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardField {
    Name,
    Email,
    Message,
    /// The submission as a whole.
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success,
    Failure(String),
}

/// Outcome of [`ContactWizard::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The current step is invalid or a submission is already in flight.
    Blocked,
    Moved(Step),
    /// The last step is valid and the request should be sent now.
    Submit(ContactRequest),
}

#[derive(Debug, Clone, Default)]
pub struct ContactWizard {
    started: bool,
    current_step: Step,
    form: FormData,
    errors: BTreeMap<WizardField, String>,
    is_submitting: bool,
    result: Option<SubmissionResult>,
}

impl ContactWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn error(&self, field: WizardField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<WizardField, String> {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    pub fn start(&mut self) {
        self.started = true;
        self.current_step = Step::Name;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
        self.errors.remove(&WizardField::Name);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.form.email = email.into();
        self.errors.remove(&WizardField::Email);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.form.message = message.into();
        self.errors.remove(&WizardField::Message);
    }

    pub fn set_honeypot(&mut self, honeypot: impl Into<String>) {
        self.form.honeypot = honeypot.into();
    }

    /// Whether the current step would validate, without recording any errors.
    pub fn can_proceed(&self) -> bool {
        self.started && check_step(&self.form, self.current_step).is_ok()
    }

    /// Whether all steps before `target` are filled in.
    pub fn can_navigate_to(&self, target: Step) -> bool {
        Step::ALL
            .into_iter()
            .take_while(|&step| step < target)
            .all(|step| check_step(&self.form, step).is_ok())
    }

    /// Validate the current step and move to the next one.
    ///
    /// On the last step this starts the submission instead.
    pub fn advance(&mut self) -> Advance {
        if !self.started || self.is_submitting {
            return Advance::Blocked;
        }

        let Some(next) = self.current_step.next() else {
            return self.submit().map_or(Advance::Blocked, Advance::Submit);
        };

        if !self.validate_current_step() {
            return Advance::Blocked;
        }

        self.current_step = next;
        self.errors.clear();
        Advance::Moved(next)
    }

    /// Go back one step. Entered data is kept and not validated.
    pub fn retreat(&mut self) -> Option<Step> {
        if !self.started || self.is_submitting {
            return None;
        }

        let previous = self.current_step.previous()?;
        self.current_step = previous;
        Some(previous)
    }

    /// Move directly to `target`.
    ///
    /// Allowed only if every step before `target` is filled in and the
    /// current step is valid.
    pub fn jump_to_step(&mut self, target: Step) -> bool {
        if !self.started || self.is_submitting {
            return false;
        }
        if target == self.current_step {
            return true;
        }
        if !self.can_navigate_to(target) || !self.validate_current_step() {
            return false;
        }

        self.current_step = target;
        self.errors.clear();
        true
    }

    /// Validate the last step and mark the wizard as submitting.
    ///
    /// Returns `None` if the form is not ready or a submission is already in
    /// flight. Every returned request must be followed by a call to
    /// [`complete`](Self::complete).
    pub fn submit(&mut self) -> Option<ContactRequest> {
        if !self.started || self.is_submitting || self.current_step != Step::Message {
            return None;
        }
        if !self.validate_current_step() {
            return None;
        }

        self.is_submitting = true;
        self.errors.remove(&WizardField::Submit);
        self.result = None;

        let FormData {
            name,
            email,
            message,
            honeypot,
        } = self.form.clone();
        Some(ContactRequest {
            name,
            email,
            message,
            honeypot,
        })
    }

    /// Record the outcome of the submission started by [`submit`](Self::submit).
    pub fn complete(&mut self, outcome: Result<SubmissionReceipt, SubmissionError>) {
        self.is_submitting = false;

        match outcome {
            Ok(receipt) => {
                debug!(id = ?receipt.id, "contact form submitted");
                self.form = FormData::default();
                self.current_step = Step::Name;
                self.errors.clear();
                self.result = Some(SubmissionResult::Success);
            }
            Err(err) => {
                debug!("contact form submission failed: {err:?}");
                let message = err.to_string();
                self.errors.insert(WizardField::Submit, message.clone());
                self.result = Some(SubmissionResult::Failure(message));
            }
        }
    }

    /// Submit the form using `client` and record the outcome.
    pub async fn send(&mut self, client: &impl SubmissionClient) -> Option<&SubmissionResult> {
        let request = self.submit()?;
        let outcome = client.send(&request).await;
        self.complete(outcome);
        self.result.as_ref()
    }

    /// Leave the wizard and discard everything entered.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn validate_current_step(&mut self) -> bool {
        match check_step(&self.form, self.current_step) {
            Ok(()) => true,
            Err((field, message)) => {
                self.errors.insert(field, message.into());
                false
            }
        }
    }
}

fn check_step(form: &FormData, step: Step) -> Result<(), (WizardField, &'static str)> {
    match step {
        Step::Name if form.name.trim().is_empty() => {
            Err((WizardField::Name, "Name is required"))
        }
        Step::Email if form.email.trim().is_empty() => {
            Err((WizardField::Email, "Email is required"))
        }
        Step::Email if !is_plausible_email(&form.email) => Err((
            WizardField::Email,
            "Please enter a valid email address",
        )),
        Step::Message if form.message.trim().is_empty() => {
            Err((WizardField::Message, "Message is required"))
        }
        _ => Ok(()),
    }
}
