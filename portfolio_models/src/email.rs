/// Receipt for an email that has been accepted by the email provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Identifier assigned to the email by the provider.
    pub id: String,
}
