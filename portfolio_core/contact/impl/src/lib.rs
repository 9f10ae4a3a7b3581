use std::sync::Arc;

use portfolio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use portfolio_di::Build;
use portfolio_email_contracts::{Email, EmailBody, EmailService};
use portfolio_models::{
    contact::{
        ContactMessage, ContactMessageAuthor, ContactMessageAuthorEmail, ContactMessageAuthorName,
        ContactMessageContent, ContactSubmission,
    },
    email::SentEmail,
    email_address::EmailAddressWithName,
};
use portfolio_shared_contracts::rate_limit::{RateLimitPolicy, RateLimitService};
use portfolio_templates_contracts::{
    ContactMessageTemplate, ContactMessageTextTemplate, TemplateService,
};
use portfolio_utils::trace_instrument;
use tracing::{debug, info};

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<Email, RateLimit, Template> {
    email: Option<Email>,
    rate_limit: RateLimit,
    template: Template,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Receives all contact form messages.
    pub recipient: Arc<EmailAddressWithName>,
    pub rate_limit: RateLimitPolicy,
    pub reject_suspicious_emails: bool,
}

impl<EmailS, RateLimit, Template> ContactFeatureService
    for ContactFeatureServiceImpl<EmailS, RateLimit, Template>
where
    EmailS: EmailService,
    RateLimit: RateLimitService,
    Template: TemplateService,
{
    #[trace_instrument(skip(self, submission))]
    async fn submit(
        &self,
        client: &str,
        submission: ContactSubmission,
    ) -> Result<SentEmail, ContactSubmitError> {
        let Some(email) = &self.email else {
            return Err(ContactSubmitError::NotConfigured);
        };

        if !self
            .rate_limit
            .acquire(&format!("contact:{client}"), self.config.rate_limit)
            .await
        {
            return Err(ContactSubmitError::RateLimited);
        }

        if submission.is_bot() {
            debug!("honeypot filled in");
            return Err(ContactSubmitError::BotDetected);
        }

        let message = self.validate(submission)?;

        let email_message = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!(
                "New Contact Form Message from {} ({})",
                *message.author.name, *message.author.email
            ),
            body: self.render(&message)?,
            reply_to: Some(message.author.email.to_string()),
        };

        let sent = email
            .send(email_message)
            .await?
            .ok_or(ContactSubmitError::Send)?;

        info!(id = %sent.id, "contact message sent");

        Ok(sent)
    }
}

impl<EmailS, RateLimit, Template> ContactFeatureServiceImpl<EmailS, RateLimit, Template>
where
    Template: TemplateService,
{
    fn validate(&self, submission: ContactSubmission) -> Result<ContactMessage, ContactSubmitError> {
        let present = |field: Option<String>| field.filter(|x| !x.is_empty());
        let (Some(name), Some(email), Some(message)) = (
            present(submission.name),
            present(submission.email),
            present(submission.message),
        ) else {
            return Err(ContactSubmitError::MissingFields);
        };

        let email = ContactMessageAuthorEmail::try_new(email)
            .map_err(|_| ContactSubmitError::InvalidEmail)?;
        if self.config.reject_suspicious_emails && email.is_suspicious() {
            debug!(%email, "suspicious email address");
            return Err(ContactSubmitError::InvalidEmail);
        }

        let name =
            ContactMessageAuthorName::try_new(name).map_err(|_| ContactSubmitError::InvalidName)?;
        let content = ContactMessageContent::try_new(message)
            .map_err(|_| ContactSubmitError::InvalidMessage)?;

        Ok(ContactMessage {
            author: ContactMessageAuthor { name, email },
            content,
        })
    }

    fn render(&self, message: &ContactMessage) -> anyhow::Result<EmailBody> {
        let name = message.author.name.to_string();
        let email = message.author.email.to_string();
        let content = message.content.to_string();

        let html = self.template.render(&ContactMessageTemplate {
            name: name.clone(),
            email: email.clone(),
            message: content.clone(),
        })?;
        let text = self.template.render(&ContactMessageTextTemplate {
            name,
            email,
            message: content,
        })?;

        Ok(EmailBody {
            text,
            html: Some(html),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use portfolio_email_contracts::MockEmailService;
    use portfolio_shared_contracts::rate_limit::MockRateLimitService;
    use portfolio_templates_contracts::MockTemplateService;
    use portfolio_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    const CLIENT: &str = "203.0.113.7";

    fn config() -> ContactFeatureConfig {
        ContactFeatureConfig {
            recipient: Arc::new("Site Owner <owner@example.com>".parse().unwrap()),
            rate_limit: RateLimitPolicy {
                max_requests: 5,
                window: Duration::from_secs(3600),
            },
            reject_suspicious_emails: false,
        }
    }

    fn submission(name: &str, email: &str, message: &str) -> ContactSubmission {
        ContactSubmission {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
            honeypot: Some(String::new()),
        }
    }

    fn rate_limit(result: bool) -> MockRateLimitService {
        MockRateLimitService::new().with_acquire(
            format!("contact:{CLIENT}"),
            config().rate_limit,
            result,
        )
    }

    fn template(name: &str, email: &str, message: &str) -> MockTemplateService {
        MockTemplateService::new()
            .with_render(
                ContactMessageTemplate {
                    name: name.into(),
                    email: email.into(),
                    message: message.into(),
                },
                "<p>html</p>".into(),
            )
            .with_render(
                ContactMessageTextTemplate {
                    name: name.into(),
                    email: email.into(),
                    message: message.into(),
                },
                "text".into(),
            )
    }

    fn expected_email(name: &str, email: &str) -> Email {
        Email {
            recipient: (*config().recipient).clone(),
            subject: format!("New Contact Form Message from {name} ({email})"),
            body: EmailBody {
                text: "text".into(),
                html: Some("<p>html</p>".into()),
            },
            reply_to: Some(email.into()),
        }
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let email = MockEmailService::new().with_send(
            expected_email("Al", "al@example.com"),
            Some(SentEmail { id: "abc".into() }),
        );

        let sut = ContactFeatureServiceImpl {
            email: Some(email),
            rate_limit: rate_limit(true),
            template: template("Al", "al@example.com", "Hello, this is a test message."),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission("Al", "al@example.com", "Hello, this is a test message."),
            )
            .await;

        // Assert
        assert_eq!(result.unwrap(), SentEmail { id: "abc".into() });
    }

    #[tokio::test]
    async fn ok_sanitizes_fields() {
        // Arrange
        let email = MockEmailService::new().with_send(
            expected_email("Bob bbold/b", "bob@example.com"),
            Some(SentEmail { id: "abc".into() }),
        );

        let sut = ContactFeatureServiceImpl {
            email: Some(email),
            rate_limit: rate_limit(true),
            template: template(
                "Bob bbold/b",
                "bob@example.com",
                "scriptalert(1)/script please",
            ),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission(
                    "  Bob <b>bold</b> ",
                    " Bob@Example.COM ",
                    "<script>alert(1)</script> please",
                ),
            )
            .await;

        // Assert
        assert_eq!(result.unwrap(), SentEmail { id: "abc".into() });
    }

    #[tokio::test]
    async fn ok_unusual_domain() {
        for address in ["al@example..com", "al@-example.com", "al@example-.com"] {
            // Arrange
            let email = MockEmailService::new().with_send(
                expected_email("Al", address),
                Some(SentEmail { id: "abc".into() }),
            );

            let sut = ContactFeatureServiceImpl {
                email: Some(email),
                rate_limit: rate_limit(true),
                template: template("Al", address, "Hello, this is a test message."),
                config: config(),
            };

            // Act
            let result = sut
                .submit(
                    CLIENT,
                    submission("Al", address, "Hello, this is a test message."),
                )
                .await;

            // Assert
            assert_eq!(result.unwrap(), SentEmail { id: "abc".into() }, "{address}");
        }
    }

    #[tokio::test]
    async fn not_configured() {
        // Arrange
        let sut = ContactFeatureServiceImpl {
            email: None::<MockEmailService>,
            rate_limit: MockRateLimitService::new(),
            template: MockTemplateService::new(),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission("Al", "al@example.com", "Hello, this is a test message."),
            )
            .await;

        // Assert
        assert_matches!(result, Err(ContactSubmitError::NotConfigured));
    }

    #[tokio::test]
    async fn rate_limited() {
        // Arrange
        let sut = ContactFeatureServiceImpl {
            email: Some(MockEmailService::new()),
            rate_limit: rate_limit(false),
            template: MockTemplateService::new(),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission("Al", "al@example.com", "Hello, this is a test message."),
            )
            .await;

        // Assert
        assert_matches!(result, Err(ContactSubmitError::RateLimited));
    }

    #[tokio::test]
    async fn honeypot() {
        // Arrange
        let sut = ContactFeatureServiceImpl {
            email: Some(MockEmailService::new()),
            rate_limit: rate_limit(true),
            template: MockTemplateService::new(),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                ContactSubmission {
                    honeypot: Some("http://spam.example".into()),
                    ..submission("Al", "al@example.com", "Hello, this is a test message.")
                },
            )
            .await;

        // Assert
        assert_matches!(result, Err(ContactSubmitError::BotDetected));
    }

    #[tokio::test]
    async fn whitespace_honeypot_is_ignored() {
        // Arrange
        let email = MockEmailService::new().with_send(
            expected_email("Al", "al@example.com"),
            Some(SentEmail { id: "abc".into() }),
        );

        let sut = ContactFeatureServiceImpl {
            email: Some(email),
            rate_limit: rate_limit(true),
            template: template("Al", "al@example.com", "Hello, this is a test message."),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                ContactSubmission {
                    honeypot: Some("   ".into()),
                    ..submission("Al", "al@example.com", "Hello, this is a test message.")
                },
            )
            .await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn missing_fields() {
        for submission in [
            ContactSubmission::default(),
            ContactSubmission {
                name: None,
                ..submission("Al", "al@example.com", "Hello, this is a test message.")
            },
            submission("Al", "", "Hello, this is a test message."),
            submission("Al", "al@example.com", ""),
        ] {
            // Arrange
            let sut = ContactFeatureServiceImpl {
                email: Some(MockEmailService::new()),
                rate_limit: rate_limit(true),
                template: MockTemplateService::new(),
                config: config(),
            };

            // Act
            let result = sut.submit(CLIENT, submission).await;

            // Assert
            assert_matches!(result, Err(ContactSubmitError::MissingFields));
        }
    }

    #[tokio::test]
    async fn invalid_email() {
        for email in ["not-an-email", "a@b", "al@example.c", "   "] {
            // Arrange
            let sut = ContactFeatureServiceImpl {
                email: Some(MockEmailService::new()),
                rate_limit: rate_limit(true),
                template: MockTemplateService::new(),
                config: config(),
            };

            // Act
            let result = sut
                .submit(
                    CLIENT,
                    submission("A", email, "Hello, this is a test message."),
                )
                .await;

            // Assert
            assert_matches!(result, Err(ContactSubmitError::InvalidEmail));
        }
    }

    #[tokio::test]
    async fn invalid_name() {
        let long_name = "x".repeat(101);
        for name in ["A", " A ", "<A>", long_name.as_str()] {
            // Arrange
            let sut = ContactFeatureServiceImpl {
                email: Some(MockEmailService::new()),
                rate_limit: rate_limit(true),
                template: MockTemplateService::new(),
                config: config(),
            };

            // Act
            let result = sut
                .submit(
                    CLIENT,
                    submission(name, "al@example.com", "Hello, this is a test message."),
                )
                .await;

            // Assert
            assert_matches!(result, Err(ContactSubmitError::InvalidName));
        }
    }

    #[tokio::test]
    async fn invalid_message() {
        let long_message = "x".repeat(2001);
        for message in ["too short", "  <<<short>>>  ", long_message.as_str()] {
            // Arrange
            let sut = ContactFeatureServiceImpl {
                email: Some(MockEmailService::new()),
                rate_limit: rate_limit(true),
                template: MockTemplateService::new(),
                config: config(),
            };

            // Act
            let result = sut
                .submit(CLIENT, submission("Al", "al@example.com", message))
                .await;

            // Assert
            assert_matches!(result, Err(ContactSubmitError::InvalidMessage));
        }
    }

    #[tokio::test]
    async fn suspicious_email_accepted_by_default() {
        // Arrange
        let email = MockEmailService::new().with_send(
            expected_email("Al", "test@example.ru"),
            Some(SentEmail { id: "abc".into() }),
        );

        let sut = ContactFeatureServiceImpl {
            email: Some(email),
            rate_limit: rate_limit(true),
            template: template("Al", "test@example.ru", "Hello, this is a test message."),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission("Al", "test@example.ru", "Hello, this is a test message."),
            )
            .await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn suspicious_email_rejected() {
        for email in ["test@example.com", "al@example.tk", "NoReply@example.com"] {
            // Arrange
            let sut = ContactFeatureServiceImpl {
                email: Some(MockEmailService::new()),
                rate_limit: rate_limit(true),
                template: MockTemplateService::new(),
                config: ContactFeatureConfig {
                    reject_suspicious_emails: true,
                    ..config()
                },
            };

            // Act
            let result = sut
                .submit(
                    CLIENT,
                    submission("Al", email, "Hello, this is a test message."),
                )
                .await;

            // Assert
            assert_matches!(result, Err(ContactSubmitError::InvalidEmail));
        }
    }

    #[tokio::test]
    async fn send_refused() {
        // Arrange
        let email = MockEmailService::new().with_send(expected_email("Al", "al@example.com"), None);

        let sut = ContactFeatureServiceImpl {
            email: Some(email),
            rate_limit: rate_limit(true),
            template: template("Al", "al@example.com", "Hello, this is a test message."),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission("Al", "al@example.com", "Hello, this is a test message."),
            )
            .await;

        // Assert
        assert_matches!(result, Err(ContactSubmitError::Send));
    }

    #[tokio::test]
    async fn send_error() {
        // Arrange
        let email = MockEmailService::new()
            .with_send_error(expected_email("Al", "al@example.com"), "connection reset");

        let sut = ContactFeatureServiceImpl {
            email: Some(email),
            rate_limit: rate_limit(true),
            template: template("Al", "al@example.com", "Hello, this is a test message."),
            config: config(),
        };

        // Act
        let result = sut
            .submit(
                CLIENT,
                submission("Al", "al@example.com", "Hello, this is a test message."),
            )
            .await;

        // Assert
        assert_matches!(result, Err(ContactSubmitError::Other(_)));
    }
}
