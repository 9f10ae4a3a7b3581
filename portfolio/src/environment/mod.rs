use std::time::Duration;

use anyhow::ensure;
use portfolio_api_rest::RestServerConfig;
use portfolio_config::Config;
use portfolio_core_contact_impl::ContactFeatureConfig;
use portfolio_core_health_impl::HealthFeatureConfig;
use portfolio_di::provider;
use portfolio_shared_contracts::rate_limit::RateLimitPolicy;
use types::Email;

pub mod types;

/// Upper bound for `contact.rate_limit_window`.
const MAX_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

provider! {
    /// The default provider, capable of providing all the dependencies
    pub Provider {
        email: Option<Email>,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Core
            ContactFeatureConfig,
            HealthFeatureConfig,
        }
    }
}

impl Provider {
    /// `email` is `None` if no email service has been configured.
    pub fn new(config: ConfigProvider, email: Option<Email>) -> Self {
        Self {
            _cache: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Core
        contact_feature_config: ContactFeatureConfig,
        health_feature_config: HealthFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let rest_server_config = RestServerConfig {
            address: config.http.address,
        };

        // Core
        ensure!(
            config.contact.rate_limit_max_requests > 0,
            "contact.rate_limit_max_requests must be at least 1"
        );
        let window = *config.contact.rate_limit_window;
        ensure!(
            !window.is_zero() && window <= MAX_RATE_LIMIT_WINDOW,
            "contact.rate_limit_window must be positive and at most 365 days"
        );
        let contact_feature_config = ContactFeatureConfig {
            recipient: config.contact.recipient.clone().into(),
            rate_limit: RateLimitPolicy {
                max_requests: config.contact.rate_limit_max_requests,
                window,
            },
            reject_suspicious_emails: config.contact.reject_suspicious_emails,
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Ok(Self {
            _cache: Default::default(),
            rest_server_config,
            contact_feature_config,
            health_feature_config,
        })
    }
}
