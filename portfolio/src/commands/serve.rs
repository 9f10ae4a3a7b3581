use portfolio_config::Config;
use portfolio_di::Provides;
use portfolio_email_contracts::EmailService;
use tracing::{info, warn};

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let email = email::connect(&config.email).await?;
    match &email {
        Some(email) => {
            info!("Connecting to email service");
            if let Err(err) = email.ping().await {
                warn!("Email service is not reachable: {err:#}");
            }
        }
        None => warn!("No email service configured, contact form submissions will be rejected"),
    }

    let config_provider = ConfigProvider::new(&config)?;
    let mut provider = Provider::new(config_provider, email);
    let server: RestServer = provider.provide();
    info!("Starting http server on {}", config.http.address);
    server.serve().await
}
