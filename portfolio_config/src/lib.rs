use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use portfolio_models::email_address::EmailAddressWithName;
use serde::Deserialize;
use url::Url;

pub use self::duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of config files layered on top of the defaults.
pub const CONFIG_PATHS_ENV: &str = "PORTFOLIO_CONFIG";

const ENV_PREFIX: &str = "PORTFOLIO";
const RESEND_API_KEY_ENV: &str = "RESEND_API_KEY";

/// Load the default config, the files listed in `PORTFOLIO_CONFIG` and
/// overrides from the environment.
pub fn load() -> anyhow::Result<Config> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Ok(extra) = std::env::var(CONFIG_PATHS_ENV) {
        paths.extend(extra.split(':').filter(|x| !x.is_empty()).map(Into::into));
    }

    let resend_api_key = std::env::var(RESEND_API_KEY_ENV).ok();

    files(&paths)?
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("email.resend.api_key", resend_api_key)?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

/// Load only the default config, ignoring the environment.
pub fn load_dev_config() -> anyhow::Result<Config> {
    load_paths(&[Path::new(DEFAULT_CONFIG_PATH)])
}

pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    files(paths)?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

fn files(
    paths: &[impl AsRef<Path>],
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub health: HealthConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub address: SocketAddr,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    /// Sender of all outgoing emails.
    pub from: EmailAddressWithName,
    pub resend: Option<ResendConfig>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Deserialize)]
pub struct ResendConfig {
    pub api_key: String,
    pub endpoint_override: Option<Url>,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[redacted]")
            .field("endpoint_override", &self.endpoint_override)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Receives all contact form messages.
    pub recipient: EmailAddressWithName,
    pub rate_limit_max_requests: u64,
    pub rate_limit_window: Duration,
    #[serde(default)]
    pub reject_suspicious_emails: bool,
}
