use strum::{EnumString, IntoStaticStr};

/// Immutable run configuration, assembled once at startup by
/// [`super::env_loader::load_config`] and passed by reference afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: SyncMode,
    pub smtp: SmtpConfig,
    pub outlook: OutlookConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub to_emails: Vec<String>,
    pub subject_override: String,
    pub use_starttls: bool,
    pub use_ssl: bool,
    pub state_file: String,
}

#[derive(Debug, Clone)]
pub struct OutlookConfig {
    pub access_token: String,
    pub base_url: String,
}

/// Which synchronizer drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum SyncMode {
    Email,
    Outlook,
}
