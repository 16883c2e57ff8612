use crate::config::model::SmtpConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Delivery seam for composed messages. The notifier only needs "send this
/// message"; everything TLS- and auth-related stays behind this trait.
#[async_trait]
pub trait Mailer {
    async fn send(&self, message: Message) -> SyncResult<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> SyncResult<Self> {
        let mut builder = if config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|err| SyncError::Transport(err.to_string()))?
        } else if config.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|err| SyncError::Transport(err.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder.port(config.port);
        if !config.user.is_empty() && !config.password.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: Message) -> SyncResult<()> {
        self.transport
            .send(message)
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;

        Ok(())
    }
}
