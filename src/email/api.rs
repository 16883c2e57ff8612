use crate::config::model::SmtpConfig;
use crate::email::ics::build_invite;
use crate::email::state::SentKeyStore;
use crate::email::transport::Mailer;
use crate::error::{SyncError, SyncResult};
use crate::hku_page::model::Seminar;
use crate::hku_page::time::HK_TZ;
use crate::hku_page::HKU_SEMINAR_URL;
use crate::identity;
use crate::sync::{SyncReport, Synchronizer};
use async_trait::async_trait;
use chrono::Utc;
use lettre::message::header::{ContentDisposition, ContentType};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::Message;
use tracing::{info, instrument};

/**
Notify-once synchronizer: sends one calendar-invite email per previously
unseen seminar and records its identity key durably after every send.

Delivery failure aborts the run. The key of the failed seminar has not been
persisted at that point, so simply re-running retries it and skips everything
already delivered.
*/
pub struct EmailNotifier<M: Mailer> {
    config: SmtpConfig,
    mailer: M,
    store: SentKeyStore,
}

impl<M: Mailer> EmailNotifier<M> {
    pub fn new(mut config: SmtpConfig, mailer: M) -> Self {
        if config.from_email.is_empty() {
            config.from_email = config.user.clone();
        }
        let store = SentKeyStore::new(&config.state_file);

        Self {
            config,
            mailer,
            store,
        }
    }

    /// Configuration checks that must hold before any message leaves.
    fn ensure_ready(&self) -> SyncResult<()> {
        if self.config.host.is_empty() {
            return Err(SyncError::Config(
                "SMTP host is not configured. Set HKU_SMTP_HOST.".to_string(),
            ));
        }
        if self.config.from_email.is_empty() {
            return Err(SyncError::Config(
                "Sender email is empty. Set HKU_FROM_EMAIL or HKU_SMTP_USER.".to_string(),
            ));
        }
        if self.config.to_emails.is_empty() {
            return Err(SyncError::Config(
                "Recipient list is empty. Set HKU_TO_EMAILS.".to_string(),
            ));
        }

        Ok(())
    }

    #[instrument(skip(self, seminars), fields(total = seminars.len()))]
    pub async fn send_new_invites(&self, seminars: &[Seminar]) -> SyncResult<usize> {
        self.ensure_ready()?;

        let mut sent = self.store.load();
        let mut new_count = 0;

        for seminar in seminars {
            let key = identity::notify_key(seminar);
            if sent.contains(&key) {
                continue;
            }

            let message = self.build_message(seminar)?;
            self.mailer.send(message).await?;

            sent.insert(key);
            // flush per send to avoid losing progress
            self.store.persist(&sent)?;
            new_count += 1;

            info!(
                "Sent invite for: {} ({})",
                seminar.title,
                seminar.start.format("%Y-%m-%d %H:%M")
            );
        }

        Ok(new_count)
    }

    fn build_message(&self, seminar: &Seminar) -> SyncResult<Message> {
        let per_event_subject = seminar.subject();
        let subject = if self.config.subject_override.is_empty() {
            per_event_subject.clone()
        } else {
            self.config.subject_override.clone()
        };

        let mut builder = Message::builder()
            .from(mailbox(&self.config.from_email)?)
            .subject(subject);
        for recipient in &self.config.to_emails {
            builder = builder.to(mailbox(recipient)?);
        }

        let invite = build_invite(
            seminar,
            Utc::now(),
            &self.config.from_email,
            &self.config.to_emails,
        );
        let calendar_part = SinglePart::builder()
            .header(
                ContentType::parse(
                    "text/calendar; method=REQUEST; charset=\"UTF-8\"; name=\"invite.ics\"",
                )
                .map_err(|err| SyncError::Compose(err.to_string()))?,
            )
            .header(ContentDisposition::inline())
            .body(invite);

        builder
            .multipart(
                MultiPart::mixed()
                    .multipart(MultiPart::alternative_plain_html(
                        self.plain_body(seminar),
                        self.html_body(seminar, &per_event_subject),
                    ))
                    .singlepart(calendar_part),
            )
            .map_err(|err| SyncError::Compose(err.to_string()))
    }

    fn plain_body(&self, seminar: &Seminar) -> String {
        let mut body = format!(
            "{} — {}\nTime: {} - {} ({})\nVenue: {}\nSource: {}\n",
            seminar.title,
            seminar.speaker,
            seminar.start.format("%Y-%m-%d %H:%M"),
            seminar.end.format("%H:%M"),
            HK_TZ.name(),
            seminar.venue,
            HKU_SEMINAR_URL
        );
        if let Some(link) = &seminar.poster_link {
            body.push_str(&format!("Poster: {}\n", link));
        }

        body
    }

    fn html_body(&self, seminar: &Seminar, heading: &str) -> String {
        let mut rows = vec![
            format!(
                "<tr><td class='label'>Title</td><td class='value'>{}</td></tr>",
                seminar.title
            ),
            format!(
                "<tr><td class='label'>Speaker</td><td class='value'>{}</td></tr>",
                seminar.speaker
            ),
            format!(
                "<tr><td class='label'>Time</td><td class='value'>{} - {} ({})</td></tr>",
                seminar.start.format("%Y-%m-%d %H:%M"),
                seminar.end.format("%H:%M"),
                HK_TZ.name()
            ),
            format!(
                "<tr><td class='label'>Venue</td><td class='value'>{}</td></tr>",
                seminar.venue
            ),
            format!(
                "<tr><td class='label'>Source</td><td class='value'><a href='{0}'>{0}</a></td></tr>",
                HKU_SEMINAR_URL
            ),
        ];
        if let Some(link) = &seminar.poster_link {
            rows.push(format!(
                "<tr><td class='label'>Poster</td><td class='value'><a href='{0}'>{0}</a></td></tr>",
                link
            ));
        }

        format!(
            r#"<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; color: #222; }}
    .card {{ max-width: 640px; border: 1px solid #e5e5e5; border-radius: 8px; padding: 16px; box-shadow: 0 2px 6px rgba(0,0,0,0.05); }}
    h2 {{ margin: 0 0 12px 0; font-size: 20px; color: #1a4d8f; }}
    table {{ width: 100%; border-collapse: collapse; }}
    td {{ padding: 8px 6px; vertical-align: top; }}
    .label {{ width: 80px; font-weight: bold; color: #555; }}
    .value {{ color: #222; }}
    a {{ color: #1a4d8f; text-decoration: none; }}
    a:hover {{ text-decoration: underline; }}
  </style>
</head>
<body>
  <div class="card">
    <h2>{}</h2>
    <table>
      {}
    </table>
  </div>
</body>
</html>"#,
            heading,
            rows.concat()
        )
    }
}

#[async_trait]
impl<M: Mailer + Send + Sync> Synchronizer for EmailNotifier<M> {
    async fn reconcile(&self, seminars: &[Seminar]) -> SyncResult<SyncReport> {
        let invites_sent = self.send_new_invites(seminars).await?;

        Ok(SyncReport {
            invites_sent,
            ..SyncReport::default()
        })
    }
}

fn mailbox(address: &str) -> SyncResult<Mailbox> {
    address
        .parse()
        .map_err(|_| SyncError::Config(format!("Invalid email address: {}", address)))
}
