use chrono::Utc;
use hku_seminar_sync::config::env_loader::load_config;
use hku_seminar_sync::config::model::{Config, SyncMode};
use hku_seminar_sync::email::{EmailNotifier, SmtpMailer};
use hku_seminar_sync::error::SyncResult;
use hku_seminar_sync::hku_page::api::SeminarPageAPI;
use hku_seminar_sync::hku_page::time::HK_TZ;
use hku_seminar_sync::hku_page::Seminar;
use hku_seminar_sync::outlook::OutlookCalendarAPI;
use hku_seminar_sync::sync::Synchronizer;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let loki = hku_seminar_sync::tracing::setup_loki().await;
    let config = load_config();

    let outcome = run(&config).await;
    if let Err(err) = &outcome {
        error!("Sync failed: {}", err);
    }

    if let Some((controller, handle)) = loki {
        controller.shutdown().await;
        let _ = handle.await;
    }

    if outcome.is_err() {
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> SyncResult<()> {
    let seminars = SeminarPageAPI::fetch_seminars().await?;
    if seminars.is_empty() {
        info!("No seminars found on the page.");
        return Ok(());
    }

    let now = Utc::now().with_timezone(&HK_TZ);
    let upcoming: Vec<Seminar> = seminars
        .into_iter()
        .filter(|seminar| seminar.end >= now)
        .collect();
    if upcoming.is_empty() {
        info!("No upcoming seminars found.");
        return Ok(());
    }

    log_overview(&upcoming);

    let mode: &'static str = config.mode.into();
    info!("Syncing via {}", mode);

    let synchronizer: Box<dyn Synchronizer> = match config.mode {
        SyncMode::Email => Box::new(EmailNotifier::new(
            config.smtp.clone(),
            SmtpMailer::from_config(&config.smtp)?,
        )),
        SyncMode::Outlook => Box::new(OutlookCalendarAPI::new(config.outlook.clone())?),
    };

    let report = synchronizer.reconcile(&upcoming).await?;
    info!("Completed. {}", report);

    Ok(())
}

fn log_overview(seminars: &[Seminar]) {
    info!("Seminar list:");
    for seminar in seminars {
        info!(
            " - {} | {} | {}-{} ({}) | {}",
            seminar.title,
            seminar.speaker,
            seminar.start.format("%Y-%m-%d %H:%M"),
            seminar.end.format("%H:%M"),
            HK_TZ.name(),
            seminar.venue
        );
    }
    info!("Total {} seminar(s).", seminars.len());
}
