use super::dto::{EventBody, EventLocation, EventPage, NewEvent, RemoteEvent, WireDateTime};
use crate::config::model::OutlookConfig;
use crate::error::{SyncError, SyncResult};
use crate::hku_page::model::Seminar;
use crate::hku_page::time::HK_TZ;
use crate::hku_page::{HKU_SEMINAR_URL, SUBJECT_PREFIX};
use crate::identity;
use crate::sync::{SyncReport, Synchronizer};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

const PAGE_SIZE: u32 = 50;
const WINDOW_PADDING_DAYS: i64 = 7;

/**
Calendar reconciler: re-derives the identity of every remote event this
system owns (by subject prefix) inside a padded window around the scraped
seminars, creates the ones that are missing, and deletes the ones whose end
has passed.

Remote events without the subject prefix are invisible to the reconciler and
never touched.
*/
pub struct OutlookCalendarAPI {
    client: Client,
    config: OutlookConfig,
}

impl OutlookCalendarAPI {
    pub fn new(config: OutlookConfig) -> SyncResult<Self> {
        if config.access_token.is_empty() {
            return Err(SyncError::Config(
                "Outlook access token is empty. Set HKU_OUTLOOK_TOKEN.".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    #[instrument(skip(self, seminars, now), fields(total = seminars.len()))]
    pub async fn reconcile_events(
        &self,
        seminars: &[Seminar],
        now: DateTime<Tz>,
    ) -> SyncResult<(usize, usize)> {
        // The query window is derived from the occurrences, so an empty
        // scrape pass reconciles nothing
        let Some(earliest_start) = seminars.iter().map(|seminar| seminar.start).min() else {
            return Ok((0, 0));
        };
        let Some(latest_end) = seminars.iter().map(|seminar| seminar.end).max() else {
            return Ok((0, 0));
        };

        let index = self
            .fetch_event_index(
                earliest_start - Duration::days(WINDOW_PADDING_DAYS),
                latest_end + Duration::days(WINDOW_PADDING_DAYS),
            )
            .await?;
        debug!("Remote index holds {} owned event(s)", index.len());

        let mut created = 0;
        for seminar in seminars {
            let subject = seminar.subject();
            let key = identity::calendar_key(&subject, &seminar.start);
            if index.contains_key(&key) {
                continue;
            }

            self.create_event(seminar, subject).await?;
            created += 1;
        }

        let mut deleted = 0;
        for event in index.values() {
            let Some(end) = parse_wire_datetime(&event.end.date_time) else {
                warn!(
                    "Skipping event with unparseable end time: {}",
                    event.end.date_time
                );
                continue;
            };

            if end < now {
                self.delete_event(&event.id).await?;
                deleted += 1;
            }
        }

        Ok((created, deleted))
    }

    /// Fetches all owned events in the window, following continuation links
    /// until the listing is exhausted.
    async fn fetch_event_index(
        &self,
        from: DateTime<Tz>,
        to: DateTime<Tz>,
    ) -> SyncResult<HashMap<String, RemoteEvent>> {
        let mut index = HashMap::new();
        let mut next = Some(format!(
            "{}/me/calendarView?startDateTime={}&endDateTime={}&$top={}&$select=id,subject,start,end",
            self.config.base_url,
            format_query_instant(&from),
            format_query_instant(&to),
            PAGE_SIZE
        ));

        while let Some(url) = next {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.config.access_token)
                .header("Prefer", format!("outlook.timezone=\"{}\"", HK_TZ.name()))
                .send()
                .await?;
            let page: EventPage = check_status(response).await?.json().await?;

            for event in page.value {
                if !event.subject.starts_with(SUBJECT_PREFIX) {
                    continue;
                }

                index.insert(
                    identity::calendar_key_from_wire(&event.subject, &event.start.date_time),
                    event,
                );
            }

            next = page.next_link;
        }

        Ok(index)
    }

    #[instrument(skip(self, seminar, subject), fields(title = %seminar.title))]
    async fn create_event(&self, seminar: &Seminar, subject: String) -> SyncResult<()> {
        info!("Creating calendar event");

        let new_event = NewEvent {
            subject,
            body: EventBody {
                content_type: "HTML".to_string(),
                content: event_body_html(seminar),
            },
            start: wire_datetime(&seminar.start),
            end: wire_datetime(&seminar.end),
            location: EventLocation {
                display_name: seminar.venue.clone(),
            },
        };

        let response = self
            .client
            .post(format!("{}/me/calendar/events", self.config.base_url))
            .bearer_auth(&self.config.access_token)
            .json(&new_event)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Deleting an event that is already gone counts as success.
    #[instrument(skip(self))]
    async fn delete_event(&self, event_id: &str) -> SyncResult<()> {
        info!("Deleting expired calendar event");

        let response = self
            .client
            .delete(format!(
                "{}/me/calendar/events/{}",
                self.config.base_url, event_id
            ))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Event was already gone");
            return Ok(());
        }
        check_status(response).await?;

        Ok(())
    }
}

#[async_trait]
impl Synchronizer for OutlookCalendarAPI {
    async fn reconcile(&self, seminars: &[Seminar]) -> SyncResult<SyncReport> {
        let now = Utc::now().with_timezone(&HK_TZ);
        let (events_created, events_deleted) = self.reconcile_events(seminars, now).await?;

        Ok(SyncReport {
            events_created,
            events_deleted,
            ..SyncReport::default()
        })
    }
}

fn event_body_html(seminar: &Seminar) -> String {
    let mut body = format!(
        "<p>Speaker: {}<br>Venue: {}<br>Source: <a href=\"{2}\">{2}</a>",
        seminar.speaker, seminar.venue, HKU_SEMINAR_URL
    );
    if let Some(link) = &seminar.poster_link {
        body.push_str(&format!("<br>Poster: <a href=\"{0}\">{0}</a>", link));
    }
    body.push_str("</p>");

    body
}

fn wire_datetime(instant: &DateTime<Tz>) -> WireDateTime {
    WireDateTime {
        date_time: instant.format("%Y-%m-%dT%H:%M:%S").to_string(),
        time_zone: HK_TZ.name().to_string(),
    }
}

fn format_query_instant(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Turns a non-success HTTP response into a `SyncError::Api`, passing a
/// successful response through untouched.
async fn check_status(response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Api { status, body })
    }
}

fn parse_wire_datetime(text: &str) -> Option<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    HK_TZ.from_local_datetime(&naive).single()
}
