use crate::error::{SyncError, SyncResult};
use chrono::DateTime;
use chrono_tz::Tz;

/// One concrete seminar occurrence scraped from the schedule table.
///
/// Built once per scrape pass and immutable afterwards. Only its derived
/// identity key and rendered payloads ever get persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Seminar {
    pub title: String,
    pub speaker: String,
    pub venue: String,
    pub poster_link: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Seminar {
    pub fn new(
        title: String,
        speaker: String,
        venue: String,
        poster_link: Option<String>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> SyncResult<Self> {
        // A non-positive duration is a normalizer bug, never something to swap around
        if end <= start {
            return Err(SyncError::EndNotAfterStart { title });
        }

        Ok(Self {
            title,
            speaker,
            venue,
            poster_link,
            start,
            end,
        })
    }

    /// Rendered subject used for notification emails and remote event
    /// subjects. The prefix marks events as owned by this system.
    pub fn subject(&self) -> String {
        format!("{}{} — {}", super::SUBJECT_PREFIX, self.title, self.speaker)
    }
}
