use super::model::Seminar;
use super::time::parse_datetime_range;
use crate::error::SyncResult;

/// Raw field tuple for one table row, before any temporal normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SeminarRow {
    pub title: String,
    pub link: Option<String>,
    pub speaker: String,
    pub date_text: String,
    pub time_range_text: String,
    pub venue: String,
}

impl SeminarRow {
    /// Normalizes the date/time cells and builds the immutable model.
    /// Unparseable temporal text is fatal for the record.
    pub fn to_model(&self) -> SyncResult<Seminar> {
        let (start, end) = parse_datetime_range(&self.date_text, &self.time_range_text)?;

        Seminar::new(
            self.title.clone(),
            self.speaker.clone(),
            self.venue.clone(),
            self.link.clone(),
            start,
            end,
        )
    }
}
