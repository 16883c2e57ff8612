use serde::{Deserialize, Serialize};

/// One page of a windowed `calendarView` query.
#[derive(Debug, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub value: Vec<RemoteEvent>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    pub start: WireDateTime,
    pub end: WireDateTime,
}

/// Wall-clock time as the calendar API speaks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
pub struct NewEvent {
    pub subject: String,
    pub body: EventBody,
    pub start: WireDateTime,
    pub end: WireDateTime,
    pub location: EventLocation,
}

#[derive(Debug, Serialize)]
pub struct EventBody {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct EventLocation {
    #[serde(rename = "displayName")]
    pub display_name: String,
}
