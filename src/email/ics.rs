use crate::hku_page::model::Seminar;
use crate::hku_page::HKU_SEMINAR_URL;
use crate::identity;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const UID_SUFFIX: &str = "@hku-cs";

/// Renders the calendar-invite attachment for one seminar.
///
/// The layout is a wire-format contract with calendar clients: CRLF line
/// terminators, this exact field order, UTC timestamps, and newlines in the
/// description escaped as a literal `\n`.
pub fn build_invite(
    seminar: &Seminar,
    dtstamp: DateTime<Utc>,
    from_email: &str,
    to_emails: &[String],
) -> String {
    let uid = format!("{}{}", identity::notify_key(seminar), UID_SUFFIX);

    let mut description = format!(
        "Speaker: {}\\nVenue: {}\\nSource: {}",
        seminar.speaker, seminar.venue, HKU_SEMINAR_URL
    );
    if let Some(link) = &seminar.poster_link {
        description.push_str(&format!("\\nPoster: {}", link));
    }

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "PRODID:-//HKU CS Seminar Sync//EN".to_string(),
        "VERSION:2.0".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:REQUEST".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", uid),
        "SEQUENCE:0".to_string(),
        "STATUS:CONFIRMED".to_string(),
        "TRANSP:OPAQUE".to_string(),
        format!("SUMMARY:{}", seminar.subject()),
        format!("DTSTAMP:{}", dtstamp.format("%Y%m%dT%H%M%SZ")),
        format!("DTSTART:{}", format_ics_datetime(&seminar.start)),
        format!("DTEND:{}", format_ics_datetime(&seminar.end)),
        format!("LOCATION:{}", seminar.venue),
        format!("DESCRIPTION:{}", description),
        format!("ORGANIZER;CN={}:MAILTO:{}", from_email, from_email),
    ];
    for attendee in to_emails {
        lines.push(format!(
            "ATTENDEE;RSVP=TRUE;PARTSTAT=NEEDS-ACTION;ROLE=REQ-PARTICIPANT:MAILTO:{}",
            attendee
        ));
    }
    lines.extend(
        ["PRIORITY:5", "CLASS:PUBLIC", "END:VEVENT", "END:VCALENDAR", ""].map(String::from),
    );

    lines.join("\r\n")
}

fn format_ics_datetime(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .format("%Y%m%dT%H%M%SZ")
        .to_string()
}
