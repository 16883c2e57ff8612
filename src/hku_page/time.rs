use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// All seminar times on the page are wall-clock times in Hong Kong.
pub const HK_TZ: Tz = chrono_tz::Asia::Hong_Kong;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/**
Turns the page's free-text date and time-range cells into a concrete
start/end pair in Hong Kong time.

* `date_text`: "November 21, 2025"
* `time_range_text`: "10:30 am - 11:30 am" or "11:00 am - 12:00 nn"

An empty time range falls back to a one-hour slot from 09:00, which the page
is not expected to ever produce. A range whose end does not land after its
start gets a meridiem-aware rollover (see `roll_over_end`).
*/
pub fn parse_datetime_range(
    date_text: &str,
    time_range_text: &str,
) -> SyncResult<(DateTime<Tz>, DateTime<Tz>)> {
    let date = NaiveDate::parse_from_str(date_text.trim(), "%B %d, %Y").map_err(|_| {
        SyncError::InvalidDate {
            text: date_text.trim().to_string(),
        }
    })?;

    if time_range_text.trim().is_empty() {
        let nine_am = NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid wall-clock time");
        let start = localize(date, nine_am)?;
        return Ok((start, start + Duration::hours(1)));
    }

    let parts: Vec<&str> = time_range_text.split('-').collect();
    if parts.len() != 2 {
        return Err(SyncError::InvalidTimeRange {
            text: time_range_text.to_string(),
        });
    }

    let (start_time, start_meridiem) = parse_time(parts[0])?;
    let (end_time, end_meridiem) = parse_time(parts[1])?;

    let start = localize(date, start_time)?;
    let mut end = localize(date, end_time)?;

    if end <= start {
        end = roll_over_end(end, start_meridiem, end_meridiem);
    }

    Ok((start, end))
}

/// Parses one side of the range as a 12-hour clock time, also reporting which
/// meridiem marker was present in the text.
fn parse_time(raw: &str) -> SyncResult<(NaiveTime, Option<Meridiem>)> {
    let mut text = raw.trim().to_lowercase();
    // "12:00 nn" and "12:00 noon" both mean 12:00 pm
    text = text.replace("nn", "pm");
    text = text.replace(" noon", " pm");
    // Some rows write "10:00am" without the space
    if text.contains("am") && !text.contains(' ') {
        text = text.replace("am", " am");
    }
    if text.contains("pm") && !text.contains(' ') {
        text = text.replace("pm", " pm");
    }

    let meridiem = if text.contains(" am") {
        Some(Meridiem::Am)
    } else if text.contains(" pm") {
        Some(Meridiem::Pm)
    } else {
        None
    };

    let time = NaiveTime::parse_from_str(&text, "%I:%M %p").map_err(|_| {
        SyncError::InvalidTimeRange {
            text: raw.trim().to_string(),
        }
    })?;

    Ok((time, meridiem))
}

/// An end at or before its start means the range crossed a meridiem boundary
/// the page left implicit. Both-am ranges run into the afternoon (+12h), a
/// pm-to-am range crosses midnight (+24h), and anything without a clear pair
/// of markers gets the +12h guess.
fn roll_over_end(
    end: DateTime<Tz>,
    start_meridiem: Option<Meridiem>,
    end_meridiem: Option<Meridiem>,
) -> DateTime<Tz> {
    match (start_meridiem, end_meridiem) {
        (Some(Meridiem::Am), Some(Meridiem::Am)) => end + Duration::hours(12),
        (Some(Meridiem::Pm), Some(Meridiem::Am)) => end + Duration::days(1),
        _ => end + Duration::hours(12),
    }
}

fn localize(date: NaiveDate, time: NaiveTime) -> SyncResult<DateTime<Tz>> {
    HK_TZ
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| SyncError::NonexistentLocalTime {
            text: date.and_time(time).to_string(),
            zone: HK_TZ.name().to_string(),
        })
}
