//! Deterministic identity keys for dedup decisions.
//!
//! The two sync targets deliberately use different granularity: the
//! notify-once path keys on the full RFC 3339 start instant, while the
//! calendar path keys on the rendered subject plus the start truncated to the
//! minute (the remote store only echoes wall-clock times back at that
//! precision). Unifying the two would change dedup behavior.

use crate::hku_page::model::Seminar;
use chrono::DateTime;
use chrono_tz::Tz;

/// Key for the append-only "already notified" set.
pub fn notify_key(seminar: &Seminar) -> String {
    format!(
        "{}|{}|{}",
        seminar.title,
        seminar.speaker,
        seminar.start.to_rfc3339()
    )
}

/// Key for matching local occurrences against remote calendar events.
pub fn calendar_key(subject: &str, start: &DateTime<Tz>) -> String {
    format!("{}|{}", subject, start.format("%Y-%m-%dT%H:%M"))
}

/// Same key, derived from the wall-clock text a remote event echoes back
/// (e.g. `2025-11-21T10:30:00.0000000`). Must agree with [`calendar_key`]
/// for the same instant.
pub fn calendar_key_from_wire(subject: &str, date_time_text: &str) -> String {
    let minute_precision = &date_time_text[..date_time_text.len().min(16)];
    format!("{}|{}", subject, minute_precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hku_page::time::HK_TZ;
    use chrono::TimeZone;

    fn seminar() -> Seminar {
        Seminar::new(
            "Learning to Rank".to_string(),
            "Ada Lovelace".to_string(),
            "Room 308".to_string(),
            None,
            HK_TZ.with_ymd_and_hms(2025, 11, 21, 10, 30, 0).unwrap(),
            HK_TZ.with_ymd_and_hms(2025, 11, 21, 11, 30, 0).unwrap(),
        )
        .expect("valid seminar")
    }

    #[test]
    fn notify_key_carries_the_full_offset_instant() {
        assert_eq!(
            notify_key(&seminar()),
            "Learning to Rank|Ada Lovelace|2025-11-21T10:30:00+08:00"
        );
    }

    #[test]
    fn calendar_key_truncates_the_start_to_the_minute() {
        let seminar = seminar();
        assert_eq!(
            calendar_key("[HKU CS Seminar] Learning to Rank — Ada Lovelace", &seminar.start),
            "[HKU CS Seminar] Learning to Rank — Ada Lovelace|2025-11-21T10:30"
        );
    }

    #[test]
    fn wire_key_agrees_with_the_local_key() {
        let seminar = seminar();
        let subject = "[HKU CS Seminar] Learning to Rank — Ada Lovelace";

        assert_eq!(
            calendar_key_from_wire(subject, "2025-11-21T10:30:00.0000000"),
            calendar_key(subject, &seminar.start)
        );
    }

    #[test]
    fn keys_are_deterministic() {
        let seminar = seminar();
        assert_eq!(notify_key(&seminar), notify_key(&seminar.clone()));
        assert_eq!(
            calendar_key("subject", &seminar.start),
            calendar_key("subject", &seminar.start)
        );
    }
}
