use chrono::TimeZone;
use hku_seminar_sync::error::SyncError;
use hku_seminar_sync::hku_page::api::parse_seminar_table;
use hku_seminar_sync::hku_page::time::HK_TZ;

const PAGE: &str = r#"
<html><body>
<h2>Courses offered</h2>
<table><tr><td>Unrelated table</td></tr></table>
<h2>Schedule of the seminars</h2>
<table>
  <tr><th>Title</th><th>Speaker</th><th>Date and time</th><th>Venue</th></tr>
  <tr>
    <td><a href="/seminars/learning-to-rank.pdf">Learning to Rank</a></td>
    <td>Ada Lovelace</td>
    <td>November 21, 2025<br>10:30 am - 11:30 am</td>
    <td>Room 308</td>
  </tr>
  <tr>
    <td>Quantum Complexity</td>
    <td>Alan Turing</td>
    <td>November 28, 2025<br>11:00 am - 12:00 nn</td>
    <td>Room 101</td>
  </tr>
  <tr><td>Row without enough cells</td></tr>
</table>
</body></html>
"#;

#[test_log::test]
fn should_extract_rows_from_the_schedule_table() {
    let rows = parse_seminar_table(PAGE).unwrap();

    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].title, "Learning to Rank");
    assert_eq!(
        rows[0].link.as_deref(),
        Some("https://www.cs.hku.hk/seminars/learning-to-rank.pdf")
    );
    assert_eq!(rows[0].speaker, "Ada Lovelace");
    assert_eq!(rows[0].date_text, "November 21, 2025");
    assert_eq!(rows[0].time_range_text, "10:30 am - 11:30 am");
    assert_eq!(rows[0].venue, "Room 308");

    assert_eq!(rows[1].title, "Quantum Complexity");
    assert_eq!(rows[1].link, None);
    assert_eq!(rows[1].time_range_text, "11:00 am - 12:00 nn");
}

#[test_log::test]
fn should_normalize_rows_into_seminars() {
    let rows = parse_seminar_table(PAGE).unwrap();
    let seminar = rows[0].to_model().unwrap();

    assert_eq!(
        seminar.start,
        HK_TZ.with_ymd_and_hms(2025, 11, 21, 10, 30, 0).unwrap()
    );
    assert_eq!(
        seminar.end,
        HK_TZ.with_ymd_and_hms(2025, 11, 21, 11, 30, 0).unwrap()
    );
    assert_eq!(
        seminar.subject(),
        "[HKU CS Seminar] Learning to Rank — Ada Lovelace"
    );
}

#[test_log::test]
fn should_fail_when_the_heading_is_missing() {
    let result = parse_seminar_table("<html><body><h2>Other</h2></body></html>");

    assert!(matches!(result, Err(SyncError::PageStructure(_))));
}

#[test_log::test]
fn should_fail_when_no_table_follows_the_heading() {
    let result =
        parse_seminar_table("<html><body><h2>Schedule of the seminars</h2></body></html>");

    assert!(matches!(result, Err(SyncError::PageStructure(_))));
}

#[test_log::test]
fn should_skip_rows_whose_date_cell_is_empty() {
    let page = r#"
    <h2>Schedule of the seminars</h2>
    <table>
      <tr><th>Title</th><th>Speaker</th><th>Date and time</th><th>Venue</th></tr>
      <tr><td>Untimed</td><td>Nobody</td><td></td><td>Room 1</td></tr>
    </table>
    "#;

    assert!(parse_seminar_table(page).unwrap().is_empty());
}
