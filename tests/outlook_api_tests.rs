use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use hku_seminar_sync::config::model::OutlookConfig;
use hku_seminar_sync::error::SyncError;
use hku_seminar_sync::hku_page::model::Seminar;
use hku_seminar_sync::hku_page::time::HK_TZ;
use hku_seminar_sync::outlook::api::OutlookCalendarAPI;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seminar(title: &str, day: u32) -> Seminar {
    Seminar::new(
        title.to_string(),
        "Ada Lovelace".to_string(),
        "Room 308".to_string(),
        None,
        HK_TZ.with_ymd_and_hms(2025, 11, day, 10, 30, 0).unwrap(),
        HK_TZ.with_ymd_and_hms(2025, 11, day, 11, 30, 0).unwrap(),
    )
    .expect("valid seminar")
}

fn api(server: &MockServer) -> OutlookCalendarAPI {
    OutlookCalendarAPI::new(OutlookConfig {
        access_token: "test-token".to_string(),
        base_url: server.uri(),
    })
    .expect("valid outlook config")
}

fn now() -> DateTime<Tz> {
    HK_TZ.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap()
}

fn remote_event(id: &str, subject: &str, day: u32) -> serde_json::Value {
    json!({
        "id": id,
        "subject": subject,
        "start": {
            "dateTime": format!("2025-11-{:02}T10:30:00.0000000", day),
            "timeZone": "Asia/Hong_Kong"
        },
        "end": {
            "dateTime": format!("2025-11-{:02}T11:30:00.0000000", day),
            "timeZone": "Asia/Hong_Kong"
        }
    })
}

#[test_log::test(tokio::test)]
async fn should_create_seminars_missing_from_the_calendar() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Prefer", "outlook.timezone=\"Asia/Hong_Kong\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/me/calendar/events"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "start": { "dateTime": "2025-11-21T10:30:00", "timeZone": "Asia/Hong_Kong" },
            "location": { "displayName": "Room 308" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt-new" })))
        .expect(1)
        .mount(&server)
        .await;

    let (created, deleted) = api(&server)
        .reconcile_events(&[seminar("Learning to Rank", 21)], now())
        .await
        .unwrap();

    assert_eq!(created, 1);
    assert_eq!(deleted, 0);
}

#[test_log::test(tokio::test)]
async fn should_follow_pagination_before_deciding_what_is_missing() {
    let server = MockServer::start().await;
    let existing = seminar("Learning to Rank", 21);

    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [],
            "@odata.nextLink": format!("{}/me/calendarView?cursor=2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .and(query_param("cursor", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [remote_event("evt-1", &existing.subject(), 21)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    // The event only shows up on the second page, so nothing gets created
    Mock::given(method("POST"))
        .and(path("/me/calendar/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt-dup" })))
        .expect(0)
        .mount(&server)
        .await;

    let (created, deleted) = api(&server)
        .reconcile_events(&[existing.clone()], now())
        .await
        .unwrap();

    assert_eq!(created, 0);
    assert_eq!(deleted, 0);
}

#[test_log::test(tokio::test)]
async fn should_be_idempotent_across_identical_runs() {
    let server = MockServer::start().await;
    let existing = seminar("Learning to Rank", 21);

    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [remote_event("evt-1", &existing.subject(), 21)]
        })))
        .mount(&server)
        .await;

    let api = api(&server);
    let first = api.reconcile_events(&[existing.clone()], now()).await.unwrap();
    let second = api.reconcile_events(&[existing], now()).await.unwrap();

    assert_eq!(first, (0, 0));
    assert_eq!(second, (0, 0));
}

#[test_log::test(tokio::test)]
async fn should_not_touch_events_without_the_subject_prefix() {
    let server = MockServer::start().await;
    let upcoming = seminar("Learning to Rank", 21);

    // Same talk, but the subject carries no prefix: not ours, so the
    // seminar still gets created and the stale event is left alone
    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                remote_event("evt-foreign", "Learning to Rank — Ada Lovelace", 21),
                remote_event("evt-old-foreign", "Department retreat", 18)
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/me/calendar/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "evt-new" })))
        .expect(1)
        .mount(&server)
        .await;

    let (created, deleted) = api(&server)
        .reconcile_events(&[upcoming], now())
        .await
        .unwrap();

    assert_eq!(created, 1);
    assert_eq!(deleted, 0);
}

#[test_log::test(tokio::test)]
async fn should_delete_owned_events_that_have_ended() {
    let server = MockServer::start().await;
    let upcoming = seminar("Learning to Rank", 21);
    let finished = seminar("Old Talk", 18);

    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                remote_event("evt-upcoming", &upcoming.subject(), 21),
                remote_event("evt-finished", &finished.subject(), 18)
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/me/calendar/events/evt-finished"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (created, deleted) = api(&server)
        .reconcile_events(&[upcoming], now())
        .await
        .unwrap();

    assert_eq!(created, 0);
    assert_eq!(deleted, 1);
}

#[test_log::test(tokio::test)]
async fn should_count_a_not_found_delete_as_success() {
    let server = MockServer::start().await;
    let upcoming = seminar("Learning to Rank", 21);
    let finished = seminar("Old Talk", 18);

    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                remote_event("evt-upcoming", &upcoming.subject(), 21),
                remote_event("evt-gone", &finished.subject(), 18)
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/me/calendar/events/evt-gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (created, deleted) = api(&server)
        .reconcile_events(&[upcoming], now())
        .await
        .unwrap();

    assert_eq!(created, 0);
    assert_eq!(deleted, 1);
}

#[test_log::test(tokio::test)]
async fn should_surface_other_delete_failures() {
    let server = MockServer::start().await;
    let upcoming = seminar("Learning to Rank", 21);
    let finished = seminar("Old Talk", 18);

    Mock::given(method("GET"))
        .and(path("/me/calendarView"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                remote_event("evt-upcoming", &upcoming.subject(), 21),
                remote_event("evt-stuck", &finished.subject(), 18)
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/me/calendar/events/evt-stuck"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let outcome = api(&server).reconcile_events(&[upcoming], now()).await;

    assert!(matches!(outcome, Err(SyncError::Api { .. })));
}

#[test_log::test(tokio::test)]
async fn should_reconcile_nothing_when_the_scrape_is_empty() {
    let server = MockServer::start().await;

    let (created, deleted) = api(&server).reconcile_events(&[], now()).await.unwrap();

    assert_eq!((created, deleted), (0, 0));
}

#[test_log::test(tokio::test)]
async fn should_refuse_to_run_without_a_token() {
    let result = OutlookCalendarAPI::new(OutlookConfig {
        access_token: String::new(),
        base_url: "https://graph.microsoft.com/v1.0".to_string(),
    });

    assert!(matches!(result, Err(SyncError::Config(_))));
}
