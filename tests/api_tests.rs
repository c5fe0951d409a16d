//! Integration tests for the backend client and the read-only views,
//! driven end-to-end against the in-process mock backend.

mod support;

use std::time::Duration;

use gridwatch::api::ApiClient;
use gridwatch::chat::{self, ChatRole};
use gridwatch::reports::{self, PREVIEW_MAX_LINES};
use gridwatch::zones;
use serde_json::json;
use support::{MockBackend, Route, json_route};

fn client_for(backend: &MockBackend) -> ApiClient {
    ApiClient::new(backend.base_url(), Duration::from_secs(5))
}

// ---------------------------------------------------------------------------
// Carbon intensity
// ---------------------------------------------------------------------------

#[test]
fn fetches_a_carbon_reading() {
    let backend = MockBackend::start(vec![json_route(
        "GET",
        "/api/carbon-intensity",
        json!({"region": "IN-WE", "carbon_intensity": 712.4, "unit": "gCO2eq/kWh"}),
    )]);
    let client = client_for(&backend);

    let reading = client.carbon_intensity("IN-WE").unwrap();
    assert_eq!(reading.region, "IN-WE");
    assert_eq!(reading.carbon_intensity, 712.4);
    assert_eq!(backend.hits("GET", "/api/carbon-intensity"), 1);
}

#[test]
fn null_intensity_is_an_error_not_a_reading() {
    let backend = MockBackend::start(vec![json_route(
        "GET",
        "/api/carbon-intensity",
        json!({"region": "IN-WE", "carbon_intensity": null, "error": "no API key"}),
    )]);
    let client = client_for(&backend);

    let err = client.carbon_intensity("IN-WE").unwrap_err();
    assert!(err.to_string().contains("IN-WE"));
}

#[test]
fn unreachable_backend_is_an_error() {
    // Nothing listens on this port.
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(300));
    assert!(client.carbon_intensity("IN-WE").is_err());
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[test]
fn chat_answer_with_carbon_info() {
    let backend = MockBackend::start(vec![json_route(
        "POST",
        "/api/greenai",
        json!({
            "answer": "Run it tonight after 22:00.",
            "carbon": {"region": "IN-WE", "carbon_intensity": 640.0}
        }),
    )]);
    let client = client_for(&backend);

    let messages = chat::exchange(&client, "when should I train?");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::Assistant);
    assert!(messages[0].text.contains("tonight"));
    assert_eq!(messages[1].role, ChatRole::Info);
    assert!(messages[1].text.contains("640.0"));
    assert!(messages[1].text.contains("IN-WE"));
}

#[test]
fn chat_answer_without_carbon_has_no_info_line() {
    let backend = MockBackend::start(vec![json_route(
        "POST",
        "/api/greenai",
        json!({"answer": "Hello."}),
    )]);
    let client = client_for(&backend);

    let messages = chat::exchange(&client, "hi");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, ChatRole::Assistant);
}

#[test]
fn chat_server_error_becomes_an_error_message() {
    let backend = MockBackend::start(vec![json_route(
        "POST",
        "/api/greenai",
        json!({"error": "model not loaded"}),
    )]);
    let client = client_for(&backend);

    let messages = chat::exchange(&client, "hi");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, ChatRole::Error);
    assert!(messages[0].text.contains("model not loaded"));
}

#[test]
fn chat_null_carbon_intensity_is_dropped_from_info() {
    let backend = MockBackend::start(vec![json_route(
        "POST",
        "/api/greenai",
        json!({
            "answer": "Hello.",
            "carbon": {"region": "IN-WE", "carbon_intensity": null}
        }),
    )]);
    let client = client_for(&backend);

    let messages = chat::exchange(&client, "hi");
    assert_eq!(messages.len(), 1);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn listing_sorts_newest_first_end_to_end() {
    let backend = MockBackend::start(vec![json_route(
        "GET",
        "/api/get-reports",
        json!([
            {"filename": "b.csv", "size": 200, "modified": "2024-03-01T12:00:00"},
            {"filename": "a.csv", "size": 100, "modified": "2024-03-01T11:00:00"},
            {"filename": "c.csv", "size": 300, "modified": "2024-03-01T13:00:00"}
        ]),
    )]);
    let client = client_for(&backend);

    let mut list = client.reports().unwrap();
    reports::sort_reports(&mut list);
    let names: Vec<&str> = list.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["c.csv", "b.csv", "a.csv"]);
}

#[test]
fn preview_truncates_a_long_report() {
    let body: String = (0..50).map(|i| format!("row{i}\n")).collect();
    let backend = MockBackend::start(vec![Route {
        method: "GET",
        path: "/api/download-report/big.csv".to_string(),
        status: 200,
        body,
    }]);
    let client = client_for(&backend);

    let body = client.report_body("big.csv").unwrap();
    let preview = reports::preview_lines(&body, PREVIEW_MAX_LINES);
    assert_eq!(preview.lines().count(), 11);
}

// ---------------------------------------------------------------------------
// Zone survey
// ---------------------------------------------------------------------------

#[test]
fn survey_mixes_live_and_typical_values() {
    let backend = MockBackend::start(vec![
        json_route(
            "GET",
            "/api/carbon-intensity?region=IN-WE",
            json!({"region": "IN-WE", "carbon_intensity": 712.0}),
        ),
        json_route(
            "GET",
            "/api/carbon-intensity?region=SE-SE4",
            json!({"region": "SE-SE4", "carbon_intensity": 50.0}),
        ),
    ]);
    let client = client_for(&backend);

    let readings = zones::survey(&client);
    assert_eq!(readings.len(), zones::ZONES.len());
    assert_eq!(backend.hits("GET", "/api/carbon-intensity"), 2);

    let in_we = readings.iter().find(|r| r.zone.code == "IN-WE").unwrap();
    assert!(in_we.live);
    assert_eq!(in_we.intensity, 712.0);

    let de = readings.iter().find(|r| r.zone.code == "DE").unwrap();
    assert!(!de.live);
    assert_eq!(de.intensity, 350.0);
}

#[test]
fn survey_falls_back_to_simulated_on_live_failure() {
    // No routes at all: both live fetches 404 and fall back.
    let backend = MockBackend::start(vec![]);
    let client = client_for(&backend);

    let readings = zones::survey(&client);
    let in_we = readings.iter().find(|r| r.zone.code == "IN-WE").unwrap();
    assert!(!in_we.live);
    assert_eq!(in_we.intensity, 400.0); // unmapped code → default
}
