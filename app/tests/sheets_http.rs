//! HTTP contract tests for the sheet client and the sheet-backed service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use cinema_admin::codec::{BOOKING_DATE, SEATS, TOTAL_AMOUNT};
use cinema_admin::{
    decode_rows, BookingService, BookingServiceError, SeatCode, SheetsBookingService, SheetsClient,
    SheetsConfig,
};
use reqwest::Url;
use serde_json::json;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCENARIO: &str = r#"[{"訂票日期":"2025/01/20","電影名稱":"Demo","場次日期":"2025/01/20","場次時間":"14:30","人數":"2","票種":"全票","座位":"A1,A2","總金額":"560"}]"#;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
}

fn config_for(server: &MockServer) -> SheetsConfig {
    SheetsConfig::new(Url::parse(&server.uri()).unwrap())
}

fn service_for(server: &MockServer) -> SheetsBookingService {
    SheetsBookingService::new(SheetsClient::new(config_for(server)).unwrap())
}

#[tokio::test]
async fn fetch_sends_sheet_and_date_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("sheet", "工作表1"))
        .and(query_param(BOOKING_DATE, "2025/01/20"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SCENARIO, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let bookings = service_for(&server).fetch_bookings(day()).await.unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].movie_name, "Demo");
    assert_eq!(SeatCode::join(&bookings[0].seats), "A1,A2");
    assert_eq!(bookings[0].total_amount.to_string(), "560");
}

#[tokio::test]
async fn configured_date_format_is_used_in_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param(BOOKING_DATE, "2025-01-20"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.date_format = "%Y-%m-%d".to_string();
    let client = SheetsClient::new(config).unwrap();

    assert!(client.fetch_rows(day()).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_keeps_the_endpoint_path_and_query() {
    for base in ["/abc?auth=x", "/abc/?auth=x"] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abc/search"))
            .and(query_param("auth", "x"))
            .and(query_param("sheet", "工作表1"))
            .and(query_param(BOOKING_DATE, "2025/01/20"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SCENARIO, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}{base}", server.uri())).unwrap();
        let client = SheetsClient::new(SheetsConfig::new(endpoint)).unwrap();

        let rows = assert_ok!(client.fetch_rows(day()).await);
        assert_eq!(rows.len(), 1, "endpoint {base}");
    }
}

#[tokio::test]
async fn empty_array_is_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let bookings = assert_ok!(service_for(&server).fetch_bookings(day()).await);
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn non_success_status_is_a_bad_server_response() {
    for status in [301, 400, 404, 500, 503] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            // A body that would otherwise decode must not matter
            .respond_with(ResponseTemplate::new(status).set_body_raw(SCENARIO, "application/json"))
            .mount(&server)
            .await;

        let result = service_for(&server).fetch_bookings(day()).await;
        assert!(
            matches!(result, Err(BookingServiceError::BadServerResponse)),
            "status {status} gave {result:?}"
        );
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"[{"電影名稱":"Demo"}]"#, "application/json"),
        )
        .mount(&server)
        .await;

    let result = service_for(&server).fetch_bookings(day()).await;
    assert!(matches!(result, Err(BookingServiceError::Decode(_))));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("[]", "application/json")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout(Duration::from_millis(200));
    let service = SheetsBookingService::new(SheetsClient::new(config).unwrap());

    let result = service.fetch_bookings(day()).await;
    assert!(matches!(result, Err(BookingServiceError::Timeout)), "got {result:?}");
}

#[tokio::test]
async fn add_posts_the_row_and_requires_created() {
    let record = decode_rows(SCENARIO.as_bytes()).unwrap().remove(0);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("sheet", "工作表1"))
        .and(body_partial_json(json!({
            BOOKING_DATE: "2025/01/20",
            SEATS: "A1,A2",
            TOTAL_AMOUNT: "560",
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(service_for(&server).add_booking(record).await);
}

#[tokio::test]
async fn add_rejects_any_status_but_created() {
    let record = decode_rows(SCENARIO.as_bytes()).unwrap().remove(0);

    for status in [200, 204, 400, 500] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let result = service_for(&server).add_booking(record.clone()).await;
        assert!(
            matches!(result, Err(BookingServiceError::BadServerResponse)),
            "status {status} gave {result:?}"
        );
    }
}

#[tokio::test]
async fn update_and_delete_fail_loudly_without_a_request() {
    let record = decode_rows(SCENARIO.as_bytes()).unwrap().remove(0);

    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = service_for(&server);

    let result = service.update_booking(record).await;
    assert!(matches!(
        result,
        Err(BookingServiceError::Unsupported { operation: "update_booking" })
    ));

    let result = service.delete_booking(day(), "Demo".to_string()).await;
    assert!(matches!(
        result,
        Err(BookingServiceError::Unsupported { operation: "delete_booking" })
    ));
}
