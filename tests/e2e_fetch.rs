//! E2E tests for POST /fetch_tn_data

mod common;

use chrono::{Duration, Utc};
use common::{MockUpstream, MockYear, TestServer, upstream_record};
use mgnrega::config::DEFAULT_FIN_YEARS;
use mgnrega::data::RecordFilter;
use serde_json::json;

#[tokio::test]
async fn test_fetch_stores_mock_records() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2023-2024",
        MockYear::Records(vec![
            upstream_record("MADURAI", "2023-2024"),
            upstream_record("SALEM", "2023-2024"),
            upstream_record("VELLORE", "2023-2024"),
        ]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let body = server.fetch().await;

    assert_eq!(body["cached"], false);
    assert_eq!(body["message"], "3 Tamil Nadu records stored successfully");
    assert_eq!(server.state.db.count_records().await.unwrap(), 3);

    let stored = server
        .state
        .db
        .query_records(&RecordFilter::default())
        .await
        .unwrap();
    assert!(stored.iter().all(|row| row.record.fin_year == "2023-2024"));
    assert_eq!(stored[0].record.total_exp, 18234.77);
    assert_eq!(stored[0].record.women_persondays, 2300450.0);
}

#[tokio::test]
async fn test_fetch_requests_every_year_in_order() {
    let server = TestServer::new().await;

    server.fetch().await;

    let requests = server.upstream.requests();
    assert_eq!(requests.len(), DEFAULT_FIN_YEARS.len());

    for (request, year) in requests.iter().zip(DEFAULT_FIN_YEARS) {
        assert_eq!(request["filters[fin_year]"], year);
        assert_eq!(request["filters[state_name]"], "TAMIL NADU");
        assert_eq!(request["api-key"], "test-api-key");
        assert_eq!(request["format"], "json");
        assert_eq!(request["limit"], "1000");
        assert!(!request.contains_key("offset"));
    }
}

#[tokio::test]
async fn test_second_fetch_within_window_is_cached() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2022-2023",
        MockYear::Records(vec![upstream_record("MADURAI", "2022-2023")]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let first = server.fetch().await;
    assert_eq!(first["cached"], false);
    let calls_after_first = server.upstream.request_count();
    assert_eq!(calls_after_first, DEFAULT_FIN_YEARS.len());

    let second = server.fetch().await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["message"], "Using cached data (from memory)");
    assert_eq!(server.upstream.request_count(), calls_after_first);
    assert_eq!(server.state.db.count_records().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_fetches_run_pipeline_once() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2024-2025",
        MockYear::Records(vec![
            upstream_record("MADURAI", "2024-2025"),
            upstream_record("SALEM", "2024-2025"),
        ]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let (a, b) = tokio::join!(server.fetch(), server.fetch());

    let cached: Vec<bool> = [a, b]
        .iter()
        .map(|body| body["cached"].as_bool().unwrap())
        .collect();
    assert_eq!(cached.iter().filter(|c| **c).count(), 1);
    assert_eq!(server.upstream.request_count(), DEFAULT_FIN_YEARS.len());
    assert_eq!(server.state.db.count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_year_does_not_abort_later_years() {
    let upstream = MockUpstream::start().await;
    upstream.set_year("2019-2020", MockYear::Status(500));
    upstream.set_year(
        "2020-2021",
        MockYear::Records(vec![upstream_record("MADURAI", "2020-2021")]),
    );
    upstream.set_year(
        "2024-2025",
        MockYear::Records(vec![upstream_record("SALEM", "2024-2025")]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let body = server.fetch().await;

    assert_eq!(body["cached"], false);
    assert_eq!(body["message"], "2 Tamil Nadu records stored successfully");
    assert_eq!(server.upstream.request_count(), DEFAULT_FIN_YEARS.len());

    let years: Vec<String> = server
        .state
        .db
        .query_records(&RecordFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.record.fin_year)
        .collect();
    assert_eq!(years, vec!["2020-2021", "2024-2025"]);
}

#[tokio::test]
async fn test_all_years_failing_still_succeeds_with_zero() {
    let upstream = MockUpstream::start().await;
    for year in DEFAULT_FIN_YEARS {
        upstream.set_year(year, MockYear::Status(503));
    }
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let body = server.fetch().await;

    assert_eq!(body["cached"], false);
    assert_eq!(body["message"], "0 Tamil Nadu records stored successfully");
    assert_eq!(server.state.db.count_records().await.unwrap(), 0);
    assert!(server.state.fetch_cache.is_valid().await);
}

#[tokio::test]
async fn test_unreachable_upstream_is_skipped() {
    let upstream = MockUpstream::start().await;
    let server = TestServer::with_upstream(upstream, |config| {
        config.upstream.base_url = "http://127.0.0.1:9/resource/mgnrega".to_string();
        config.upstream.years = vec!["2023-2024".to_string()];
    })
    .await;

    let body = server.fetch().await;

    assert_eq!(body["cached"], false);
    assert_eq!(body["message"], "0 Tamil Nadu records stored successfully");
}

#[tokio::test]
async fn test_missing_and_malformed_numbers_are_stored_as_zero() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2021-2022",
        MockYear::Records(vec![json!({
            "state_name": "TAMIL NADU",
            "district_name": "ARIYALUR",
            "month": "Jan",
            "Total_Exp": null,
            "Wages": "NA",
            "SC_persondays": "",
            "Approved_Labour_Budget": 5000,
        })]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let body = server.fetch().await;
    assert_eq!(body["message"], "1 Tamil Nadu records stored successfully");

    let stored = server
        .state
        .db
        .query_records(&RecordFilter::default())
        .await
        .unwrap();
    let record = &stored[0].record;

    assert_eq!(record.total_exp, 0.0);
    assert_eq!(record.wages, 0.0);
    assert_eq!(record.sc_persondays, 0.0);
    assert_eq!(record.st_persondays, 0.0);
    assert_eq!(record.approved_labour_budget, 5000.0);
    assert_eq!(record.fin_year, "2021-2022");
}

#[tokio::test]
async fn test_cache_holds_only_latest_refresh() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2023-2024",
        MockYear::Records(vec![upstream_record("MADURAI", "2023-2024")]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    server.fetch().await;

    // Age the cache past the window so the next request refreshes again.
    let stale = Utc::now() - Duration::hours(7);
    server.state.fetch_cache.store(Vec::new(), stale).await;
    assert!(!server.state.fetch_cache.is_valid().await);

    server.upstream.set_year(
        "2023-2024",
        MockYear::Records(vec![
            upstream_record("SALEM", "2023-2024"),
            upstream_record("VELLORE", "2023-2024"),
        ]),
    );

    let body = server.fetch().await;
    assert_eq!(body["cached"], false);

    let entry = server.state.fetch_cache.snapshot().await.unwrap();
    assert_eq!(entry.records.len(), 2);
    assert!(entry.fetched_at > stale);

    // Refetching appends instead of replacing rows.
    assert_eq!(server.state.db.count_records().await.unwrap(), 3);
}

#[tokio::test]
async fn test_pagination_follows_full_pages() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2023-2024",
        MockYear::Records(vec![
            upstream_record("MADURAI", "2023-2024"),
            upstream_record("SALEM", "2023-2024"),
        ]),
    );
    let server = TestServer::with_upstream(upstream, |config| {
        config.upstream.years = vec!["2023-2024".to_string()];
        config.upstream.page_limit = 2;
        config.upstream.max_pages = 3;
    })
    .await;

    server.fetch().await;

    // The mock ignores offset, so every page is full and paging stops at max_pages.
    let requests = server.upstream.requests();
    assert_eq!(requests.len(), 3);
    assert!(!requests[0].contains_key("offset"));
    assert_eq!(requests[1]["offset"], "2");
    assert_eq!(requests[2]["offset"], "4");
    assert_eq!(server.state.db.count_records().await.unwrap(), 6);
}

#[tokio::test]
async fn test_undecodable_body_skips_only_that_year() {
    let upstream = MockUpstream::start().await;
    upstream.set_year("2018-2019", MockYear::Body("<html>down</html>".to_string()));
    upstream.set_year(
        "2019-2020",
        MockYear::Body(r#"{"records": "x"}"#.to_string()),
    );
    upstream.set_year(
        "2020-2021",
        MockYear::Records(vec![upstream_record("MADURAI", "2020-2021")]),
    );
    let server = TestServer::with_upstream(upstream, |_| {}).await;

    let body = server.fetch().await;

    assert_eq!(body["cached"], false);
    assert_eq!(body["message"], "1 Tamil Nadu records stored successfully");
    assert_eq!(server.upstream.request_count(), DEFAULT_FIN_YEARS.len());

    let stored = server
        .state
        .db
        .query_records(&RecordFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.fin_year, "2020-2021");
}

#[tokio::test]
async fn test_out_of_range_number_keeps_the_rest_of_the_year() {
    let upstream = MockUpstream::start().await;
    upstream.set_year(
        "2023-2024",
        MockYear::Body(
            r#"{"records": [
                {"state_name": "TAMIL NADU", "district_name": "MADURAI", "Total_Exp": "5"},
                {"state_name": "TAMIL NADU", "district_name": "SALEM", "Total_Exp": 1e400, "Wages": 7}
            ]}"#
            .to_string(),
        ),
    );
    let server = TestServer::with_upstream(upstream, |config| {
        config.upstream.years = vec!["2023-2024".to_string()];
    })
    .await;

    let body = server.fetch().await;
    assert_eq!(body["message"], "2 Tamil Nadu records stored successfully");

    let stored = server
        .state
        .db
        .query_records(&RecordFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].record.district_name.as_deref(), Some("MADURAI"));
    assert_eq!(stored[0].record.total_exp, 5.0);
    assert_eq!(stored[1].record.district_name.as_deref(), Some("SALEM"));
    assert_eq!(stored[1].record.total_exp, 0.0);
    assert_eq!(stored[1].record.wages, 7.0);
}
