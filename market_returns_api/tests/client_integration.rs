use chrono::NaiveDate;
use market_returns_api::{ChartQuery, Client, Error};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn ytd_query() -> ChartQuery {
    ChartQuery::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
    )
}

#[tokio::test]
async fn get_chart_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("chart_agg.json");

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .and(query_param("period1", "1704067200"))
        .and(query_param("period2", "1718409600"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart("AGG", &ytd_query()).await;
    assert!(result.is_ok());

    let resp = result.unwrap();
    let results = resp.chart.result.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].meta.symbol, "AGG");
    assert_eq!(results[0].timestamps().len(), 6);
}

#[tokio::test]
async fn get_chart_result_returns_first_block() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("chart_agg.json");

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart_result("AGG", &ytd_query()).await.unwrap();
    assert_eq!(result.closes()[0], Some(99.0));
    assert_eq!(result.adjusted_closes().unwrap()[0], Some(96.0));
}

#[tokio::test]
async fn get_chart_not_found() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("chart_not_found.json");

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart("NOPE", &ytd_query()).await;
    assert!(matches!(result, Err(Error::SymbolNotFound(ref s)) if s == "NOPE"));
}

#[tokio::test]
async fn get_chart_error_object_in_ok_response() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("chart_not_found.json");

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let err = client.get_chart("AGG", &ytd_query()).await.unwrap_err();
    match err {
        Error::Upstream { code, description } => {
            assert_eq!(code, "Not Found");
            assert!(description.contains("delisted"));
        }
        other => panic!("expected Upstream, got {:?}", other),
    }
}

#[tokio::test]
async fn get_chart_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart("AGG", &ytd_query()).await;
    assert!(matches!(result, Err(Error::RateLimited)));
}

#[tokio::test]
async fn get_chart_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart("AGG", &ytd_query()).await;
    match result {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        _ => panic!("expected HttpStatus error"),
    }
}

#[tokio::test]
async fn get_chart_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart("AGG", &ytd_query()).await;
    assert!(matches!(result, Err(Error::ParseFailed(_))));
}

#[tokio::test]
async fn get_chart_result_null_result_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AGG"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"chart":{"result":[],"error":null}}"#),
        )
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_chart_result("AGG", &ytd_query()).await;
    assert!(matches!(result, Err(Error::SymbolNotFound(_))));
}
