use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use market_data_api::config::AppConfig;
use market_data_api::routes::register_routes;
use market_data_api::state::AppState;
use once_cell::sync::Lazy;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

//
// ----------- Global Setup -----------
//

static INIT: Lazy<()> = Lazy::new(|| {
    dotenvy::dotenv().ok();
});

//
// ----------- Test Helpers -----------
//

fn test_state(upstream_base: &str) -> AppState {
    AppState::new(AppConfig {
        options_base_url: upstream_base.to_string(),
        futures_base_url: upstream_base.to_string(),
        settlement_ttl_hours: 24,
        app_server_port: 8080,
    })
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("should receive a response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let body: Value = serde_json::from_slice(&bytes).expect("should parse JSON");

    (status, body)
}

fn option_chain_body(expiries: &[i64], implied_volatilities: &[f64]) -> Value {
    let calls: Vec<Value> = implied_volatilities
        .iter()
        .map(|iv| serde_json::json!({ "impliedVolatility": iv }))
        .collect();

    serde_json::json!({
        "optionChain": {
            "result": [{
                "expirationDates": expiries,
                "options": [{ "calls": calls }]
            }]
        }
    })
}

async fn mount_option_chain(server: &MockServer, symbol: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v7/finance/options"))
        .and(query_param("symbol", symbol))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts both settlement steps for one product code, expecting the cache
/// to keep each step at exactly one upstream hit.
async fn mount_settlement(server: &MockServer, code: &str, contract: &str, last_settlement: &str) {
    Mock::given(method("GET"))
        .and(path("/front-month"))
        .and(query_param("code", code))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "contract": contract })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/quotes"))
        .and(query_param("code", code))
        .and(query_param("contract", contract))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "quotes": [{ "lastSettlement": last_settlement }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

//
// ----------- Tests -----------
//

#[tokio::test]
async fn dados_assembles_the_full_bundle() {
    let _ = *INIT;

    let server = MockServer::start().await;
    mount_option_chain(
        &server,
        "^NDX",
        option_chain_body(&[1767139200], &[0.21, 0.23, 0.19]),
    )
    .await;
    mount_option_chain(&server, "^GSPC", option_chain_body(&[1767139200], &[0.18])).await;
    mount_settlement(&server, "NQ", "NQZ5", "21,412.25").await;
    mount_settlement(&server, "ES", "ESZ5", "6,123.50").await;

    let app = register_routes(test_state(&server.uri()));
    let (status, body) = get_json(&app, "/dados").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["ativos_spot"]["NDX"]["volatilidade_implícita_estim"],
        serde_json::json!(0.21)
    );
    assert_eq!(
        body["ativos_spot"]["SPX"]["volatilidade_implícita_estim"],
        serde_json::json!(0.18)
    );
    assert_eq!(
        body["futuros_cme"]["NQ"]["ajuste_diário"],
        serde_json::json!(21412.25)
    );
    assert_eq!(
        body["futuros_cme"]["ES"]["ajuste_diário"],
        serde_json::json!(6123.5)
    );
}

#[tokio::test]
async fn dados_serves_settlements_from_cache_on_repeat_requests() {
    let _ = *INIT;

    let server = MockServer::start().await;
    mount_option_chain(
        &server,
        "^NDX",
        option_chain_body(&[1767139200], &[0.21]),
    )
    .await;
    mount_option_chain(&server, "^GSPC", option_chain_body(&[1767139200], &[0.18])).await;
    // expect(1) inside: a second request must not reach the provider.
    mount_settlement(&server, "NQ", "NQZ5", "21,412.25").await;
    mount_settlement(&server, "ES", "ESZ5", "6,123.50").await;

    let app = register_routes(test_state(&server.uri()));

    let (_, first) = get_json(&app, "/dados").await;
    let (_, second) = get_json(&app, "/dados").await;

    assert_eq!(first["futuros_cme"], second["futuros_cme"]);
    server.verify().await;
}

#[tokio::test]
async fn dados_reports_null_volatility_when_no_expiries_exist() {
    let _ = *INIT;

    let server = MockServer::start().await;
    mount_option_chain(&server, "^NDX", option_chain_body(&[], &[])).await;
    mount_option_chain(&server, "^GSPC", option_chain_body(&[], &[])).await;
    mount_settlement(&server, "NQ", "NQZ5", "21,412.25").await;
    mount_settlement(&server, "ES", "ESZ5", "6,123.50").await;

    let app = register_routes(test_state(&server.uri()));
    let (status, body) = get_json(&app, "/dados").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["ativos_spot"]["NDX"]["volatilidade_implícita_estim"],
        Value::Null
    );
    assert_eq!(
        body["ativos_spot"]["SPX"]["volatilidade_implícita_estim"],
        Value::Null
    );
}

#[tokio::test]
async fn dados_collapses_upstream_failures_to_null_with_status_200() {
    let _ = *INIT;

    // No mocks mounted at all: every upstream call hits a 404.
    let server = MockServer::start().await;

    let app = register_routes(test_state(&server.uri()));
    let (status, body) = get_json(&app, "/dados").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["ativos_spot"]["NDX"]["volatilidade_implícita_estim"],
        Value::Null
    );
    assert_eq!(body["futuros_cme"]["NQ"]["ajuste_diário"], Value::Null);
    assert_eq!(body["futuros_cme"]["ES"]["ajuste_diário"], Value::Null);
}
