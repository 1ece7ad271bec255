//! REST session tests against a local mock server.
//!
//! Every request is captured by `wiremock`, so the tests check both the
//! client's state transitions and the exact `jData` / `jKey` body it sends.

use std::sync::Arc;

use noren_rs::NorenClient;
use noren_rs::config::{Route, ServiceConfig};
use noren_rs::error::NorenError;
use noren_rs::types::auth::{LoginRequest, app_key, hash_password};
use noren_rs::types::enums::*;
use noren_rs::types::orders::PlaceOrderRequest;
use noren_rs::types::payload::Payload;
use noren_rs::ws::handler::FeedHandlers;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const WS_UNUSED: &str = "ws://127.0.0.1:1/";

fn client_for(server: &MockServer) -> NorenClient {
    NorenClient::new(server.uri(), WS_UNUSED)
}

fn login_request() -> LoginRequest {
    LoginRequest {
        user_id: "FA12345".into(),
        password: "secret".into(),
        two_fa: "123456".into(),
        vendor_code: "FA12345_U".into(),
        api_secret: "api-secret".into(),
        imei: "abc1234".into(),
    }
}

/// Split a captured body into its `jData` JSON and optional `jKey`.
fn parse_body(req: &Request) -> (Value, Option<String>) {
    let body = String::from_utf8(req.body.clone()).expect("utf-8 body");
    let body = body.strip_prefix("jData=").expect("body starts with jData=");
    let (data, key) = match body.rsplit_once("&jKey=") {
        Some((data, key)) => (data, Some(key.to_owned())),
        None => (body, None),
    };
    (serde_json::from_str(data).expect("jData is JSON"), key)
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.remove(0)
}

async fn mount_ok(server: &MockServer, route_path: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(route_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_session_and_sends_digests() {
    let server = MockServer::start().await;
    mount_ok(
        &server,
        "/QuickAuth",
        json!({"stat": "Ok", "susertoken": "tok-1", "actid": "ACC1", "uname": "Test User"}),
    )
    .await;

    let mut client = client_for(&server);
    let resp = client.login(&login_request()).await.unwrap();

    assert_eq!(resp.susertoken, "tok-1");
    assert_eq!(resp.uname.as_deref(), Some("Test User"));
    assert!(client.is_authenticated());
    assert_eq!(client.session_token(), Some("tok-1"));
    assert_eq!(client.session().user_id(), Some("FA12345"));
    assert_eq!(client.session().account_id(), Some("ACC1"));

    let req = only_request(&server).await;
    let (data, key) = parse_body(&req);
    assert_eq!(key, None, "login is not authorized");
    assert_eq!(data["uid"], "FA12345");
    assert_eq!(data["source"], "API");
    assert_eq!(data["pwd"], hash_password("secret"));
    assert_eq!(data["appkey"], app_key("FA12345", "api-secret"));
    assert_eq!(data["factor2"], "123456");
    assert_eq!(data["vc"], "FA12345_U");
    assert_eq!(data["imei"], "abc1234");
}

#[tokio::test]
async fn login_without_actid_uses_user_id_as_account() {
    let server = MockServer::start().await;
    mount_ok(&server, "/QuickAuth", json!({"stat": "Ok", "susertoken": "tok"})).await;

    let mut client = client_for(&server);
    client.login(&login_request()).await.unwrap();
    assert_eq!(client.session().account_id(), Some("FA12345"));
}

#[tokio::test]
async fn failed_login_leaves_session_untouched() {
    let server = MockServer::start().await;
    mount_ok(
        &server,
        "/QuickAuth",
        json!({"stat": "Not_Ok", "emsg": "Invalid Input : Wrong Password"}),
    )
    .await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "old-token");

    let err = client.login(&login_request()).await.unwrap_err();
    match err {
        NorenError::Api(body) => {
            assert_eq!(body.stat.as_deref(), Some("Not_Ok"));
            assert_eq!(body.emsg.as_deref(), Some("Invalid Input : Wrong Password"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(client.session_token(), Some("old-token"));
}

#[tokio::test]
async fn logout_clears_session() {
    let server = MockServer::start().await;
    mount_ok(&server, "/Logout", json!({"stat": "Ok", "request_time": "10:00:00"})).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    client.logout().await.unwrap();

    assert!(!client.is_authenticated());
    assert!(client.session().user_id().is_none());
    assert!(matches!(
        client.get_positions().await,
        Err(NorenError::NotAuthenticated)
    ));

    let req = only_request(&server).await;
    let (data, key) = parse_body(&req);
    assert_eq!(key.as_deref(), Some("tok"));
    assert_eq!(data["uid"], "FA12345");
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authorized_call_without_token_never_reaches_network() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .send(Route::OrderBook, &Payload::new().with("uid", "FA12345"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, NorenError::NotAuthenticated));

    let err = client.get_order_book().await.unwrap_err();
    assert!(matches!(err, NorenError::NotAuthenticated));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn set_session_appends_jkey() {
    let server = MockServer::start().await;
    mount_ok(&server, "/PositionBook", json!([{"tsym": "INFY-EQ", "netqty": "10"}])).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok-xyz");
    let positions = client.get_positions().await.unwrap();
    assert_eq!(positions.len(), 1);

    let req = only_request(&server).await;
    let (data, key) = parse_body(&req);
    assert_eq!(key.as_deref(), Some("tok-xyz"));
    assert_eq!(data["uid"], "FA12345");
    assert_eq!(data["actid"], "FA12345");
    assert_eq!(
        req.headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/x-www-form-urlencoded")
    );
}

// ---------------------------------------------------------------------------
// Response classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_route_failure_body_surfaces_as_api_error() {
    let server = MockServer::start().await;
    let failure = json!({"stat": "Not_Ok", "emsg": "no data", "request_time": "09:15:00"});
    mount_ok(&server, "/OrderBook", failure.clone()).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");

    match client.get_order_book().await.unwrap_err() {
        NorenError::Api(body) => {
            assert_eq!(body.emsg.as_deref(), Some("no data"));
            assert_eq!(body.request_time.as_deref(), Some("09:15:00"));
            assert_eq!(body.raw, failure);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn object_route_with_array_body_is_an_error() {
    let server = MockServer::start().await;
    mount_ok(&server, "/GetQuotes", json!([])).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");

    let err = client.get_quotes("NSE", "22").await.unwrap_err();
    assert!(matches!(err, NorenError::Api(body) if body.raw == json!([])));
}

#[tokio::test]
async fn non_json_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Limits"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");

    match client.get_limits(None, None, None).await.unwrap_err() {
        NorenError::HttpStatus { status, body } => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn route_override_is_honoured() {
    let server = MockServer::start().await;
    mount_ok(&server, "/v2/Holdings", json!([])).await;

    let config =
        ServiceConfig::new(server.uri(), WS_UNUSED).with_route(Route::Holdings, "/v2/Holdings");
    let mut client = NorenClient::with_config(config);
    client.set_session("FA12345", "tok");

    let holdings = client.get_holdings(None).await.unwrap();
    assert!(holdings.is_empty());

    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["prd"], "C");
}

// ---------------------------------------------------------------------------
// Operation payloads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn place_order_sends_order_fields() {
    let server = MockServer::start().await;
    mount_ok(
        &server,
        "/PlaceOrder",
        json!({"stat": "Ok", "norenordno": "24010100000001", "request_time": "10:00:00"}),
    )
    .await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");

    let req = PlaceOrderRequest {
        price: 1500.5,
        remarks: Some("my order".into()),
        ..PlaceOrderRequest::new(
            TransactionType::Buy,
            ProductType::Intraday,
            "NSE",
            "M&M-EQ",
            10,
            PriceType::Limit,
        )
    };
    let ack = client.place_order(&req).await.unwrap();
    assert_eq!(ack.order_no(), Some("24010100000001"));

    let (data, key) = parse_body(&only_request(&server).await);
    assert_eq!(key.as_deref(), Some("tok"));
    assert_eq!(data["ordersource"], "API");
    assert_eq!(data["uid"], "FA12345");
    assert_eq!(data["actid"], "FA12345");
    assert_eq!(data["trantype"], "B");
    assert_eq!(data["prd"], "I");
    assert_eq!(data["exch"], "NSE");
    assert_eq!(data["tsym"], "M%26M-EQ");
    assert_eq!(data["qty"], "10");
    assert_eq!(data["dscqty"], "0");
    assert_eq!(data["prctyp"], "LMT");
    assert_eq!(data["prc"], "1500.5");
    assert_eq!(data["ret"], "DAY");
    assert_eq!(data["remarks"], "my order");
    assert_eq!(data["amo"], "NO");
    assert!(data.get("trgprc").is_none());
    assert!(data.get("blprc").is_none());
}

#[tokio::test]
async fn daily_series_uses_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/EODChartData"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "{\"time\":\"01-JAN-2024\",\"into\":\"100\"}"
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");

    let candles = client
        .get_daily_price_series("NSE", "INFY-EQ", Some(1_700_000_000), Some(1_700_600_000))
        .await
        .unwrap();
    assert_eq!(candles.len(), 1);

    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["sym"], "NSE:INFY-EQ");
    assert_eq!(data["from"], "1700000000");
    assert_eq!(data["to"], "1700600000");
}

#[tokio::test]
async fn watch_list_scrips_are_joined() {
    let server = MockServer::start().await;
    mount_ok(&server, "/AddMultiScripsToMW", json!({"stat": "Ok"})).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    client
        .add_watch_list_scrips("1", &["NSE|22", "NSE|2885"])
        .await
        .unwrap();

    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["wlname"], "1");
    assert_eq!(data["scrips"], "NSE|22#NSE|2885");
}

#[tokio::test]
async fn search_scrip_rejects_empty_text_and_encodes_query() {
    let server = MockServer::start().await;
    mount_ok(&server, "/SearchScrip", json!({"stat": "Ok", "values": []})).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");

    let err = client.search_scrip("NSE", "  ").await.unwrap_err();
    assert!(matches!(err, NorenError::InvalidArgument(_)));

    client.search_scrip("NSE", "M&M FIN").await.unwrap();
    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["stext"], "M%26M+FIN");
}

#[tokio::test]
async fn option_chain_defaults_count() {
    let server = MockServer::start().await;
    mount_ok(&server, "/GetOptionChain", json!({"stat": "Ok", "values": []})).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    client
        .get_option_chain("NFO", "NIFTY25JAN24C21000", 21000.0, None)
        .await
        .unwrap();

    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["cnt"], "2");
    assert_eq!(data["strprc"], "21000");
}

#[tokio::test]
async fn cancel_order_sends_order_number() {
    let server = MockServer::start().await;
    mount_ok(
        &server,
        "/CancelOrder",
        json!({"stat": "Ok", "result": "24010100000001"}),
    )
    .await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    let ack = client.cancel_order("24010100000001").await.unwrap();
    assert_eq!(ack.order_no(), Some("24010100000001"));

    let (data, key) = parse_body(&only_request(&server).await);
    assert_eq!(key.as_deref(), Some("tok"));
    assert_eq!(
        data,
        json!({"ordersource": "API", "uid": "FA12345", "norenordno": "24010100000001"})
    );
}

#[tokio::test]
async fn exit_order_sends_product() {
    let server = MockServer::start().await;
    mount_ok(&server, "/ExitSNOOrder", json!({"stat": "Ok"})).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    client
        .exit_order("24010100000002", ProductType::BracketOrder)
        .await
        .unwrap();

    let (data, key) = parse_body(&only_request(&server).await);
    assert_eq!(key.as_deref(), Some("tok"));
    assert_eq!(data["ordersource"], "API");
    assert_eq!(data["uid"], "FA12345");
    assert_eq!(data["norenordno"], "24010100000002");
    assert_eq!(data["prd"], "B");
}

#[tokio::test]
async fn forgot_password_is_sent_without_a_session() {
    let server = MockServer::start().await;
    mount_ok(&server, "/ForgotPassword", json!({"stat": "Ok"})).await;

    let client = client_for(&server);
    client
        .forgot_password("FA12345", "ABCDE1234F", "01-01-1990")
        .await
        .unwrap();

    let (data, key) = parse_body(&only_request(&server).await);
    assert_eq!(key, None);
    assert_eq!(
        data,
        json!({"source": "API", "uid": "FA12345", "pan": "ABCDE1234F", "dob": "01-01-1990"})
    );
}

#[tokio::test]
async fn change_password_hashes_only_the_old_password() {
    let server = MockServer::start().await;
    mount_ok(&server, "/Changepwd", json!({"stat": "Ok", "dmsg": "changed"})).await;

    let client = client_for(&server);
    let resp = client
        .change_password("FA12345", "old-secret", "new-secret")
        .await
        .unwrap();
    assert_eq!(resp["dmsg"], "changed");

    let (data, key) = parse_body(&only_request(&server).await);
    assert_eq!(key, None);
    assert_eq!(data["uid"], "FA12345");
    assert_eq!(data["oldpwd"], hash_password("old-secret"));
    assert_eq!(data["pwd"], "new-secret");
}

#[tokio::test]
async fn time_price_series_defaults_start_to_today() {
    let server = MockServer::start().await;
    mount_ok(&server, "/TPSeries", json!([])).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    let before = chrono::Local::now().timestamp();
    let candles = client
        .get_time_price_series("NSE", "22", None, None, None)
        .await
        .unwrap();
    assert!(candles.is_empty());

    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["exch"], "NSE");
    assert_eq!(data["token"], "22");
    let st: i64 = data["st"].as_str().unwrap().parse().unwrap();
    assert!(st <= before, "start {st} is in the future");
    assert!(before - st <= 25 * 3600, "start {st} is not today");
    assert!(data.get("et").is_none());
    assert!(data.get("intrv").is_none());
}

#[tokio::test]
async fn time_price_series_sends_explicit_range() {
    let server = MockServer::start().await;
    mount_ok(&server, "/TPSeries", json!([])).await;

    let mut client = client_for(&server);
    client.set_session("FA12345", "tok");
    client
        .get_time_price_series("NSE", "22", Some(1_700_000_000), Some(1_700_003_600), Some(5))
        .await
        .unwrap();

    let (data, _) = parse_body(&only_request(&server).await);
    assert_eq!(data["st"], "1700000000");
    assert_eq!(data["et"], "1700003600");
    assert_eq!(data["intrv"], "5");
}

// ---------------------------------------------------------------------------
// Streaming feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn feed_is_shared_per_session() {
    let mut client = NorenClient::new("http://127.0.0.1:1", WS_UNUSED);
    assert!(matches!(client.feed(), Err(NorenError::NotAuthenticated)));

    client.set_session("FA12345", "tok-1");
    let first = client.feed().unwrap();
    let again = client.feed().unwrap();
    let from_clone = client.clone().feed().unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert!(Arc::ptr_eq(&first, &from_clone));

    first.start(FeedHandlers::new());
    assert!(again.is_running(), "one worker behind every handle");
    again.stop().await;
    assert!(!first.is_running());

    client.set_session("FA12345", "tok-2");
    let renewed = client.feed().unwrap();
    assert!(!Arc::ptr_eq(&first, &renewed));
    assert_eq!(renewed.credentials().user_id(), "FA12345");
    assert!(Arc::ptr_eq(&renewed, &client.feed().unwrap()));
}
