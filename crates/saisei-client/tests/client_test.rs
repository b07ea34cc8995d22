//! Request/response tests for the Saisei client against a local HTTP server

use saisei_client::{
    SaiseiClient, SaiseiClientTrait, SaiseiConfig, SaiseiConfigBuilder, SaiseiError, TransportErrorKind,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const BASE: &str = "/rest/top/configurations/running";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(server: &MockServer, debug: bool) -> SaiseiClient {
    init_tracing();
    let addr = server.address();
    let config = SaiseiConfig::builder(format!("http://{}", addr.ip()), "admin", "secret")
        .port(addr.port())
        .debug(debug)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("valid config");
    SaiseiClient::new(config).expect("client")
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.expect("request recording enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.remove(0)
}

fn ok_collection() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"collection": []}))
}

#[tokio::test]
async fn test_list_appends_query_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/users/")))
        .and(query_param("a", "1"))
        .and(query_param("b", "2"))
        .respond_with(ok_collection())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    let response = client.query_users(&[("a", "1"), ("b", "2")]).await.expect("query users");
    assert_eq!(response.status(), 200);

    let request = only_request(&server).await;
    assert_eq!(request.url.query(), Some("a=1&b=2"));
    assert!(request.url.as_str().ends_with("/users/?a=1&b=2"));
}

#[tokio::test]
async fn test_list_with_empty_params_has_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/interfaces/")))
        .respond_with(ok_collection())
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.query_interfaces(&[]).await.expect("query interfaces");

    let request = only_request(&server).await;
    assert_eq!(request.url.query(), None);
    assert!(!request.url.as_str().contains('?'));
}

#[tokio::test]
async fn test_query_values_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/fibs/fib0/hosts/")))
        .respond_with(ok_collection())
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client
        .query_hosts(&[("select", "name,rate_plan"), ("with", "a b&c")])
        .await
        .expect("query hosts");

    let request = only_request(&server).await;
    assert_eq!(request.url.query(), Some("select=name%2Crate_plan&with=a%20b%26c"));
}

#[tokio::test]
async fn test_flows_and_rate_plans_do_not_send_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_collection())
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.query_flows(&[("limit", "5")]).await.expect("flows with params");
    client.query_flows(&[]).await.expect("flows without params");
    client.query_rate_plans(&[("limit", "5")]).await.expect("rate plans with params");
    client.query_rate_plans(&[]).await.expect("rate plans without params");

    let requests = server.received_requests().await.expect("request recording enabled");
    let urls: Vec<String> = requests.iter().map(|r| r.url.to_string()).collect();
    assert_eq!(urls.len(), 4);
    assert_eq!(urls[0], urls[1]);
    assert_eq!(urls[2], urls[3]);
    assert!(urls[0].ends_with(&format!("{BASE}/flows/")));
    assert!(urls[2].ends_with(&format!("{BASE}/rate_plans/")));
}

#[tokio::test]
async fn test_get_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_collection())
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.get_interface("eth0").await.expect("interface");
    client.get_host("10.0.0.1").await.expect("host");
    client.get_user_group("staff").await.expect("user group");
    client.get_user("alice").await.expect("user");
    client.get_application_group("streaming").await.expect("app group");
    client.get_application("netflix").await.expect("application");
    client.query_application_groups(&[]).await.expect("app groups");
    client.query_applications(&[]).await.expect("applications");
    client.query_user_groups(&[]).await.expect("user groups");
    client.query_user_applications("alice", &[("limit", "3")]).await.expect("user applications");
    client.get_user_application("alice", "netflix").await.expect("user application");
    client.get_flow("f1").await.expect("flow");
    client.get_rate_plan("gold").await.expect("rate plan");

    let requests = server.received_requests().await.expect("request recording enabled");
    let targets: Vec<String> = requests
        .iter()
        .map(|r| match r.url.query() {
            Some(query) => format!("{}?{}", r.url.path(), query),
            None => r.url.path().to_string(),
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            format!("{BASE}/interfaces/eth0"),
            format!("{BASE}/fibs/fib0/hosts/10.0.0.1"),
            format!("{BASE}/user_groups/staff"),
            format!("{BASE}/users/alice"),
            format!("{BASE}/app_groups/streaming"),
            format!("{BASE}/applications/netflix"),
            format!("{BASE}/app_groups/"),
            format!("{BASE}/applications/"),
            format!("{BASE}/user_groups/"),
            format!("{BASE}/users/alice/applications/?limit=3"),
            format!("{BASE}/users/alice/applications/netflix"),
            format!("{BASE}/flows/f1"),
            format!("{BASE}/rate_plans/gold"),
        ]
    );
}

#[tokio::test]
async fn test_upsert_sends_exact_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{BASE}/users/alice")))
        .and(header("content-type", "application/json"))
        .respond_with(ok_collection())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.upsert_user("alice", &json!({"x": 1})).await.expect("upsert user");

    let request = only_request(&server).await;
    assert_eq!(request.body, br#"{"x":1}"#.to_vec());
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert_eq!(content_type, Some("application/json"));
}

#[tokio::test]
async fn test_update_host_writes_to_hosts_collection() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{BASE}/hosts/10.0.0.7")))
        .and(body_json(json!({"rate_plan": "bronze"})))
        .respond_with(ok_collection())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client
        .update_host("10.0.0.7", &json!({"rate_plan": "bronze"}))
        .await
        .expect("update host");
}

#[tokio::test]
async fn test_upsert_rate_plan_via_trait_object() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{BASE}/rate_plans/gold")))
        .and(body_json(json!({"downstream": 100000})))
        .respond_with(ok_collection())
        .expect(1)
        .mount(&server)
        .await;

    let client: Box<dyn SaiseiClientTrait> = Box::new(client_for(&server, false));
    let response = client
        .upsert_rate_plan("gold", &json!({"downstream": 100000}))
        .await
        .expect("upsert rate plan");
    assert!(response.is_success());
}

#[tokio::test]
async fn test_every_request_uses_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(basic_auth("admin", "secret"))
        .respond_with(ok_collection())
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.query_users(&[]).await.expect("list");
    client.delete_user("alice").await.expect("delete");
    client.commit().await.expect("commit");
}

#[tokio::test]
async fn test_deletes_succeed_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/users/ghost")))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"not found"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{BASE}/rate_plans/broken")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.delete_user("ghost").await.expect("delete user reports success");
    client.delete_rate_plan("broken").await.expect("delete rate plan reports success");
}

#[tokio::test]
async fn test_commit_body_and_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(BASE))
        .and(body_json(json!({"save_partition": "current", "save_config": "true"})))
        .respond_with(ok_collection())
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.upsert_user("alice", &json!({"rate_plan": "gold"})).await.expect("upsert");
    client.commit().await.expect("first commit");
    client.commit().await.expect("second commit");

    let requests = server.received_requests().await.expect("request recording enabled");
    let commit = requests.last().expect("commit request");
    assert_eq!(commit.url.path(), BASE);
    assert_eq!(commit.url.query(), None);
    assert_eq!(
        commit.body,
        br#"{"save_partition":"current","save_config":"true"}"#.to_vec()
    );
}

#[tokio::test]
async fn test_error_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"boom"}"#))
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    let response = client.get_user("alice").await.expect("status is not a transport error");
    assert_eq!(response.status(), 500);
    assert_eq!(response.body(), r#"{"error":"boom"}"#);

    match response.error_for_status() {
        Err(SaiseiError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_method_fails_before_network() {
    let server = MockServer::start().await;
    let client = client_for(&server, false);

    let result = client.request("PATCH", &format!("{BASE}/users/alice"));
    assert!(matches!(result, Err(SaiseiError::InvalidMethod(ref m)) if m == "PATCH"));

    let requests = server.received_requests().await.expect("request recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_raw_post_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/actions/restart")))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(202).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    let response = client
        .request("POST", &format!("{BASE}/actions/restart"))
        .expect("POST is allowed")
        .header("X-Trace", "abc")
        .body(&json!({}))
        .expect("serializable")
        .execute()
        .await
        .expect("post");
    assert_eq!(response.status(), 202);
}

#[tokio::test]
async fn test_transport_failure_carries_code() {
    init_tracing();
    // Nothing listens on port 1
    let config = SaiseiConfig::builder("http://127.0.0.1", "admin", "secret")
        .port(1)
        .debug(true)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("valid config");
    let client = SaiseiClient::new(config).expect("client");

    let err = client.get_user("alice").await.expect_err("connection must fail");
    assert!(matches!(err, SaiseiError::Transport { .. }), "got {err:?}");
    assert!(err.code().is_some_and(|code| code != 0));
}

#[tokio::test]
async fn test_debug_mode_attaches_diagnostics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_collection().insert_header("x-saisei", "1"))
        .mount(&server)
        .await;

    let debug_client = client_for(&server, true);
    let response = debug_client.get_interface("eth0").await.expect("get interface");
    let diagnostics = response.diagnostics().expect("diagnostics in debug mode");
    assert_eq!(diagnostics.status, 200);
    assert!(diagnostics.url.ends_with(&format!("{BASE}/interfaces/eth0")));
    assert!(
        diagnostics
            .response_headers
            .iter()
            .any(|(k, v)| k == "x-saisei" && v == "1")
    );

    let quiet_client = client_for(&server, false);
    let response = quiet_client.get_interface("eth0").await.expect("get interface");
    assert!(response.diagnostics().is_none());
}

fn local_config(server: &MockServer) -> SaiseiConfigBuilder {
    init_tracing();
    let addr = server.address();
    SaiseiConfig::builder(format!("http://{}", addr.ip()), "admin", "secret").port(addr.port())
}

#[tokio::test]
async fn test_default_config_waits_for_slow_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/flows/")))
        .respond_with(ok_collection().set_delay(Duration::from_millis(1500)))
        .expect(1)
        .mount(&server)
        .await;

    let config = local_config(&server).build().expect("valid config");
    assert_eq!(config.timeout(), None);
    let client = SaiseiClient::new(config).expect("client");

    let response = client.query_flows(&[]).await.expect("slow listing completes");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_configured_timeout_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_collection().set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = local_config(&server)
        .timeout(Duration::from_millis(200))
        .build()
        .expect("valid config");
    let client = SaiseiClient::new(config).expect("client");

    let err = client.query_flows(&[]).await.expect_err("request must time out");
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Timeout), "got {err:?}");
}

#[tokio::test]
async fn test_identifier_with_slash_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_collection())
        .mount(&server)
        .await;

    let client = client_for(&server, false);
    client.get_interface("eth0/1").await.expect("get interface");

    let request = only_request(&server).await;
    assert_eq!(request.url.path(), format!("{BASE}/interfaces/eth0/1"));
}

#[tokio::test]
async fn test_insecure_client_builds_and_sends() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_collection())
        .expect(1)
        .mount(&server)
        .await;

    let config = local_config(&server)
        .insecure_skip_verify(true)
        .build()
        .expect("valid config");
    let client = SaiseiClient::new(config).expect("client with certificate checks disabled");
    assert!(client.config().insecure_skip_verify());

    let response = client.get_host("10.0.0.1").await.expect("get host");
    assert_eq!(response.status(), 200);
}
