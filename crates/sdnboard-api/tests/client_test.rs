#![allow(clippy::unwrap_used)]
// Integration tests for `ControllerClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sdnboard_api::models::ThresholdUpdate;
use sdnboard_api::{ControllerClient, Dpid, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ControllerClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ControllerClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Host tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_connected_ips_rich() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/connected_ips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"ip": "10.0.0.1", "hostname": "h1", "lastSeen": "2024-06-15T10:30:00Z"},
            {"ip": "10.0.0.2", "hostname": "h2", "lastSeen": "2024-06-15T10:31:00Z"}
        ])))
        .mount(&server)
        .await;

    let hosts = client.list_connected_ips().await.unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[1].hostname, "h2");
}

#[tokio::test]
async fn test_list_blocked_addresses_plain() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/blocked_ips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["10.0.0.9"])))
        .mount(&server)
        .await;

    let ips = client.list_blocked_addresses().await.unwrap();
    assert_eq!(ips, vec!["10.0.0.9".to_string()]);
}

#[tokio::test]
async fn test_block_ip_sends_body_and_ignores_text_reply() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/block_ip"))
        .and(body_json(json!({"ip": "10.0.0.5"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("IP 10.0.0.5 blocked."))
        .expect(1)
        .mount(&server)
        .await;

    client.block_ip("10.0.0.5").await.unwrap();
}

#[tokio::test]
async fn test_unblock_ip_failure_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/unblock_ip"))
        .respond_with(ResponseTemplate::new(400).set_body_string("IP not blocked."))
        .mount(&server)
        .await;

    let err = client.unblock_ip("10.0.0.5").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "IP not blocked.");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_host_to_switch_accepts_string_dpids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/host_to_switch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"ip": "10.0.0.1", "switch": "1", "port": 2},
            {"ip": "10.0.0.2", "switch": 2, "port": 1}
        ])))
        .mount(&server)
        .await;

    let rows = client.host_to_switch().await.unwrap();
    assert_eq!(rows[0].switch, Dpid(1));
    assert_eq!(rows[1].switch, Dpid(2));
}

// ── Port tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_switch_ports() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1": {
                "all_ports": [
                    {"port_no": 1, "name": "s1-eth1", "hw_addr": "00:00:00:00:01:01"},
                    {"port_no": 2, "name": "s1-eth2", "hw_addr": "00:00:00:00:01:02"}
                ],
                "blocked_ports": [2]
            }
        })))
        .mount(&server)
        .await;

    let inventory = client.list_switch_ports().await.unwrap();
    let s1 = &inventory[&Dpid(1)];
    assert_eq!(s1.all_ports.len(), 2);
    assert_eq!(s1.blocked_ports, vec![2]);
}

#[tokio::test]
async fn test_block_switch_port_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/block_port"))
        .and(body_json(json!({"dpid": 1, "port_no": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    client.block_switch_port(Dpid(1), 3).await.unwrap();
}

#[tokio::test]
async fn test_unblock_service_port_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/unblock_port"))
        .and(body_json(json!({"port": 22})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.unblock_service_port(22).await.unwrap();
}

// ── Threshold tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_update_thresholds_returns_messages_in_order() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/threshold"))
        .and(body_json(json!([{"switch": 1, "port": 2, "threshold": 42}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "ok: switch 1 port 2 updated",
            "Error: threshold exceeds max"
        ])))
        .mount(&server)
        .await;

    let messages = client
        .update_thresholds(&[ThresholdUpdate {
            switch: Dpid(1),
            port: 2,
            threshold: 42.0,
        }])
        .await
        .unwrap();

    assert_eq!(
        messages,
        vec![
            "ok: switch 1 port 2 updated".to_string(),
            "Error: threshold exceeds max".to_string()
        ]
    );
}

#[tokio::test]
async fn test_list_thresholds_bad_shape_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/thresholds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_thresholds().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Topology tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_topology_document() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/topology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "switches": [{"dpid": 1}, {"dpid": 2}],
            "hosts": [{"mac": "aa", "ip": "10.0.0.1", "dpid": 1, "port": 3}],
            "links": [{"src": 1, "dst": 2, "src_port": 2, "dst_port": 1}]
        })))
        .mount(&server)
        .await;

    let doc = client.topology().await.unwrap();
    assert_eq!(doc.switches.len(), 2);
    assert_eq!(doc.hosts[0].ip.as_deref(), Some("10.0.0.1"));
    assert_eq!(doc.links[0].dst, Dpid(2));
}

// ── Auth tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_token_and_bearer_is_sent() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-1"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/connected_ips"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    let token = client.login("/auth/login", "admin", &secret).await.unwrap();
    client.set_token(token);

    let hosts = client.list_connected_addresses().await.unwrap();
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("/auth/login", "admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_verify_token_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.verify_token("/auth/verify").await.unwrap();
}

#[tokio::test]
async fn test_verify_token_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.verify_token("/auth/verify").await.unwrap_err();
    assert!(err.is_auth_expired());
}

// ── Transport tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_controller_is_transport_error() {
    let client = ControllerClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1").unwrap(),
    );

    let err = client.list_connected_addresses().await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got: {err:?}");
}
