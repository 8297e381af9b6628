//! HttpGateway against an in-process warp server.

use dsr_gateway::{GatewayConfig, GatewayError, HttpGateway, RulesGateway, DEFAULT_SAVE_MESSAGE};
use dsr_rules::{Condition, ProjectRef, ProjectState, Rule, RuleId, SampleRate};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::Filter;

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// Spawn a server answering every request with `status` and `reply`.
fn spawn_server(status: StatusCode, reply: Value) -> (SocketAddr, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();

    let routes = warp::any()
        .and(warp::method())
        .and(warp::path::full())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::bytes())
        .map(
            move |method: Method,
                  path: warp::path::FullPath,
                  authorization: Option<String>,
                  body: Bytes| {
                sink.lock().push(Recorded {
                    method,
                    path: path.as_str().to_string(),
                    authorization,
                    body: serde_json::from_slice(&body).ok(),
                });
                warp::reply::with_status(warp::reply::json(&reply), status)
            },
        );

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, log)
}

fn gateway(addr: SocketAddr) -> HttpGateway {
    HttpGateway::new(
        GatewayConfig::new()
            .with_base_url(format!("http://{addr}"))
            .with_auth_token("token-123")
            .with_timeout_secs(5),
    )
    .unwrap()
}

fn project() -> ProjectRef {
    ProjectRef::new("acme", "web")
}

fn server_state() -> ProjectState {
    ProjectState::new(
        "11",
        "web",
        vec![
            Rule::specific(
                21,
                SampleRate::new(0.5).unwrap(),
                vec![Condition::eq("event.environment", ["prod"])],
            )
            .with_active(true),
            Rule::uniform(22, SampleRate::new(0.1).unwrap()),
        ],
    )
}

#[tokio::test]
async fn save_sends_full_list_with_put() {
    let (addr, log) = spawn_server(StatusCode::OK, serde_json::to_value(server_state()).unwrap());
    let gateway = gateway(addr);

    let rules = vec![
        Rule::specific(0, SampleRate::ALL, vec![]),
        Rule::uniform(5, SampleRate::new(0.2).unwrap()),
    ];
    let state = gateway.save(&project(), &rules).await.unwrap();

    assert_eq!(state, server_state());

    let recorded = log.lock().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, Method::PUT);
    assert_eq!(recorded[0].path, "/api/0/projects/acme/web/");
    assert_eq!(recorded[0].authorization.as_deref(), Some("Bearer token-123"));

    let body = recorded[0].body.clone().unwrap();
    assert_eq!(body["dynamicSampling"]["rules"].as_array().unwrap().len(), 2);
    assert_eq!(body["dynamicSampling"]["rules"][1]["id"], json!(5));
}

#[tokio::test]
async fn fetch_uses_get() {
    let (addr, log) = spawn_server(StatusCode::OK, serde_json::to_value(server_state()).unwrap());

    let state = gateway(addr).fetch(&project()).await.unwrap();
    assert_eq!(state.rules()[0].id, RuleId::new(21));
    assert_eq!(log.lock()[0].method, Method::GET);
}

#[tokio::test]
async fn rejection_carries_server_message() {
    let (addr, _log) = spawn_server(
        StatusCode::BAD_REQUEST,
        json!({"dynamicSampling": {"rules": ["Uniform rule must be last"]}}),
    );

    let err = gateway(addr).save(&project(), &[]).await.unwrap_err();
    assert_eq!(err, GatewayError::rejected(400, "Uniform rule must be last"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rejection_without_message_uses_default() {
    let (addr, _log) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR, json!({}));

    let err = gateway(addr).save(&project(), &[]).await.unwrap_err();
    assert_eq!(err, GatewayError::rejected(500, DEFAULT_SAVE_MESSAGE));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn undecodable_success_body() {
    let (addr, _log) = spawn_server(StatusCode::OK, json!({"dynamicSampling": {"rules": [{"id": 1}]}}));

    let err = gateway(addr).fetch(&project()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let err = gateway(addr).fetch(&project()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}
