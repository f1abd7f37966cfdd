//! Wire-level tests for `MarathonClient` against an in-process mock Marathon.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use orchestrator::MarathonClient;
use serde::Deserialize;
use subscription::{
    AgentError, CallbackUrl, EventSubscriptions, ListenPort, NetworkAddress, RemoteOperation,
};
use tokio::net::TcpListener;

#[derive(Debug, Deserialize)]
struct CallbackParams {
    #[serde(rename = "callbackUrl")]
    callback_url: String,
}

/// Registered callbacks, de-duplicated the way Marathon does it.
type Registry = Arc<Mutex<Vec<String>>>;

async fn list(State(registry): State<Registry>) -> Json<serde_json::Value> {
    let urls = registry.lock().unwrap().clone();
    Json(serde_json::json!({ "callbackUrls": urls }))
}

async fn subscribe(
    State(registry): State<Registry>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut urls = registry.lock().unwrap();
    if !urls.contains(&params.callback_url) {
        urls.push(params.callback_url.clone());
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "callbackUrl": params.callback_url,
            "eventType": "subscribe_event",
        })),
    )
}

async fn unsubscribe(
    State(registry): State<Registry>,
    Query(params): Query<CallbackParams>,
) -> StatusCode {
    registry
        .lock()
        .unwrap()
        .retain(|u| u != &params.callback_url);
    StatusCode::OK
}

struct MockMarathon {
    registry: Registry,
    addr: SocketAddr,
}

impl MockMarathon {
    /// Starts a mock serving the subscription resource under `prefix`.
    async fn start(prefix: &str) -> Self {
        let registry: Registry = Arc::new(Mutex::new(Vec::new()));
        let resource = Router::new()
            .route(
                "/v2/eventSubscriptions",
                get(list).post(subscribe).delete(unsubscribe),
            )
            .with_state(registry.clone());
        let app = if prefix.is_empty() {
            resource
        } else {
            Router::new().nest(prefix, resource)
        };
        let addr = serve(app).await;
        Self { registry, addr }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn registered(&self) -> Vec<String> {
        self.registry.lock().unwrap().clone()
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Mock server failed");
    });
    addr
}

fn callback(address: &str, port: u16) -> CallbackUrl {
    CallbackUrl::build(
        &NetworkAddress::from_reported(address).unwrap(),
        ListenPort::new(port).unwrap(),
    )
}

#[tokio::test]
async fn test_register_then_list() {
    let marathon = MockMarathon::start("").await;
    let client = MarathonClient::new(&marathon.url()).unwrap();
    let url = callback("10.0.0.5", 8080);

    assert!(client.list_subscriptions().await.unwrap().is_empty());
    client.register_callback(&url).await.unwrap();

    let subs = client.list_subscriptions().await.unwrap();
    assert!(subs.contains(&url));
    assert_eq!(marathon.registered(), vec!["http://10.0.0.5:8080/callback"]);
}

#[tokio::test]
async fn test_duplicate_registration_is_not_an_error() {
    let marathon = MockMarathon::start("").await;
    let client = MarathonClient::new(&marathon.url()).unwrap();
    let url = callback("10.0.0.5", 8080);

    client.register_callback(&url).await.unwrap();
    client.register_callback(&url).await.unwrap();

    assert_eq!(marathon.registered().len(), 1);
}

#[tokio::test]
async fn test_unregister_removes_callback() {
    let marathon = MockMarathon::start("").await;
    let client = MarathonClient::new(&marathon.url()).unwrap();
    let ours = callback("10.0.0.5", 8080);
    let theirs = callback("10.0.0.9", 9090);

    client.register_callback(&ours).await.unwrap();
    client.register_callback(&theirs).await.unwrap();
    client.unregister_callback(&ours).await.unwrap();

    assert_eq!(marathon.registered(), vec![theirs.as_str().to_string()]);
}

#[tokio::test]
async fn test_endpoint_base_path_is_preserved() {
    let marathon = MockMarathon::start("/marathon").await;
    let client = MarathonClient::new(&format!("{}/marathon", marathon.url())).unwrap();

    client
        .register_callback(&callback("fd00::5", 8080))
        .await
        .unwrap();

    assert_eq!(marathon.registered(), vec!["http://[fd00::5]:8080/callback"]);
}

#[tokio::test]
async fn test_error_status_is_remote_unreachable() {
    let app = Router::new().route(
        "/v2/eventSubscriptions",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "leader election in progress") })
            .post(|| async { (StatusCode::FORBIDDEN, "http_callback disabled") }),
    );
    let addr = serve(app).await;
    let client = MarathonClient::new(&format!("http://{addr}")).unwrap();

    match client.list_subscriptions().await.unwrap_err() {
        AgentError::RemoteUnreachable { operation, message } => {
            assert_eq!(operation, RemoteOperation::ListSubscriptions);
            assert!(message.contains("503"), "message: {message}");
            assert!(message.contains("leader election"), "message: {message}");
        }
        other => panic!("expected RemoteUnreachable, got {other:?}"),
    }

    match client
        .register_callback(&callback("10.0.0.5", 8080))
        .await
        .unwrap_err()
    {
        AgentError::RemoteUnreachable { operation, .. } => {
            assert_eq!(operation, RemoteOperation::RegisterCallback)
        }
        other => panic!("expected RemoteUnreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_list_is_remote_unreachable() {
    let app = Router::new().route(
        "/v2/eventSubscriptions",
        get(|| async { "<html>proxy error</html>" }),
    );
    let addr = serve(app).await;
    let client = MarathonClient::new(&format!("http://{addr}")).unwrap();

    let err = client.list_subscriptions().await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::RemoteUnreachable {
            operation: RemoteOperation::ListSubscriptions,
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_refused_is_remote_unreachable() {
    // Bind then drop to obtain a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = MarathonClient::new(&format!("http://{addr}")).unwrap();

    let err = client.list_subscriptions().await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.as_label(), "remote_unreachable");
}
