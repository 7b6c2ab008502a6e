//! Integration tests for bearer attachment and the refresh-and-retry protocol.

mod common;

use common::{config_for, harness, logged_in, logged_out, storage_cleared};
use serde_json::json;
use std::time::Duration;
use vindex_client::{ApiError, ApiRequest, KeyValueStorage, Navigator, Session};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn wine_list() -> serde_json::Value {
    json!([{ "id": 1, "name": "Yarden Cabernet", "type": "RED", "vintage": "2019", "quantity": 2 }])
}

async fn mount_refresh(server: &MockServer, refresh: &str, access: &str, new_refresh: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refreshToken": refresh })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access,
            "refreshToken": new_refresh,
        })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_attaches_current_bearer_token() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "tokenA", "tokenR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer tokenA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wine_list()))
        .expect(1)
        .mount(&server)
        .await;

    let wines = h.client.wines().list().await.unwrap();
    assert_eq!(wines.len(), 1);
    assert_eq!(wines[0].name, "Yarden Cabernet");
}

#[tokio::test]
async fn test_end_to_end_refresh_is_invisible_to_caller() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "validR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer expiredA"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer freshA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wine_list()))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "validR", "freshA", "freshR", 1).await;

    let wines = h.client.wines().list().await.unwrap();
    assert_eq!(wines.len(), 1);

    let session = h.session.snapshot();
    assert_eq!(session.access_token.as_deref(), Some("freshA"));
    assert_eq!(session.refresh_token.as_deref(), Some("freshR"));
    assert!(session.user.is_some());
    assert_eq!(h.storage.get("accessToken").unwrap().as_deref(), Some("freshA"));
    assert_eq!(h.storage.get("refreshToken").unwrap().as_deref(), Some("freshR"));
    assert_eq!(h.navigator.history(), vec!["/cellar"]);
}

#[tokio::test]
async fn test_refresh_request_is_not_authenticated() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "validR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer expiredA"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer freshA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mount_refresh(&server, "validR", "freshA", "freshR", 1).await;

    h.client.wines().list().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/api/auth/refresh")
        .unwrap();
    assert!(!refresh.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_second_unauthorized_is_final() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "validR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(ResponseTemplate::new(401).set_body_string("still no"))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, "validR", "freshA", "freshR", 1).await;

    let err = h.client.wines().list().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 401,
            message: "still no".to_string(),
        }
    );
    // The refresh itself succeeded, so the session keeps the rotated tokens.
    assert_eq!(h.session.access_token().as_deref(), Some("freshA"));
}

#[tokio::test]
async fn test_unauthenticated_401_never_refreshes() {
    let server = MockServer::start().await;
    let h = logged_out(&server);

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = h.client.wines().list().await.unwrap_err();
    assert!(err.is_unauthorized());

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(h.navigator.history(), vec!["/cellar"]);
}

#[tokio::test]
async fn test_other_errors_pass_through() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "tokenA", "tokenR");

    Mock::given(method("DELETE"))
        .and(path("/api/wines/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = h.client.wines().delete(7).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn test_refresh_failure_forces_logout() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "revokedR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_string("revoked"))
        .expect(1)
        .mount(&server)
        .await;

    let err = h.client.wines().list().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::RefreshFailed(Box::new(ApiError::Status {
            status: 403,
            message: "revoked".to_string(),
        }))
    );

    assert_eq!(h.session.snapshot(), Session::default());
    assert!(!h.session.is_authenticated());
    assert!(storage_cleared(&h.storage));
    assert_eq!(h.navigator.history(), vec!["/cellar", "/login"]);
}

#[tokio::test]
async fn test_refresh_timeout_forces_logout() {
    let server = MockServer::start().await;
    let config = config_for(&server).with_refresh_timeout(Duration::from_millis(100));
    let h = harness(config, Some(("expiredA", "validR")));

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "late", "refreshToken": "late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = h.client.wines().list().await.unwrap_err();
    assert_eq!(err, ApiError::RefreshFailed(Box::new(ApiError::Timeout)));
    assert!(!h.session.is_authenticated());
    assert!(storage_cleared(&h.storage));
}

#[tokio::test]
async fn test_logout_during_flight_returns_original_error() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "validR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("expired")
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = h.client.clone();
    let call = tokio::spawn(async move { client.execute(ApiRequest::get("/wines")).await });

    // The session ends while the request is on the wire, so there is nothing to redeem.
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.session.logout();

    let err = call.await.unwrap().unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 401,
            message: "expired".to_string(),
        }
    );
    assert!(!h.session.is_authenticated());
    assert_eq!(h.navigator.history(), vec!["/cellar", "/login"]);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "validR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer expiredA"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .expect(5)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer freshA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wine_list()))
        .expect(5)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "freshA", "refreshToken": "freshR" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let calls = (0..5).map(|_| {
        let client = h.client.clone();
        async move { client.wines().list().await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(h.session.access_token().as_deref(), Some("freshA"));
}

#[tokio::test]
async fn test_shared_refresh_failure_reaches_every_caller() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "revokedR");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("revoked")
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let calls = (0..3).map(|_| {
        let client = h.client.clone();
        async move { client.wines().list().await }
    });
    let results = futures::future::join_all(calls).await;

    let expected = ApiError::RefreshFailed(Box::new(ApiError::Status {
        status: 401,
        message: "revoked".to_string(),
    }));
    for result in results {
        assert_eq!(result.unwrap_err(), expected);
    }
    assert!(!h.session.is_authenticated());
    assert!(storage_cleared(&h.storage));
    assert_eq!(h.navigator.history(), vec!["/cellar", "/login"]);
}

#[tokio::test]
async fn test_uncoalesced_calls_refresh_independently() {
    let server = MockServer::start().await;
    let config = config_for(&server).with_coalesced_refresh(false);
    let h = harness(config, Some(("expiredA", "validR")));

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer expiredA"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .and(header("Authorization", "Bearer freshA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "freshA", "refreshToken": "validR" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let calls = (0..3).map(|_| {
        let client = h.client.clone();
        async move { client.wines().list().await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
}

#[tokio::test]
async fn test_no_redirect_from_register_surface() {
    let server = MockServer::start().await;
    let h = logged_in(&server, "expiredA", "validR");
    h.navigator.navigate("/register");

    Mock::given(method("GET"))
        .and(path("/api/wines"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = h.client.wines().list().await.unwrap_err();
    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert_eq!(h.navigator.history(), vec!["/cellar", "/register"]);
}
