//! Tests for the HTTP notification client against a mock endpoint.

use std::time::Duration;

use mockito::Matcher;
use notifier::{
    Notification, NotificationClient, Notifier, NotifierConfig, NotifyError, CLIENT_USER_AGENT,
};
use tokio_util::sync::CancellationToken;

fn client(url: String, retry_attempts: u32) -> NotificationClient {
    NotificationClient::new(NotifierConfig {
        retry_attempts,
        retry_delay_ms: 10,
        timeout_ms: 2_000,
        ..NotifierConfig::new(url)
    })
    .unwrap()
}

fn warning() -> Notification {
    Notification::warning("Employee ABC has 3 computers assigned (threshold: 3)")
        .with_employee("ABC")
}

#[tokio::test]
async fn test_success() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .match_header("user-agent", CLIENT_USER_AGENT)
        .match_body(Matcher::PartialJson(serde_json::json!({
            "level": "warning",
            "employeeAbbreviation": "ABC",
            "message": "Employee ABC has 3 computers assigned (threshold: 3)",
            "source": "asset-tracker"
        })))
        .with_status(200)
        .create_async()
        .await;

    let result = client(server.url(), 3).send(warning()).await;

    assert!(result.is_ok(), "{:?}", result);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retries_server_errors_then_succeeds() {
    let mut server = mockito::Server::new_async().await;

    let failing = server
        .mock("POST", "/")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(3)
        .create_async()
        .await;
    let succeeding = server
        .mock("POST", "/")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let result = client(server.url(), 3).send(warning()).await;

    assert!(result.is_ok(), "{:?}", result);
    failing.assert_async().await;
    succeeding.assert_async().await;
}

#[tokio::test]
async fn test_exhausted_after_all_attempts() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(3)
        .create_async()
        .await;

    let err = client(server.url(), 2).send(warning()).await.unwrap_err();

    match &err {
        NotifyError::Exhausted { attempts, last } => {
            assert_eq!(*attempts, 3);
            assert!(matches!(**last, NotifyError::RemoteServer { status: 503, .. }));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert!(err.to_string().contains("after 3 attempts"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(400)
        .with_body("Bad Request")
        .expect(1)
        .create_async()
        .await;

    let err = client(server.url(), 3).send(warning()).await.unwrap_err();

    assert!(matches!(err, NotifyError::RemoteClient { status: 400, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_notification_never_sent() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let client = client(server.url(), 3);

    let err = client.send(Notification::warning("   ")).await.unwrap_err();
    assert!(matches!(err, NotifyError::Validation(_)));

    let err = client
        .send(Notification::warning("x".repeat(1001)))
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Validation(_)));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_oversized_payload_never_sent() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let client = NotificationClient::new(NotifierConfig {
        max_payload_size: 1024,
        ..NotifierConfig::new(server.url())
    })
    .unwrap();

    let mut notification = warning();
    for i in 0..20 {
        notification = notification.with_metadata(format!("key_{}", i), "v".repeat(64));
    }

    let err = client.send(notification).await.unwrap_err();
    assert!(matches!(err, NotifyError::PayloadTooLarge { max: 1024, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_during_backoff() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = NotificationClient::new(NotifierConfig {
        retry_attempts: 3,
        retry_delay_ms: 5_000,
        ..NotifierConfig::new(server.url())
    })
    .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = client.notify(warning(), &cancel).await.unwrap_err();

    assert!(err.is_cancellation());
    assert!(started.elapsed() < Duration::from_secs(5));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .create_async()
        .await;

    let client = NotificationClient::new(NotifierConfig {
        retry_attempts: 3,
        retry_delay_ms: 5_000,
        ..NotifierConfig::new(server.url())
    })
    .unwrap();

    let err = client
        .send_with_timeout(warning(), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, NotifyError::DeadlineExceeded(_)));
    assert!(err.is_cancellation());
}

#[tokio::test]
async fn test_health_probe() {
    let mut server = mockito::Server::new_async().await;
    let client = client(server.url(), 0);

    let ok = server
        .mock("HEAD", "/")
        .with_status(405)
        .create_async()
        .await;
    assert!(client.is_healthy().await, "4xx still means reachable");
    ok.remove_async().await;

    let _down = server
        .mock("HEAD", "/")
        .with_status(503)
        .create_async()
        .await;
    assert!(!client.is_healthy().await);
}

#[tokio::test]
async fn test_health_probe_uses_health_path() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .create_async()
        .await;

    let client = NotificationClient::new(NotifierConfig {
        health_path: Some("/health".into()),
        ..NotifierConfig::new(server.url())
    })
    .unwrap();

    assert!(client.is_healthy().await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unhealthy() {
    let client = client("http://127.0.0.1:9".to_string(), 0);
    assert!(!client.is_healthy().await);
}
