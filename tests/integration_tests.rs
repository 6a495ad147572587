//! Integration tests for the vpnconf crate.
//!
//! These tests walk the whole path from `configure` to the engine hand-off
//! and check the ordering guarantees observers rely on.

use std::time::Duration;
use vpnconf::session::{EngineEvent, SessionState};
use vpnconf::ErrorKind;

mod common;
use common::helpers::*;
use common::server::{TestResponse, TestServer};

const FIVE_MB: usize = 5 * 1024 * 1024;

/// Test the complete workflow from configure to a connected session
#[tokio::test]
async fn test_end_to_end_five_megabytes() {
    let temp_dir = create_temp_dir();
    let content = create_profile_content(FIVE_MB);
    let server = TestServer::serving(TestResponse::ok(content.clone())).await;
    let engine = MockEngine::new();
    let (session, observer) = create_test_session(engine.clone(), temp_dir.path());

    session
        .configure(true, Some(&server.url("/profiles/config.ovpn")))
        .await
        .unwrap();
    within(session.join()).await.unwrap();

    // Exactly one start, monotonic progress, exactly one end, in that order.
    let events = observer.events();
    assert_eq!(events.first(), Some(&Recorded::Start));
    assert_eq!(events.last(), Some(&Recorded::End));
    assert_eq!(observer.count(&Recorded::Start), 1);
    assert_eq!(observer.count(&Recorded::End), 1);
    assert!(observer.errors().is_empty());

    let progress = observer.progress();
    assert_monotonic(&progress);
    assert!(*progress.last().unwrap() >= 99);
    assert!(progress.iter().all(|p| *p < 100));

    // The engine got the artifact path after the download ended.
    assert_eq!(engine.starts(), vec![session.artifact_path().to_path_buf()]);
    assert_file_content(session.artifact_path(), &content);

    engine.emit(EngineEvent::ProfileLoaded(true));
    engine.emit(EngineEvent::Connected);
    assert!(wait_until(Duration::from_secs(10), || observer.count(&Recorded::VpnStatus(true)) == 1).await);
    assert!(session.is_connected());
    assert_eq!(session.state(), SessionState::Connected);
}

/// Test that an unreachable host fails the cycle without starting the engine
#[tokio::test]
async fn test_end_to_end_unreachable_host() {
    let temp_dir = create_temp_dir();
    let engine = MockEngine::new();
    let (session, observer) = create_test_session(engine.clone(), temp_dir.path());

    session
        .configure(true, Some("http://127.0.0.1:1/config.ovpn"))
        .await
        .unwrap();
    within(session.join()).await.unwrap();

    assert_eq!(
        observer.events(),
        vec![Recorded::Start, Recorded::Error(ErrorKind::Io)]
    );
    assert!(engine.starts().is_empty());
    assert_eq!(session.state(), SessionState::Idle);
}

/// Test redirects and a throttled first attempt on the way to the profile
#[tokio::test]
async fn test_end_to_end_through_redirect_and_backoff() {
    let temp_dir = create_temp_dir();
    let server = TestServer::start(|request, hit| match (request.path.as_str(), hit) {
        ("/config.ovpn", _) => TestResponse::redirect(302, "/mirror/config.ovpn"),
        (_, 1) => TestResponse::status(429).header("Retry-After", "1"),
        _ => TestResponse::ok(gzip(b"client\nremote 10.0.0.1 1194\n"))
            .header("Content-Encoding", "gzip"),
    })
    .await;
    let engine = MockEngine::new();
    let (session, observer) = create_test_session(engine.clone(), temp_dir.path());

    session
        .configure(true, Some(&server.url("/config.ovpn")))
        .await
        .unwrap();
    within(session.join()).await.unwrap();

    assert_eq!(server.hits(), 3);
    assert_eq!(observer.count(&Recorded::End), 1);
    assert_file_content(session.artifact_path(), b"client\nremote 10.0.0.1 1194\n");
    assert_eq!(engine.starts().len(), 1);
}

/// Test that a failed cycle can be retried by configuring again
#[tokio::test]
async fn test_retry_is_explicit() {
    let temp_dir = create_temp_dir();
    let server = TestServer::start(|_, hit| {
        if hit == 0 {
            TestResponse::status(500)
        } else {
            TestResponse::ok("client\n")
        }
    })
    .await;
    let engine = MockEngine::new();
    let (session, observer) = create_test_session(engine.clone(), temp_dir.path());

    session
        .configure(true, Some(&server.url("/config.ovpn")))
        .await
        .unwrap();
    within(session.join()).await.unwrap();

    // No automatic retry.
    assert_eq!(server.hits(), 1);
    assert_eq!(observer.errors(), vec![ErrorKind::Http]);

    session.configure(true, None).await.unwrap();
    within(session.join()).await.unwrap();

    assert_eq!(server.hits(), 2);
    assert_eq!(observer.count(&Recorded::End), 1);
    assert_eq!(engine.starts().len(), 1);
}

/// Test that dropping the session stops its background work
#[tokio::test]
async fn test_drop_cancels_download() {
    let temp_dir = create_temp_dir();
    let server = TestServer::serving(
        TestResponse::ok(create_profile_content(200 * 1024)).throttled(1024, Duration::from_millis(5)),
    )
    .await;
    let engine = MockEngine::new();
    let (session, observer) = create_test_session(engine.clone(), temp_dir.path());
    let artifact = session.artifact_path().to_path_buf();

    session
        .configure(true, Some(&server.url("/config.ovpn")))
        .await
        .unwrap();
    assert!(wait_until(Duration::from_secs(10), || !observer.progress().is_empty()).await);
    drop(session);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!observer.finished());
    assert!(engine.starts().is_empty());
    assert!(std::fs::metadata(&artifact).unwrap().len() < 200 * 1024);
}
