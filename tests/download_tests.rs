// Download strategies against an in-process HTTP fixture: resumable fetch
// continues from a partial file, retries transient failures up to the
// attempt ceiling, and the direct strategy never retries.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use scribe_backend::infrastructure::download::resumable::{RetryPolicy, fetch_with};
use scribe_backend::infrastructure::download::{DownloadError, stream_to_file};

struct Fixture {
    payload: Vec<u8>,
    /// Respond 500 to this many requests before serving the payload.
    fail_first: usize,
    /// Whether the server honors `Range` requests with 206 responses.
    honor_range: bool,
    hits: AtomicUsize,
    ranges: Mutex<Vec<Option<String>>>,
}

impl Fixture {
    fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            fail_first: 0,
            honor_range: true,
            hits: AtomicUsize::new(0),
            ranges: Mutex::new(Vec::new()),
        }
    }
}

async fn serve_media(State(fx): State<Arc<Fixture>>, headers: HeaderMap) -> Response {
    let hit = fx.hits.fetch_add(1, Ordering::SeqCst);
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    fx.ranges.lock().unwrap().push(range.clone());

    if hit < fx.fail_first {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match range.filter(|_| fx.honor_range) {
        Some(spec) => {
            let offset: usize = spec
                .trim_start_matches("bytes=")
                .trim_end_matches('-')
                .parse()
                .expect("fixture only sees open-ended ranges");
            (StatusCode::PARTIAL_CONTENT, fx.payload[offset..].to_vec()).into_response()
        }
        None => (StatusCode::OK, fx.payload.clone()).into_response(),
    }
}

async fn spawn_fixture(fx: Arc<Fixture>) -> SocketAddr {
    let app = Router::new()
        .route("/media.mp3", get(serve_media))
        .with_state(fx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn quick_retries(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        backoff: Duration::from_millis(10),
    }
}

fn test_payload() -> Vec<u8> {
    (0..10_000u32).flat_map(|n| n.to_le_bytes()).collect()
}

#[tokio::test]
async fn fetch_downloads_the_whole_payload() -> Result<()> {
    let fx = Arc::new(Fixture::new(test_payload()));
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");
    let client = reqwest::Client::new();

    fetch_with(
        &client,
        &format!("http://{addr}/media.mp3"),
        &dest,
        quick_retries(3),
    )
    .await?;

    assert_eq!(std::fs::read(&dest)?, fx.payload);
    assert_eq!(fx.hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn fetch_resumes_from_partial_file() -> Result<()> {
    let fx = Arc::new(Fixture::new(test_payload()));
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");

    // A previous attempt left the first 1000 bytes behind.
    std::fs::write(&dest, &fx.payload[..1_000])?;

    let client = reqwest::Client::new();
    fetch_with(
        &client,
        &format!("http://{addr}/media.mp3"),
        &dest,
        quick_retries(3),
    )
    .await?;

    // Byte-for-byte what an uninterrupted download would have produced.
    assert_eq!(std::fs::read(&dest)?, fx.payload);

    let ranges = fx.ranges.lock().unwrap();
    assert_eq!(ranges[0].as_deref(), Some("bytes=1000-"));
    Ok(())
}

#[tokio::test]
async fn fetch_restarts_when_server_ignores_range() -> Result<()> {
    let mut fixture = Fixture::new(test_payload());
    fixture.honor_range = false;
    let fx = Arc::new(fixture);
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");

    // Stale partial content that does NOT match the real payload prefix.
    std::fs::write(&dest, vec![0xAB; 1_000])?;

    let client = reqwest::Client::new();
    fetch_with(
        &client,
        &format!("http://{addr}/media.mp3"),
        &dest,
        quick_retries(3),
    )
    .await?;

    // The stale prefix must not survive; the file is the payload alone.
    assert_eq!(std::fs::read(&dest)?, fx.payload);
    Ok(())
}

#[tokio::test]
async fn fetch_retries_transient_server_errors() -> Result<()> {
    let mut fixture = Fixture::new(test_payload());
    fixture.fail_first = 2;
    let fx = Arc::new(fixture);
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");
    let client = reqwest::Client::new();

    fetch_with(
        &client,
        &format!("http://{addr}/media.mp3"),
        &dest,
        quick_retries(5),
    )
    .await?;

    assert_eq!(std::fs::read(&dest)?, fx.payload);
    assert_eq!(fx.hits.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn fetch_gives_up_at_the_attempt_ceiling() -> Result<()> {
    let mut fixture = Fixture::new(test_payload());
    fixture.fail_first = usize::MAX;
    let fx = Arc::new(fixture);
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");
    let client = reqwest::Client::new();

    let err = fetch_with(
        &client,
        &format!("http://{addr}/media.mp3"),
        &dest,
        quick_retries(2),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::RetriesExhausted { attempts: 2, .. }
    ));
    assert_eq!(fx.hits.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn direct_fetch_streams_without_retrying() -> Result<()> {
    let fx = Arc::new(Fixture::new(test_payload()));
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");
    let client = reqwest::Client::new();

    stream_to_file(&client, &format!("http://{addr}/media.mp3"), &dest).await?;
    assert_eq!(std::fs::read(&dest)?, fx.payload);
    Ok(())
}

#[tokio::test]
async fn direct_fetch_fails_outright_on_server_error() -> Result<()> {
    let mut fixture = Fixture::new(test_payload());
    fixture.fail_first = 1;
    let fx = Arc::new(fixture);
    let addr = spawn_fixture(fx.clone()).await;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("media.tmp");
    let client = reqwest::Client::new();

    let err = stream_to_file(&client, &format!("http://{addr}/media.mp3"), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Status(status) if status.is_server_error()));
    // One attempt, no retry loop on the direct path.
    assert_eq!(fx.hits.load(Ordering::SeqCst), 1);
    Ok(())
}
