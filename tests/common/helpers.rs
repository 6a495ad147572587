use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use vpnconf::session::{
    Connectivity, ConnectionEngine, EngineEvent, SessionManager, SessionManagerBuilder,
    SessionObserver,
};
use vpnconf::{DownloaderBuilder, Error, ErrorKind, Result};

pub const TEST_USER_AGENT: &str = "vpnconf-test-agent";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates binary test content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Creates a text profile of at least `size` bytes
pub fn create_profile_content(size: usize) -> Vec<u8> {
    let mut profile = b"client\ndev tun\nproto udp\n".to_vec();
    let mut i = 0u32;
    while profile.len() < size {
        profile.extend_from_slice(format!("remote 10.0.{}.{} 1194\n", i / 256 % 256, i % 256).as_bytes());
        i += 1;
    }
    profile.truncate(size.max(1));
    profile
}

pub fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).expect("Failed to compress");
    encoder.finish().expect("Failed to finish compression")
}

/// Asserts that a file holds exactly `expected`
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = fs::read(path).expect("Failed to read file");
    assert_eq!(content.len(), expected.len(), "File size mismatch at path: {:?}", path);
    assert!(content == expected, "File content mismatch at path: {:?}", path);
}

/// Asserts that percent values never decrease and stay within 0..=100
pub fn assert_monotonic(percents: &[u8]) {
    for pair in percents.windows(2) {
        assert!(pair[0] <= pair[1], "Progress went backwards: {:?}", percents);
    }
    assert!(percents.iter().all(|p| *p <= 100));
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Runs `future` with a generous upper bound so a hang fails the test
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(30), future)
        .await
        .expect("Timed out")
}

// === Engine ===

/// Connection engine recording the calls it receives.
pub struct MockEngine {
    events: broadcast::Sender<EngineEvent>,
    starts: Mutex<Vec<PathBuf>>,
    stops: AtomicUsize,
    fail_start: bool,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    /// An engine refusing every profile.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(fail_start: bool) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            starts: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            fail_start,
        }
    }

    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    pub fn starts(&self) -> Vec<PathBuf> {
        self.starts.lock().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionEngine for MockEngine {
    async fn start(&self, profile: &Path) -> Result<()> {
        self.starts.lock().push(profile.to_path_buf());
        if self.fail_start {
            return Err(Error::Internal("engine refused the profile".into()));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

// === Observers ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    ProfileLoaded(bool),
    VpnStatus(bool),
    Start,
    Progress(u8),
    End,
    Error(ErrorKind),
}

/// Observer keeping every event it receives.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
    fail_progress: bool,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// An observer failing on every progress event.
    pub fn failing_progress() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            fail_progress: true,
        })
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &Recorded) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Recorded::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ErrorKind> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Recorded::Error(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Whether the download cycle ended, successfully or not.
    pub fn finished(&self) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| matches!(e, Recorded::End | Recorded::Error(_)))
    }

    fn record(&self, event: Recorded) {
        self.events.lock().push(event);
    }
}

impl SessionObserver for RecordingObserver {
    fn on_profile_loaded(&self, loaded: bool) -> Result<()> {
        self.record(Recorded::ProfileLoaded(loaded));
        Ok(())
    }

    fn on_vpn_status_changed(&self, connected: bool) -> Result<()> {
        self.record(Recorded::VpnStatus(connected));
        Ok(())
    }

    fn on_config_download_start(&self) -> Result<()> {
        self.record(Recorded::Start);
        Ok(())
    }

    fn on_config_download_progress(&self, percent: u8) -> Result<()> {
        self.record(Recorded::Progress(percent));
        if self.fail_progress {
            return Err(Error::Observer("progress rejected".into()));
        }
        Ok(())
    }

    fn on_config_download_end(&self) -> Result<()> {
        self.record(Recorded::End);
        Ok(())
    }

    fn on_config_download_error(&self, error: &Error) -> Result<()> {
        self.record(Recorded::Error(error.kind()));
        Ok(())
    }
}

// === Connectivity ===

/// Connectivity probe switched by the test.
#[derive(Default)]
pub struct SwitchableNetwork {
    online: AtomicBool,
    polls: AtomicUsize,
}

impl SwitchableNetwork {
    pub fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl Connectivity for SwitchableNetwork {
    fn is_available(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.online.load(Ordering::SeqCst)
    }
}

// === Session ===

/// Creates a session builder writing its artifact into `dir`
pub fn create_test_session_builder(engine: Arc<MockEngine>, dir: &Path) -> SessionManagerBuilder {
    let downloader = DownloaderBuilder::new()
        .user_agent(TEST_USER_AGENT)
        .build()
        .expect("Failed to build downloader");
    SessionManagerBuilder::new(engine)
        .artifact_path(dir.join("config.ovpn"))
        .network_wait(3, Duration::from_millis(10))
        .downloader(downloader)
}

/// Creates a session with a recording observer attached
pub fn create_test_session(
    engine: Arc<MockEngine>,
    dir: &Path,
) -> (SessionManager, Arc<RecordingObserver>) {
    let session = create_test_session_builder(engine, dir)
        .build()
        .expect("Failed to build session");
    let observer = RecordingObserver::new();
    session.subscribe(observer.clone());
    (session, observer)
}
