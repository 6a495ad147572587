use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::warn;

/// Jobs detached from a scope by `cancel` or `remove`.
///
/// Dropping this leaves the jobs running to their next cancellation check.
/// Awaiting [`PendingJobs::wait`] blocks until every one of them has returned.
#[derive(Debug, Default)]
pub struct PendingJobs {
    jobs: Vec<JoinHandle<()>>,
}

impl PendingJobs {
    pub(crate) fn new(jobs: Vec<JoinHandle<()>>) -> Self {
        Self { jobs }
    }

    /// Number of detached jobs, finished or not.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Wait for every job to return.
    pub async fn wait(self) {
        for result in join_all(self.jobs).await {
            if let Err(e) = result {
                if e.is_panic() {
                    warn!("Supervised job panicked: {}", e);
                }
            }
        }
    }
}
