//! Named task scopes.
//!
//! Every scope owns a cancellation handle and the jobs launched under its
//! name. Cancellation is cooperative: jobs receive a [`CancellationToken`]
//! and decide themselves when to check it. Nothing is aborted.

use super::pending::PendingJobs;
use crate::error::{Error, Result};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

tokio::task_local! {
    /// Name of the scope the running job was launched under.
    static CURRENT_SCOPE: String;
}

#[derive(Debug)]
struct Scope {
    token: CancellationToken,
    jobs: Vec<JoinHandle<()>>,
}

impl Scope {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            jobs: Vec::new(),
        }
    }

    /// Cancel the running jobs and hand them out. The scope stays usable.
    fn cancel(&mut self) -> Vec<JoinHandle<()>> {
        let token = std::mem::take(&mut self.token);
        token.cancel();
        std::mem::take(&mut self.jobs)
    }
}

/// Registry of named scopes of concurrent work.
///
/// All registry mutations go through one lock; the jobs themselves run
/// concurrently on the tokio runtime.
///
/// ```rust
/// use vpnconf::supervisor::TaskSupervisor;
///
/// # #[tokio::main]
/// # async fn main() -> vpnconf::Result<()> {
/// let tasks = TaskSupervisor::new();
/// tasks.launch("download", |token| async move {
///     if !token.is_cancelled() {
///         // do the work
///     }
/// });
/// tasks.join("download").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TaskSupervisor {
    scopes: Mutex<HashMap<String, Scope>>,
    runtime: Option<Handle>,
}

impl TaskSupervisor {
    /// Creates a supervisor spawning on the ambient tokio runtime.
    ///
    /// [`TaskSupervisor::launch`] must then be called from within a runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a supervisor spawning on `handle`, usable from any thread.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            scopes: Mutex::default(),
            runtime: Some(handle),
        }
    }

    /// Start `work` as a new job under `name`.
    ///
    /// The scope is created on first use. Jobs launched under the same name
    /// share its cancellation handle: `work` receives a token that fires when
    /// the scope is cancelled or removed.
    ///
    /// `work` is called with the registry lock held and must only build its
    /// future, not call back into the supervisor.
    pub fn launch<F, Fut>(&self, name: &str, work: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut scopes = self.scopes.lock();
        let scope = scopes.entry(name.to_string()).or_insert_with(|| {
            debug!("Creating task scope \"{}\"", name);
            Scope::new()
        });
        scope.jobs.retain(|job| !job.is_finished());

        let token = scope.token.child_token();
        let job = self.spawn(CURRENT_SCOPE.scope(name.to_string(), work(token)));
        scope.jobs.push(job);
        debug!("Launched job #{} in scope \"{}\"", scope.jobs.len(), name);
    }

    /// Cancel the jobs of `name` and launch `work` once they have all returned.
    ///
    /// The new job starts right away but only calls `work` after the
    /// cancelled ones finished, so two jobs of the same name never overlap.
    pub fn relaunch<F, Fut>(&self, name: &str, work: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let previous = self.cancel(name);
        self.launch(name, move |token| async move {
            previous.wait().await;
            work(token).await;
        });
    }

    /// Cancel every running job of `name` and forget them.
    ///
    /// The scope stays registered and later launches reuse it with a fresh
    /// handle. Unknown names are ignored.
    pub fn cancel(&self, name: &str) -> PendingJobs {
        let mut scopes = self.scopes.lock();
        match scopes.get_mut(name) {
            Some(scope) => {
                let jobs = scope.cancel();
                debug!("Cancelled {} job(s) in scope \"{}\"", jobs.len(), name);
                PendingJobs::new(jobs)
            }
            None => PendingJobs::default(),
        }
    }

    /// Cancel the jobs of `name` and drop the scope.
    ///
    /// The next launch under `name` creates a new scope.
    pub fn remove(&self, name: &str) -> PendingJobs {
        let mut scopes = self.scopes.lock();
        match scopes.remove(name) {
            Some(mut scope) => {
                let jobs = scope.cancel();
                debug!("Removed scope \"{}\" with {} job(s)", name, jobs.len());
                PendingJobs::new(jobs)
            }
            None => PendingJobs::default(),
        }
    }

    /// Wait until every job recorded under `name` has returned.
    ///
    /// Meant for orderly shutdown. Jobs launched while waiting are waited for
    /// as well. Calling this from a job of the same scope would never return
    /// and fails with [`Error::JoinFromWithin`] instead.
    pub async fn join(&self, name: &str) -> Result<()> {
        let inside = CURRENT_SCOPE
            .try_with(|current| current == name)
            .unwrap_or(false);
        if inside {
            return Err(Error::JoinFromWithin(name.to_string()));
        }

        loop {
            let jobs = match self.scopes.lock().get_mut(name) {
                Some(scope) => std::mem::take(&mut scope.jobs),
                None => Vec::new(),
            };
            if jobs.is_empty() {
                return Ok(());
            }
            PendingJobs::new(jobs).wait().await;
        }
    }

    /// Cancel and drop every scope, then wait for all their jobs.
    ///
    /// Must not be awaited from a supervised job.
    pub async fn shutdown(&self) {
        let jobs: Vec<_> = self
            .scopes
            .lock()
            .drain()
            .flat_map(|(_, mut scope)| scope.cancel())
            .collect();
        debug!("Shutting down {} supervised job(s)", jobs.len());
        PendingJobs::new(jobs).wait().await;
    }

    /// Whether a scope named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.lock().contains_key(name)
    }

    /// Number of jobs of `name` that have not returned yet.
    pub fn job_count(&self, name: &str) -> usize {
        self.scopes.lock().get(name).map_or(0, |scope| {
            scope.jobs.iter().filter(|job| !job.is_finished()).count()
        })
    }

    fn spawn<Fut>(&self, future: Fut) -> JoinHandle<()>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        match &self.runtime {
            Some(handle) => handle.spawn(future),
            None => tokio::spawn(future),
        }
    }
}
