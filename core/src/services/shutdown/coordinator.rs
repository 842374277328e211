//! Shutdown coordinator
//!
//! Phase and outstanding count live together in one `watch` cell, so the
//! "still running?" check and the increment in `register` are a single
//! atomic step. A unit registered before `begin_drain` is always waited for.

use futures_util::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::errors::{DomainError, DomainResult};

/// Lifecycle phase of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPhase {
    Running,
    Draining,
    Stopped,
}

impl ShutdownPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownPhase::Running => "running",
            ShutdownPhase::Draining => "draining",
            ShutdownPhase::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    phase: ShutdownPhase,
    outstanding: usize,
}

/// Tracks in-flight background units and sequences the drain
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    state: Arc<watch::Sender<State>>,
    runtime: Option<Handle>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(State {
            phase: ShutdownPhase::Running,
            outstanding: 0,
        });
        Self {
            state: Arc::new(state),
            runtime: None,
        }
    }

    /// Spawn tracked tasks on `runtime` instead of the caller's runtime
    ///
    /// actix workers each run their own runtime and drop its tasks when they
    /// stop, so tracked work must live on a runtime that outlives them.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
            ..Self::new()
        }
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.state.borrow().phase
    }

    /// Units registered and not yet finished
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding
    }

    /// Count one unit of work until the returned guard is dropped
    ///
    /// # Errors
    /// `ShutdownInProgress` once draining has begun
    pub fn register(&self) -> DomainResult<TaskGuard> {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            if state.phase != ShutdownPhase::Running {
                return false;
            }
            state.outstanding += 1;
            accepted = true;
            true
        });

        if !accepted {
            return Err(DomainError::ShutdownInProgress);
        }
        Ok(TaskGuard {
            state: Arc::clone(&self.state),
        })
    }

    /// Register `task` and run it on the tokio runtime
    ///
    /// Without [`with_runtime`](Self::with_runtime) this must be called from
    /// inside a runtime.
    ///
    /// The guard moves into the spawned task, so the count drops when the task
    /// finishes, fails or panics. Panics are caught and logged.
    pub fn track<F>(&self, name: &'static str, task: F) -> DomainResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.register()?;

        let unit = async move {
            let _guard = guard;
            if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
                error!(task = name, panic = %panic_message(&*panic), "Background task panicked");
            }
        };
        match &self.runtime {
            Some(runtime) => drop(runtime.spawn(unit)),
            None => drop(tokio::spawn(unit)),
        }
        Ok(())
    }

    /// `Running → Draining`; no effect in any other phase
    pub fn begin_drain(&self) {
        let changed = self.state.send_if_modified(|state| {
            if state.phase == ShutdownPhase::Running {
                state.phase = ShutdownPhase::Draining;
                true
            } else {
                false
            }
        });

        if changed {
            info!(outstanding = self.outstanding(), "Shutdown started, draining background tasks");
        }
    }

    /// Begin draining if needed and wait until no unit is outstanding
    ///
    /// Never cancels running work. The phase is `Stopped` afterwards whether
    /// or not the wait succeeded.
    ///
    /// # Errors
    /// `ShutdownTimeout` when units are still outstanding after `timeout`
    pub async fn drain(&self, timeout: Duration) -> DomainResult<()> {
        self.begin_drain();

        let mut watcher = self.state.subscribe();
        let waited = tokio::time::timeout(timeout, async {
            // The sender lives in `self`, so this cannot observe a closed channel
            let _ = watcher.wait_for(|state| state.outstanding == 0).await;
        })
        .await;

        self.state.send_modify(|state| state.phase = ShutdownPhase::Stopped);

        match waited {
            Ok(()) => {
                info!("All background tasks completed");
                Ok(())
            }
            Err(_) => {
                let outstanding = self.outstanding();
                warn!(outstanding, timeout_secs = timeout.as_secs(), "Drain timed out");
                Err(DomainError::ShutdownTimeout { outstanding })
            }
        }
    }
}

/// Releases one registered unit when dropped
#[must_use = "the unit is released as soon as the guard is dropped"]
pub struct TaskGuard {
    state: Arc<watch::Sender<State>>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.state
            .send_modify(|state| state.outstanding = state.outstanding.saturating_sub(1));
    }
}

impl std::fmt::Debug for TaskGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGuard").finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
