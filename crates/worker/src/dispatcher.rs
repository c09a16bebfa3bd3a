//! Bounded background pool for threshold checks and lifecycle notifications.
//!
//! Request handlers enqueue a job and return immediately. A fixed set of
//! workers drains the queue, running each job under its own timeout so a
//! finished or cancelled request never cuts a dispatch short.

use notifier::{Notifier, NotifierConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracker_core::limits::DISPATCH_TIMEOUT_MARGIN_MS;

use crate::lifecycle::LifecycleEvent;
use crate::threshold::ThresholdPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Pending checks held before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Concurrent dispatch workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-job timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_workers() -> usize {
    4
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            workers: default_workers(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Raise the per-job timeout so a notifier configured with `notifier`
    /// can run all of its attempts and backoff waits before being cut off.
    pub fn fitted_to(mut self, notifier: &NotifierConfig) -> Self {
        let budget = notifier.delivery_budget() + Duration::from_millis(DISPATCH_TIMEOUT_MARGIN_MS);
        if self.timeout() < budget {
            warn!(
                configured_ms = self.timeout_ms,
                raised_to_ms = budget.as_millis() as u64,
                "Dispatch timeout shorter than notifier retry budget, raising it"
            );
            self.timeout_ms = budget.as_millis() as u64;
        }
        self
    }
}

/// Work item run by the dispatch pool.
#[derive(Debug, Clone)]
pub enum DispatchJob {
    /// Count an employee's computers and warn at the threshold.
    ThresholdCheck(String),
    Lifecycle(LifecycleEvent),
}

impl DispatchJob {
    fn label(&self) -> &'static str {
        match self {
            DispatchJob::ThresholdCheck(_) => "threshold check",
            DispatchJob::Lifecycle(event) => event.kind().as_str(),
        }
    }
}

/// Handle for enqueueing background notification work.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<DispatchJob>,
}

impl NotificationDispatcher {
    /// Spawn the worker pool. Workers exit when `shutdown` fires or every
    /// dispatcher handle has been dropped.
    pub fn start(
        policy: Arc<ThresholdPolicy>,
        config: DispatchConfig,
        shutdown: CancellationToken,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..config.workers.max(1))
            .map(|worker_id| {
                let policy = policy.clone();
                let receiver = receiver.clone();
                let shutdown = shutdown.clone();
                let timeout = config.timeout();
                tokio::spawn(async move {
                    run_worker(worker_id, policy, receiver, timeout, shutdown).await;
                })
            })
            .collect();

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            timeout_ms = config.timeout_ms,
            "Notification dispatcher started"
        );

        (Self { sender }, handles)
    }

    /// Queue a threshold check without waiting.
    ///
    /// Returns false when the code is empty, the queue is full, or the pool
    /// has shut down.
    pub fn enqueue(&self, employee_code: &str) -> bool {
        if employee_code.is_empty() {
            return false;
        }
        self.submit(DispatchJob::ThresholdCheck(employee_code.to_string()))
    }

    /// Queue a lifecycle notification without waiting.
    pub fn enqueue_lifecycle(&self, event: LifecycleEvent) -> bool {
        self.submit(DispatchJob::Lifecycle(event))
    }

    fn submit(&self, job: DispatchJob) -> bool {
        let m = metrics();
        m.dispatch_queue_depth.inc();

        let label = job.label();
        match self.sender.try_send(job) {
            Ok(()) => {
                m.dispatch_enqueued.inc();
                debug!(job = label, "Dispatch job queued");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                m.dispatch_queue_depth.dec();
                m.dispatch_dropped.inc();
                warn!(job = label, "Dispatch queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                m.dispatch_queue_depth.dec();
                m.dispatch_dropped.inc();
                warn!(job = label, "Dispatcher stopped, dropping job");
                false
            }
        }
    }
}

async fn run_worker(
    worker_id: usize,
    policy: Arc<ThresholdPolicy>,
    receiver: Arc<Mutex<mpsc::Receiver<DispatchJob>>>,
    timeout: Duration,
    shutdown: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => None,
            job = async { receiver.lock().await.recv().await } => job,
        };

        let Some(job) = next else {
            debug!(worker_id, "Dispatch worker stopping");
            return;
        };
        metrics().dispatch_queue_depth.dec();

        let cancel = shutdown.child_token();
        let label = job.label();
        if tokio::time::timeout(timeout, run_job(worker_id, &policy, job, &cancel))
            .await
            .is_err()
        {
            metrics().dispatch_timeouts.inc();
            error!(
                worker_id,
                job = label,
                timeout_ms = timeout.as_millis() as u64,
                "Dispatch job timed out"
            );
        }
    }
}

async fn run_job(
    worker_id: usize,
    policy: &ThresholdPolicy,
    job: DispatchJob,
    cancel: &CancellationToken,
) {
    match job {
        DispatchJob::ThresholdCheck(employee_code) => {
            let outcome = policy.check_and_notify(&employee_code, cancel).await;
            debug!(worker_id, employee_code = %employee_code, ?outcome, "Threshold check done");
        }
        DispatchJob::Lifecycle(event) => {
            let notifier: &dyn Notifier = policy.notifier().as_ref();
            event.deliver(notifier, cancel).await;
        }
    }
}
