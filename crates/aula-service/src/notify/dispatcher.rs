//! Bounded worker pool delivering notification jobs.
//!
//! One `Notifier` instance is constructed at process start and injected
//! into every triggering operation; it is torn down once, at process
//! shutdown. Workers isolate per-job failures: a rejected address or an
//! unreachable mail server is logged and discarded without affecting
//! sibling jobs, the worker, or the submitting caller.
//!
//! # Shutdown
//!
//! `shutdown` stops intake immediately, grants queued and in-flight jobs a
//! bounded drain window (60 seconds by default), then force-cancels any
//! workers still running. It is idempotent.

use crate::config::NotifierConfig;
use crate::notify::{MailTransport, NotificationJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Fixed-size notification worker pool.
pub struct Notifier {
    /// Intake side of the queue; `None` once shutdown has begun.
    tx: std::sync::Mutex<Option<mpsc::UnboundedSender<NotificationJob>>>,

    /// Worker handles, consumed by the first `shutdown` call.
    workers: AsyncMutex<Vec<JoinHandle<()>>>,

    drain_timeout: Duration,
}

impl Notifier {
    /// Spawn the worker pool against the given transport.
    #[must_use]
    pub fn spawn(transport: Arc<dyn MailTransport>, config: NotifierConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<NotificationJob>();
        let rx = Arc::new(AsyncMutex::new(rx));

        let workers = (0..config.workers)
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let transport = Arc::clone(&transport);
                tokio::spawn(async move {
                    worker_loop(worker_id, rx, transport).await;
                })
            })
            .collect();

        info!(
            target: "aula.notify",
            workers = config.workers,
            "Notification dispatcher started"
        );

        Self {
            tx: std::sync::Mutex::new(Some(tx)),
            workers: AsyncMutex::new(workers),
            drain_timeout: config.drain_timeout,
        }
    }

    /// Enqueue a batch of jobs and return immediately.
    ///
    /// Never blocks and never reports delivery outcomes. Jobs submitted
    /// after `shutdown` has begun are dropped, not executed.
    pub fn submit(&self, batch: Vec<NotificationJob>) {
        let guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(tx) = guard.as_ref() else {
            debug!(
                target: "aula.notify",
                dropped = batch.len(),
                "Batch submitted after shutdown, dropping"
            );
            return;
        };

        let count = batch.len();
        for job in batch {
            // Send only fails if every worker is gone, which means shutdown
            // raced us; those jobs are dropped like any post-shutdown batch.
            if let Err(e) = tx.send(job) {
                debug!(
                    target: "aula.notify",
                    recipient = %e.0.recipient,
                    "Workers stopped, dropping job"
                );
            }
        }

        debug!(target: "aula.notify", jobs = count, "Batch enqueued");
    }

    /// Stop intake, drain up to the configured window, then force-cancel.
    ///
    /// Idempotent: the second and later calls return immediately.
    pub async fn shutdown(&self) {
        {
            let mut guard = match self.tx.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if guard.take().is_none() {
                debug!(target: "aula.notify", "Shutdown already performed");
                return;
            }
            // Dropping the sender lets workers finish the queue and exit.
        }

        let workers = {
            let mut guard = self.workers.lock().await;
            std::mem::take(&mut *guard)
        };

        info!(
            target: "aula.notify",
            drain_timeout_secs = self.drain_timeout.as_secs(),
            "Notification dispatcher draining"
        );

        let deadline = Instant::now() + self.drain_timeout;
        let mut forced = 0usize;
        for mut handle in workers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if tokio::time::timeout(remaining, &mut handle).await.is_err() {
                handle.abort();
                forced += 1;
            }
        }

        if forced > 0 {
            warn!(
                target: "aula.notify",
                forced,
                "Drain window elapsed, force-cancelled workers"
            );
        } else {
            info!(target: "aula.notify", "Notification dispatcher stopped");
        }
    }
}

/// Worker body: pull jobs until the queue closes, attempting each once.
async fn worker_loop(
    worker_id: usize,
    rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<NotificationJob>>>,
    transport: Arc<dyn MailTransport>,
) {
    loop {
        // The lock is held only while waiting for the next job, so one
        // worker blocking on an empty queue never stalls a sibling that is
        // mid-delivery.
        let job = { rx.lock().await.recv().await };
        let Some(job) = job else {
            debug!(target: "aula.notify", worker_id, "Queue closed, worker exiting");
            break;
        };

        match transport.send(&job.recipient, &job.subject, &job.body).await {
            Ok(()) => {
                debug!(
                    target: "aula.notify",
                    worker_id,
                    recipient = %job.recipient,
                    "Notification delivered"
                );
            }
            Err(e) => {
                // Per-job isolation: log and move on. No retry, no
                // dead-letter, nothing surfaces to the submitter.
                warn!(
                    target: "aula.notify",
                    worker_id,
                    recipient = %job.recipient,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }
}
