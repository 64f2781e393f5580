// src/probe/scheduler.rs
// =============================================================================
// Fans probe tasks out under a fixed concurrency ceiling.
//
// How it works:
// 1. Every request becomes one tokio task, spawned up front into a JoinSet
// 2. A task first waits for a Semaphore permit, then runs the WHOLE probe
//    (all retries) while holding it, so a slow URL keeps exactly one slot
// 3. Finished tasks send their result down a channel; this function is the
//    only reader, so results are collected by a single consumer
// 4. Results arrive in completion order, tagged with their submission index
//    so the aggregator can restore a deterministic order later
//
// Cancellation: run_until takes a "shutdown" future (e.g. Ctrl-C). When it
// resolves we stop waiting, keep every result already delivered, and abort
// the tasks that are still running.
// =============================================================================

use crate::config::ProbeConfig;
use crate::error::ConfigError;
use crate::probe::engine::ProbeEngine;
use crate::probe::transport::Transport;
use crate::probe::types::{FailureDetail, FailureKind, ProbeRequest, ProbeResult};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A finished probe, tagged with the position of its request in the input.
#[derive(Debug, Clone)]
pub struct Completed {
    pub sequence: usize,
    pub result: ProbeResult,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct ProbeRun {
    /// Results in completion order
    pub completed: Vec<Completed>,
    /// Number of requests that were submitted
    pub submitted: usize,
    /// True when the shutdown future fired before every probe finished
    pub interrupted: bool,
    /// Highest number of probes that held a slot at the same time
    pub peak_in_flight: usize,
}

// Counts probes that currently hold a concurrency slot
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

struct InFlightGuard<'a>(&'a InFlight);

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs many probes with at most `concurrency` in flight.
pub struct Scheduler {
    engine: Arc<ProbeEngine>,
    concurrency: usize,
}

impl Scheduler {
    /// Validates the configuration before anything is probed.
    pub fn new(transport: Arc<dyn Transport>, config: ProbeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let concurrency = config.concurrency;
        Ok(Scheduler {
            engine: Arc::new(ProbeEngine::new(transport, config)),
            concurrency,
        })
    }

    /// Probes every request and waits for all of them.
    pub async fn run(&self, requests: Vec<ProbeRequest>) -> ProbeRun {
        self.run_until(requests, std::future::pending::<()>()).await
    }

    /// Probes every request until they are all done or `shutdown` resolves.
    pub async fn run_until<F>(&self, requests: Vec<ProbeRequest>, shutdown: F) -> ProbeRun
    where
        F: Future<Output = ()>,
    {
        let total = requests.len();
        let mut run = ProbeRun {
            completed: Vec::with_capacity(total),
            submitted: total,
            ..ProbeRun::default()
        };
        if total == 0 {
            return run;
        }

        let limiter = Arc::new(Semaphore::new(self.concurrency));
        let gauge = Arc::new(InFlight::default());
        let (sender, mut receiver) = mpsc::unbounded_channel::<Completed>();
        let mut tasks = JoinSet::new();

        for (sequence, request) in requests.into_iter().enumerate() {
            let engine = Arc::clone(&self.engine);
            let limiter = Arc::clone(&limiter);
            let gauge = Arc::clone(&gauge);
            let sender = sender.clone();

            tasks.spawn(async move {
                let result = probe_in_slot(&engine, &limiter, &gauge, &request).await;
                // The receiver is only gone once the run is over
                let _ = sender.send(Completed { sequence, result });
            });
        }
        // Only the tasks hold senders now, so recv() ends when they all finish
        drop(sender);

        let progress_every = (total / 20).max(1);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    run.interrupted = true;
                    break;
                }
                received = receiver.recv() => match received {
                    Some(done) => {
                        run.completed.push(done);
                        let count = run.completed.len();
                        if count % progress_every == 0 || count == total {
                            info!(
                                "Progress: {}/{} ({:.0}%)",
                                count,
                                total,
                                count as f64 * 100.0 / total as f64
                            );
                        }
                    }
                    None => break,
                },
            }
        }

        if run.interrupted {
            tasks.abort_all();
            // Keep whatever finished before the abort took effect
            while let Ok(done) = receiver.try_recv() {
                run.completed.push(done);
            }
            warn!(
                "Interrupted: kept {} of {} results, abandoned the rest",
                run.completed.len(),
                total
            );
        }

        run.peak_in_flight = gauge.peak.load(Ordering::SeqCst);
        run
    }
}

// Holds one concurrency slot for the entire attempt sequence of a request
async fn probe_in_slot(
    engine: &ProbeEngine,
    limiter: &Semaphore,
    gauge: &InFlight,
    request: &ProbeRequest,
) -> ProbeResult {
    let method = engine.first_method();

    let permit = match limiter.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            let detail = FailureDetail::new(FailureKind::Other, "concurrency limiter closed");
            return ProbeResult::unprobed(request, method, &detail);
        }
    };
    let slot = gauge.enter();

    // The engine never panics on purpose, but a panic must still yield a result
    let result = match AssertUnwindSafe(engine.probe(request)).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            let detail = FailureDetail::new(FailureKind::Other, "probe task panicked");
            ProbeResult::unprobed(request, method, &detail)
        }
    };

    drop(slot);
    drop(permit);
    result
}
