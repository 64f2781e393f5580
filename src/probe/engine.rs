// src/probe/engine.rs
// =============================================================================
// The probe engine: turns one ProbeRequest into exactly one ProbeResult.
//
// Per URL the engine runs up to `retries + 1` attempt cycles:
//
//   PENDING
//     -> (optional jitter sleep)
//     -> ATTEMPTING(HEAD)   status in [200,400)  -> SUCCESS
//                           status >= 400 / error -> ATTEMPTING(GET), same cycle
//     -> ATTEMPTING(GET)    status in [200,400)  -> SUCCESS
//                           status >= 400 / error -> next cycle (RETRY_WAIT)
//     -> ... after the last cycle                -> TERMINAL(failed)
//
// The HEAD -> GET fallback never consumes a retry. A 4xx/5xx from GET is
// retried exactly like a timeout unless `retry_http_errors` is off.
//
// The engine never returns an error: every failure mode ends up in the
// result's `category` / `error` fields.
// =============================================================================

use crate::config::ProbeConfig;
use crate::probe::transport::{Transport, TransportResponse};
use crate::probe::types::{Category, FailureDetail, FailureKind, Method, ProbeRequest, ProbeResult};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Probes single URLs through a shared transport.
#[derive(Clone)]
pub struct ProbeEngine {
    transport: Arc<dyn Transport>,
    config: ProbeConfig,
}

// What one attempt cycle ended with
enum CycleOutcome {
    Success(TransportResponse, Method),
    Failed,
    // A stable HTTP error that should not be retried
    Settled,
}

// Everything observed so far for one URL, overwritten attempt by attempt
struct ProbeState {
    method: Method,
    last_response: Option<TransportResponse>,
    last_failure: Option<FailureDetail>,
}

impl ProbeEngine {
    pub fn new(transport: Arc<dyn Transport>, config: ProbeConfig) -> Self {
        ProbeEngine { transport, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs the full attempt sequence for one request.
    pub async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let start = Instant::now();
        let mut state = ProbeState {
            method: self.first_method(),
            last_response: None,
            last_failure: None,
        };

        for cycle in 0..=self.config.retries {
            self.jitter_pause().await;

            match self.run_cycle(request, cycle, &mut state).await {
                CycleOutcome::Success(response, method) => {
                    return build_success(request, response, method, cycle, start);
                }
                CycleOutcome::Settled => {
                    return build_failure(request, state, cycle, start);
                }
                CycleOutcome::Failed => {}
            }
        }

        build_failure(request, state, self.config.retries, start)
    }

    pub(crate) fn first_method(&self) -> Method {
        if self.config.use_head {
            Method::Head
        } else {
            Method::Get
        }
    }

    async fn jitter_pause(&self) {
        if self.config.jitter.is_zero() {
            return;
        }
        // Draw before awaiting: thread_rng is not Send
        let delay = {
            let mut rng = rand::thread_rng();
            Duration::from_secs_f64(rng.gen_range(0.0..self.config.jitter.as_secs_f64()))
        };
        tokio::time::sleep(delay).await;
    }

    async fn run_cycle(&self, request: &ProbeRequest, cycle: u32, state: &mut ProbeState) -> CycleOutcome {
        let methods: &[Method] = if self.config.use_head {
            &[Method::Head, Method::Get]
        } else {
            &[Method::Get]
        };

        for &method in methods {
            state.method = method;
            let outcome = self.transport.send(method, &request.url).await;

            match outcome {
                Ok(response) => {
                    let status = response.status;
                    debug!(url = %request.url, %method, cycle, status, "attempt answered");

                    if ProbeResult::is_ok_status(Some(status)) {
                        return CycleOutcome::Success(response, method);
                    }
                    state.last_response = Some(response);

                    // HEAD >= 400 (405 included) falls through to GET in this cycle
                    if method == Method::Head {
                        continue;
                    }
                    if !self.config.retry_http_errors && status >= 400 {
                        return CycleOutcome::Settled;
                    }
                }
                Err(failure) => {
                    debug!(url = %request.url, %method, cycle, error = %failure, "attempt failed");
                    state.last_failure = Some(failure);
                }
            }
        }

        CycleOutcome::Failed
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn build_success(
    request: &ProbeRequest,
    response: TransportResponse,
    method: Method,
    cycle: u32,
    start: Instant,
) -> ProbeResult {
    ProbeResult {
        id: request.id,
        url: request.url.clone(),
        final_url: Some(response.final_url),
        status_code: Some(response.status),
        ok: true,
        category: Category::from_status(Some(response.status)),
        error: None,
        elapsed_ms: elapsed_ms(start),
        content_type: response.content_type,
        content_length: response.content_length,
        retries_used: cycle,
        method,
        timestamp: Utc::now(),
    }
}

// Terminal failure: the last status seen (if any) decides the category,
// otherwise it is an exception. The last transport failure, when there was
// one, is always reported as the error text.
fn build_failure(request: &ProbeRequest, state: ProbeState, cycle: u32, start: Instant) -> ProbeResult {
    let ProbeState { method, last_response, last_failure } = state;

    let (final_url, status_code, content_type, content_length) = match last_response {
        Some(r) => (Some(r.final_url), Some(r.status), r.content_type, r.content_length),
        None => (None, None, None, None),
    };

    let category = match status_code {
        Some(status) => Category::from_status(Some(status)),
        None => Category::Exception,
    };
    let error = match (last_failure, status_code) {
        (Some(detail), _) => Some(detail.describe()),
        (None, None) => Some(FailureDetail::new(FailureKind::Other, "no attempt was made").describe()),
        (None, Some(_)) => None,
    };

    ProbeResult {
        id: request.id,
        url: request.url.clone(),
        final_url,
        status_code,
        ok: false,
        category,
        error,
        elapsed_ms: elapsed_ms(start),
        content_type,
        content_length,
        retries_used: cycle,
        method,
        timestamp: Utc::now(),
    }
}
