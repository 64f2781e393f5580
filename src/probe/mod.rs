// src/probe/mod.rs
// =============================================================================
// The probing core.
//
// Submodules:
// - types: requests, results, categories
// - transport: the network seam (trait + reqwest implementation)
// - engine: per-URL attempt / fallback / retry state machine
// - scheduler: bounded fan-out of many probes with cancellation
// =============================================================================

mod engine;
mod scheduler;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use engine::ProbeEngine;
pub use scheduler::{Completed, ProbeRun, Scheduler};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse, MAX_REDIRECTS};
pub use types::{
    truncate_chars, Category, FailureDetail, FailureKind, Method, ProbeRequest, ProbeResult,
    MAX_ERROR_CHARS,
};
