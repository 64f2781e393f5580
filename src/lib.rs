// src/lib.rs
// =============================================================================
// link_prober: collect URLs and check that they are reachable.
//
// Layout:
// - config:  ProbeConfig (concurrency, timeout, retries, HEAD/GET, ...)
// - probe:   the transport seam, the per-URL engine and the bounded scheduler
// - collect: URL extraction from files plus normalization
// - report:  ordering, summary, JSON/CSV/Markdown reports
// - error:   typed errors for the fallible parts of the API
//
// A typical run:
//   let transport = Arc::new(ReqwestTransport::new(&config)?);
//   let run = Scheduler::new(transport, config)?.run(requests).await;
//   let Aggregate { results, summary } = aggregate(run.completed);
// =============================================================================

pub mod collect;
pub mod config;
pub mod error;
pub mod probe;
pub mod report;

pub use config::ProbeConfig;
pub use error::{CollectError, ConfigError, ReportError};
pub use probe::{
    Category, ProbeEngine, ProbeRequest, ProbeResult, ProbeRun, ReqwestTransport, Scheduler,
    Transport,
};
pub use report::{aggregate, Aggregate, Summary};
