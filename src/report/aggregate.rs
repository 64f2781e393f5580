// src/report/aggregate.rs
// =============================================================================
// Puts finished probes back in a deterministic order and summarizes them.
//
// Order: rows with an id first (by id), then rows without one, each group by
// submission index. Completion time never plays a role, so two runs over the
// same input produce the same report order.
//
// Pure functions only: no I/O happens here.
// =============================================================================

use crate::probe::{Category, Completed, ProbeResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// How many failing results the summary keeps for display.
pub const FAILURE_SAMPLE: usize = 10;

/// Counts and a failure sample for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    /// Only categories that occurred, in report order
    pub by_category: BTreeMap<Category, usize>,
    /// The first FAILURE_SAMPLE failing results, in report order
    pub failures: Vec<ProbeResult>,
}

impl Summary {
    /// Share of ok results, 0.0 for an empty run.
    pub fn success_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.ok as f64 / self.total as f64
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.ok
    }
}

/// Ordered results plus their summary.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub results: Vec<ProbeResult>,
    pub summary: Summary,
}

/// Orders completed probes and computes the summary.
pub fn aggregate(mut completed: Vec<Completed>) -> Aggregate {
    completed.sort_by_key(|c| (c.result.id.is_none(), c.result.id, c.sequence));
    let results: Vec<ProbeResult> = completed.into_iter().map(|c| c.result).collect();
    let summary = summarize(&results);
    Aggregate { results, summary }
}

/// Summary of results that are already in report order.
pub fn summarize(results: &[ProbeResult]) -> Summary {
    let mut by_category = BTreeMap::new();
    for result in results {
        *by_category.entry(result.category).or_insert(0) += 1;
    }

    Summary {
        total: results.len(),
        ok: results.iter().filter(|r| r.ok).count(),
        by_category,
        failures: results.iter().filter(|r| !r.ok).take(FAILURE_SAMPLE).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::probe::mock::{MockReply, MockTransport};
    use crate::probe::{FailureKind, Method, ProbeRequest, Scheduler};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn result(id: Option<i64>, url: &str, status: Option<u16>) -> ProbeResult {
        ProbeResult {
            id,
            url: url.to_string(),
            final_url: None,
            status_code: status,
            ok: ProbeResult::is_ok_status(status),
            category: status.map_or(Category::Exception, |s| Category::from_status(Some(s))),
            error: None,
            elapsed_ms: 1.0,
            content_type: None,
            content_length: None,
            retries_used: 0,
            method: Method::Get,
            timestamp: Utc::now(),
        }
    }

    fn completed(sequence: usize, result: ProbeResult) -> Completed {
        Completed { sequence, result }
    }

    #[test]
    fn test_orders_by_id_then_submission_index() {
        let shuffled = vec![
            completed(0, result(Some(7), "https://g.test/", Some(200))),
            completed(4, result(None, "https://late.test/", Some(200))),
            completed(1, result(Some(2), "https://b.test/", Some(404))),
            completed(3, result(None, "https://early.test/", None)),
            completed(2, result(Some(2), "https://b2.test/", Some(200))),
        ];

        let urls: Vec<String> = aggregate(shuffled).results.into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://b.test/",
                "https://b2.test/",
                "https://g.test/",
                "https://early.test/",
                "https://late.test/",
            ]
        );
    }

    #[test]
    fn test_counts_and_ratio() {
        let results = vec![
            completed(0, result(None, "https://a.test/", Some(200))),
            completed(1, result(None, "https://b.test/", Some(301))),
            completed(2, result(None, "https://c.test/", Some(404))),
            completed(3, result(None, "https://d.test/", None)),
        ];

        let summary = aggregate(results).summary;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.ok, 2);
        assert_eq!(summary.failed(), 2);
        assert!((summary.success_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.by_category[&Category::Success], 1);
        assert_eq!(summary.by_category[&Category::Redirection], 1);
        assert_eq!(summary.by_category[&Category::ClientError], 1);
        assert_eq!(summary.by_category[&Category::Exception], 1);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.failures[0].url, "https://c.test/");
    }

    #[test]
    fn test_failure_sample_is_capped() {
        let results = (0..25)
            .map(|i| completed(i, result(None, &format!("https://f{i}.test/"), Some(500))))
            .collect();
        let summary = aggregate(results).summary;
        assert_eq!(summary.failures.len(), FAILURE_SAMPLE);
        assert_eq!(summary.failures[0].url, "https://f0.test/");
    }

    #[test]
    fn test_empty_run_has_zero_ratio() {
        let aggregate = aggregate(Vec::new());
        assert!(aggregate.results.is_empty());
        assert_eq!(aggregate.summary.total, 0);
        assert_eq!(aggregate.summary.success_ratio(), 0.0);
        assert!(aggregate.summary.by_category.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_runs_agree_after_aggregation() {
        let transport = Arc::new(MockTransport::with_latency(Duration::from_millis(1)));
        let urls: Vec<String> = (0..40).map(|i| format!("https://u{i}.test/")).collect();
        for (i, url) in urls.iter().enumerate() {
            let reply = match i % 4 {
                0 => MockReply::Status(200),
                1 => MockReply::Status(404),
                2 => MockReply::Status(503),
                _ => MockReply::Fail(FailureKind::Dns),
            };
            transport.always(url, reply);
        }
        let config = ProbeConfig {
            concurrency: 6,
            retries: 1,
            ..ProbeConfig::default()
        };
        let scheduler = Scheduler::new(transport, config).unwrap();
        let requests: Vec<ProbeRequest> = urls.iter().map(ProbeRequest::new).collect();

        let first = aggregate(scheduler.run(requests.clone()).await.completed);
        let second = aggregate(scheduler.run(requests).await.completed);

        assert_eq!(first.summary.by_category, second.summary.by_category);
        let order = |a: &Aggregate| -> Vec<(String, Category)> {
            a.results.iter().map(|r| (r.url.clone(), r.category)).collect()
        };
        assert_eq!(order(&first), order(&second));
        assert_eq!(order(&first)[0].0, "https://u0.test/");
    }
}
