// src/probe/mock.rs
// =============================================================================
// A scripted Transport for tests.
//
// Each URL gets a list of replies that are handed out one per call; once the
// list runs out, the last reply repeats. URLs without a script fail with a
// connection error. Every call is recorded, per URL and in global order, and
// an in-flight gauge tracks how many calls were running at the same time.
// =============================================================================

use crate::probe::transport::{Transport, TransportError, TransportResponse};
use crate::probe::types::{FailureDetail, FailureKind, Method};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockReply {
    Status(u16),
    Fail(FailureKind),
    /// Answers with the status after sleeping (on top of any global latency)
    Slow(Duration, u16),
}

#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, Vec<MockReply>>>,
    calls: Mutex<HashMap<String, Vec<Method>>>,
    order: Mutex<Vec<String>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Every call sleeps this long before replying.
    pub fn with_latency(latency: Duration) -> Self {
        MockTransport { latency, ..MockTransport::default() }
    }

    pub fn script(&self, url: &str, replies: Vec<MockReply>) {
        self.scripts.lock().unwrap().insert(url.to_string(), replies);
    }

    pub fn always(&self, url: &str, reply: MockReply) {
        self.script(url, vec![reply]);
    }

    pub fn calls(&self, url: &str) -> Vec<Method> {
        self.calls.lock().unwrap().get(url).cloned().unwrap_or_default()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls(url).len()
    }

    /// Every URL sent, across all calls, in the order the calls started.
    pub fn call_order(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> MockReply {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(url) {
            Some(replies) if replies.len() > 1 => replies.remove(0),
            Some(replies) if !replies.is_empty() => replies[0].clone(),
            _ => MockReply::Fail(FailureKind::Connect),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, method: Method, url: &str) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(method);
        self.order.lock().unwrap().push(url.to_string());

        let reply = self.next_reply(url);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let mut delay = self.latency;
        if let MockReply::Slow(extra, _) = &reply {
            delay += *extra;
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            MockReply::Status(status) | MockReply::Slow(_, status) => Ok(TransportResponse {
                status,
                final_url: url.to_string(),
                content_type: Some("text/html".to_string()),
                content_length: None,
            }),
            MockReply::Fail(kind) => Err(FailureDetail::new(kind, format!("simulated failure for {url}"))),
        }
    }
}
