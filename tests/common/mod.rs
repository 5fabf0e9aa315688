//! Synthetic collaborators for driving the resolver without a network

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

use favicon_resolver::errors::{ProbeError, PublishError, PublishResult};
use favicon_resolver::models::{IconCandidate, IconSource};
use favicon_resolver::services::{
    DuckDuckGoProvider, FaviconService, GoogleFaviconProvider, IconCache, IconProvider,
    IconRanker, ImageFetcher, ImageProber, RankingPolicy, RemoteIconStore, UploadReceipt,
};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

pub fn remote_url(domain: &str) -> String {
    format!("https://remote.test/favicons/{domain}")
}

pub fn google_url(domain: &str) -> String {
    GoogleFaviconProvider::new(128).icon_url(domain)
}

pub fn duckduckgo_url(domain: &str) -> String {
    DuckDuckGoProvider.icon_url(domain)
}

/// Holds probes whose URL contains a pattern until released
pub struct Gate {
    pattern: String,
    entered: Notify,
    release: Semaphore,
}

impl Gate {
    pub fn new(pattern: &str) -> Arc<Self> {
        Arc::new(Self {
            pattern: pattern.to_string(),
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    /// Resolves once at least one gated probe is waiting
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.add_permits(64);
    }
}

/// Answers probes from a URL -> width table; unknown URLs fail
#[derive(Default)]
pub struct StubProber {
    widths: HashMap<String, u32>,
    calls: AtomicUsize,
    settled: AtomicUsize,
    gate: Option<Arc<Gate>>,
}

impl StubProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, width: u32) -> Self {
        self.widths.insert(url.into(), width);
        self
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups that have returned an outcome
    pub fn settled(&self) -> usize {
        self.settled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProber for StubProber {
    async fn probe(&self, url: &str, source: IconSource) -> Option<IconCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate
            && url.contains(&gate.pattern)
        {
            gate.entered.notify_one();
            if let Ok(permit) = gate.release.acquire().await {
                permit.forget();
            }
        }
        let outcome = self
            .widths
            .get(url)
            .map(|width| IconCandidate::new(source, url, *width, *width));
        self.settled.fetch_add(1, Ordering::SeqCst);
        outcome
    }
}

/// Remote store double with the same `favicons/{domain}` addressing
#[derive(Default)]
pub struct RecordingRemoteStore {
    published: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteIconStore for RecordingRemoteStore {
    fn fetch_url(&self, domain: &str) -> String {
        remote_url(domain)
    }

    async fn publish(&self, domain: &str, source_url: &str) -> PublishResult<UploadReceipt> {
        self.published
            .lock()
            .unwrap()
            .push((domain.to_string(), source_url.to_string()));
        if self.fail {
            return Err(PublishError::Rejected {
                message: "upload preset disabled".to_string(),
            });
        }
        Ok(UploadReceipt {
            public_id: format!("favicons/{domain}"),
            secure_url: remote_url(domain),
        })
    }
}

/// Serves fixed bytes per URL; unknown URLs answer 404
#[derive(Default)]
pub struct StubFetcher {
    bodies: HashMap<String, Bytes>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: &'static [u8]) -> Self {
        self.bodies.insert(url.into(), Bytes::from_static(body));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.get(url).cloned().ok_or_else(|| ProbeError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Wire a service from doubles with the real public provider URL builders
pub fn service(
    prober: Arc<StubProber>,
    remote_store: Arc<RecordingRemoteStore>,
    fetcher: Arc<StubFetcher>,
    cache: IconCache,
) -> Arc<FaviconService> {
    let ranker = IconRanker::new(
        prober,
        remote_store,
        Arc::new(GoogleFaviconProvider::new(128)),
        Arc::new(DuckDuckGoProvider),
        RankingPolicy::default(),
    );
    Arc::new(FaviconService::new(cache, ranker, fetcher))
}
