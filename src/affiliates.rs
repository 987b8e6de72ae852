//! Affiliate API fetch boundary.
//!
//! The only fallible operation in the whole page: everything downstream of
//! the fetch is infallible by contract, so a failed request degrades into
//! empty row lists plus a single error message instead of crashing the
//! render.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::period::Period;

pub const DEFAULT_API_BASE: &str = "https://services.rainbet.com/v1";

/// One participant row as the affiliate API reports it. At least one of
/// `username` and `id` is expected, but nothing is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Affiliate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub wagered_amount: Option<String>,
}

impl Affiliate {
    /// Stable identity for dedup and display: username when present and
    /// non-empty, otherwise id.
    pub fn identity(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AffiliatesResponse {
    #[serde(default)]
    pub affiliates: Vec<Affiliate>,
    #[serde(default)]
    pub cache_updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base: String,
    pub key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_API_BASE.to_string(),
            key: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AffiliateFetchError {
    #[error("affiliate API client build error: {0}")]
    ClientBuild(String),
    #[error("affiliate API {status}: {body}")]
    Status { status: u16, body: String },
    #[error("affiliate API transport error: {0}")]
    Transport(String),
    #[error("affiliate API returned invalid JSON: {0}")]
    InvalidBody(String),
    #[error("affiliate fetch task failed: {0}")]
    Join(String),
}

/// Read-only source of affiliate rows for an inclusive `YYYY-MM-DD` UTC
/// date range.
pub trait AffiliateSource: Send + Sync + 'static {
    fn fetch(&self, start_at: &str, end_at: &str)
        -> Result<AffiliatesResponse, AffiliateFetchError>;
}

/// Live source backed by the affiliate HTTP API. No explicit timeout is
/// configured; the client defaults govern. Must be constructed from a
/// synchronous context: the blocking client cannot be built inside a tokio
/// runtime.
pub struct ReqwestAffiliateSource {
    client: reqwest::blocking::Client,
    base: String,
    key: String,
}

impl ReqwestAffiliateSource {
    pub fn new(cfg: ApiConfig) -> Result<Self, AffiliateFetchError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| AffiliateFetchError::ClientBuild(err.to_string()))?;
        Ok(Self {
            client,
            base: cfg.base.trim_end_matches('/').to_string(),
            key: cfg.key,
        })
    }
}

impl AffiliateSource for ReqwestAffiliateSource {
    fn fetch(
        &self,
        start_at: &str,
        end_at: &str,
    ) -> Result<AffiliatesResponse, AffiliateFetchError> {
        let url = affiliates_url(&self.base, start_at, end_at, &self.key);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|err| AffiliateFetchError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| AffiliateFetchError::Transport(err.to_string()))?;

        if status != 200 {
            warn!(
                component = "affiliates",
                event = "affiliates.fetch.status",
                start_at,
                end_at,
                status
            );
            return Err(AffiliateFetchError::Status { status, body });
        }

        let parsed: AffiliatesResponse = serde_json::from_str(&body)
            .map_err(|err| AffiliateFetchError::InvalidBody(err.to_string()))?;

        info!(
            component = "affiliates",
            event = "affiliates.fetch.ok",
            start_at,
            end_at,
            rows = parsed.affiliates.len()
        );

        Ok(parsed)
    }
}

fn affiliates_url(base: &str, start_at: &str, end_at: &str, key: &str) -> String {
    format!("{base}/external/affiliates?start_at={start_at}&end_at={end_at}&key={key}")
}

/// In-memory source keyed by `(start_at, end_at)`, with an optional
/// fallback response for unseeded ranges. Used by tests and demo mode.
#[derive(Clone, Default)]
pub struct InMemoryAffiliateSource {
    by_range: Arc<RwLock<HashMap<(String, String), AffiliatesResponse>>>,
    fallback: Arc<RwLock<AffiliatesResponse>>,
}

impl InMemoryAffiliateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: AffiliatesResponse) -> Self {
        let source = Self::default();
        *source
            .fallback
            .write()
            .expect("in-memory fallback lock should not be poisoned") = fallback;
        source
    }

    /// Demo source with plausible rows for every range.
    pub fn demo() -> Self {
        Self::with_fallback(AffiliatesResponse {
            affiliates: demo_affiliates(),
            cache_updated_at: None,
        })
    }

    pub fn insert(&self, start_at: &str, end_at: &str, response: AffiliatesResponse) {
        self.by_range
            .write()
            .expect("in-memory range lock should not be poisoned")
            .insert((start_at.to_string(), end_at.to_string()), response);
    }
}

impl AffiliateSource for InMemoryAffiliateSource {
    fn fetch(
        &self,
        start_at: &str,
        end_at: &str,
    ) -> Result<AffiliatesResponse, AffiliateFetchError> {
        let seeded = self
            .by_range
            .read()
            .expect("in-memory range lock should not be poisoned")
            .get(&(start_at.to_string(), end_at.to_string()))
            .cloned();

        Ok(seeded.unwrap_or_else(|| {
            self.fallback
                .read()
                .expect("in-memory fallback lock should not be poisoned")
                .clone()
        }))
    }
}

/// Source that fails every fetch. Exercises the degrade path in tests.
pub struct FailingAffiliateSource {
    pub message: String,
}

impl AffiliateSource for FailingAffiliateSource {
    fn fetch(
        &self,
        _start_at: &str,
        _end_at: &str,
    ) -> Result<AffiliatesResponse, AffiliateFetchError> {
        Err(AffiliateFetchError::Transport(self.message.clone()))
    }
}

/// Rows for the current and previous period, plus the single surfaced
/// error when either fetch failed (in which case both lists are empty).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchedRows {
    pub current: Vec<Affiliate>,
    pub previous: Vec<Affiliate>,
    pub error: Option<String>,
}

/// Fetches the current and previous period concurrently. Any failure
/// degrades the whole pair: the page still renders, with empty data and
/// the error message.
pub async fn fetch_period_pair(
    source: Arc<dyn AffiliateSource>,
    current: &Period,
    previous: &Period,
) -> FetchedRows {
    let current_task = {
        let source = Arc::clone(&source);
        let (start_at, end_at) = (current.start_at(), current.end_at());
        tokio::task::spawn_blocking(move || source.fetch(&start_at, &end_at))
    };
    let previous_task = {
        let source = Arc::clone(&source);
        let (start_at, end_at) = (previous.start_at(), previous.end_at());
        tokio::task::spawn_blocking(move || source.fetch(&start_at, &end_at))
    };

    let (current_result, previous_result) = tokio::join!(current_task, previous_task);

    match (flatten(current_result), flatten(previous_result)) {
        (Ok(current_rows), Ok(previous_rows)) => FetchedRows {
            current: current_rows.affiliates,
            previous: previous_rows.affiliates,
            error: None,
        },
        (Err(err), _) | (_, Err(err)) => {
            warn!(
                component = "affiliates",
                event = "affiliates.fetch.degraded",
                error = %err
            );
            FetchedRows {
                current: Vec::new(),
                previous: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

fn flatten(
    result: Result<Result<AffiliatesResponse, AffiliateFetchError>, tokio::task::JoinError>,
) -> Result<AffiliatesResponse, AffiliateFetchError> {
    match result {
        Ok(inner) => inner,
        Err(join_err) => Err(AffiliateFetchError::Join(join_err.to_string())),
    }
}

/// Deterministic demo rows for running the site without an API key.
pub fn demo_affiliates() -> Vec<Affiliate> {
    let rows: [(&str, &str); 12] = [
        ("stormchaser", "18230.55"),
        ("luckyseven", "15980.00"),
        ("rivermonster", "14412.80"),
        ("midnightrun", "9022.10"),
        ("copperhead", "7731.45"),
        ("blueglass", "6210.00"),
        ("quietwolf", "4104.92"),
        ("redletter", "2250.30"),
        ("palebird", "1345.00"),
        ("greenroom", "812.77"),
        ("ashenfox", "405.50"),
        ("tinspark", "120.00"),
    ];

    rows.iter()
        .enumerate()
        .map(|(idx, (name, amount))| Affiliate {
            username: Some((*name).to_string()),
            id: Some(format!("demo-{}", idx + 1)),
            wagered_amount: Some((*amount).to_string()),
        })
        .collect()
}
