//! Analysis session: current text, selected provider, cached results per kind

use crate::analyzer::Analyzer;
use crate::error::AgentError;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use textlens_core::{AnalysisKind, AnalysisResult};
use textlens_llm::Provider;
use tokio::sync::RwLock;
use tracing::{debug, info};

struct SessionState {
    text: String,
    analyzer: Analyzer,
    /// Bumped whenever the text or provider selection changes, so a request
    /// that started before the change cannot repopulate the cache.
    generation: u64,
}

pub struct AnalysisSession {
    state: RwLock<SessionState>,
    results: DashMap<AnalysisKind, AnalysisResult>,
    busy: AtomicBool,
}

impl AnalysisSession {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::with_text(provider, String::new())
    }

    pub fn with_text(provider: Arc<dyn Provider>, text: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                text: text.into(),
                analyzer: Analyzer::new(provider),
                generation: 0,
            }),
            results: DashMap::new(),
            busy: AtomicBool::new(false),
        }
    }

    pub async fn text(&self) -> String {
        self.state.read().await.text.clone()
    }

    /// Replace the input text. Cached results are dropped only if it changed.
    pub async fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.state.write().await;
        if state.text == text {
            return;
        }
        state.text = text;
        state.generation += 1;
        self.results.clear();
        debug!("Session text changed ({} chars), cache cleared", state.text.len());
    }

    /// Switch provider or model. Cached results are dropped when the
    /// vendor or model differs from the current one.
    pub async fn set_provider(&self, provider: Arc<dyn Provider>) {
        let mut state = self.state.write().await;
        let current = state.analyzer.provider();
        let changed = current.kind() != provider.kind() || current.model() != provider.model();
        state.analyzer = Analyzer::new(provider);
        if changed {
            state.generation += 1;
            self.results.clear();
            info!("Session provider set to {}, cache cleared", state.analyzer.label());
        }
    }

    /// `provider/model` of the current selection.
    pub async fn provider_label(&self) -> String {
        self.state.read().await.analyzer.label()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn cached(&self, kind: AnalysisKind) -> Option<AnalysisResult> {
        self.results.get(&kind).map(|r| r.clone())
    }

    pub fn cached_kinds(&self) -> Vec<AnalysisKind> {
        AnalysisKind::ALL
            .into_iter()
            .filter(|k| self.results.contains_key(k))
            .collect()
    }

    pub fn clear(&self) {
        self.results.clear();
    }

    /// Return the cached result for `kind`, or run the analysis. Fails with
    /// `Busy` while another request of this session is in flight.
    pub async fn analyze(&self, kind: AnalysisKind) -> Result<AnalysisResult, AgentError> {
        if let Some(hit) = self.cached(kind) {
            debug!("{} served from session cache", kind);
            return Ok(hit);
        }

        let _busy = BusyGuard::acquire(&self.busy)?;

        let (text, analyzer, generation) = {
            let state = self.state.read().await;
            (state.text.clone(), state.analyzer.clone(), state.generation)
        };

        match analyzer.run(&text, kind).await {
            Ok(result) => {
                let state = self.state.read().await;
                if state.generation == generation {
                    self.results.insert(kind, result.clone());
                } else {
                    debug!("{} result discarded: session changed mid-request", kind);
                }
                Ok(result)
            }
            Err(e) => {
                self.results.remove(&kind);
                Err(e)
            }
        }
    }
}

/// Holds the session's busy flag; released on drop, success or failure.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AgentError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AgentError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
