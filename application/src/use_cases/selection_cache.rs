//! Selection cache
//!
//! Wraps a [`ModelSelector`] and remembers its answers per
//! `(role, repository context)` for a fixed time-to-live. The cache belongs
//! to the wrapper instance; nothing is shared between instances.

use crate::ports::model_selector::ModelSelector;
use async_trait::async_trait;
use ensemble_domain::{AgentRole, AgentSelection, RepositoryContext};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

type CacheKey = (AgentRole, RepositoryContext);

pub struct CachedSelector<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, Option<AgentSelection>)>>,
}

impl<S: ModelSelector> CachedSelector<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached answer.
    pub fn invalidate(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<Option<AgentSelection>> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, selection) = entries.get(key)?;
        (stored_at.elapsed() < self.ttl).then(|| selection.clone())
    }

    fn store(&self, key: CacheKey, selection: Option<AgentSelection>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
            entries.insert(key, (Instant::now(), selection));
        }
    }
}

#[async_trait]
impl<S: ModelSelector> ModelSelector for CachedSelector<S> {
    async fn select(&self, role: AgentRole, context: &RepositoryContext) -> Option<AgentSelection> {
        let key = (role, context.clone());
        if let Some(hit) = self.lookup(&key) {
            debug!("Selection cache hit for {}", role);
            return hit;
        }

        let selection = self.inner.select(role, context).await;
        self.store(key, selection.clone());
        selection
    }
}
