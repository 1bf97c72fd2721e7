//! Provider liveness directory
//!
//! Tracks which provider should serve the next request behind a short-lived
//! cache. Selection re-probes in fixed priority order when the cache
//! expires. The whole structure is a best-effort hint: concurrent refreshes
//! may race and last-writer-wins is acceptable.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agrivoice_core::{ChatBackend, ProviderId};

/// Liveness record for one provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderHealth {
    pub provider: ProviderId,
    pub probed_at: Instant,
    pub available: bool,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    provider: ProviderId,
    selected_at: Instant,
}

/// Cached provider selection with per-provider probe records.
///
/// Owned by the composition root and injected, so tests can reset it
/// deterministically instead of fighting ambient globals.
pub struct ProviderDirectory {
    ttl: Duration,
    selection: RwLock<Option<Selection>>,
    health: DashMap<ProviderId, ProviderHealth>,
}

impl ProviderDirectory {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            selection: RwLock::new(None),
            health: DashMap::new(),
        }
    }

    /// Default 60-second cache window
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(60))
    }

    /// Pick the provider to lead the next attempt order.
    ///
    /// Returns the cached choice while it is fresher than the TTL window;
    /// otherwise probes `backends` (already in priority order) and caches
    /// the first available one. `None` means nothing probed as available —
    /// the router will still walk every backend.
    pub async fn select(&self, backends: &[Arc<dyn ChatBackend>]) -> Option<ProviderId> {
        if let Some(selection) = *self.selection.read() {
            if selection.selected_at.elapsed() < self.ttl {
                return Some(selection.provider);
            }
        }

        for backend in backends {
            let id = backend.id();
            let available = backend.is_available().await;
            self.health.insert(
                id,
                ProviderHealth {
                    provider: id,
                    probed_at: Instant::now(),
                    available,
                },
            );
            if available {
                tracing::info!(provider = %id, "provider selected");
                *self.selection.write() = Some(Selection {
                    provider: id,
                    selected_at: Instant::now(),
                });
                return Some(id);
            }
            tracing::debug!(provider = %id, "provider unavailable");
        }

        *self.selection.write() = None;
        None
    }

    /// Last probe result for a provider, if it has been probed
    pub fn health(&self, provider: ProviderId) -> Option<ProviderHealth> {
        self.health.get(&provider).map(|entry| *entry.value())
    }

    /// Drop the cached selection and all probe records
    pub fn reset(&self) {
        *self.selection.write() = None;
        self.health.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrivoice_core::{ChatMessage, ChatOptions, ProviderError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ProbeCounting {
        id: ProviderId,
        available: bool,
        probes: AtomicU32,
    }

    impl ProbeCounting {
        fn new(id: ProviderId, available: bool) -> Arc<Self> {
            Arc::new(Self {
                id,
                available,
                probes: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ProbeCounting {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn is_available(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.available
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: &ChatOptions,
        ) -> Result<String, ProviderError> {
            Ok("ok".into())
        }
    }

    fn as_backends(list: &[Arc<ProbeCounting>]) -> Vec<Arc<dyn ChatBackend>> {
        list.iter().map(|b| b.clone() as Arc<dyn ChatBackend>).collect()
    }

    #[tokio::test]
    async fn caches_first_available_within_ttl() {
        let ollama = ProbeCounting::new(ProviderId::Ollama, false);
        let groq = ProbeCounting::new(ProviderId::Groq, true);
        let backends = as_backends(&[ollama.clone(), groq.clone()]);

        let directory = ProviderDirectory::new(Duration::from_secs(60));
        assert_eq!(directory.select(&backends).await, Some(ProviderId::Groq));
        assert_eq!(directory.select(&backends).await, Some(ProviderId::Groq));

        // Second select served from cache: one probe each
        assert_eq!(ollama.probes.load(Ordering::SeqCst), 1);
        assert_eq!(groq.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_ttl_reprobes() {
        let ollama = ProbeCounting::new(ProviderId::Ollama, true);
        let backends = as_backends(&[ollama.clone()]);

        let directory = ProviderDirectory::new(Duration::ZERO);
        directory.select(&backends).await;
        directory.select(&backends).await;
        assert_eq!(ollama.probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn none_available_yields_none_and_records_health() {
        let ollama = ProbeCounting::new(ProviderId::Ollama, false);
        let backends = as_backends(&[ollama]);

        let directory = ProviderDirectory::with_default_ttl();
        assert_eq!(directory.select(&backends).await, None);
        let health = directory.health(ProviderId::Ollama).unwrap();
        assert!(!health.available);
    }

    #[tokio::test]
    async fn reset_clears_cache() {
        let ollama = ProbeCounting::new(ProviderId::Ollama, true);
        let backends = as_backends(&[ollama.clone()]);

        let directory = ProviderDirectory::with_default_ttl();
        directory.select(&backends).await;
        directory.reset();
        assert!(directory.health(ProviderId::Ollama).is_none());
        directory.select(&backends).await;
        assert_eq!(ollama.probes.load(Ordering::SeqCst), 2);
    }
}
