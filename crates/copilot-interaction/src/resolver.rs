//! Model resolution over an ordered fallback list.
//!
//! One `ModelResolver` is created per client session and shared by reference.
//! The first model that answers a probe is remembered for the lifetime of the
//! resolver and returned without probing on later calls with the same key.
//! A cached model is never re-validated: if it disappears mid-session the
//! failure shows up at generation time, not here.

use copilot_core::backend::{GenerativeBackend, ModelId, ProbeOutcome};
use copilot_core::error::{PipelineError, Result};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::supported_models::default_fallbacks;

#[derive(Debug, Clone)]
struct CachedResolution {
    /// Hash of the key the model was resolved for; the key itself is not kept.
    key_fingerprint: u64,
    model: ModelId,
}

pub struct ModelResolver {
    backend: Arc<dyn GenerativeBackend>,
    candidates: Vec<ModelId>,
    cache: RwLock<Option<CachedResolution>>,
}

impl ModelResolver {
    pub fn new(backend: Arc<dyn GenerativeBackend>, candidates: Vec<ModelId>) -> Self {
        Self {
            backend,
            candidates,
            cache: RwLock::new(None),
        }
    }

    pub fn with_default_fallbacks(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self::new(backend, default_fallbacks())
    }

    pub fn backend(&self) -> &Arc<dyn GenerativeBackend> {
        &self.backend
    }

    pub fn candidates(&self) -> &[ModelId] {
        &self.candidates
    }

    /// The memoized model, if any.
    pub async fn cached(&self) -> Option<ModelId> {
        self.cache.read().await.as_ref().map(|c| c.model.clone())
    }

    /// The memoized model, only if it was resolved for `api_key`.
    pub async fn cached_for(&self, api_key: &str) -> Option<ModelId> {
        let fingerprint = fingerprint(api_key);
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|c| c.key_fingerprint == fingerprint)
            .map(|c| c.model.clone())
    }

    /// Returns a reachable model for `api_key`.
    ///
    /// Order: `preferred` (probed every time it is given), then the cached
    /// model, then the fallback list. A 404 probe moves on to the next
    /// candidate; any other probe failure is returned immediately.
    pub async fn resolve(&self, api_key: &str, preferred: Option<&ModelId>) -> Result<ModelId> {
        let fingerprint = fingerprint(api_key);

        if let Some(model) = preferred {
            match self.backend.probe(model, api_key).await? {
                ProbeOutcome::Available => {
                    tracing::info!(%model, "Using preferred model");
                    self.remember(fingerprint, model.clone()).await;
                    return Ok(model.clone());
                }
                ProbeOutcome::NotFound => {
                    tracing::warn!(%model, "Preferred model not available, falling back");
                }
            }
        }

        if let Some(model) = self.cached_for(api_key).await {
            return Ok(model);
        }

        for model in &self.candidates {
            if self.backend.probe(model, api_key).await? == ProbeOutcome::Available {
                tracing::info!(%model, "Resolved model from fallback list");
                self.remember(fingerprint, model.clone()).await;
                return Ok(model.clone());
            }
        }

        let tried = preferred
            .into_iter()
            .chain(self.candidates.iter())
            .map(ModelId::as_str)
            .collect::<Vec<_>>();
        Err(PipelineError::no_reachable_model(if tried.is_empty() {
            "The model fallback list is empty.".to_string()
        } else {
            format!(
                "No accessible Gemini model found with this API key (tried: {}). \
                 Confirm the key has access to these models.",
                tried.join(", ")
            )
        }))
    }

    async fn remember(&self, key_fingerprint: u64, model: ModelId) {
        *self.cache.write().await = Some(CachedResolution {
            key_fingerprint,
            model,
        });
    }
}

fn fingerprint(api_key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    api_key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::backend::RawProbeResponse;
    use copilot_core::error::PipelineErrorKind;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Reply {
        Ok,
        Missing,
        Status(u16),
    }

    /// Probe-only backend that records every probed model.
    struct ScriptedBackend {
        replies: HashMap<String, Reply>,
        probes: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: &[(&str, Reply)]) -> Arc<Self> {
            Arc::new(Self {
                replies: replies.iter().map(|(m, r)| (m.to_string(), *r)).collect(),
                probes: Mutex::new(Vec::new()),
            })
        }

        fn probes(&self) -> Vec<String> {
            self.probes.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl GenerativeBackend for ScriptedBackend {
        async fn probe(&self, model: &ModelId, _api_key: &str) -> Result<ProbeOutcome> {
            self.probes.lock().unwrap().push(model.to_string());
            match self.replies.get(model.as_str()).copied().unwrap_or(Reply::Missing) {
                Reply::Ok => Ok(ProbeOutcome::Available),
                Reply::Missing => Ok(ProbeOutcome::NotFound),
                Reply::Status(401) => Err(PipelineError::no_credential("401 rejected")),
                Reply::Status(code) => Err(PipelineError::generation(Some(code), "probe failed")),
            }
        }

        async fn generate(&self, _: &ModelId, _: &str, _: &str) -> Result<String> {
            unreachable!("resolver never generates")
        }

        async fn describe(&self, _: &ModelId, _: &str) -> RawProbeResponse {
            unreachable!("resolver never describes")
        }
    }

    fn ids(names: &[&str]) -> Vec<ModelId> {
        names.iter().copied().map(ModelId::from).collect()
    }

    #[tokio::test]
    async fn test_first_reachable_candidate_wins_within_k_probes() {
        let backend = ScriptedBackend::new(&[("m3", Reply::Ok), ("m4", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1", "m2", "m3", "m4"]));

        let model = resolver.resolve("key", None).await.unwrap();

        assert_eq!(model.as_str(), "m3");
        assert_eq!(backend.probes(), vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_unreachable_preferred_falls_back() {
        let backend = ScriptedBackend::new(&[("m2", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1", "m2"]));

        let model = resolver
            .resolve("key", Some(&ModelId::from("gone")))
            .await
            .unwrap();

        assert_eq!(model.as_str(), "m2");
        assert_eq!(backend.probes(), vec!["gone", "m1", "m2"]);
    }

    #[tokio::test]
    async fn test_reachable_preferred_short_circuits_and_is_cached() {
        let backend = ScriptedBackend::new(&[("pref", Reply::Ok), ("m1", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1"]));

        let model = resolver
            .resolve("key", Some(&ModelId::from("pref")))
            .await
            .unwrap();
        assert_eq!(model.as_str(), "pref");
        assert_eq!(resolver.cached().await, Some(ModelId::from("pref")));

        assert_eq!(resolver.resolve("key", None).await.unwrap().as_str(), "pref");
        assert_eq!(backend.probes(), vec!["pref"]);
    }

    #[tokio::test]
    async fn test_credential_failure_aborts_without_further_probes() {
        let backend = ScriptedBackend::new(&[("m1", Reply::Status(401)), ("m2", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1", "m2"]));

        let err = resolver.resolve("bad-key", None).await.unwrap_err();

        assert_eq!(err.kind(), PipelineErrorKind::NoCredential);
        assert_eq!(backend.probes(), vec!["m1"]);
        assert_eq!(resolver.cached().await, None);
    }

    #[tokio::test]
    async fn test_server_error_aborts_without_further_probes() {
        let backend = ScriptedBackend::new(&[("m1", Reply::Status(500)), ("m2", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1", "m2"]));

        let err = resolver.resolve("key", None).await.unwrap_err();

        assert_eq!(err.kind(), PipelineErrorKind::GenerationFailure);
        assert_eq!(backend.probes(), vec!["m1"]);
    }

    #[tokio::test]
    async fn test_preferred_credential_failure_propagates() {
        let backend = ScriptedBackend::new(&[("pref", Reply::Status(401)), ("m1", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1"]));

        let err = resolver
            .resolve("key", Some(&ModelId::from("pref")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), PipelineErrorKind::NoCredential);
        assert_eq!(backend.probes(), vec!["pref"]);
    }

    #[tokio::test]
    async fn test_exhausted_list_is_no_reachable_model() {
        let backend = ScriptedBackend::new(&[]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1", "m2"]));

        let err = resolver.resolve("key", None).await.unwrap_err();

        assert_eq!(err.kind(), PipelineErrorKind::NoReachableModel);
        assert!(err.diagnostic().contains("m1, m2"));
        assert_eq!(backend.probes().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_list_is_no_reachable_model() {
        let resolver = ModelResolver::new(ScriptedBackend::new(&[]), Vec::new());
        let err = resolver.resolve("key", None).await.unwrap_err();
        assert_eq!(err.kind(), PipelineErrorKind::NoReachableModel);
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let backend = ScriptedBackend::new(&[("m2", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1", "m2"]));

        let first = resolver.resolve("key", None).await.unwrap();
        let probes_after_first = backend.probes().len();
        let second = resolver.resolve("key", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.probes().len(), probes_after_first);
    }

    #[tokio::test]
    async fn test_different_key_resolves_again() {
        let backend = ScriptedBackend::new(&[("m1", Reply::Ok)]);
        let resolver = ModelResolver::new(backend.clone(), ids(&["m1"]));

        resolver.resolve("key-a", None).await.unwrap();
        resolver.resolve("key-b", None).await.unwrap();

        assert_eq!(backend.probes().len(), 2);
    }

    #[tokio::test]
    async fn test_cached_for_matches_only_the_resolving_key() {
        let resolver = ModelResolver::new(ScriptedBackend::new(&[("m1", Reply::Ok)]), ids(&["m1"]));

        assert_eq!(resolver.cached_for("key-a").await, None);
        resolver.resolve("key-a", None).await.unwrap();
        assert_eq!(resolver.cached_for("key-a").await, Some(ModelId::from("m1")));
        assert_eq!(resolver.cached_for("key-b").await, None);
    }
}
