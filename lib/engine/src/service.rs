use crate::{EngineConfig, EngineState, RerankStage};
use parking_lot::RwLock;
use std::sync::Arc;
use vitrine_core::Result;
use vitrine_inference::{Embedder, SketchInterpreter};

/// The retrieval service: one instance constructed at startup and shared
/// by every request handler.
///
/// All per-session data lives in an [`EngineState`] behind a lock that is
/// only ever written during [`SearchEngine::install`] - queries take a
/// cheap `Arc` clone and never block each other. With no state installed,
/// every search answers with an explicit empty result rather than an error.
pub struct SearchEngine {
    pub(crate) state: RwLock<Option<Arc<EngineState>>>,
    pub(crate) embedder: Arc<dyn Embedder>,
    pub(crate) interpreter: Arc<dyn SketchInterpreter>,
    pub(crate) rerank: RerankStage,
    pub(crate) config: EngineConfig,
}

impl SearchEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        interpreter: Arc<dyn SketchInterpreter>,
        rerank: RerankStage,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: RwLock::new(None),
            embedder,
            interpreter,
            rerank,
            config,
        })
    }

    /// Swap in a freshly built state. Atomic from the point of view of
    /// concurrent searches: they hold either the old `Arc` or the new one,
    /// never a half-updated view.
    pub fn install(&self, state: EngineState) {
        *self.state.write() = Some(Arc::new(state));
    }

    /// The current session state, if a catalog has been loaded
    #[must_use]
    pub fn state(&self) -> Option<Arc<EngineState>> {
        self.state.read().clone()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.read().is_some()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
