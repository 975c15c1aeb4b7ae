//! Deterministic mock collaborators for tests.
//!
//! Vectors can be pinned per input; anything unpinned gets a seeded,
//! reproducible unit vector. Every mock can also be constructed in a
//! failing mode to exercise degradation paths.

use crate::traits::{
    Captioner, CleanedQuery, Embedder, RerankModel, SketchInterpreter, SketchReading,
    TextCleaner, Transcriber,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use vitrine_core::{vector, Error, Result, StrictCategory, KNOWN_PRODUCT_TYPES};

fn mock_failure() -> Error {
    Error::Inference("mock collaborator set to fail".to_string())
}

/// Reproducible unit vector derived from a byte seed (FNV-1a + xorshift)
#[must_use]
pub fn seeded_unit_vector(seed: &[u8], dim: usize) -> Vec<f32> {
    let mut state: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in seed {
        state ^= u64::from(b);
        state = state.wrapping_mul(0x0100_0000_01b3);
    }
    let mut v = Vec::with_capacity(dim);
    for _ in 0..dim {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        let bits = state.wrapping_mul(0x2545_F491_4F6C_DD1D);
        v.push(((bits >> 40) as f32 / (1u64 << 24) as f32) - 0.5);
    }
    let norm = vector::norm(&v);
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Deterministic cross-modal encoder with pinnable vectors
#[derive(Default)]
pub struct MockEmbedder {
    dim: usize,
    text_vectors: HashMap<String, Vec<f32>>,
    image_vectors: HashMap<Vec<u8>, Vec<f32>>,
    sketch_vectors: HashMap<Vec<u8>, Vec<f32>>,
    fail: bool,
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing(dim: usize) -> Self {
        Self {
            dim,
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text_vector(mut self, text: impl Into<String>, v: Vec<f32>) -> Self {
        self.text_vectors.insert(text.into(), normalized(v));
        self
    }

    #[must_use]
    pub fn with_image_vector(mut self, image: impl Into<Vec<u8>>, v: Vec<f32>) -> Self {
        self.image_vectors.insert(image.into(), normalized(v));
        self
    }

    #[must_use]
    pub fn with_sketch_vector(mut self, image: impl Into<Vec<u8>>, v: Vec<f32>) -> Self {
        self.sketch_vectors.insert(image.into(), normalized(v));
        self
    }
}

fn normalized(mut v: Vec<f32>) -> Vec<f32> {
    let norm = vector::norm(&v);
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            return Err(mock_failure());
        }
        Ok(texts
            .iter()
            .map(|t| {
                self.text_vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| seeded_unit_vector(t.as_bytes(), self.dim))
            })
            .collect())
    }

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self
            .image_vectors
            .get(image)
            .cloned()
            .unwrap_or_else(|| seeded_unit_vector(image, self.dim)))
    }

    async fn embed_sketch(&self, image: &[u8]) -> Result<Vec<f32>> {
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self
            .sketch_vectors
            .get(image)
            .cloned()
            .unwrap_or_else(|| seeded_unit_vector(image, self.dim)))
    }

    async fn embed_photo_as_sketch(&self, image: &[u8]) -> Result<Vec<f32>> {
        // Same sketch domain as user uploads; pinned sketch vectors apply
        self.embed_sketch(image).await
    }
}

/// Scripted sketch interpreter
pub struct MockSketchInterpreter {
    reading: SketchReading,
    fail: bool,
}

impl MockSketchInterpreter {
    #[must_use]
    pub fn scripted(description: impl Into<String>, category: Option<StrictCategory>) -> Self {
        Self {
            reading: SketchReading {
                description: description.into(),
                category,
            },
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            reading: SketchReading::fallback(),
            fail: true,
        }
    }
}

#[async_trait]
impl SketchInterpreter for MockSketchInterpreter {
    async fn interpret(&self, _image: &[u8]) -> Result<SketchReading> {
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self.reading.clone())
    }
}

/// Word-overlap reranker: logit grows with the number of distinct words a
/// candidate text shares with the query. Pinned logits win over overlap.
#[derive(Default)]
pub struct MockRerankModel {
    pinned: HashMap<String, f32>,
    fail: bool,
}

impl MockRerankModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_logit(mut self, text: impl Into<String>, logit: f32) -> Self {
        self.pinned.insert(text.into(), logit);
        self
    }
}

#[async_trait]
impl RerankModel for MockRerankModel {
    async fn rerank_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        if self.fail {
            return Err(mock_failure());
        }
        let query_words: HashSet<String> =
            query.to_lowercase().split_whitespace().map(String::from).collect();
        Ok(texts
            .iter()
            .map(|text| {
                if let Some(&logit) = self.pinned.get(text) {
                    return logit;
                }
                let shared = text
                    .to_lowercase()
                    .split_whitespace()
                    .map(String::from)
                    .collect::<HashSet<_>>()
                    .intersection(&query_words)
                    .count();
                2.0 * shared as f32 - 1.0
            })
            .collect())
    }
}

/// Template captioner
#[derive(Default)]
pub struct MockCaptioner {
    scripted: Option<String>,
    fail: bool,
}

impl MockCaptioner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scripted(caption: impl Into<String>) -> Self {
        Self {
            scripted: Some(caption.into()),
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            scripted: None,
            fail: true,
        }
    }
}

#[async_trait]
impl Captioner for MockCaptioner {
    async fn caption(&self, _image: &[u8], category_hint: Option<&str>) -> Result<String> {
        if self.fail {
            return Err(mock_failure());
        }
        Ok(match &self.scripted {
            Some(caption) => caption.clone(),
            None => format!(
                "a photograph of a {}",
                category_hint.unwrap_or("jewellery piece")
            ),
        })
    }
}

/// Cleaner that trims the raw text and applies the guardrail
#[derive(Default)]
pub struct MockTextCleaner {
    fail: bool,
}

impl MockTextCleaner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl TextCleaner for MockTextCleaner {
    async fn clean(&self, raw_text: &str) -> Result<CleanedQuery> {
        if self.fail {
            return Err(mock_failure());
        }
        let raw_lower = raw_text.to_lowercase();
        let product_type = KNOWN_PRODUCT_TYPES
            .iter()
            .find(|t| raw_lower.contains(*t))
            .map_or_else(|| "jewellery".to_string(), |t| (*t).to_string());
        let mut cleaned = CleanedQuery {
            cleaned_query: raw_text.trim().to_string(),
            product_type,
        };
        crate::clean::apply_category_guardrail(raw_text, &mut cleaned);
        Ok(cleaned)
    }
}

/// Fixed-transcript speech recognizer
pub struct MockTranscriber {
    text: String,
    fail: bool,
}

impl MockTranscriber {
    #[must_use]
    pub fn scripted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        if self.fail {
            return Err(mock_failure());
        }
        Ok(self.text.clone())
    }
}
