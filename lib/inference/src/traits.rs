use async_trait::async_trait;
use vitrine_core::{Result, StrictCategory};

/// What the sketch interpreter made of an uploaded drawing.
///
/// `category` is only set when the interpreter named a label inside the
/// closed [`StrictCategory`] vocabulary; anything else means the strict
/// filter stays off.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchReading {
    pub description: String,
    pub category: Option<StrictCategory>,
}

impl SketchReading {
    /// Reading used when the interpreter is unreachable: a generic
    /// description, no category constraint.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            description: "sketch of jewellery".to_string(),
            category: None,
        }
    }
}

/// A cleaned-up free-text query plus the product type detected in it
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CleanedQuery {
    pub cleaned_query: String,
    pub product_type: String,
}

/// Cross-modal embedding encoder. Text and images land in one shared
/// D-dimensional space, and every vector comes back unit-normalized.
///
/// The sketch variants handle their own image-domain work service-side:
/// `embed_sketch` standardizes and binarizes a user upload before
/// encoding, `embed_photo_as_sketch` renders a catalog photo into the
/// same sketch domain first. Both sides of sketch search therefore meet
/// in one visual domain - cross-domain similarity is meaningless otherwise.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>>;
    async fn embed_sketch(&self, image: &[u8]) -> Result<Vec<f32>>;
    async fn embed_photo_as_sketch(&self, image: &[u8]) -> Result<Vec<f32>>;
}

/// Vision-language service that turns a sketch into a search query
#[async_trait]
pub trait SketchInterpreter: Send + Sync {
    async fn interpret(&self, image: &[u8]) -> Result<SketchReading>;
}

/// Caption generator for catalog photographs
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, image: &[u8], category_hint: Option<&str>) -> Result<String>;
}

/// Cleans raw OCR'd or dictated text into a search query.
///
/// Implementations must honor the guardrail: any known product-type token
/// present in the raw text but missing from the cleaned query is appended
/// (see [`crate::clean::apply_category_guardrail`]).
#[async_trait]
pub trait TextCleaner: Send + Sync {
    async fn clean(&self, raw_text: &str) -> Result<CleanedQuery>;
}

/// Pairwise relevance model: one logit per (query, text) pair,
/// higher is more relevant
#[async_trait]
pub trait RerankModel: Send + Sync {
    async fn rerank_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>>;
}

/// Speech-to-text service
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}
