//! # vitrine Inference
//!
//! External model collaborators for the vitrine search engine. The engine
//! itself never loads a model; it talks to encoders, vision-language
//! services and rerankers through the async contracts defined here:
//!
//! - [`Embedder`] - cross-modal text/image embeddings in one shared space
//! - [`SketchInterpreter`] - sketch image to description + category
//! - [`Captioner`] - catalog photo captioning
//! - [`TextCleaner`] - OCR/dictation cleanup with the product-type guardrail
//! - [`RerankModel`] - pairwise (query, text) relevance logits
//! - [`Transcriber`] - speech to text
//!
//! HTTP implementations live in [`http`]; deterministic test doubles in
//! [`mock`]. Structured model output is parsed tolerantly ([`parse`]) -
//! malformed responses degrade to plain strings, they are never executed.

pub mod clean;
pub mod http;
pub mod mock;
pub mod parse;
pub mod traits;

pub use clean::apply_category_guardrail;
pub use http::{
    HttpCaptioner, HttpEmbedder, HttpReranker, HttpSketchInterpreter, HttpTextCleaner,
    HttpTranscriber, InferenceClient, InferenceConfig,
};
pub use parse::{parse_cleaned_query, parse_sketch_reading, strip_code_fences};
pub use traits::{
    Captioner, CleanedQuery, Embedder, RerankModel, SketchInterpreter, SketchReading,
    TextCleaner, Transcriber,
};
