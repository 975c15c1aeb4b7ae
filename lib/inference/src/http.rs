//! HTTP-backed collaborator implementations.
//!
//! Embedding, reranking and transcription talk to a model sidecar with a
//! small JSON API; captioning, sketch interpretation and query cleanup go
//! through an OpenAI-compatible chat endpoint with vision support. Every
//! request carries the configured timeout so one slow dependency cannot
//! stall a search indefinitely.

use crate::clean::apply_category_guardrail;
use crate::parse::{parse_cleaned_query, parse_sketch_reading, strip_code_fences};
use crate::traits::{
    Captioner, CleanedQuery, Embedder, RerankModel, SketchInterpreter, SketchReading,
    TextCleaner, Transcriber,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use vitrine_core::{Error, Result};

const SKETCH_PROMPT: &str = "\
Analyze this sketch of a jewellery piece.

MANDATORY TASK: You MUST classify it as either a \"Necklace\" or a \"Ring\".

1. Identify the object: ONLY \"Necklace\" or \"Ring\". If unclear, pick the most likely one.
2. Describe the shape/design (Heart, Flower, Geometric) and visual features.

Respond in JSON:
{
    \"type\": \"Ring\" or \"Necklace\",
    \"description\": \"visual search query string e.g. heart shaped diamond ring\"
}";

const CLEANUP_PROMPT: &str = "\
You are a jewellery search assistant.
The user provided this raw text read from a handwritten note: \"{raw_text}\"

TASK: Clean up the text for a search engine.
CRITICAL RULE: YOU MUST KEEP THE PRODUCT TYPE (Ring, Necklace, Earring, etc) if it appears in the text.

Respond in JSON:
{
    \"product_type\": \"ring\" or \"necklace\" or \"jewellery\",
    \"cleaned_query\": \"visual keywords + product type\"
}";

/// Connection settings shared by every HTTP collaborator
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the model sidecar and chat endpoint
    pub base_url: String,
    /// Bearer token for the chat endpoint, if it needs one
    pub api_key: Option<String>,
    /// Chat model used for vision and cleanup calls
    pub chat_model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".to_string(),
            api_key: None,
            chat_model: "gpt-4.1-nano".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Shared reqwest client for all collaborator calls
pub struct InferenceClient {
    http: reqwest::Client,
    config: InferenceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Arc<Self>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Inference(e.to_string()))?;
        Ok(Arc::new(Self { http, config }))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::Inference(format!("{} request failed: {}", path, e)))?;
        if !response.status().is_success() {
            return Err(Error::Inference(format!(
                "{} returned status {}",
                path,
                response.status()
            )));
        }
        response
            .json::<R>()
            .await
            .map_err(|e| Error::Inference(format!("{} returned invalid body: {}", path, e)))
    }

    /// One chat turn, optionally with an attached image, returning the
    /// assistant message content.
    async fn chat(&self, prompt: &str, image: Option<&[u8]>, max_tokens: u32) -> Result<String> {
        let content = match image {
            Some(bytes) => {
                let encoded = BASE64.encode(bytes);
                json!([
                    {"type": "text", "text": prompt},
                    {"type": "image_url",
                     "image_url": {"url": format!("data:image/jpeg;base64,{}", encoded)}}
                ])
            }
            None => json!(prompt),
        };
        let body = json!({
            "model": self.config.chat_model,
            "messages": [{"role": "user", "content": content}],
            "max_tokens": max_tokens,
            "temperature": 0,
        });

        let response: ChatResponse = self.post_json("/v1/chat/completions", &body).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Inference("chat endpoint returned no choices".to_string()))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct EmbedTextResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct EmbedImageResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// CLIP-style encoder over the sidecar's embed endpoints
pub struct HttpEmbedder {
    client: Arc<InferenceClient>,
}

impl HttpEmbedder {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    async fn embed_image_domain(&self, image: &[u8], domain: &str) -> Result<Vec<f32>> {
        let body = json!({
            "image": BASE64.encode(image),
            "domain": domain,
        });
        let response: EmbedImageResponse = self.client.post_json("/embed/image", &body).await?;
        Ok(response.embedding)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = json!({ "texts": texts });
        let response: EmbedTextResponse = self.client.post_json("/embed/text", &body).await?;
        if response.embeddings.len() != texts.len() {
            return Err(Error::Inference(format!(
                "embed endpoint returned {} vectors for {} texts",
                response.embeddings.len(),
                texts.len()
            )));
        }
        Ok(response.embeddings)
    }

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        self.embed_image_domain(image, "photo").await
    }

    async fn embed_sketch(&self, image: &[u8]) -> Result<Vec<f32>> {
        self.embed_image_domain(image, "sketch").await
    }

    async fn embed_photo_as_sketch(&self, image: &[u8]) -> Result<Vec<f32>> {
        self.embed_image_domain(image, "photo_as_sketch").await
    }
}

/// Vision-LLM sketch interpreter
pub struct HttpSketchInterpreter {
    client: Arc<InferenceClient>,
}

impl HttpSketchInterpreter {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SketchInterpreter for HttpSketchInterpreter {
    async fn interpret(&self, image: &[u8]) -> Result<SketchReading> {
        let content = self.client.chat(SKETCH_PROMPT, Some(image), 100).await?;
        debug!(raw = %content, "sketch interpreter response");
        Ok(parse_sketch_reading(&content))
    }
}

/// Vision-LLM caption generator for catalog photos
pub struct HttpCaptioner {
    client: Arc<InferenceClient>,
}

impl HttpCaptioner {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Captioner for HttpCaptioner {
    async fn caption(&self, image: &[u8], category_hint: Option<&str>) -> Result<String> {
        let prompt = match category_hint {
            Some(category) => format!(
                "Describe this photograph of a {} for a product catalog in one short sentence.",
                category
            ),
            None => {
                "Describe this jewellery photograph for a product catalog in one short sentence."
                    .to_string()
            }
        };
        let content = self.client.chat(&prompt, Some(image), 60).await?;
        Ok(strip_code_fences(&content).to_string())
    }
}

/// LLM query cleaner with the product-type guardrail applied
pub struct HttpTextCleaner {
    client: Arc<InferenceClient>,
}

impl HttpTextCleaner {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextCleaner for HttpTextCleaner {
    async fn clean(&self, raw_text: &str) -> Result<CleanedQuery> {
        let prompt = CLEANUP_PROMPT.replace("{raw_text}", raw_text);
        let content = self.client.chat(&prompt, None, 80).await?;
        let mut cleaned = parse_cleaned_query(&content, raw_text);
        apply_category_guardrail(raw_text, &mut cleaned);
        Ok(cleaned)
    }
}

/// Cross-encoder reranker over the sidecar's rerank endpoint
pub struct HttpReranker {
    client: Arc<InferenceClient>,
}

impl HttpReranker {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RerankModel for HttpReranker {
    async fn rerank_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>> {
        let body = json!({ "query": query, "texts": texts });
        let response: RerankResponse = self.client.post_json("/rerank", &body).await?;
        if response.scores.len() != texts.len() {
            return Err(Error::Inference(format!(
                "rerank endpoint returned {} scores for {} texts",
                response.scores.len(),
                texts.len()
            )));
        }
        Ok(response.scores)
    }
}

/// Speech-to-text over the sidecar's transcribe endpoint
pub struct HttpTranscriber {
    client: Arc<InferenceClient>,
}

impl HttpTranscriber {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let body = json!({ "audio": BASE64.encode(audio) });
        let response: TranscribeResponse = self.client.post_json("/transcribe", &body).await?;
        Ok(response.text.trim().to_string())
    }
}
