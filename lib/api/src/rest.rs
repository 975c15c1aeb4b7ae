use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use vitrine_core::Candidate;
use vitrine_engine::SearchEngine;
use vitrine_inference::{CleanedQuery, TextCleaner, Transcriber};

#[derive(Deserialize)]
struct TextSearchRequest {
    query: String,
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct TextSearchResponse {
    query: String,
    results: Vec<Candidate>,
}

#[derive(Serialize)]
struct SketchSearchResponse {
    interpretation: String,
    results: Vec<Candidate>,
}

#[derive(Deserialize)]
struct CleanQueryRequest {
    raw_text: String,
}

#[derive(Serialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    index_loaded: bool,
    catalog_items: usize,
}

/// Everything the route handlers need, shared across workers
pub struct ApiContext {
    pub engine: Arc<SearchEngine>,
    pub cleaner: Arc<dyn TextCleaner>,
    pub transcriber: Arc<dyn Transcriber>,
    pub data_dir: PathBuf,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(context: Arc<ApiContext>, port: u16) -> std::io::Result<()> {
        info!(port, "starting REST API");
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(context.clone()))
                .route("/healthz", web::get().to(health))
                .route("/search/text", web::post().to(search_text))
                .route("/search/image", web::post().to(search_image))
                .route("/search/sketch", web::post().to(search_sketch))
                .route("/query/clean", web::post().to(clean_query))
                .route("/voice/transcribe", web::post().to(transcribe_voice))
                .service(actix_files::Files::new("/data", context.data_dir.clone()))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> HttpResponse {
    error!(error = %e, "{} failed", context);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": format!("{}: {}", context, e)
    }))
}

/// Collect the bytes of the first file field in a multipart upload
async fn read_upload(mut payload: Multipart) -> ActixResult<Vec<u8>> {
    let mut bytes = Vec::new();
    if let Some(mut field) = payload.try_next().await? {
        while let Some(chunk) = field.try_next().await? {
            bytes.extend_from_slice(&chunk);
        }
    }
    Ok(bytes)
}

async fn health(context: web::Data<Arc<ApiContext>>) -> ActixResult<HttpResponse> {
    let state = context.engine.state();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        index_loaded: state.is_some(),
        catalog_items: state.map_or(0, |s| s.catalog().len()),
    }))
}

async fn search_text(
    context: web::Data<Arc<ApiContext>>,
    req: web::Json<TextSearchRequest>,
) -> ActixResult<HttpResponse> {
    let top_k = req.top_k.unwrap_or(context.engine.config().default_top_k);
    match context.engine.search_by_text(&req.query, top_k).await {
        Ok(results) => Ok(HttpResponse::Ok().json(TextSearchResponse {
            query: req.into_inner().query,
            results,
        })),
        Err(e) => Ok(internal_error("text search", e)),
    }
}

async fn search_image(
    context: web::Data<Arc<ApiContext>>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let image = read_upload(payload).await?;
    if image.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "no image uploaded"
        })));
    }
    let top_k = context.engine.config().default_top_k;
    match context.engine.search_by_image(&image, top_k).await {
        Ok(results) => Ok(HttpResponse::Ok().json(results)),
        Err(e) => Ok(internal_error("image search", e)),
    }
}

async fn search_sketch(
    context: web::Data<Arc<ApiContext>>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let sketch = read_upload(payload).await?;
    if sketch.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "no sketch uploaded"
        })));
    }
    let top_k = context.engine.config().default_top_k;
    match context.engine.search_by_sketch(&sketch, top_k).await {
        Ok((results, interpretation)) => Ok(HttpResponse::Ok().json(SketchSearchResponse {
            interpretation,
            results,
        })),
        Err(e) => Ok(internal_error("sketch search", e)),
    }
}

async fn clean_query(
    context: web::Data<Arc<ApiContext>>,
    req: web::Json<CleanQueryRequest>,
) -> ActixResult<HttpResponse> {
    let raw_text = req.into_inner().raw_text;
    // Cleaner outage degrades to the raw text, never an error
    let cleaned = match context.cleaner.clean(&raw_text).await {
        Ok(cleaned) => cleaned,
        Err(e) => {
            tracing::warn!(error = %e, "text cleaner unavailable, passing raw text through");
            CleanedQuery {
                cleaned_query: raw_text,
                product_type: "jewellery".to_string(),
            }
        }
    };
    Ok(HttpResponse::Ok().json(cleaned))
}

async fn transcribe_voice(
    context: web::Data<Arc<ApiContext>>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let audio = read_upload(payload).await?;
    if audio.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "no audio uploaded"
        })));
    }
    match context.transcriber.transcribe(&audio).await {
        Ok(text) => Ok(HttpResponse::Ok().json(TranscribeResponse { text })),
        Err(e) => Ok(internal_error("transcription", e)),
    }
}
