use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vitrine_api::{ApiContext, RestApi};
use vitrine_engine::{rebuild_state, EngineConfig, RerankStage, SearchEngine};
use vitrine_inference::{
    HttpCaptioner, HttpEmbedder, HttpReranker, HttpSketchInterpreter, HttpTextCleaner,
    HttpTranscriber, InferenceClient, InferenceConfig,
};
use vitrine_storage::ArtifactStore;

/// Multi-modal jewellery catalog search server
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Search a jewellery catalog by text, photo, sketch or voice", long_about = None)]
struct Args {
    /// Path to the catalog image tree (one subdirectory per category)
    #[arg(short, long, default_value = "./data/images")]
    data_dir: PathBuf,

    /// Path to the embedding artifact directory
    #[arg(long, default_value = "./indexes")]
    index_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Base URL of the inference sidecar (embeddings, rerank, chat)
    #[arg(long, default_value = "http://localhost:9090")]
    inference_url: String,

    /// Chat model used for captioning, sketch interpretation and cleanup
    #[arg(long, default_value = "gpt-4.1-nano")]
    chat_model: String,

    /// Per-request inference timeout in seconds
    #[arg(long, default_value_t = 20)]
    inference_timeout: u64,

    /// Item ids excluded from all search results
    #[arg(long = "deny", value_name = "ITEM_ID")]
    denylist: Vec<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vitrine v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog directory: {:?}", args.data_dir);
    info!("Index directory: {:?}", args.index_dir);
    info!("Inference sidecar: {}", args.inference_url);

    let inference = InferenceClient::new(InferenceConfig {
        base_url: args.inference_url.clone(),
        api_key: std::env::var("OPENAI_API_KEY").ok(),
        chat_model: args.chat_model.clone(),
        timeout: Duration::from_secs(args.inference_timeout),
    })?;

    let embedder = Arc::new(HttpEmbedder::new(inference.clone()));
    let interpreter = Arc::new(HttpSketchInterpreter::new(inference.clone()));
    let captioner = HttpCaptioner::new(inference.clone());
    let reranker = Arc::new(HttpReranker::new(inference.clone()));
    let cleaner = Arc::new(HttpTextCleaner::new(inference.clone()));
    let transcriber = Arc::new(HttpTranscriber::new(inference));

    let engine_config = EngineConfig {
        denylist: args.denylist.clone(),
        ..EngineConfig::default()
    };
    let engine = Arc::new(SearchEngine::new(
        embedder.clone(),
        interpreter,
        RerankStage::new(reranker),
        engine_config,
    )?);

    // Single-writer build phase: finish before serving queries
    let artifact_store = ArtifactStore::new(&args.index_dir)?;
    match rebuild_state(&args.data_dir, &artifact_store, embedder.as_ref(), &captioner).await {
        Ok(state) => {
            info!(items = state.catalog().len(), "catalog ready");
            engine.install(state);
        }
        Err(e) => {
            // Serve an empty catalog rather than refusing to start
            warn!(error = %e, "catalog rebuild failed, serving with no index");
        }
    }

    let context = Arc::new(ApiContext {
        engine,
        cleaner,
        transcriber,
        data_dir: args.data_dir.clone(),
    });

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(context, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("vitrine started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
