// Integration tests for vitrine: the end-to-end search properties over
// a small engineered catalog with deterministic mock collaborators.
use std::collections::HashSet;
use std::sync::Arc;
use vitrine::prelude::*;
use vitrine::{catalog_fingerprint, ArtifactSet, ArtifactStore};
use vitrine_inference::mock::{MockEmbedder, MockRerankModel, MockSketchInterpreter};
use vitrine_inference::SketchReading;

const DIM: usize = 4;
const SKETCH_UPLOAD: &[u8] = b"user-sketch";

/// The three-item scenario catalog: r1 is nearest "gold ring" on both the
/// visual and the caption axis.
fn scenario_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("r1", "/data/ring/r1.jpg", "ring", "gold ring"),
        CatalogItem::new("r2", "/data/ring/r2.jpg", "ring", "silver ring"),
        CatalogItem::new("n1", "/data/necklace/n1.jpg", "necklace", "pearl necklace"),
    ]
}

fn scenario_state() -> EngineState {
    let photo = EmbeddingMatrix::from_rows(vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.5, 0.86, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
    ])
    .unwrap();
    // Sketch domain: n1 is the closest shape to the test sketch
    let sketch = EmbeddingMatrix::from_rows(vec![
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.6, 0.8, 0.0, 0.0],
        vec![1.0, 0.0, 0.0, 0.0],
    ])
    .unwrap();
    let captions = EmbeddingMatrix::from_rows(vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.6, 0.8, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
    ])
    .unwrap();
    vitrine::state_from_parts(scenario_items(), photo, sketch, captions).unwrap()
}

fn scenario_embedder() -> MockEmbedder {
    MockEmbedder::new(DIM)
        .with_text_vector("gold ring", vec![1.0, 0.0, 0.0, 0.0])
        .with_text_vector("heart shaped ring", vec![1.0, 0.0, 0.0, 0.0])
        .with_sketch_vector(SKETCH_UPLOAD, vec![1.0, 0.0, 0.0, 0.0])
}

fn engine(
    embedder: MockEmbedder,
    interpreter: MockSketchInterpreter,
    rerank: RerankStage,
    config: EngineConfig,
) -> SearchEngine {
    let engine = SearchEngine::new(Arc::new(embedder), Arc::new(interpreter), rerank, config)
        .expect("valid config");
    engine.install(scenario_state());
    engine
}

fn default_engine() -> SearchEngine {
    engine(
        scenario_embedder(),
        MockSketchInterpreter::scripted("heart shaped ring", Some(StrictCategory::Ring)),
        RerankStage::new(Arc::new(MockRerankModel::new())),
        EngineConfig::default(),
    )
}

fn sorted_ids(results: &[Candidate]) -> Vec<String> {
    let mut ids: Vec<String> = results.iter().map(|c| c.id().to_string()).collect();
    ids.sort();
    ids
}

#[test]
fn test_normalization_invariant() {
    // Engineered rows are normalized on ingest...
    let state = scenario_state();
    assert!(state.caption_embeddings().validate_normalized().is_none());

    // ...and so is every mock-encoded query vector
    let v = vitrine_inference::mock::seeded_unit_vector(b"free text query", 512);
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_end_to_end_gold_ring_scenario() {
    let engine = default_engine();
    let results = engine.search_by_text("gold ring", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id(), "r1");
    assert_eq!(results[0].item.category, "ring");
    assert_eq!(results[0].item.caption, "gold ring");
}

#[tokio::test]
async fn test_fusion_determinism() {
    let engine = default_engine();
    let first = engine.search_by_text("gold ring", 10).await.unwrap();
    let second = engine.search_by_text("gold ring", 10).await.unwrap();
    assert_eq!(sorted_ids(&first), sorted_ids(&second));
    assert_eq!(first[0].id(), second[0].id());
}

#[tokio::test]
async fn test_top_k_contract() {
    let engine = default_engine();
    let results = engine.search_by_text("gold ring", 5).await.unwrap();
    // Fewer than 5 only because the catalog has fewer than 5 items
    assert_eq!(results.len(), 3);
    let results = engine.search_by_text("gold ring", 1).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_denylist_scenario() {
    let config = EngineConfig {
        denylist: vec!["r1".to_string()],
        ..EngineConfig::default()
    };
    let engine = engine(
        scenario_embedder(),
        MockSketchInterpreter::scripted("heart shaped ring", None),
        RerankStage::new(Arc::new(MockRerankModel::new())),
        config,
    );
    let results = engine.search_by_text("gold ring", 10).await.unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|c| c.id() != "r1"));

    // The denylist holds on every retrieval path
    let (sketch_results, _) = engine.search_by_sketch(SKETCH_UPLOAD, 10).await.unwrap();
    assert!(sketch_results.iter().all(|c| c.id() != "r1"));
}

#[tokio::test]
async fn test_graceful_degradation_keeps_candidate_set() {
    let ranked_engine = default_engine();
    let degraded_engine = engine(
        scenario_embedder(),
        MockSketchInterpreter::scripted("heart shaped ring", None),
        RerankStage::new(Arc::new(MockRerankModel::failing())),
        EngineConfig::default(),
    );

    let ranked = ranked_engine.search_by_text("gold ring", 50).await.unwrap();
    let degraded = degraded_engine.search_by_text("gold ring", 50).await.unwrap();

    // Same fused candidate set, only the ordering signal differs
    assert_eq!(sorted_ids(&ranked), sorted_ids(&degraded));
    for pair in degraded.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        assert!(pair[0].pre_rerank_score() >= pair[1].pre_rerank_score());
    }
}

#[tokio::test]
async fn test_sketch_dedup_invariant() {
    let engine = default_engine();
    let (results, interpretation) = engine.search_by_sketch(SKETCH_UPLOAD, 50).await.unwrap();
    assert_eq!(interpretation, "heart shaped ring");
    let ids: HashSet<&str> = results.iter().map(|c| c.id()).collect();
    assert_eq!(ids.len(), results.len());
}

#[tokio::test]
async fn test_sketch_strict_filter_with_shape_safety_net() {
    let engine = default_engine();
    let (results, _) = engine.search_by_sketch(SKETCH_UPLOAD, 50).await.unwrap();

    // n1 was cut from the text branch by the strict ring filter, so it can
    // only carry shape provenance.
    let n1 = results.iter().find(|c| c.id() == "n1").unwrap();
    let debug = n1.debug.as_deref().unwrap();
    assert!(debug.contains("Shape:"));
    assert!(!debug.contains("Src:"));

    // Every candidate advertises the interpretation it came from
    assert!(results
        .iter()
        .all(|c| c.interpretation.as_deref() == Some("heart shaped ring")));
}

#[tokio::test]
async fn test_sketch_interpreter_outage_still_ranks() {
    let engine = engine(
        scenario_embedder(),
        MockSketchInterpreter::failing(),
        RerankStage::new(Arc::new(MockRerankModel::new())),
        EngineConfig::default(),
    );
    let (results, interpretation) = engine.search_by_sketch(SKETCH_UPLOAD, 10).await.unwrap();
    assert_eq!(interpretation, "sketch of jewellery");
    assert!(!results.is_empty());
}

#[tokio::test]
async fn test_unloaded_engine_answers_empty() {
    let engine = SearchEngine::new(
        Arc::new(scenario_embedder()),
        Arc::new(MockSketchInterpreter::scripted("x", None)),
        RerankStage::disabled(),
        EngineConfig::default(),
    )
    .unwrap();
    assert!(engine.search_by_text("gold ring", 5).await.unwrap().is_empty());
    let (results, _) = engine.search_by_sketch(SKETCH_UPLOAD, 5).await.unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_artifact_round_trip_restores_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();

    let items = scenario_items();
    let rows = vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
    ];
    let artifacts = ArtifactSet {
        fingerprint: catalog_fingerprint(&items),
        items,
        photo: EmbeddingMatrix::from_rows(rows.clone()).unwrap(),
        sketch: EmbeddingMatrix::from_rows(rows.clone()).unwrap(),
        captions: EmbeddingMatrix::from_rows(rows).unwrap(),
    };
    store.save(&artifacts).unwrap();

    let restored = store.load().unwrap().unwrap();
    let state = EngineState::from_artifacts(restored).unwrap();
    assert_eq!(state.catalog().len(), 3);
    assert_eq!(state.photo_index().len(), 3);
}

#[tokio::test]
async fn test_interpreter_reading_shapes_strict_filter() {
    // A reading outside the closed vocabulary leaves the text branch
    // unfiltered: the necklace may then surface through text too.
    let engine = engine(
        scenario_embedder(),
        MockSketchInterpreter::scripted("heart shaped ring", None),
        RerankStage::new(Arc::new(MockRerankModel::new())),
        EngineConfig::default(),
    );
    let (results, _) = engine.search_by_sketch(SKETCH_UPLOAD, 50).await.unwrap();
    let n1 = results.iter().find(|c| c.id() == "n1").unwrap();
    assert!(n1.debug.as_deref().unwrap().contains("Src:"));
}

#[test]
fn test_sketch_reading_fallback_shape() {
    let fallback = SketchReading::fallback();
    assert_eq!(fallback.description, "sketch of jewellery");
    assert!(fallback.category.is_none());
}
