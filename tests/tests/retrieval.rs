use application::retrieval_service::{RetrievalService, DEFAULT_TOP_K};
use domain::models::QueryOutcome;
use serde_json::json;
use shared::types::MedMateError;
use std::sync::Arc;
use tests::{
    catalog_embedder, raw_match, record, resources, seeded_catalog, ScriptedIndex, StubEmbedder,
    CONTRACEPTIVE, NAMESPACE,
};

fn is_rounded_to_3(score: f64) -> bool {
    ((score * 1000.0).round() / 1000.0 - score).abs() < 1e-12
}

#[tokio::test]
async fn exact_key_returns_exact_mode_without_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = Arc::new(catalog_embedder());
    let service = RetrievalService::new(resources(embedder.clone(), Arc::new(seeded_catalog(&dir))));

    let outcome = service
        .retrieve("  Ethinyl Estradiol and Norgestimate (Oral Route) ", DEFAULT_TOP_K)
        .await
        .unwrap();

    assert_eq!(outcome.mode(), "exact");
    let results = outcome.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, None);
    assert_eq!(results[0].generic_name, CONTRACEPTIVE);
    assert_eq!(results[0].drug_class, "Contraceptives");
    assert_eq!(results[0].alcohol, "X");
    assert_eq!(results[0].pregnancy, "X");
    assert_eq!(results[0].csa, "N");
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn exact_outcome_json_has_no_score_field() {
    let dir = tempfile::tempdir().unwrap();
    let service = RetrievalService::new(resources(
        Arc::new(catalog_embedder()),
        Arc::new(seeded_catalog(&dir)),
    ));

    let outcome = service.retrieve(CONTRACEPTIVE, DEFAULT_TOP_K).await.unwrap();
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        value,
        json!({
            "mode": "exact",
            "results": [{
                "generic_name": CONTRACEPTIVE,
                "drug_class": "Contraceptives",
                "alcohol": "X",
                "pregnancy": "X",
                "csa": "N",
            }]
        })
    );
}

#[tokio::test]
async fn unknown_generic_name_falls_back_to_semantic() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = Arc::new(catalog_embedder());
    let service = RetrievalService::new(resources(embedder.clone(), Arc::new(seeded_catalog(&dir))));

    let outcome = service.retrieve("Acetaminophen", DEFAULT_TOP_K).await.unwrap();

    assert_eq!(outcome.mode(), "semantic");
    let results = outcome.results();
    assert!(!results.is_empty());
    assert!(results.len() <= DEFAULT_TOP_K);
    assert_eq!(results[0].generic_name, "acetaminophen and codeine");
    assert_eq!(results[1].generic_name, "acetaminophen and hydrocodone");
    for row in results {
        let score = row.score.expect("semantic rows are scored");
        assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        assert!(is_rounded_to_3(score), "score {score} not rounded");
    }
    assert_eq!(embedder.seen(), vec!["acetaminophen".to_string()]);

    let value = serde_json::to_value(&outcome).unwrap();
    let first = &value["results"][0];
    for key in ["score", "generic_name", "drug_class", "alcohol", "pregnancy", "csa"] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn semantic_results_are_capped_at_top_k() {
    let dir = tempfile::tempdir().unwrap();
    let service = RetrievalService::new(resources(
        Arc::new(catalog_embedder()),
        Arc::new(seeded_catalog(&dir)),
    ));

    let outcome = service.retrieve("acetaminophen", DEFAULT_TOP_K).await.unwrap();
    assert_eq!(outcome.results().len(), DEFAULT_TOP_K);

    let outcome = service.retrieve("acetaminophen", 3).await.unwrap();
    assert_eq!(outcome.results().len(), 3);
}

#[tokio::test]
async fn oversized_index_response_is_truncated() {
    let row = record("naproxen", "NSAIDs", "X", "C", "N");
    let index = Arc::new(ScriptedIndex::new().on_any_vector(
        (0..5)
            .map(|i| raw_match(&format!("m{i}"), Some(0.9 - i as f32 * 0.1), &row))
            .collect(),
    ));
    let service = RetrievalService::new(resources(Arc::new(StubEmbedder::new()), index));

    let outcome = service.retrieve("naproxen sodium", 2).await.unwrap();
    assert_eq!(outcome.results().len(), 2);
}

#[tokio::test]
async fn exact_phase_sends_filter_only_lookup() {
    let index = Arc::new(ScriptedIndex::new());
    let service = RetrievalService::new(resources(Arc::new(StubEmbedder::new()), index.clone()));

    service.retrieve("  IBUPROFEN ", 5).await.unwrap();

    let queries = index.queries();
    assert_eq!(queries.len(), 2);
    let exact = &queries[0];
    assert!(exact.vector.is_none());
    assert_eq!(exact.top_k, 1);
    assert_eq!(exact.namespace, NAMESPACE);
    let filter = exact.filter.as_ref().unwrap();
    assert_eq!(filter.field, "generic_name");
    assert_eq!(filter.value, json!("ibuprofen"));

    let semantic = &queries[1];
    assert!(semantic.vector.is_some());
    assert!(semantic.filter.is_none());
    assert_eq!(semantic.top_k, 5);
}

#[tokio::test]
async fn no_match_in_either_phase_is_empty_semantic() {
    let service = RetrievalService::new(resources(
        Arc::new(StubEmbedder::new()),
        Arc::new(ScriptedIndex::new()),
    ));

    let outcome = service.retrieve("unobtainium", DEFAULT_TOP_K).await.unwrap();
    assert_eq!(outcome, QueryOutcome::Semantic(Vec::new()));
}

#[tokio::test]
async fn exact_phase_failure_skips_fallback() {
    let embedder = Arc::new(StubEmbedder::new());
    let index = Arc::new(ScriptedIndex::new().failing_filter());
    let service = RetrievalService::new(resources(embedder.clone(), index.clone()));

    let err = service.retrieve("atorvastatin", DEFAULT_TOP_K).await.unwrap_err();

    assert!(matches!(err, MedMateError::Index(_)));
    assert!(err.is_upstream());
    assert_eq!(embedder.calls(), 0);
    assert_eq!(index.queries().len(), 1);
}

#[tokio::test]
async fn semantic_phase_failures_propagate() {
    let service = RetrievalService::new(resources(
        Arc::new(StubEmbedder::failing()),
        Arc::new(ScriptedIndex::new()),
    ));
    let err = service.retrieve("atorvastatin", DEFAULT_TOP_K).await.unwrap_err();
    assert!(matches!(err, MedMateError::Embedding(_)));

    let service = RetrievalService::new(resources(
        Arc::new(StubEmbedder::new()),
        Arc::new(ScriptedIndex::new().failing_vector()),
    ));
    let err = service.retrieve("atorvastatin", DEFAULT_TOP_K).await.unwrap_err();
    assert!(matches!(err, MedMateError::Index(_)));
}

#[tokio::test]
async fn malformed_semantic_match_is_rejected() {
    let mut incomplete = record("warfarin", "Coumarins", "X", "X", "N");
    incomplete.csa = None;
    let index = Arc::new(ScriptedIndex::new().on_any_vector(vec![raw_match("w", Some(0.7), &incomplete)]));
    let service = RetrievalService::new(resources(Arc::new(StubEmbedder::new()), index));

    let err = service.retrieve("warfarin sodium", DEFAULT_TOP_K).await.unwrap_err();
    assert!(matches!(err, MedMateError::MalformedMatch { field: "csa", .. }));
}

#[tokio::test]
async fn blank_query_and_zero_top_k_are_rejected() {
    let embedder = Arc::new(StubEmbedder::new());
    let index = Arc::new(ScriptedIndex::new());
    let service = RetrievalService::new(resources(embedder.clone(), index.clone()));

    let err = service.retrieve("   ", DEFAULT_TOP_K).await.unwrap_err();
    assert!(matches!(err, MedMateError::InvalidQuery(_)));

    let err = service.retrieve("ibuprofen", 0).await.unwrap_err();
    assert!(matches!(err, MedMateError::InvalidQuery(_)));

    assert_eq!(embedder.calls(), 0);
    assert!(index.queries().is_empty());
}
