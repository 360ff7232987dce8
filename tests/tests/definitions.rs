use application::definition_service::{DefinitionService, DEFAULT_TOP_K, NO_DEFINITION};
use shared::types::MedMateError;
use std::sync::Arc;
use tests::{catalog_embedder, raw_match, record, resources, seeded_catalog, ScriptedIndex, StubEmbedder};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn definitions_preserve_order_duplicates_and_misses() {
    let aspirin_vec = vec![0.3, 0.3, 0.3, 0.1];
    let embedder = Arc::new(StubEmbedder::new().with("aspirin", aspirin_vec.clone()));
    let index = Arc::new(ScriptedIndex::new().on_vector(
        aspirin_vec,
        vec![raw_match(
            "asa",
            Some(0.93),
            &record("aspirin", "Salicylates", "X", "D", "N"),
        )],
    ));
    let service = DefinitionService::new(resources(embedder.clone(), index));

    let input = names(&["Aspirin", "Unobtainium", "aspirin"]);
    let defs = service.get_definitions(&input, DEFAULT_TOP_K).await.unwrap();

    assert_eq!(defs.len(), input.len());
    let returned: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(returned, vec!["Aspirin", "Unobtainium", "aspirin"]);
    assert!(defs[0].definition.starts_with("aspirin belongs to the drug class Salicylates."));
    assert_eq!(defs[1].definition, NO_DEFINITION);
    assert_eq!(defs[2].definition, defs[0].definition);
    assert_eq!(embedder.calls(), 3);
}

#[tokio::test]
async fn definitions_from_local_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let service = DefinitionService::new(resources(
        Arc::new(catalog_embedder()),
        Arc::new(seeded_catalog(&dir)),
    ));

    let defs = service
        .get_definitions(&names(&["Atorvastatin", "Lipitor"]), DEFAULT_TOP_K)
        .await
        .unwrap();

    let expected = "atorvastatin belongs to the drug class Statins.\n\
                    It is available under the following brand names: Lipitor.\n\
                    This medication is classified as Rx, with a user-reported effectiveness rating of 6.8/10.\n\
                    Pregnancy category: X — High risk of fetal abnormalities; should not be used.\n\
                    CSA Schedule: N — Not a controlled substance.\n\
                    Alcohol Interaction Warning: X";
    assert_eq!(defs[0].definition, expected);
    assert_eq!(defs[1].name, "Lipitor");
    assert_eq!(defs[1].definition, expected);
}

#[tokio::test]
async fn defaults_fill_sparse_metadata() {
    let sparse = domain::models::MedicationRecord {
        generic_name: Some("mystery".into()),
        ..Default::default()
    };
    let index = Arc::new(ScriptedIndex::new().on_any_vector(vec![raw_match("m", Some(0.4), &sparse)]));
    let service = DefinitionService::new(resources(Arc::new(StubEmbedder::new()), index));

    let defs = service.get_definitions(&names(&["Mystery"]), 1).await.unwrap();
    let text = &defs[0].definition;
    assert!(text.contains("drug class Unknown class."));
    assert!(text.contains("Pregnancy category: N — Not classified."));
    assert!(text.contains("CSA Schedule: U — Unknown CSA schedule."));
    assert!(text.contains("rating of Not rated/10."));
}

#[tokio::test]
async fn empty_name_list_gives_empty_output() {
    let embedder = Arc::new(StubEmbedder::new());
    let service = DefinitionService::new(resources(embedder.clone(), Arc::new(ScriptedIndex::new())));
    assert!(service.get_definitions(&[], DEFAULT_TOP_K).await.unwrap().is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn upstream_failure_fails_the_batch() {
    let service = DefinitionService::new(resources(
        Arc::new(StubEmbedder::new()),
        Arc::new(ScriptedIndex::new().failing_vector()),
    ));
    let err = service
        .get_definitions(&names(&["aspirin", "ibuprofen"]), DEFAULT_TOP_K)
        .await
        .unwrap_err();
    assert!(matches!(err, MedMateError::Index(_)));
}

#[tokio::test]
async fn top_k_is_forwarded_and_zero_rejected() {
    let index = Arc::new(ScriptedIndex::new());
    let service = DefinitionService::new(resources(Arc::new(StubEmbedder::new()), index.clone()));

    service.get_definitions(&names(&["aspirin"]), 3).await.unwrap();
    assert_eq!(index.queries()[0].top_k, 3);

    let err = service.get_definitions(&names(&["aspirin"]), 0).await.unwrap_err();
    assert!(matches!(err, MedMateError::InvalidQuery(_)));
}
