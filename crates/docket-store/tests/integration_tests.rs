//! Integration tests for the SQLite store

use docket_domain::traits::{FactStore, SegmentStore};
use docket_domain::{
    CaseId, DocumentType, EntityKind, ExtractedEntity, Fact, FactCategory, FactId, IdRange,
    PageRange, ProductionId, Segment, SegmentId,
};
use docket_store::{EmbeddingModel, HashEmbedder, SqliteStore, StoreError, DEFAULT_DIMENSION};

fn segment(case_id: CaseId, production_id: ProductionId, ordinal: u32, pages: PageRange) -> Segment {
    Segment {
        id: SegmentId::new(),
        case_id,
        production_id,
        ordinal,
        pages,
        document_type: DocumentType::Contract,
        title: format!("Segment {}", ordinal),
        id_range: IdRange {
            first: format!("ACME-{:06}", pages.start),
            last: format!("ACME-{:06}", pages.end),
        },
        confidence: 0.9,
    }
}

fn fact(case_id: CaseId, segment_id: SegmentId, text: &str) -> Fact {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    Fact {
        id: FactId::new(),
        case_id,
        segment_id,
        text: text.to_string(),
        category: FactCategory::Assertion,
        confidence: 0.8,
        source_span: (0, text.len()),
        entities: vec![ExtractedEntity {
            kind: EntityKind::Date,
            text: "March 3, 2019".to_string(),
        }],
        embedding: embedder.embed(text).unwrap(),
    }
}

#[test]
fn test_segment_round_trip() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case = CaseId::new();
    let production = ProductionId::new();

    let original = segment(case, production, 0, PageRange::new(1, 8).unwrap());
    let id = store.persist_segment(case, original.clone()).unwrap();
    assert_eq!(id, original.id);

    let loaded = store.get_segment(case, id).unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn test_segments_for_production_ordered() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case = CaseId::new();
    let production = ProductionId::new();

    // Insert out of ordinal order
    for (ordinal, range) in [(2, (21, 30)), (0, (1, 8)), (1, (9, 20))] {
        let pages = PageRange::new(range.0, range.1).unwrap();
        store
            .persist_segment(case, segment(case, production, ordinal, pages))
            .unwrap();
    }

    let segments = store.segments_for_production(case, production).unwrap();
    let ordinals: Vec<u32> = segments.iter().map(|s| s.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2]);
}

#[test]
fn test_persist_segment_refuses_foreign_case() {
    let mut store = SqliteStore::in_memory().unwrap();
    let owner = CaseId::new();
    let intruder = CaseId::new();

    let seg = segment(owner, ProductionId::new(), 0, PageRange::new(1, 5).unwrap());
    let result = store.persist_segment(intruder, seg);
    assert!(matches!(result, Err(StoreError::IsolationViolation { .. })));
}

#[test]
fn test_get_segment_scoped_to_case() {
    let mut store = SqliteStore::in_memory().unwrap();
    let owner = CaseId::new();
    let other = CaseId::new();

    let seg = segment(owner, ProductionId::new(), 0, PageRange::new(1, 5).unwrap());
    let id = store.persist_segment(owner, seg).unwrap();

    // The row exists, but not for another case
    assert!(store.get_segment(owner, id).unwrap().is_some());
    assert!(store.get_segment(other, id).unwrap().is_none());
}

#[test]
fn test_fact_round_trip() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case = CaseId::new();
    let segment_id = SegmentId::new();

    let original = fact(case, segment_id, "The contract was signed on March 3, 2019.");
    store.persist_fact(case, original.clone()).unwrap();

    let facts = store.facts_for_segment(case, segment_id).unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0], original);
}

#[test]
fn test_persist_fact_refuses_foreign_case() {
    let mut store = SqliteStore::in_memory().unwrap();
    let owner = CaseId::new();
    let intruder = CaseId::new();

    let f = fact(owner, SegmentId::new(), "payment was due on delivery");
    let result = store.persist_fact(intruder, f);
    assert!(matches!(result, Err(StoreError::IsolationViolation { .. })));
}

#[test]
fn test_persist_fact_rejects_invalid_fact() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case = CaseId::new();

    let mut bad = fact(case, SegmentId::new(), "the invoice was disputed");
    bad.confidence = 1.5;
    let result = store.persist_fact(case, bad);
    assert!(matches!(result, Err(StoreError::InvalidData(_))));

    let mut empty = fact(case, SegmentId::new(), "placeholder");
    empty.text = "   ".to_string();
    let result = store.persist_fact(case, empty);
    assert!(matches!(result, Err(StoreError::InvalidData(_))));

    // Nothing was written
    assert!(store.facts_for_case(case).unwrap().is_empty());
}

#[test]
fn test_facts_for_case_excludes_other_cases() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case_a = CaseId::new();
    let case_b = CaseId::new();

    store
        .persist_fact(case_a, fact(case_a, SegmentId::new(), "fact in case a"))
        .unwrap();
    store
        .persist_fact(case_b, fact(case_b, SegmentId::new(), "fact in case b"))
        .unwrap();

    let facts_a = store.facts_for_case(case_a).unwrap();
    assert_eq!(facts_a.len(), 1);
    assert_eq!(facts_a[0].text, "fact in case a");
}

#[test]
fn test_search_similar_finds_identical_text() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case = CaseId::new();
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);

    let stored = fact(case, SegmentId::new(), "the invoice was paid late");
    store.persist_fact(case, stored.clone()).unwrap();
    store
        .persist_fact(case, fact(case, SegmentId::new(), "entirely unrelated statement"))
        .unwrap();

    let query = embedder.embed("the invoice was paid late").unwrap();
    let results = store.search_similar(case, &query, 0.95, 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.id, stored.id);
    assert!(results[0].1 > 0.99);
}

#[test]
fn test_search_similar_never_crosses_cases() {
    let mut store = SqliteStore::in_memory().unwrap();
    let case_a = CaseId::new();
    let case_b = CaseId::new();
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);

    store
        .persist_fact(case_a, fact(case_a, SegmentId::new(), "shared wording"))
        .unwrap();

    // Same text exists in case A, but case B's search space is empty
    let query = embedder.embed("shared wording").unwrap();
    let results = store.search_similar(case_b, &query, 0.0, 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_indexes_rebuilt_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docket.db");
    let case = CaseId::new();
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);

    {
        let mut store = SqliteStore::new(&path, DEFAULT_DIMENSION).unwrap();
        store
            .persist_fact(case, fact(case, SegmentId::new(), "durable fact"))
            .unwrap();
    }

    let store = SqliteStore::new(&path, DEFAULT_DIMENSION).unwrap();
    let query = embedder.embed("durable fact").unwrap();
    let results = store.search_similar(case, &query, 0.95, 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.text, "durable fact");
}
