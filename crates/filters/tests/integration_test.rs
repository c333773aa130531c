//! Integration tests for compile + apply.
//!
//! These tests check the behavioural guarantees of the filter layer against
//! a realistic freelancer snapshot.

use filters::{FilterEngine, FilterState, Predicate, SortOrder, apply, compile};
use records::{Record, RecordKind, RecordStore};

fn freelancer(key: &str) -> Record {
    Record::new(key, RecordKind::Freelancer)
}

fn create_test_store() -> RecordStore {
    let mut store = RecordStore::new();
    store
        .load(vec![
            freelancer("f1")
                .with_name("Maya Patel")
                .with_title("Frontend Engineer")
                .with_amount(20.0)
                .with_category("intermediate")
                .with_tags(["React", "TypeScript"])
                .with_location(Some("Mumbai"), Some("India")),
            freelancer("f2")
                .with_name("Tom Becker")
                .with_title("Product Designer")
                .with_category("expert")
                .with_tags(["Design", "Figma"])
                .with_location(Some("Berlin"), Some("Germany")),
            freelancer("f3")
                .with_name("Ana Souza")
                .with_description("Backend services in Rust and Go")
                .with_amount(85.0)
                .with_category("expert")
                .with_tags(["Rust", "Go", "PostgreSQL"])
                .with_location(None, Some("Brazil")),
            freelancer("f4")
                .with_name("Kenji Sato")
                .with_title("Mobile Developer")
                .with_amount(45.0)
                .with_category("beginner")
                .with_tags(["React Native", "Swift"]),
        ])
        .unwrap();
    store
}

fn keys(store: &RecordStore, state: &FilterState) -> Vec<String> {
    apply(store, &compile(state), &SortOrder::fetch_order())
        .keys()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `a` appears in `b` in the same relative order
fn is_subsequence(a: &[String], b: &[String]) -> bool {
    let mut rest = b.iter();
    a.iter().all(|item| rest.any(|candidate| candidate == item))
}

#[test]
fn test_default_state_is_identity() {
    let store = create_test_store();
    let view = apply(&store, &compile(&FilterState::default()), &SortOrder::fetch_order());

    assert_eq!(view.keys(), vec!["f1", "f2", "f3", "f4"]);
}

#[test]
fn test_compile_is_idempotent() {
    let store = create_test_store();
    let state = FilterState::new().with_search("re").with_min(10.0);

    let once = apply(&store, &compile(&state), &SortOrder::fetch_order());
    let twice = apply(&store, &compile(&state.clone()), &SortOrder::fetch_order());
    let again = apply(&store, &compile(&state), &SortOrder::fetch_order());

    assert_eq!(once, twice);
    assert_eq!(once, again);
}

#[test]
fn test_monotonic_narrowing() {
    let store = create_test_store();

    let chain = [
        FilterState::new(),
        FilterState::new().with_min(10.0),
        FilterState::new().with_min(10.0).with_max(60.0),
        FilterState::new().with_min(10.0).with_max(60.0).with_tag("react"),
        FilterState::new()
            .with_min(10.0)
            .with_max(60.0)
            .with_tag("react")
            .with_location("india"),
    ];

    for pair in chain.windows(2) {
        let wider = keys(&store, &pair[0]);
        let narrower = keys(&store, &pair[1]);
        assert!(
            is_subsequence(&narrower, &wider),
            "{narrower:?} should be a subsequence of {wider:?}"
        );
    }
}

#[test]
fn test_tag_any_semantics() {
    let mut store = RecordStore::new();
    store
        .load(vec![freelancer("ab").with_tags(["A", "B"])])
        .unwrap();

    let hit = FilterState::new().with_tag("B").with_tag("C");
    let miss = FilterState::new().with_tag("C").with_tag("D");

    assert_eq!(keys(&store, &hit), vec!["ab"]);
    assert!(keys(&store, &miss).is_empty());
}

#[test]
fn test_null_amount_excluded_once_range_set() {
    let store = create_test_store();

    assert!(keys(&store, &FilterState::new()).contains(&"f2".to_string()));
    assert!(!keys(&store, &FilterState::new().with_min(0.0)).contains(&"f2".to_string()));
    assert!(!keys(&store, &FilterState::new().with_max(1_000.0)).contains(&"f2".to_string()));
}

#[test]
fn test_rate_floor_scenario() {
    let mut store = RecordStore::new();
    store
        .load(vec![
            freelancer("f1").with_amount(20.0).with_tags(["react"]),
            freelancer("f2").with_tags(["design"]),
        ])
        .unwrap();

    assert_eq!(keys(&store, &FilterState::new().with_min(10.0)), vec!["f1"]);
}

#[test]
fn test_search_spans_name_title_description_and_tags() {
    let store = create_test_store();

    assert_eq!(keys(&store, &FilterState::new().with_search("maya")), vec!["f1"]);
    assert_eq!(keys(&store, &FilterState::new().with_search("designer")), vec!["f2"]);
    assert_eq!(keys(&store, &FilterState::new().with_search("backend")), vec!["f3"]);
    assert_eq!(keys(&store, &FilterState::new().with_search("swift")), vec!["f4"]);
}

#[test]
fn test_combined_filters() {
    let store = create_test_store();
    let state = FilterState::new()
        .with_category("expert")
        .with_tag("go")
        .with_location("brazil");

    assert_eq!(keys(&store, &state), vec!["f3"]);
}

#[test]
fn test_inverted_range_yields_empty_view() {
    let store = create_test_store();
    let state = FilterState::new().with_min(90.0).with_max(10.0);

    assert!(state.validate().is_err());
    assert!(keys(&store, &state).is_empty());
}

#[test]
fn test_apply_does_not_touch_store() {
    let store = create_test_store();
    let before: Vec<Record> = store.all().iter().map(|r| r.as_ref().clone()).collect();

    let _ = apply(&store, &compile(&FilterState::new().with_tag("rust")), &SortOrder::showcase());

    let after: Vec<Record> = store.all().iter().map(|r| r.as_ref().clone()).collect();
    assert_eq!(before, after);
    assert_eq!(store.generation(), 1);
}

#[test]
fn test_engine_keeps_filter_across_reload() {
    let mut store = create_test_store();
    let mut engine = FilterEngine::new();
    engine.set_filter(FilterState::new().with_category("expert"), &store);
    assert_eq!(engine.view().keys(), vec!["f2", "f3"]);

    store
        .load(vec![
            freelancer("f3").with_category("expert"),
            freelancer("f5").with_category("expert"),
        ])
        .unwrap();
    engine.refresh(&store);

    assert_eq!(engine.view().keys(), vec!["f3", "f5"]);
    assert!(engine.predicate().describe().contains(&"CategoryClause"));
}

#[test]
fn test_empty_predicate_on_empty_store() {
    let store = RecordStore::new();
    let view = apply(&store, &Predicate::new(), &SortOrder::fetch_order());
    assert!(view.is_empty());
    assert_eq!(view.generation(), 0);
}
