//! Comparator behavior tests
//!
//! Covers the reconciliation scenarios, strategy equivalence, order
//! preservation, the missing-value placeholder quirk and malformed input.

use proptest::prelude::*;
use shelfsync_common::config::ComparisonStrategy;
use shelfsync_common::Error;
use shelfsync_rc::compare::{
    compare_records, CatalogId, ChunkedEngine, ColumnLayout, Comparator, CsvSource, MemorySource,
    RowWiseEngine,
};

const ALL_STRATEGIES: [ComparisonStrategy; 3] = [
    ComparisonStrategy::RowWise,
    ComparisonStrategy::Bulk,
    ComparisonStrategy::Chunked,
];

fn ids(values: &[i64]) -> Vec<CatalogId> {
    values.iter().map(|&v| CatalogId::Int(v)).collect()
}

fn named(entries: &[(i64, &str)]) -> Vec<(CatalogId, Option<String>)> {
    entries
        .iter()
        .map(|(id, name)| (CatalogId::Int(*id), Some(name.to_string())))
        .collect()
}

/// Run every strategy and assert they agree, returning the shared result
fn compare_all(inventory: &[&str], catalog: &[(CatalogId, Option<String>)], chunk_size: usize) -> Vec<CatalogId> {
    let baseline =
        compare_records(inventory, catalog, ComparisonStrategy::RowWise, chunk_size).unwrap();
    for strategy in ALL_STRATEGIES {
        let result = compare_records(inventory, catalog, strategy, chunk_size).unwrap();
        assert_eq!(result, baseline, "{strategy} disagrees with row_wise");
    }
    baseline
}

#[test]
fn test_trailing_whitespace_matches_and_unknown_release_flagged() {
    let catalog = named(&[
        (1, "Beatles - Abbey Road"),
        (2, "Beatles - Abbey Road  "),
        (3, "Rolling Stones - Exile"),
    ]);
    assert_eq!(compare_all(&["Beatles - Abbey Road"], &catalog, 2), ids(&[3]));
}

#[test]
fn test_empty_inventory_flags_everything() {
    let catalog = named(&[(1, "Anything")]);
    assert_eq!(compare_all(&[], &catalog, 10), ids(&[1]));
}

#[test]
fn test_duplicate_inventory_entries_still_match() {
    let catalog = named(&[(1, "a - b")]);
    assert_eq!(compare_all(&["A - B", "A - B"], &catalog, 10), Vec::<CatalogId>::new());
}

#[test]
fn test_chunk_size_one_matches_across_batch_boundaries() {
    let catalog = named(&[(1, "x"), (2, "y"), (3, "x")]);
    let result =
        compare_records(&["x"], &catalog, ComparisonStrategy::Chunked, 1).unwrap();
    assert_eq!(result, ids(&[2]));
}

#[test]
fn test_decoded_ampersand_compares_against_inventory() {
    let inventory = ["Simon & Garfunkel - Bookends"];
    let catalog = named(&[
        (10, "Simon & Garfunkel - Bookends"),
        (11, "Simon &amp; Garfunkel - Bookends"),
    ]);
    // Only the still-encoded name is unmatched
    assert_eq!(compare_all(&inventory, &catalog, 1), ids(&[11]));
}

#[test]
fn test_case_insensitive_match() {
    let catalog = named(&[(1, "BEATLES - ABBEY ROAD"), (2, "beatles - let it be")]);
    assert_eq!(compare_all(&["  beatles - Abbey Road"], &catalog, 1), ids(&[2]));
}

#[test]
fn test_order_and_duplicate_ids_preserved() {
    let catalog = named(&[(9, "z"), (3, "known"), (5, "y"), (9, "z"), (1, "w")]);
    assert_eq!(compare_all(&["known"], &catalog, 2), ids(&[9, 5, 9, 1]));
}

#[test]
fn test_textual_ids_preserved_verbatim() {
    let catalog = vec![
        (CatalogId::from("007"), Some("Bond - Theme".to_string())),
        (CatalogId::from("SKU-12"), Some("Known - Release".to_string())),
    ];
    let result = compare_all(&["known - release"], &catalog, 1);
    assert_eq!(result, vec![CatalogId::Text("007".to_string())]);
}

#[test]
fn test_numeric_looking_text_ids_stay_text() {
    let catalog = vec![
        (CatalogId::Text("42".to_string()), Some("Unknown - Record".to_string())),
        (CatalogId::Int(42), Some("Other - Record".to_string())),
        (CatalogId::Text("43".to_string()), Some("Known - Release".to_string())),
    ];
    for chunk_size in [1, 2, 10] {
        let result = compare_all(&["known - release"], &catalog, chunk_size);
        assert_eq!(
            result,
            vec![CatalogId::Text("42".to_string()), CatalogId::Int(42)]
        );
    }
}

#[test]
fn test_missing_names_collide_with_placeholder_key() {
    // Known quirk: a missing catalog name normalizes to the placeholder,
    // so a missing inventory key (or literal "None") suppresses it.
    let catalog: Vec<(CatalogId, Option<String>)> =
        vec![(CatalogId::Int(1), None), (CatalogId::Int(2), Some("Real - Name".to_string()))];

    assert_eq!(compare_all(&["None"], &catalog, 1), ids(&[2]));
    assert_eq!(compare_all(&["Other - Thing"], &catalog, 1), ids(&[1, 2]));
}

#[test]
fn test_missing_catalog_name_column_is_malformed_for_every_strategy() {
    let layout = ColumnLayout::default();
    for strategy in ALL_STRATEGIES {
        let mut inventory = MemorySource::inventory(&layout, &["a"]);
        let mut catalog = MemorySource::from_cells(
            vec!["id".to_string(), "title".to_string()],
            vec![vec![Some("1".to_string()), Some("a".to_string())]],
        );
        let err = Comparator::for_strategy(strategy, 5)
            .compare(&mut inventory, &mut catalog)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)), "{strategy}: {err:?}");
    }
}

#[test]
fn test_missing_catalog_id_column_is_malformed_even_when_empty() {
    let layout = ColumnLayout::default();
    let mut inventory = MemorySource::inventory(&layout, &["a"]);
    let mut catalog = MemorySource::new(vec!["name".to_string()], vec![]);

    let err = Comparator::for_strategy(ComparisonStrategy::Chunked, 5)
        .compare(&mut inventory, &mut catalog)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}

#[test]
fn test_missing_inventory_column_is_malformed() {
    let mut inventory = MemorySource::new(vec!["ARTIST".to_string()], vec![]);
    let layout = ColumnLayout::default();
    let mut catalog = MemorySource::catalog(&layout, &[(CatalogId::Int(1), Some("a"))]);

    let err = Comparator::for_strategy(ComparisonStrategy::Bulk, 5)
        .compare(&mut inventory, &mut catalog)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}

#[test]
fn test_csv_artifacts_with_extra_columns_and_blank_names() {
    let inventory_csv = "ARTIST_TITLE\nBeatles - Abbey Road\n";
    let catalog_csv = "sku,id,name\nX,1,Beatles - Abbey Road\nY,2,\nZ,3,Rolling Stones - Exile\n";

    let comparator = Comparator::new(Box::new(ChunkedEngine::new(1)), ColumnLayout::default());
    let mut inventory = CsvSource::from_reader(inventory_csv.as_bytes()).unwrap();
    let mut catalog = CsvSource::from_reader(catalog_csv.as_bytes()).unwrap();

    let result = comparator.compare(&mut inventory, &mut catalog).unwrap();
    assert_eq!(result, ids(&[2, 3]));
}

#[test]
fn test_custom_column_layout() {
    let layout = ColumnLayout {
        inventory_key: "key".to_string(),
        catalog_id: "product_id".to_string(),
        catalog_name: "title".to_string(),
    };
    let comparator = Comparator::new(Box::new(RowWiseEngine), layout.clone());
    let mut inventory = MemorySource::inventory(&layout, &["a - b"]);
    let mut catalog = MemorySource::catalog(
        &layout,
        &[(CatalogId::Int(4), Some("A - B")), (CatalogId::Int(5), Some("C - D"))],
    );

    assert_eq!(comparator.compare(&mut inventory, &mut catalog).unwrap(), ids(&[5]));
}

fn catalog_strategy() -> impl Strategy<Value = Vec<(CatalogId, Option<String>)>> {
    prop::collection::vec(
        (0i64..50, prop::option::weighted(0.9, "[ ]?[a-cA-C]{1,2}[ ]?")),
        0..40,
    )
    .prop_map(|rows| rows.into_iter().map(|(id, name)| (CatalogId::Int(id), name)).collect())
}

proptest! {
    #[test]
    fn prop_strategies_agree(
        inventory in prop::collection::vec("[ ]?[a-cA-C]{1,2}", 0..10),
        catalog in catalog_strategy(),
        chunk_size in 1usize..7,
    ) {
        let baseline = compare_records(&inventory, &catalog, ComparisonStrategy::RowWise, chunk_size).unwrap();
        let bulk = compare_records(&inventory, &catalog, ComparisonStrategy::Bulk, chunk_size).unwrap();
        let chunked = compare_records(&inventory, &catalog, ComparisonStrategy::Chunked, chunk_size).unwrap();
        prop_assert_eq!(&bulk, &baseline);
        prop_assert_eq!(&chunked, &baseline);
    }

    #[test]
    fn prop_result_is_exactly_the_unmatched_rows(
        inventory in prop::collection::vec("[a-cA-C]{1,2}", 0..10),
        catalog in catalog_strategy(),
    ) {
        let keys: std::collections::HashSet<String> =
            inventory.iter().map(|k| k.trim().to_lowercase()).collect();
        let expected: Vec<CatalogId> = catalog
            .iter()
            .filter(|(_, name)| {
                let key = name.as_deref().unwrap_or("none").trim().to_lowercase();
                !keys.contains(&key)
            })
            .map(|(id, _)| id.clone())
            .collect();

        let result = compare_records(&inventory, &catalog, ComparisonStrategy::Bulk, 3).unwrap();
        prop_assert_eq!(result, expected);
    }
}
