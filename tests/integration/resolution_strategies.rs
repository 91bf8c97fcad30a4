//! Resolution strategies applied to a merged dataset built from the fixture

use super::fixtures::movie_fixture;
use fusion::classify::{classify_datasets, AttributeSchema};
use fusion::cluster::Clusters;
use fusion::dataset::Dataset;
use fusion::merge::RecordMerger;
use fusion::pipeline::Pipeline;
use fusion::resolution::{
    resolve, resolve_all, value_pairs, MostTrusted, PassThrough, Resolution, Strategy, ValuePair,
};
use fusion::tree::JsonTreeStore;
use std::collections::BTreeMap;

fn merged() -> (Dataset, AttributeSchema) {
    let fixture = movie_fixture();
    let store = JsonTreeStore::new(true);
    let pipeline = Pipeline::new(&fixture.config, &store);
    let sources = pipeline.load_sources().unwrap();
    let clusters: Clusters = pipeline.clusters().unwrap();
    let schema = classify_datasets(&sources);
    let merged = RecordMerger::new("data").merge(&clusters, &sources, &schema).unwrap();
    (merged, schema)
}

fn trust(weights: &[(&str, f64)]) -> BTreeMap<String, f64> {
    weights.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_pass_through_keeps_contributions() {
    let (mut merged, _) = merged();
    let before = merged.record("a1---b1---c1").unwrap().clone();
    assert_eq!(resolve(&mut merged, "a1---b1---c1", "year", &PassThrough), Resolution::Applied);
    assert_eq!(merged.record("a1---b1---c1").unwrap(), &before);
}

#[test]
fn test_most_trusted_prefers_weighted_source() {
    let (mut merged, schema) = merged();
    let mut strategies = BTreeMap::new();
    strategies.insert(
        "year".to_string(),
        Strategy::MostTrusted(MostTrusted::new(trust(&[
            ("imdb", 0.2),
            ("dbpedia", 0.9),
            ("freebase", 0.1),
        ]))),
    );
    let stats = resolve_all(&mut merged, &strategies, &schema);
    assert_eq!(stats.resolved, 2);

    let alien = merged.record("a1---b1---c1").unwrap();
    assert_eq!(value_pairs(alien, "year"), vec![ValuePair::new("1978", "p2")]);
}

#[test]
fn test_unknown_source_leaves_attribute_unresolved() {
    let (mut merged, schema) = merged();
    let before = value_pairs(merged.record("a1---b1---c1").unwrap(), "year");
    let mut strategies = BTreeMap::new();
    strategies.insert(
        "year".to_string(),
        Strategy::MostTrusted(MostTrusted::new(trust(&[("imdb", 1.0), ("dbpedia", 0.5)]))),
    );
    let stats = resolve_all(&mut merged, &strategies, &schema);

    // freebase only contributes to the first cluster
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.resolved, 1);
    assert_eq!(value_pairs(merged.record("a1---b1---c1").unwrap(), "year"), before);
}

#[test]
fn test_non_numeric_maximum_is_skipped() {
    let (mut merged, schema) = merged();
    let mut strategies = BTreeMap::new();
    strategies.insert("title".to_string(), Strategy::Maximum);
    let stats = resolve_all(&mut merged, &strategies, &schema);
    assert_eq!(stats.skipped, 2);
    assert_eq!(value_pairs(merged.record("a2---b2").unwrap(), "title").len(), 2);
}

#[test]
fn test_strategy_on_list_path_is_ignored() {
    let (mut merged, schema) = merged();
    let before = merged.record("a1---b1---c1").unwrap().clone();
    let mut strategies = BTreeMap::new();
    strategies.insert("actors/actor/name".to_string(), Strategy::PassThrough);
    strategies.insert("actors/actor".to_string(), Strategy::Average);
    let stats = resolve_all(&mut merged, &strategies, &schema);
    assert_eq!(stats.resolved + stats.skipped, 0);
    assert_eq!(merged.record("a1---b1---c1").unwrap(), &before);
}
