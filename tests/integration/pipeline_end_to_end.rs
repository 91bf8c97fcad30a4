//! End-to-end union and fusion over JSON documents on disk

use super::fixtures::{movie_fixture, IMDB};
use fusion::dataset::{Dataset, DocumentLayout, LoadMode};
use fusion::pipeline::Pipeline;
use fusion::resolution::value_pairs;
use fusion::tree::{JsonTreeStore, TreeStore};
use fusion::types::{AVERAGE_PROVENANCE, PROVENANCE, VALUE};

fn layout() -> DocumentLayout {
    DocumentLayout::parse("/data/movie/id", "/data/provenance/id").unwrap()
}

#[test]
fn test_union_writes_merged_document() {
    let fixture = movie_fixture();
    let store = JsonTreeStore::new(true);
    let outcome = Pipeline::new(&fixture.config, &store).union().unwrap();

    assert_eq!(outcome.clusters.len(), 2);
    assert_eq!(outcome.merged.len(), 2);
    assert!(outcome.schema.is_scalar("title"));
    assert!(outcome.schema.list.contains("actors/actor"));

    let merged = Dataset::load(&store, &fixture.config.output.merged, &layout(), LoadMode::Merged)
        .unwrap();
    assert_eq!(merged.provenance().len(), 3);
    let ids: Vec<&String> = merged.records().keys().collect();
    assert_eq!(ids, vec!["a1---b1---c1", "a2---b2"]);

    let alien = merged.record("a1---b1---c1").unwrap();
    let years = value_pairs(alien, "year");
    assert_eq!(years.len(), 3);
    assert!(years.iter().any(|p| p.value == "1978" && p.provenance == "p2"));
    // freebase has no budget, so only two contributions
    assert_eq!(value_pairs(alien, "budget").len(), 2);

    let actors = alien.select("actors/actor");
    assert_eq!(actors.len(), 2);
    assert!(actors.iter().all(|a| a.attribute(PROVENANCE) == Some("p1")));
}

#[test]
fn test_union_report_measures_sources_and_merged() {
    let fixture = movie_fixture();
    let store = JsonTreeStore::new(false);
    let report = Pipeline::new(&fixture.config, &store).union().unwrap().report;

    assert_eq!(report.cluster_count, 2);
    assert!((report.average_cluster_size - 2.5).abs() < 1e-9);
    assert!((report.sources["p1"].density - 1.0).abs() < 1e-9);
    assert!((report.sources["p3"].density - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.sources["p1"].dataset, IMDB);
    assert!((report.merged.density - 1.0).abs() < 1e-9);

    // title agrees in the first cluster, year and budget in the second
    assert!((report.consistency.consistency - 0.5).abs() < 1e-9);
    assert!((report.consistency.per_attribute["title"] - 0.5).abs() < 1e-9);
    assert!((report.consistency.per_attribute["budget"] - 0.5).abs() < 1e-9);

    let text = std::fs::read_to_string(fixture.config.output.report.as_ref().unwrap()).unwrap();
    assert!(text.contains("Cluster count: 2"));
    assert!(text.contains("not defined for list attributes"));
}

#[test]
fn test_run_resolves_and_scores() {
    let fixture = movie_fixture();
    let store = JsonTreeStore::new(true);
    let (_, fusion) = Pipeline::new(&fixture.config, &store).run().unwrap();

    assert_eq!(fusion.evaluation.evaluated_records, 2);
    assert_eq!(fusion.evaluation.resolution.resolved, 6);
    assert_eq!(fusion.evaluation.resolution.skipped, 0);
    assert!((fusion.evaluation.accuracy - 1.0).abs() < 1e-9);

    let alien = fusion.fused.record("a1---b1---c1").unwrap();
    let year = value_pairs(alien, "year");
    assert_eq!(year.len(), 1);
    assert_eq!(year[0].value, "1979");
    assert_eq!(year[0].provenance, "p1,p3");
    let budget = value_pairs(alien, "budget");
    assert_eq!(budget[0].value, "10");
    assert_eq!(budget[0].provenance, AVERAGE_PROVENANCE);

    let brazil = fusion.fused.record("a2---b2").unwrap();
    assert_eq!(brazil.values(&format!("title/{}", VALUE)), vec!["Brazil"]);

    let report = std::fs::read_to_string(fixture.config.output.report.as_ref().unwrap()).unwrap();
    let union_at = report.find("Merged dataset").unwrap();
    let fused_at = report.find("Fused dataset").unwrap();
    assert!(union_at < fused_at, "fusion part is appended after the union part");
    assert!(report.contains("Accuracy: 1.0000"));
}

#[test]
fn test_fuse_reloads_merged_document() {
    let fixture = movie_fixture();
    let store = JsonTreeStore::new(true);
    let pipeline = Pipeline::new(&fixture.config, &store);
    pipeline.union().unwrap();

    let outcome = pipeline.fuse(None).unwrap();
    assert!((outcome.evaluation.accuracy - 1.0).abs() < 1e-9);

    let fused_doc = store.load(&fixture.config.output.fused).unwrap();
    assert_eq!(fused_doc.name, "data");
    let fused = Dataset::from_document("fused.json", fused_doc, &layout(), LoadMode::Merged).unwrap();
    assert_eq!(fused.len(), 2);
    assert_eq!(
        value_pairs(fused.record("a2---b2").unwrap(), "year"),
        vec![fusion::resolution::ValuePair::new("1985", "p1,p2")]
    );
}

#[test]
fn test_unresolved_attributes_lower_accuracy() {
    let mut fixture = movie_fixture();
    fixture.config.strategies.remove("year");
    let store = JsonTreeStore::new(true);
    let (_, fusion) = Pipeline::new(&fixture.config, &store).run().unwrap();

    // unresolved years keep one value per source against one gold value
    assert!((fusion.evaluation.per_attribute["year"] - 0.0).abs() < 1e-9);
    assert!((fusion.evaluation.per_attribute["title"] - 1.0).abs() < 1e-9);
    assert!((fusion.evaluation.accuracy - 4.0 / 6.0).abs() < 1e-9);
}
