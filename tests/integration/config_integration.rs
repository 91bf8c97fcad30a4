//! Project configuration files driving full runs

use super::fixtures::{document, movie_fixture, provenance, write, DBPEDIA, FREEBASE, GOLD, IMDB, PAIRS};
use fusion::config::ConfigLoader;
use fusion::pipeline::Pipeline;
use fusion::resolution::{value_pairs, Strategy};
use fusion::tree::{Element, JsonTreeStore};

const PROJECT: &str = r#"
[input]
id_path = "/data/movie/id"
duplicates = ["pairs.csv"]
datasets = ["imdb.json", "dbpedia.json", "freebase.json"]
gold = "gold.json"

[output]
merged = "out/merged.json"
fused = "out/fused.json"
report = "out/report.txt"
pretty = false

[strategies]
title = { kind = "vote", select_first = true }
year = { kind = "most_recent" }
budget = { kind = "maximum" }
"#;

#[test]
fn test_project_file_drives_run() {
    let fixture = movie_fixture();
    let root = fixture.dir.path();
    std::fs::write(root.join("fusion.toml"), PROJECT).unwrap();

    let config = ConfigLoader::load(root).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(
        config.input.datasets,
        vec![root.join(IMDB), root.join(DBPEDIA), root.join(FREEBASE)]
    );
    assert_eq!(config.input.duplicates, vec![root.join(PAIRS)]);
    assert_eq!(config.input.gold, Some(root.join(GOLD)));
    assert!(matches!(config.strategies["year"], Strategy::MostRecent(_)));

    let store = JsonTreeStore::new(config.output.pretty);
    let (_, fusion) = Pipeline::new(&config, &store).run().unwrap();

    // most recent source (dbpedia) wins the first cluster's year with 1978
    assert!((fusion.evaluation.per_attribute["year"] - 0.5).abs() < 1e-9);
    // maximum budget of the first cluster is 11 against a gold value of 10
    assert!((fusion.evaluation.per_attribute["budget"] - 0.5).abs() < 1e-9);
    assert!((fusion.evaluation.per_attribute["title"] - 1.0).abs() < 1e-9);
    assert!(root.join("out").join("fused.json").exists());

    let merged = std::fs::read_to_string(root.join("out").join("merged.json")).unwrap();
    assert!(!merged.contains('\n'), "pretty = false writes compact JSON");
}

#[test]
fn test_explicit_config_resolves_against_its_directory() {
    let fixture = movie_fixture();
    let root = fixture.dir.path();
    let nested = root.join("conf");
    std::fs::create_dir_all(&nested).unwrap();
    let file = nested.join("custom.toml");
    std::fs::write(&file, PROJECT.replace("\"pairs.csv\"", "\"../pairs.csv\"")).unwrap();

    let config = ConfigLoader::load_from_file(&file).unwrap();
    assert_eq!(config.input.duplicates, vec![nested.join("../pairs.csv")]);
    assert_eq!(config.input.datasets[0], nested.join(IMDB));
    assert_eq!(config.output.fused, nested.join("out/fused.json"));
}

#[test]
fn test_invalid_strategy_table_is_rejected() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let bad = PROJECT.replace(
        "budget = { kind = \"maximum\" }",
        "budget = { kind = \"median\" }",
    );
    std::fs::write(temp_dir.path().join("fusion.toml"), bad).unwrap();
    assert!(ConfigLoader::load(temp_dir.path()).is_err());
}

#[test]
fn test_fixture_config_is_valid() {
    let fixture = movie_fixture();
    assert!(fixture.config.validate().is_ok());
}

const MIXED_CASE_PROJECT: &str = r#"
[input]
id_path = "/data/movie/id"
duplicates = ["pairs.csv"]
datasets = ["imdb.json", "dbpedia.json"]
gold = "gold.json"

[strategies]
releaseDate = { kind = "most_trusted", trust = { "IMDb.xml" = 1.0, "DBpedia.xml" = 0.5 } }
"Director/Name" = { kind = "vote" }
"#;

fn film(id: &str, release: &str, director: &str) -> Element {
    Element::new("movie")
        .with_child(Element::with_text("id", id))
        .with_child(Element::with_text("releaseDate", release))
        .with_child(Element::new("Director").with_child(Element::with_text("Name", director)))
}

#[test]
fn test_mixed_case_paths_and_sources_resolve() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        IMDB,
        &document(
            provenance("p1", "IMDb.xml", "01 Jan 2020 00:00:00 +0000"),
            vec![film("a1", "1979-05-25", "Ridley Scott")],
        ),
    );
    write(
        root,
        DBPEDIA,
        &document(
            provenance("p2", "DBpedia.xml", "01 Jan 2021 00:00:00 +0000"),
            vec![film("b1", "1979-06-22", "Ridley Scott")],
        ),
    );
    write(
        root,
        GOLD,
        &Element::new("data").with_child(film("a1---b1", "1979-05-25", "Ridley Scott")),
    );
    std::fs::write(root.join(PAIRS), "a1,b1\n").unwrap();
    std::fs::write(root.join("fusion.toml"), MIXED_CASE_PROJECT).unwrap();

    let config = ConfigLoader::load(root).unwrap();
    let store = JsonTreeStore::new(true);
    let (_, fusion) = Pipeline::new(&config, &store).run().unwrap();

    assert_eq!(fusion.evaluation.resolution.resolved, 2);
    assert_eq!(fusion.evaluation.resolution.skipped, 0);
    assert!((fusion.evaluation.accuracy - 1.0).abs() < 1e-9);

    let record = fusion.fused.record("a1---b1").unwrap();
    let release = value_pairs(record, "releaseDate");
    assert_eq!(release.len(), 1);
    assert_eq!(release[0].value, "1979-05-25");
    assert_eq!(release[0].provenance, "p1");
    assert_eq!(value_pairs(record, "Director/Name")[0].value, "Ridley Scott");
}
