//! Union aborts when clustered IDs cannot be traced to exactly one dataset

use super::fixtures::{document, movie, movie_fixture, provenance, write, PAIRS};
use fusion::error::{DataIntegrityError, FusionError, LoadError};
use fusion::pipeline::Pipeline;
use fusion::tree::JsonTreeStore;

#[test]
fn test_missing_record_aborts_union() {
    let fixture = movie_fixture();
    std::fs::write(fixture.path(PAIRS), "a1,b1\nb1,x99\n").unwrap();
    let store = JsonTreeStore::new(true);

    let err = Pipeline::new(&fixture.config, &store).union().unwrap_err();
    assert!(matches!(
        err,
        FusionError::DataIntegrity(DataIntegrityError::MissingRecord { ref id }) if id == "x99"
    ));
    assert!(!fixture.config.output.merged.exists(), "no merged document on integrity errors");
}

#[test]
fn test_ambiguous_record_aborts_union() {
    let mut fixture = movie_fixture();
    let clash = document(
        provenance("p4", "clash", "01 Jan 2022 00:00:00 +0000"),
        vec![movie("a1", "Alien", "1979", Some("11"))],
    );
    let clash = write(fixture.dir.path(), "clash.json", &clash);
    fixture.config.input.datasets.push(clash);
    let store = JsonTreeStore::new(true);

    match Pipeline::new(&fixture.config, &store).union() {
        Err(FusionError::DataIntegrity(DataIntegrityError::AmbiguousRecord { id, sources })) => {
            assert_eq!(id, "a1");
            assert_eq!(sources, vec!["p1".to_string(), "p4".to_string()]);
        }
        other => panic!("expected an ambiguous record error, got {:?}", other.map(|o| o.merged.len())),
    }
}

#[test]
fn test_source_without_provenance_aborts_load() {
    let mut fixture = movie_fixture();
    let bare = fusion::tree::Element::new("data").with_child(movie("d1", "Dune", "1984", None));
    let bare = write(fixture.dir.path(), "bare.json", &bare);
    fixture.config.input.datasets.push(bare);
    let store = JsonTreeStore::new(true);

    let err = Pipeline::new(&fixture.config, &store).load_sources().unwrap_err();
    assert!(matches!(
        err,
        FusionError::Load(LoadError::ProvenanceCount { found: 0, .. })
    ));
}

#[test]
fn test_malformed_document_aborts_load() {
    let mut fixture = movie_fixture();
    let broken = fixture.path("broken.json");
    std::fs::write(&broken, "{ \"name\": \"data\", ").unwrap();
    fixture.config.input.datasets.push(broken);
    let store = JsonTreeStore::new(true);

    let err = Pipeline::new(&fixture.config, &store).load_sources().unwrap_err();
    assert!(matches!(err, FusionError::Load(LoadError::Malformed { .. })));
}

#[test]
fn test_reused_provenance_key_aborts_union() {
    let mut fixture = movie_fixture();
    let reused = document(
        provenance("p1", "imdb mirror", "01 Jan 2022 00:00:00 +0000"),
        vec![movie("d1", "Dune", "1984", None)],
    );
    let reused = write(fixture.dir.path(), "mirror.json", &reused);
    fixture.config.input.datasets.push(reused);
    let store = JsonTreeStore::new(true);

    match Pipeline::new(&fixture.config, &store).union() {
        Err(FusionError::DataIntegrity(DataIntegrityError::SharedProvenance { key, datasets })) => {
            assert_eq!(key, "p1");
            assert_eq!(datasets, vec!["imdb.json".to_string(), "mirror.json".to_string()]);
        }
        other => panic!("expected a shared provenance error, got {:?}", other.map(|o| o.merged.len())),
    }
    assert!(!fixture.config.output.merged.exists());
}
