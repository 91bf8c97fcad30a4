//! Clustering duplicate-pair files read from disk

use fusion::cluster::Clusters;
use fusion::error::FusionError;
use std::collections::BTreeSet;
use tempfile::TempDir;

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_pairs_across_files_join_clusters() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("matched-1-2.csv");
    let second = temp_dir.path().join("matched-2-3.csv");
    std::fs::write(&first, "a1,b1\na2,b2\n\n").unwrap();
    std::fs::write(&second, "b1,c1\nc2,b2\nc9,c8\n").unwrap();

    let clusters = Clusters::from_files(&[first, second]).unwrap();
    let partition = clusters.partition();
    assert_eq!(partition.len(), 3);
    assert!(partition.contains(&set(&["a1", "b1", "c1"])));
    assert!(partition.contains(&set(&["a2", "b2", "c2"])));
    assert!(partition.contains(&set(&["c8", "c9"])));
    assert_eq!(clusters.cluster_of("a1"), clusters.cluster_of("c1"));
    assert_ne!(clusters.cluster_of("a1"), clusters.cluster_of("a2"));
}

#[test]
fn test_file_order_does_not_change_partition() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("one.csv");
    let second = temp_dir.path().join("two.csv");
    std::fs::write(&first, "x1,y1\nz1,w1\n").unwrap();
    std::fs::write(&second, "y1,z1\n").unwrap();

    let forward = Clusters::from_files(&[first.clone(), second.clone()]).unwrap();
    let backward = Clusters::from_files(&[second, first]).unwrap();
    assert_eq!(forward.partition(), backward.partition());
    assert_eq!(forward.len(), 1);
}

#[test]
fn test_malformed_line_names_file_and_line() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("bad.csv");
    std::fs::write(&file, "a1,b1\na2;b2\n").unwrap();

    match Clusters::from_files(&[file]) {
        Err(FusionError::Format(err)) => {
            assert_eq!(err.line_number, 2);
            assert_eq!(err.line, "a2;b2");
        }
        other => panic!("expected a format error, got {:?}", other),
    }
}

#[test]
fn test_missing_pair_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Clusters::from_files(&[temp_dir.path().join("absent.csv")]);
    assert!(result.is_err());
}
