//! Shared movie fixture: three overlapping source datasets, duplicate pairs and a gold standard
//! written as JSON documents into a temporary project directory.

use fusion::config::FusionConfig;
use fusion::resolution::{Strategy, Vote};
use fusion::tree::{Element, JsonTreeStore, TreeStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const IMDB: &str = "imdb.json";
pub const DBPEDIA: &str = "dbpedia.json";
pub const FREEBASE: &str = "freebase.json";
pub const PAIRS: &str = "pairs.csv";
pub const GOLD: &str = "gold.json";

pub struct MovieFixture {
    pub dir: TempDir,
    pub config: FusionConfig,
}

impl MovieFixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn provenance(key: &str, source: &str, date: &str) -> Element {
    Element::new("provenance")
        .with_child(Element::with_text("id", key))
        .with_child(Element::with_text("source", source))
        .with_child(Element::with_text("date", date))
}

/// A movie record; `budget` is left out when `None`.
pub fn movie(id: &str, title: &str, year: &str, budget: Option<&str>) -> Element {
    let mut record = Element::new("movie")
        .with_child(Element::with_text("id", id))
        .with_child(Element::with_text("title", title))
        .with_child(Element::with_text("year", year));
    if let Some(budget) = budget {
        record.push(Element::with_text("budget", budget));
    }
    record
}

pub fn actors(names: &[&str]) -> Element {
    let mut actors = Element::new("actors");
    for name in names {
        actors.push(Element::new("actor").with_child(Element::with_text("name", *name)));
    }
    actors
}

pub fn document(provenance: Element, records: Vec<Element>) -> Element {
    let mut root = Element::new("data").with_child(provenance);
    for record in records {
        root.push(record);
    }
    root
}

/// Gold record keyed by a merged ID.
pub fn gold_movie(id: &str, title: &str, year: &str, budget: &str) -> Element {
    movie(id, title, year, Some(budget))
}

pub fn write(dir: &Path, name: &str, root: &Element) -> PathBuf {
    let path = dir.join(name);
    JsonTreeStore::new(true).save(root, &path).unwrap();
    path
}

/// Build the fixture.
///
/// Clusters are `{a1, b1, c1}` and `{a2, b2}`. Titles of the second cluster disagree, years of
/// the first cluster disagree, and freebase carries no budget.
pub fn movie_fixture() -> MovieFixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let imdb = document(
        provenance("p1", "imdb", "01 Jan 2020 00:00:00 +0000"),
        vec![
            movie("a1", "Alien", "1979", Some("11")).with_child(actors(&["Weaver", "Hurt"])),
            movie("a2", "Brazil", "1985", Some("15")),
        ],
    );
    let dbpedia = document(
        provenance("p2", "dbpedia", "01 Jan 2021 00:00:00 +0000"),
        vec![
            movie("b1", "Alien", "1978", Some("9")),
            movie("b2", "Brazill", "1985", Some("15")),
        ],
    );
    let freebase = document(
        provenance("p3", "freebase", "01 Jan 2019 00:00:00 +0000"),
        vec![movie("c1", "Alien", "1979", None)],
    );
    let gold = Element::new("data")
        .with_child(gold_movie("a1---b1---c1", "Alien", "1979", "10"))
        .with_child(gold_movie("a2---b2", "Brazil", "1985", "15"));

    let datasets = vec![
        write(root, IMDB, &imdb),
        write(root, DBPEDIA, &dbpedia),
        write(root, FREEBASE, &freebase),
    ];
    let pairs = root.join(PAIRS);
    std::fs::write(&pairs, "a1,b1\nb1,c1\na2,b2\n").unwrap();
    let gold = write(root, GOLD, &gold);

    let mut config = FusionConfig::default();
    config.input.id_path = "/data/movie/id".to_string();
    config.input.datasets = datasets;
    config.input.duplicates = vec![pairs];
    config.input.gold = Some(gold);
    config.output.merged = root.join("out").join("merged.json");
    config.output.fused = root.join("out").join("fused.json");
    config.output.report = Some(root.join("out").join("report.txt"));
    config.strategies.insert(
        "title".to_string(),
        Strategy::Vote(Vote { select_first: true }),
    );
    config
        .strategies
        .insert("year".to_string(), Strategy::Vote(Vote::default()));
    config
        .strategies
        .insert("budget".to_string(), Strategy::Average);

    MovieFixture { dir, config }
}
