#![allow(dead_code)]

use std::path::{Path, PathBuf};

use microcheck::coverage::FailureMap;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("fixture should be readable")
}

/// Fixture path relative to the package root, as a user would type it.
pub fn relative_fixture(name: &str) -> PathBuf {
    Path::new("tests").join("fixtures").join(name)
}

pub fn failure_map(entries: &[(&str, &[&str])]) -> FailureMap {
    entries
        .iter()
        .map(|(name, prs)| {
            (
                name.to_string(),
                prs.iter().map(|pr| pr.to_string()).collect(),
            )
        })
        .collect()
}
