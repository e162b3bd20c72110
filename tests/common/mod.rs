#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use tempfile::TempDir;

/// Create a fresh temporary directory for tracefiles and sources.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn setup() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Write a plain tracefile into `dir`.
pub fn write_tracefile(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Write a gzip compressed tracefile into `dir`.
pub fn write_gz_tracefile(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(
        std::fs::File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// Config that never touches source files.
pub fn config() -> covtree::config::Config {
    covtree::config::Config {
        no_source: true,
        ..covtree::config::Config::default()
    }
}
