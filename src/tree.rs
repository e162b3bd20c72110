//! Directory rollups over the registry.
//!
//! Files are grouped by their display directory into one [`IndexNode`] per
//! directory; a top-level node sums every directory node.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Counts, TestCaseHits};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child row of an index node.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub kind: EntryKind,
    /// File name or directory path.
    pub name: String,
    pub counts: Counts,
    /// Per-test-case hits, only filled in for files.
    pub test_cases: Vec<TestCaseHits>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexNode {
    /// Display directory, or empty for the top-level node.
    pub path: String,
    /// Prefix stripped from the directory, if any.
    pub prefix: Option<String>,
    pub counts: Counts,
    /// Children in first registration order.
    pub entries: Vec<IndexEntry>,
}

impl IndexNode {
    fn new(path: String, prefix: Option<String>) -> Self {
        Self {
            path,
            prefix,
            counts: Counts::default(),
            entries: Vec::new(),
        }
    }

    fn push(&mut self, entry: IndexEntry) {
        self.counts += entry.counts;
        self.entries.push(entry);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTree {
    pub top: IndexNode,
    pub directories: Vec<IndexNode>,
}

impl ReportTree {
    #[must_use]
    pub fn directory(&self, path: &str) -> Option<&IndexNode> {
        self.directories.iter().find(|node| node.path == path)
    }
}

/// Group the registry by display directory.
#[must_use]
pub fn build_tree(registry: &Registry) -> ReportTree {
    let mut directories: Vec<IndexNode> = Vec::new();
    let mut by_path: HashMap<&str, usize> = HashMap::new();

    for file in registry.iter() {
        let idx = *by_path.entry(file.dir()).or_insert_with(|| {
            directories.push(IndexNode::new(
                file.dir().to_string(),
                file.prefix().map(str::to_string),
            ));
            directories.len() - 1
        });
        directories[idx].push(IndexEntry {
            kind: EntryKind::File,
            name: file.name().to_string(),
            counts: file.counts(),
            test_cases: file.test_case_hits(),
        });
    }

    let mut top = IndexNode::new(String::new(), None);
    for node in &directories {
        top.push(IndexEntry {
            kind: EntryKind::Directory,
            name: node.path.clone(),
            counts: node.counts,
            test_cases: Vec::new(),
        });
    }

    ReportTree { top, directories }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{lcov, ParseMode};
    use crate::source::SourceOptions;

    fn registry(input: &str) -> Registry {
        let options = SourceOptions {
            no_source: true,
            ..SourceOptions::default()
        };
        let mut registry = Registry::new();
        lcov::parse_str(&mut registry, &options, ParseMode::Trace, input);
        registry
    }

    #[test]
    fn test_directory_rollup() {
        let registry = registry(
            "\
TN:a
SF:/p/src/one.c
DA:1,1
DA:2,0
FNDA:1,f
end_of_record
SF:/p/lib/two.c
DA:1,0
end_of_record
TN:b
SF:/p/src/three.c
DA:1,2
DA:2,2
BRDA:1,0,0,1
end_of_record
",
        );
        let tree = build_tree(&registry);

        assert_eq!(tree.directories.len(), 2);
        assert_eq!(tree.directories[0].path, "/p/src");
        assert_eq!(tree.directories[1].path, "/p/lib");

        let src = tree.directory("/p/src").unwrap();
        let names: Vec<&str> = src.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one.c", "three.c"]);
        assert_eq!(src.counts.lines_valid, 4);
        assert_eq!(src.counts.lines_covered, 3);
        assert_eq!(src.counts.functions_covered, 1);
        assert_eq!(src.counts.branches_valid, 1);

        let summed: u64 = registry
            .iter()
            .filter(|f| f.dir() == "/p/src")
            .map(|f| f.counts().lines_covered)
            .sum();
        assert_eq!(src.counts.lines_covered, summed);

        assert_eq!(tree.top.entries.len(), 2);
        assert_eq!(tree.top.entries[0].kind, EntryKind::Directory);
        assert_eq!(tree.top.counts, registry.counts());
    }

    #[test]
    fn test_per_test_case_breakdown() {
        let registry = registry(
            "TN:a\nSF:/p/x.c\nDA:1,1\nDA:2,0\nend_of_record\nTN:b\nSF:/p/x.c\nDA:2,4\nBRDA:2,0,0,1\nend_of_record\n",
        );
        let tree = build_tree(&registry);
        let entry = &tree.directories[0].entries[0];

        assert_eq!(entry.test_cases.len(), 2);
        assert_eq!(entry.test_cases[0].name, "a");
        assert_eq!(entry.test_cases[0].lines_hit, 1);
        assert_eq!(entry.test_cases[0].branches_hit, 0);
        assert_eq!(entry.test_cases[1].name, "b");
        assert_eq!(entry.test_cases[1].lines_hit, 1);
        assert_eq!(entry.test_cases[1].branches_hit, 1);
    }

    #[test]
    fn test_empty_registry() {
        let tree = build_tree(&Registry::new());
        assert!(tree.directories.is_empty());
        assert_eq!(tree.top.counts, Counts::default());
    }
}
