/// Test case descriptions, as written by `gendesc`:
///
///   TN:<test name>
///   TD:<description line>
///   TD:<description line>
///
/// The grammar is loose: every non-empty line after a `TN:` belongs to that
/// test case until the next `TN:`, with or without the `TD:` marker.
use std::collections::BTreeSet;

use tracing::trace;

/// Description of one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescription {
    pub name: String,
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptions {
    entries: Vec<TestDescription>,
}

impl Descriptions {
    /// Parse a whole description file.
    pub fn parse(input: &str) -> Self {
        let mut descriptions = Self::default();
        for line in input.lines() {
            descriptions.push_line(line);
        }
        descriptions
    }

    /// Feed one line of a description file.
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim_end();
        if let Some(name) = line.strip_prefix("TN:") {
            self.entries.push(TestDescription {
                name: name.trim().to_string(),
                text: Vec::new(),
            });
            return;
        }

        let text = line.strip_prefix("TD:").unwrap_or(line).trim_start();
        if text.is_empty() {
            return;
        }
        match self.entries.last_mut() {
            Some(entry) => entry.text.push(text.to_string()),
            None => trace!("Description text before any TN: {text}"),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestDescription> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Drop descriptions of test cases that were not part of the run.
    pub fn retain_run(&mut self, run_test_names: &BTreeSet<String>) {
        self.entries
            .retain(|entry| run_test_names.contains(&entry.name));
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestDescription> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
