//! Shortening of displayed directory paths.
//!
//! The resolver picks the ancestor directory whose removal saves the most
//! characters across all report directories. A directory that does not start
//! with a candidate is charged its full length, so candidates shared by every
//! directory are favoured over deeper ones shared by only a few.

use std::collections::HashSet;

use tracing::info;

use crate::registry::Registry;

/// Number of trailing directory levels that may never be stripped.
pub const MIN_DIRECTORIES: usize = 1;

/// Drop the last `/` separated segment. `None` once only the root segment is
/// left.
fn shorten(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(idx) if idx > 0 => Some(&path[..idx]),
        _ => None,
    }
}

/// Compute the cheapest common prefix for a list of directory paths, one
/// entry per report (directories repeat when several files share them).
///
/// Ties go to the candidate seen first.
pub fn resolve_prefix(dirs: &[&str]) -> Option<String> {
    let mut candidates: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for dir in dirs {
        let mut current = *dir;
        while let Some(parent) = shorten(current) {
            let candidate = format!("{parent}/");
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
            current = parent;
        }
    }

    for dir in dirs {
        let mut current = Some(*dir);
        for _ in 0..MIN_DIRECTORIES {
            let Some(level) = current else { break };
            let own = format!("{level}/");
            candidates.retain(|candidate| *candidate != own);
            current = shorten(level);
        }
    }

    let mut best: Option<(usize, &String)> = None;
    for candidate in &candidates {
        let cost: usize = dirs
            .iter()
            .map(|dir| {
                if dir.starts_with(candidate.as_str()) {
                    dir.len() - candidate.len()
                } else {
                    dir.len()
                }
            })
            .sum();
        match best {
            Some((best_cost, _)) if best_cost <= cost => {}
            _ => best = Some((cost, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate.clone())
}

/// Decide which prefix to strip for this run and log the decision.
///
/// `no_prefix` wins over a user prefix, which wins over the resolver. A user
/// prefix is normalized to end with `/`.
pub fn choose_prefix(
    registry: &Registry,
    user_prefix: Option<&str>,
    no_prefix: bool,
) -> Option<String> {
    if no_prefix {
        info!("User asked not to remove filename prefix");
        return None;
    }

    if let Some(prefix) = user_prefix.filter(|p| !p.is_empty()) {
        let prefix = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        info!("Using user-specified filename prefix \"{prefix}\"");
        return Some(prefix);
    }

    let dirs: Vec<&str> = registry.iter().map(|file| file.dir()).collect();
    let prefix = resolve_prefix(&dirs);
    match &prefix {
        Some(prefix) => info!("Found common filename prefix {prefix}"),
        None => info!("No common filename prefix found!"),
    }
    prefix
}

/// Strip `prefix` from every display directory that is strictly longer than
/// it. Returns how many files were shortened.
pub fn strip_prefix(registry: &mut Registry, prefix: &str) -> usize {
    let mut stripped = 0;
    for file in registry.iter_mut() {
        let dir = file.dir();
        if dir.starts_with(prefix) && dir.len() > prefix.len() {
            let short = dir[prefix.len()..].to_string();
            file.set_display_dir(short, Some(prefix.to_string()));
            stripped += 1;
        }
    }
    stripped
}
