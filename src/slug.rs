use std::path::Path;

use crate::hash::digest_bytes;

/// hex chars of the disambiguating suffix appended to every slug
const SUFFIX_LEN: usize = 8;

/// build a filesystem/url-safe identifier from a display name and a seed
///
/// the name is lowercased with runs of non-alphanumeric characters
/// collapsed to a single `-`; the seed contributes a short hash suffix so
/// that identical names from different origins stay distinct.
pub fn slugify(name: &str, seed: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("repo");
    }

    let suffix = digest_bytes(seed.as_bytes()).to_hex();
    format!("{}-{}", slug, &suffix[..SUFFIX_LEN])
}

/// derive a stable repository identifier from a directory path
///
/// the final path segment provides the readable part; the full path seeds
/// the suffix, so two directories sharing a basename get different ids.
pub fn repo_id_from_dir(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    slugify(&name, &dir.to_string_lossy())
}
