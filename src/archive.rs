use std::fs;
use std::io::Write;
use std::path::Path;

use tar::{Builder, HeaderMode};
use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::rules::{walk_error, IgnoreRules};

/// version-control metadata excluded from every snapshot
pub const DEFAULT_EXCLUDES: &[&str] = &[".git"];

/// write a deterministic tar archive of `root` to `out`
///
/// entries are named relative to `root` (the root itself is the archive
/// base, not a member) and visited in lexicographic order so that
/// identical trees produce identical bytes. entries matching `rules` are
/// skipped, and an excluded directory's whole subtree with them.
/// headers use deterministic mode (constant mtime, no owner), symlinks
/// are stored as links. on error the output stream is left in an
/// undefined state.
pub fn write_archive<W: Write>(root: &Path, out: W, rules: &IgnoreRules) -> Result<()> {
    let meta = fs::metadata(root).map_err(|_| Error::RootNotFound(root.to_path_buf()))?;
    if !meta.is_dir() {
        return Err(Error::RootNotFound(root.to_path_buf()));
    }

    let mut builder = Builder::new(out);
    builder.mode(HeaderMode::Deterministic);
    builder.follow_symlinks(false);

    let mut it = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = it.next() {
        let entry = entry.map_err(walk_error)?;
        let path = entry.path();
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };

        if rules.ignored(rel, entry.file_type().is_dir()) {
            if entry.file_type().is_dir() {
                it.skip_current_dir();
            }
            continue;
        }

        builder.append_path_with_name(path, rel).with_path(path)?;
    }

    builder.finish().with_path(root)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn archive_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = tar::Archive::new(Cursor::new(bytes));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                e.unwrap()
                    .path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }

    fn build(root: &Path, globs: &[&str]) -> Vec<u8> {
        let rules = IgnoreRules::new(root, globs).unwrap();
        let mut out = Cursor::new(Vec::new());
        write_archive(root, &mut out, &rules).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_archives_tree_relative_to_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();
        fs::write(dir.path().join("src/deep/mod.rs"), "mod").unwrap();
        fs::write(dir.path().join("top.txt"), "top").unwrap();

        let names = archive_names(&build(dir.path(), &[]));
        assert_eq!(names, vec!["src", "src/deep", "src/deep/mod.rs", "top.txt"]);
    }

    #[test]
    fn test_excluded_directory_subtree_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let names = archive_names(&build(dir.path(), DEFAULT_EXCLUDES));
        assert_eq!(names, vec!["a.txt"]);
    }

    #[test]
    fn test_deterministic_bytes() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        assert_eq!(build(dir.path(), &[]), build(dir.path(), &[]));
    }

    #[test]
    fn test_missing_root() {
        let dir = tempdir().unwrap();
        let rules = IgnoreRules::globs_only(&[] as &[&str]).unwrap();
        let mut out = Cursor::new(Vec::new());
        let result = write_archive(&dir.path().join("nope"), &mut out, &rules);
        assert!(matches!(result, Err(Error::RootNotFound(_))));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let rules = IgnoreRules::globs_only(&[] as &[&str]).unwrap();
        let mut out = Cursor::new(Vec::new());
        let result = write_archive(&file, &mut out, &rules);
        assert!(matches!(result, Err(Error::RootNotFound(_))));
    }

    #[test]
    fn test_gitignore_rules_applied() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::write(dir.path().join("debug.log"), "noise").unwrap();
        fs::write(dir.path().join("keep.txt"), "data").unwrap();

        let names = archive_names(&build(dir.path(), &[]));
        assert_eq!(names, vec![".gitignore", "keep.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_stored_as_link() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("target.txt"), "t").unwrap();
        std::os::unix::fs::symlink("target.txt", dir.path().join("link")).unwrap();

        let bytes = build(dir.path(), &[]);
        let mut archive = tar::Archive::new(Cursor::new(bytes.as_slice()));
        let mut saw_link = false;
        for entry in archive.entries().unwrap() {
            let entry = entry.unwrap();
            if entry.path().unwrap() == Path::new("link") {
                assert_eq!(entry.header().entry_type(), tar::EntryType::Symlink);
                saw_link = true;
            }
        }
        assert!(saw_link);
    }
}
