use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// exclusion rules for a single directory tree
///
/// two layers: explicit globs supplied by the caller (always excluded,
/// never overridable) and `.gitignore` files discovered under the root
/// (full gitignore semantics including negation).
pub struct IgnoreRules {
    globs: Vec<glob::Pattern>,
    gitignore: Option<Gitignore>,
}

impl IgnoreRules {
    /// compile rules for `root` from explicit globs plus any `.gitignore`
    /// files found in the tree
    pub fn new<S: AsRef<str>>(root: &Path, globs: &[S]) -> Result<Self> {
        let mut rules = Self {
            globs: compile_globs(globs)?,
            gitignore: None,
        };
        rules.gitignore = rules.load_ignore_files(root)?;
        Ok(rules)
    }

    /// rules with no ignore-file discovery, explicit globs only
    pub fn globs_only<S: AsRef<str>>(globs: &[S]) -> Result<Self> {
        Ok(Self {
            globs: compile_globs(globs)?,
            gitignore: None,
        })
    }

    /// should the entry at `rel` (relative to the tree root) be excluded?
    ///
    /// explicit globs win over everything, including gitignore negation.
    pub fn ignored(&self, rel: &Path, is_dir: bool) -> bool {
        if self.matches_glob(rel) {
            return true;
        }
        match &self.gitignore {
            Some(gi) => gi.matched(rel, is_dir).is_ignore(),
            None => false,
        }
    }

    // explicit globs follow gitignore basename semantics: a pattern
    // without a separator matches the entry name at any depth
    fn matches_glob(&self, rel: &Path) -> bool {
        self.globs.iter().any(|p| {
            p.matches_path(rel)
                || rel
                    .file_name()
                    .is_some_and(|n| p.matches(&n.to_string_lossy()))
        })
    }

    fn load_ignore_files(&self, root: &Path) -> Result<Option<Gitignore>> {
        let files = self.find_ignore_files(root)?;
        if files.is_empty() {
            return Ok(None);
        }

        let mut builder = GitignoreBuilder::new(root);
        for file in files {
            if let Some(err) = builder.add(&file) {
                return Err(Error::Ignore(err));
            }
        }
        Ok(Some(builder.build()?))
    }

    // collect .gitignore files, skipping subtrees the explicit globs
    // already exclude (a .gitignore under .git must not contribute rules)
    fn find_ignore_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut it = WalkDir::new(root).sort_by_file_name().into_iter();
        while let Some(entry) = it.next() {
            let entry = entry.map_err(walk_error)?;
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            if entry.file_type().is_dir() {
                if !rel.as_os_str().is_empty() && self.matches_glob(rel) {
                    it.skip_current_dir();
                }
                continue;
            }
            if entry.file_name() == ".gitignore" && !self.matches_glob(rel) {
                files.push(entry.path().to_path_buf());
            }
        }
        Ok(files)
    }
}

fn compile_globs<S: AsRef<str>>(globs: &[S]) -> Result<Vec<glob::Pattern>> {
    globs
        .iter()
        .map(|g| {
            glob::Pattern::new(g.as_ref())
                .map_err(|_| Error::InvalidPattern(g.as_ref().to_string()))
        })
        .collect()
}

pub(crate) fn walk_error(err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("<walk>"));
    Error::Io {
        path,
        source: err.into(),
    }
}
