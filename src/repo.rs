use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::{write_archive, DEFAULT_EXCLUDES};
use crate::error::{Error, IoResultExt, Result};
use crate::hash::{digest_reader, Digest};
use crate::rules::IgnoreRules;
use crate::slug::repo_id_from_dir;

/// pre-built record describing a local repository
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRepoData {
    pub repo_dir: PathBuf,
}

impl LocalRepoData {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

/// where a snapshot handle comes from: a directory on disk or a
/// pre-built repo record
#[derive(Clone, Debug)]
pub enum RepoSource {
    Dir(PathBuf),
    Data(LocalRepoData),
}

/// handle for a local repository snapshot source
///
/// the identifier is either caller-supplied (kept verbatim) or derived
/// deterministically from the directory path. construction always
/// produces a fully resolved handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalRepo {
    repo_id: String,
    data: LocalRepoData,
}

impl LocalRepo {
    /// construct a handle from an explicit source
    pub fn new(repo_id: Option<String>, source: RepoSource) -> Self {
        let data = match source {
            RepoSource::Dir(dir) => LocalRepoData::new(dir),
            RepoSource::Data(data) => data,
        };
        let repo_id = repo_id.unwrap_or_else(|| repo_id_from_dir(&data.repo_dir));
        Self { repo_id, data }
    }

    /// resolve a handle from loose optional values
    ///
    /// a directory wins over repo data when both are given; neither is an
    /// error.
    pub fn resolve(
        repo_id: Option<String>,
        repo_dir: Option<PathBuf>,
        repo_data: Option<LocalRepoData>,
    ) -> Result<Self> {
        let source = match (repo_dir, repo_data) {
            (Some(dir), _) => RepoSource::Dir(dir),
            (None, Some(data)) => RepoSource::Data(data),
            (None, None) => return Err(Error::NoRepoData),
        };
        Ok(Self::new(repo_id, source))
    }

    /// stable, filesystem/url-safe identifier
    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// directory this handle snapshots
    pub fn repo_dir(&self) -> &Path {
        &self.data.repo_dir
    }

    /// underlying repo record
    pub fn data(&self) -> &LocalRepoData {
        &self.data
    }

    /// snapshot the repository into `out` and return its storage key
    ///
    /// writes the archive (version-control metadata excluded), rewinds,
    /// hashes the bytes, and composes the content-addressed key. the
    /// bytes hashed and the bytes left in `out` are the same; any error
    /// means no key and an unusable stream.
    pub fn snapshot<F: Read + Write + Seek>(&self, out: &mut F) -> Result<SnapshotKey> {
        self.snapshot_with_excludes(out, &[] as &[&str])
    }

    /// snapshot with extra exclusion globs on top of the defaults
    pub fn snapshot_with_excludes<F, S>(&self, out: &mut F, extra: &[S]) -> Result<SnapshotKey>
    where
        F: Read + Write + Seek,
        S: AsRef<str>,
    {
        if !self.repo_dir().is_dir() {
            return Err(Error::RootNotFound(self.repo_dir().to_path_buf()));
        }

        let mut globs: Vec<&str> = DEFAULT_EXCLUDES.to_vec();
        globs.extend(extra.iter().map(AsRef::as_ref));

        let rules = IgnoreRules::new(self.repo_dir(), &globs)?;
        write_archive(self.repo_dir(), &mut *out, &rules)?;

        out.seek(SeekFrom::Start(0)).with_path(self.repo_dir())?;
        let digest = digest_reader(out)?;
        Ok(SnapshotKey::new(&digest))
    }
}

/// content-addressed storage key for a snapshot archive
///
/// format `code/local/<sha256-hex>.tar`; external consumers depend on
/// the exact prefix, digest, and extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    pub fn new(digest: &Digest) -> Self {
        Self(format!("code/local/{}.tar", digest.to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// digest component of the key
    pub fn digest(&self) -> Result<Digest> {
        let hex = self
            .0
            .strip_prefix("code/local/")
            .and_then(|s| s.strip_suffix(".tar"))
            .ok_or_else(|| Error::InvalidDigestHex(self.0.clone()))?;
        Digest::from_hex(hex)
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
