//! snaptree - content-addressed tar snapshots of local directory trees
//!
//! packages a directory into a deterministic tar archive, filtered by
//! gitignore-style exclusion rules, and addresses the result by the
//! SHA-256 of its bytes.
//!
//! # Core concepts
//!
//! - **LocalRepo**: a handle for a snapshot source (directory + stable id)
//! - **IgnoreRules**: caller globs plus `.gitignore` files under the root
//! - **SnapshotKey**: content-addressed storage key, `code/local/<sha256>.tar`
//!
//! identical trees always produce identical archive bytes, so identical
//! keys; any content change changes the key.
//!
//! # Example usage
//!
//! ```no_run
//! use snaptree::{LocalRepo, RepoSource};
//! use std::io::Cursor;
//! use std::path::PathBuf;
//!
//! let repo = LocalRepo::new(None, RepoSource::Dir(PathBuf::from("/src/project")));
//! let mut out = Cursor::new(Vec::new());
//! let key = repo.snapshot(&mut out).unwrap();
//! println!("{}", key);
//! ```

mod archive;
mod config;
mod error;
mod hash;
mod repo;
mod rules;
mod slug;

pub use archive::{write_archive, DEFAULT_EXCLUDES};
pub use config::Config;
pub use error::{Error, Result};
pub use hash::{digest_bytes, digest_reader, Digest};
pub use rules::IgnoreRules;
pub use repo::{LocalRepo, LocalRepoData, RepoSource, SnapshotKey};
pub use slug::{repo_id_from_dir, slugify};
