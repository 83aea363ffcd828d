//! Content-signature rebuild decisions.
//!
//! A build step records the signature a dependency had when its dependents
//! were last built. [`ContentSignatureDecider`] compares that record against
//! the dependency's current content hash. Hashes are computed at most once per
//! path for the lifetime of the decider, which lives for one build invocation.
//!
//! # Example
//!
//! ```
//! use confprobe::decider::{ContentSignatureDecider, Decision};
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let dep = dir.path().join("input.c");
//! let target = dir.path().join("input.o");
//! fs::write(&dep, "int x;").unwrap();
//! fs::write(&target, "").unwrap();
//!
//! let mut decider = ContentSignatureDecider::new();
//! assert_eq!(decider.decide(&dep, &target, None).unwrap(), Decision::Changed);
//!
//! let sig = decider.signature(&dep).unwrap();
//! assert_eq!(decider.decide(&dep, &target, Some(&sig)).unwrap(), Decision::Unchanged);
//! ```

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Whether a dependency's dependents need rebuilding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Changed,
    Unchanged,
}

impl Decision {
    pub fn is_changed(self) -> bool {
        self == Decision::Changed
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Changed => f.write_str("changed"),
            Decision::Unchanged => f.write_str("unchanged"),
        }
    }
}

/// A dependency path and the signature observed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureRecord {
    pub path: PathBuf,
    pub signature: String,
}

/// Decides rebuilds from content signatures, caching each path's hash.
#[derive(Debug, Default)]
pub struct ContentSignatureDecider {
    seen: HashMap<PathBuf, String>,
}

impl ContentSignatureDecider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The content signature of `path`, hashing it on first use.
    pub fn signature(&mut self, path: &Path) -> Result<String> {
        if let Some(sig) = self.seen.get(path) {
            return Ok(sig.clone());
        }

        let sig = content_signature(path)?;
        tracing::debug!("Signature for {}: {}", path.display(), sig);
        self.seen.insert(path.to_path_buf(), sig.clone());
        Ok(sig)
    }

    /// Decide whether `target` must be rebuilt because of `dep`.
    ///
    /// `prev` is the signature recorded for `dep` at the last build, if any.
    pub fn decide(&mut self, dep: &Path, target: &Path, prev: Option<&str>) -> Result<Decision> {
        let current = self.signature(dep)?;

        let Some(prev) = prev else {
            return Ok(Decision::Changed);
        };

        if !target.exists() {
            return Ok(Decision::Changed);
        }

        if current != prev {
            return Ok(Decision::Changed);
        }

        Ok(Decision::Unchanged)
    }

    /// Whether `path` has been hashed in this run.
    pub fn has_seen(&self, path: &Path) -> bool {
        self.seen.contains_key(path)
    }

    /// Every signature computed so far, sorted by path.
    pub fn records(&self) -> Vec<SignatureRecord> {
        let mut records: Vec<_> = self
            .seen
            .iter()
            .map(|(path, signature)| SignatureRecord {
                path: path.clone(),
                signature: signature.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn content_signature(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
