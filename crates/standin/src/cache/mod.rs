//! Generation Cache: cross-invocation "already generated" records.
//!
//! The store is an append-only text file, one signature per line,
//! shared by every compilation pass of a multi-target build. Caching
//! is a pure optimization: any I/O failure degrades to a warning and
//! uncached generation, never to a missed generation.

mod snapshot;

pub use snapshot::{load_snapshot, write_snapshot};

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::signature::StructuralSignature;

/// On-disk, append-only signature store with an in-memory front.
///
/// Scoped to an explicit handle per build invocation, never a
/// process-wide singleton, so tests construct isolated instances.
///
/// Concurrent passes run as separate processes appending to the same
/// file; records are single short lines written through an `O_APPEND`
/// handle, and duplicate lines from racing writers are deduplicated
/// at load. Losing a race costs one redundant regeneration, never a
/// skipped one.
pub struct GenerationCache {
    path: PathBuf,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    seen: HashSet<String>,
    writer: Option<File>,
}

impl GenerationCache {
    /// Open the store at `path`, creating it (and parent directories)
    /// as needed. Never fails: an unwritable store logs a warning and
    /// the cache keeps working in memory only.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let mut seen = HashSet::new();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                for line in content.lines() {
                    let line = line.trim();
                    if !line.is_empty() {
                        seen.insert(line.to_string());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "cache store unreadable; generation proceeds uncached"
            ),
        }

        let writer = open_appender(&path);
        Self {
            path,
            inner: Mutex::new(CacheInner { seen, writer }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False iff this exact signature was committed by any prior
    /// pass, not necessarily the current one.
    pub fn needs_regeneration(&self, signature: &StructuralSignature) -> bool {
        !self.inner.lock().seen.contains(signature.as_str())
    }

    /// Commit a signature. Re-recording a known signature is a benign
    /// no-op; within one process the in-memory set guarantees the
    /// line is appended at most once.
    pub fn record_generation(&self, signature: &StructuralSignature) {
        let mut inner = self.inner.lock();
        if !inner.seen.insert(signature.as_str().to_string()) {
            debug!(signature = %signature, "signature already recorded");
            return;
        }
        if let Some(writer) = inner.writer.as_mut() {
            if let Err(e) = writeln!(writer, "{signature}") {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "cache append failed; further records stay in memory"
                );
                inner.writer = None;
            }
        }
    }

    /// Number of distinct recorded signatures.
    pub fn len(&self) -> usize {
        self.inner.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().seen.is_empty()
    }

    /// Drop every record, on disk and in memory. The only supported
    /// invalidation besides a per-signature change.
    pub fn wipe(&self) {
        let mut inner = self.inner.lock();
        inner.seen.clear();
        inner.writer = None;
        if let Err(e) = File::create(&self.path) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "cache wipe could not truncate the store"
            );
            return;
        }
        inner.writer = open_appender(&self.path);
    }
}

fn open_appender(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "cache directory unavailable; generation proceeds uncached"
                );
                return None;
            }
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "cache store unwritable; generation proceeds uncached"
            );
            None
        }
    }
}
