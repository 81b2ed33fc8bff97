//! Optional model snapshot for skipping re-analysis across passes.
//!
//! Where the line store only skips emission, the snapshot persists
//! the full set of analyzed models so a later pass can skip the
//! analyzer too, provided the batch's aggregate signature still
//! matches. Storage traded for the more expensive traversal.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::TypeDeclaration;
use crate::signature::StructuralSignature;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    aggregate: StructuralSignature,
    declarations: Vec<TypeDeclaration>,
}

/// Write a snapshot of analyzed models keyed by the batch aggregate.
///
/// # Errors
///
/// Returns `io::Error` if serialization or the write fails.
pub fn write_snapshot(
    path: &Path,
    aggregate: &StructuralSignature,
    declarations: &[TypeDeclaration],
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = SnapshotFile {
        aggregate: aggregate.clone(),
        declarations: declarations.to_vec(),
    };
    let json = serde_json::to_vec(&file)?;
    std::fs::write(path, json)
}

/// Load the snapshot if it exists, parses, and its aggregate matches
/// `expected`. Any mismatch or corruption means a fresh analysis,
/// never an error.
pub fn load_snapshot(
    path: &Path,
    expected: &StructuralSignature,
) -> Option<Vec<TypeDeclaration>> {
    let bytes = std::fs::read(path).ok()?;
    let file: SnapshotFile = serde_json::from_slice(&bytes).ok()?;
    (file.aggregate == *expected).then_some(file.declarations)
}
