//! Structural Signature Builder: deterministic declaration
//! fingerprints for cache invalidation.
//!
//! The structural form hashes every field of the model in a stable,
//! order-preserving traversal, so cosmetic source differences never
//! invalidate while any structural change does.
//!
//! Included fields:
//! - qualified name and kind
//! - generic parameters (name, scope, bounds, in declaration order)
//! - members (name, kind, parameters with type + nullability +
//!   vararg, return type, mutability, suspend/inline flags, own
//!   generics with bounds, own/inherited and abstract/open partition)
//! - constructor parameters (classes)
//!
//! Excluded: everything cosmetic. Whitespace, comments, and ordering of
//! unrelated declarations in the same file never reach the model.
//!
//! The coarser whole-source content hash is available as a
//! conservative fallback that invalidates on any byte change.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::{GenericParameter, GenericScope, Member, MemberKind, TypeDeclaration};

/// Hex-encoded SHA-256 fingerprint of a declaration's shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuralSignature(String);

impl StructuralSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StructuralSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which fingerprint feeds the generation cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureStrategy {
    /// Fingerprint of the structural model. Production default:
    /// cosmetic changes never invalidate.
    #[default]
    Structural,
    /// Whole-source content hash. Invalidates on any byte change.
    Content,
}

impl std::fmt::Display for SignatureStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structural => write!(f, "structural"),
            Self::Content => write!(f, "content"),
        }
    }
}

// Record and field separators for the hash feed; they cannot occur in
// identifiers or rendered types, so field boundaries stay unambiguous.
const RS: &[u8] = b"\x1e";
const FS: &[u8] = b"\x1f";

/// Compute the structural fingerprint of a declaration.
pub fn structural_signature(decl: &TypeDeclaration) -> StructuralSignature {
    let mut hasher = Sha256::new();
    hasher.update(b"standin:sig:v1");

    hasher.update(RS);
    hasher.update(decl.qualified_name.as_bytes());
    hasher.update(FS);
    hasher.update(decl.kind.to_string().as_bytes());

    for g in &decl.generics {
        hash_generic(&mut hasher, g);
    }
    for m in &decl.members {
        hash_member(&mut hasher, m);
    }
    if let Some(ctor) = &decl.constructor {
        hasher.update(RS);
        hasher.update(b"ctor");
        hasher.update(FS);
        hasher.update([u8::from(ctor.primary)]);
        for p in &ctor.parameters {
            hasher.update(FS);
            hasher.update(p.name.as_bytes());
            hasher.update(FS);
            hasher.update(p.ty.render().as_bytes());
        }
    }

    StructuralSignature(hex::encode(hasher.finalize()))
}

fn hash_generic(hasher: &mut Sha256, g: &GenericParameter) {
    hasher.update(RS);
    hasher.update(b"gen");
    hasher.update(FS);
    hasher.update(g.name.as_bytes());
    hasher.update(FS);
    hasher.update([match g.scope {
        GenericScope::Declaration => b'd',
        GenericScope::Member => b'm',
    }]);
    for b in &g.bounds {
        hasher.update(FS);
        hasher.update(b.render().as_bytes());
    }
}

fn hash_member(hasher: &mut Sha256, m: &Member) {
    hasher.update(RS);
    hasher.update(b"member");
    hasher.update(FS);
    hasher.update(m.name.as_bytes());
    hasher.update(FS);
    hasher.update([match m.kind {
        MemberKind::Function => b'f',
        MemberKind::Property => b'p',
    }]);

    let flags = u8::from(m.mutable)
        | u8::from(m.is_suspend) << 1
        | u8::from(m.is_inline) << 2
        | u8::from(m.inherited) << 3
        | u8::from(m.has_default) << 4;
    hasher.update([flags]);

    for p in &m.parameters {
        hasher.update(FS);
        hasher.update(p.name.as_bytes());
        hasher.update(FS);
        hasher.update(p.ty.render().as_bytes());
        hasher.update([u8::from(p.vararg)]);
    }
    hasher.update(FS);
    hasher.update(m.return_type.render().as_bytes());

    for g in &m.generics {
        hash_generic(hasher, g);
    }
}

/// Fingerprint of a whole source unit, the conservative fallback.
pub fn content_signature(source: &str) -> StructuralSignature {
    let mut hasher = Sha256::new();
    hasher.update(b"standin:content:v1");
    hasher.update(source.as_bytes());
    StructuralSignature(hex::encode(hasher.finalize()))
}

/// Combined fingerprint of an ordered batch; keys the model snapshot.
pub fn aggregate_signature(signatures: &[StructuralSignature]) -> StructuralSignature {
    let mut hasher = Sha256::new();
    hasher.update(b"standin:aggregate:v1");
    for sig in signatures {
        hasher.update(RS);
        hasher.update(sig.as_str().as_bytes());
    }
    StructuralSignature(hex::encode(hasher.finalize()))
}
