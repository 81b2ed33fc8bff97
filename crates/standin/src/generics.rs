//! Generic Scoping Resolver: a representation strategy per type
//! variable.
//!
//! Declaration-scoped parameters stay fully generic end-to-end
//! (Preserve): the fake, its configuration, and its factory keep the
//! real type. Member-scoped parameters cannot appear in a field type,
//! so their stored behavior is typed at the nearest bound and cast
//! back at the override (Erase-and-Cast). Declarations mixing both
//! scopes apply both strategies independently per parameter.

use std::collections::BTreeMap;

use crate::model::{GenericParameter, GenericScope, Member, TypeCategory, TypeDeclaration, TypeRef};

/// How a generic parameter is represented in the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericStrategy {
    /// Keep the real type everywhere; zero erasure.
    Preserve,
    /// Store behavior at the bound; cast at the member boundary.
    EraseAndCast {
        /// The nearest explicit bound, or `Any?`.
        bound: TypeRef,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGeneric {
    pub name: String,
    pub scope: GenericScope,
    pub strategy: GenericStrategy,
}

/// Per-declaration resolution of every generic parameter. Member
/// entries are keyed by their owning member so a member-scoped `T`
/// shadows a declaration-scoped one inside that member only.
#[derive(Debug, Clone, Default)]
pub struct GenericResolution {
    declaration: BTreeMap<String, ResolvedGeneric>,
    members: BTreeMap<String, BTreeMap<String, ResolvedGeneric>>,
}

/// Decide a strategy for every generic parameter of `decl`.
pub fn resolve(decl: &TypeDeclaration) -> GenericResolution {
    let mut resolution = GenericResolution::default();

    for g in &decl.generics {
        resolution.declaration.insert(
            g.name.clone(),
            ResolvedGeneric {
                name: g.name.clone(),
                scope: GenericScope::Declaration,
                strategy: GenericStrategy::Preserve,
            },
        );
    }

    for member in &decl.members {
        for g in &member.generics {
            resolution
                .members
                .entry(member.name.clone())
                .or_default()
                .insert(
                    g.name.clone(),
                    ResolvedGeneric {
                        name: g.name.clone(),
                        scope: GenericScope::Member,
                        strategy: GenericStrategy::EraseAndCast {
                            bound: nearest_bound(g),
                        },
                    },
                );
        }
    }

    resolution
}

/// First explicit bound, or the universal top type.
fn nearest_bound(param: &GenericParameter) -> TypeRef {
    param
        .bounds
        .iter()
        .find(|b| !is_implicit_top(b))
        .cloned()
        .unwrap_or_else(TypeRef::top)
}

/// `Any?` carries no information; `Any` (non-null) does.
fn is_implicit_top(ty: &TypeRef) -> bool {
    ty.qualified_name == "kotlin.Any" && ty.nullable && ty.arguments.is_empty()
}

/// Explicit bounds in declaration order, with the implicit top bound
/// stripped.
pub fn explicit_bounds(param: &GenericParameter) -> Vec<String> {
    param
        .bounds
        .iter()
        .filter(|b| !is_implicit_top(b))
        .map(TypeRef::render)
        .collect()
}

/// Explicit bounds joined in declaration order, with the implicit
/// top bound stripped. `None` when nothing remains.
pub fn format_bounds(param: &GenericParameter) -> Option<String> {
    let bounds = explicit_bounds(param);
    if bounds.is_empty() {
        None
    } else {
        Some(bounds.join(", "))
    }
}

impl GenericResolution {
    /// Look up a variable, with the member's own parameters shadowing
    /// declaration-scoped ones.
    pub fn lookup(&self, member: Option<&str>, name: &str) -> Option<&ResolvedGeneric> {
        if let Some(member) = member {
            if let Some(found) = self.members.get(member).and_then(|m| m.get(name)) {
                return Some(found);
            }
        }
        self.declaration.get(name)
    }

    pub fn is_erased(&self, member: Option<&str>, name: &str) -> bool {
        matches!(
            self.lookup(member, name).map(|r| &r.strategy),
            Some(GenericStrategy::EraseAndCast { .. })
        )
    }

    /// The type a behavior field stores for `ty` inside `member`:
    /// erased variables replaced by their bound, recursively.
    pub fn storage_type(&self, member: Option<&str>, ty: &TypeRef) -> TypeRef {
        if ty.category == TypeCategory::GenericVar {
            if let Some(ResolvedGeneric {
                strategy: GenericStrategy::EraseAndCast { bound },
                ..
            }) = self.lookup(member, &ty.qualified_name)
            {
                let mut stored = bound.clone();
                stored.nullable = stored.nullable || ty.nullable;
                return stored;
            }
            return ty.clone();
        }
        let mut out = ty.clone();
        out.arguments = ty
            .arguments
            .iter()
            .map(|arg| self.storage_type(member, arg))
            .collect();
        out
    }

    /// True when `ty` mentions an erased variable anywhere, meaning
    /// the member boundary needs a cast.
    pub fn mentions_erased(&self, member: Option<&str>, ty: &TypeRef) -> bool {
        if ty.category == TypeCategory::GenericVar {
            return self.is_erased(member, &ty.qualified_name);
        }
        ty.arguments
            .iter()
            .any(|arg| self.mentions_erased(member, arg))
    }

    /// True when any parameter or the return type of `member` is
    /// stored erased.
    pub fn member_requires_cast(&self, member: &Member) -> bool {
        let ctx = Some(member.name.as_str());
        member
            .parameters
            .iter()
            .any(|p| self.mentions_erased(ctx, &p.ty))
            || self.mentions_erased(ctx, &member.return_type)
    }
}
