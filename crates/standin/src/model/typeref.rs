//! Parsing of Kotlin type strings into [`TypeRef`] values.
//!
//! Raw declarations spell types as source text (`List<String>?`,
//! `(T) -> T`, `kotlinx.coroutines.flow.Flow<User>`). This module
//! turns them into structural references with a resolved category.
//! Category resolution needs to know which names are in-scope generic
//! variables, so the caller passes the current scope set.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::types::{PrimitiveKind, TypeCategory, TypeRef};

/// A type string that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed type `{0}`")]
pub struct TypeParseError(pub String);

/// Parse a Kotlin type string. `scope` holds the names of generic
/// parameters visible at this point (declaration-scoped plus the
/// current member's own).
pub fn parse_type(src: &str, scope: &HashSet<String>) -> Result<TypeRef, TypeParseError> {
    let s = src.trim();
    if s.is_empty() {
        return Err(TypeParseError(src.to_string()));
    }

    // Function type: a top-level `->` splits parameters from result.
    // The result type extends to the end of the string, so this is
    // checked before the nullability suffix.
    if let Some(arrow) = find_top_level_arrow(s) {
        let (left, right) = (s[..arrow].trim(), s[arrow + 2..].trim());
        let params_src = left
            .strip_prefix('(')
            .and_then(|l| l.strip_suffix(')'))
            .ok_or_else(|| TypeParseError(src.to_string()))?;
        let mut parameters = Vec::new();
        for part in split_top_level_commas(params_src) {
            parameters.push(parse_type(part, scope)?);
        }
        let result = parse_type(right, scope)?;
        return Ok(TypeRef::function(parameters, result));
    }

    // Nullability suffix.
    if let Some(prefix) = s.strip_suffix('?') {
        let mut inner = parse_type(prefix, scope)?;
        inner.nullable = true;
        return Ok(inner);
    }

    // Parenthesized grouping, e.g. the inner part of `(() -> Unit)?`.
    if let Some(grouped) = strip_full_parens(s) {
        return parse_type(grouped, scope);
    }

    // Plain (possibly parameterized) name.
    let (name, arguments) = match s.find('<') {
        Some(open) => {
            let name = &s[..open];
            let rest = &s[open + 1..];
            let close = rest
                .rfind('>')
                .ok_or_else(|| TypeParseError(src.to_string()))?;
            if !rest[close + 1..].trim().is_empty() {
                return Err(TypeParseError(src.to_string()));
            }
            let mut args = Vec::new();
            for part in split_top_level_commas(&rest[..close]) {
                args.push(parse_type(part, scope)?);
            }
            (name, args)
        }
        None => (s, Vec::new()),
    };

    // Variance markers on arguments (`out T`) are recorded without the
    // projection; strip the keyword here.
    let name = name
        .trim()
        .strip_prefix("out ")
        .or_else(|| name.trim().strip_prefix("in "))
        .unwrap_or(name.trim());

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '_') {
        return Err(TypeParseError(src.to_string()));
    }

    if scope.contains(name) {
        if !arguments.is_empty() {
            return Err(TypeParseError(src.to_string()));
        }
        return Ok(TypeRef {
            qualified_name: name.to_string(),
            nullable: false,
            arguments,
            category: TypeCategory::GenericVar,
        });
    }

    let qualified = qualify(name);
    let category = categorize(&qualified);
    Ok(TypeRef {
        qualified_name: qualified,
        nullable: false,
        arguments,
        category,
    })
}

/// Byte offset of a `->` outside all brackets and parens, if any.
fn find_top_level_arrow(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        if depth == 0 && bytes[i] == b'-' && bytes.get(i + 1) == Some(&b'>') {
            return Some(i);
        }
        match bytes[i] {
            b'<' | b'(' => depth += 1,
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth -= 1,
            b')' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on commas outside all brackets and parens.
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'(' => depth += 1,
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth -= 1,
            b')' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// If the whole string is one parenthesized group, return the inside.
fn strip_full_parens(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let bytes = inner.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'(' => depth += 1,
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth -= 1,
            b')' => depth -= 1,
            _ => {}
        }
        // The leading paren must not close before the end.
        if depth < 0 {
            return None;
        }
    }
    Some(inner)
}

/// Expand well-known short names to their qualified form. Anything
/// with a dot, and anything unknown, is kept verbatim.
fn qualify(name: &str) -> String {
    if name.contains('.') {
        return name.to_string();
    }
    let qualified = match name {
        "String" | "Int" | "Long" | "Float" | "Double" | "Boolean" | "Unit" | "Any"
        | "Array" | "Result" => return format!("kotlin.{name}"),
        "List" | "MutableList" | "Set" | "MutableSet" | "Map" | "MutableMap" | "Collection"
        | "Iterable" => return format!("kotlin.collections.{name}"),
        "Flow" => "kotlinx.coroutines.flow.Flow",
        "Deferred" => "kotlinx.coroutines.Deferred",
        other => other,
    };
    qualified.to_string()
}

fn categorize(qualified: &str) -> TypeCategory {
    match qualified {
        "kotlin.String" => TypeCategory::Primitive(PrimitiveKind::Text),
        "kotlin.Int" => TypeCategory::Primitive(PrimitiveKind::Int),
        "kotlin.Long" => TypeCategory::Primitive(PrimitiveKind::Long),
        "kotlin.Float" => TypeCategory::Primitive(PrimitiveKind::Float),
        "kotlin.Double" => TypeCategory::Primitive(PrimitiveKind::Double),
        "kotlin.Boolean" => TypeCategory::Primitive(PrimitiveKind::Boolean),
        "kotlin.Unit" => TypeCategory::Primitive(PrimitiveKind::Unit),
        "kotlin.collections.List"
        | "kotlin.collections.MutableList"
        | "kotlin.collections.Set"
        | "kotlin.collections.MutableSet"
        | "kotlin.collections.Collection"
        | "kotlin.collections.Iterable" => TypeCategory::Collection,
        "kotlin.collections.Map" | "kotlin.collections.MutableMap" => TypeCategory::Map,
        "kotlin.Array" => TypeCategory::Array,
        "kotlinx.coroutines.flow.Flow" | "kotlinx.coroutines.Deferred" => {
            TypeCategory::AsyncWrapper
        }
        "kotlin.Result" => TypeCategory::ResultWrapper,
        _ => TypeCategory::Custom,
    }
}
