use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::model::types::{DeclarationKind, MemberKind};

/// A candidate declaration exactly as the discovery collaborator
/// hands it over, before analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDeclaration {
    /// Fully qualified name.
    pub name: String,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub generics: Vec<RawGenericParameter>,
    #[serde(default)]
    pub members: Vec<RawMember>,
    /// Classes only.
    #[serde(default)]
    pub constructors: Vec<RawConstructor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGenericParameter {
    pub name: String,
    /// Explicit upper bounds as type strings, in declaration order.
    #[serde(default)]
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMember {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    /// Function return type; omitted means `Unit`.
    #[serde(default)]
    pub returns: Option<String>,
    /// Property type.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    /// `var` vs `val` (properties).
    #[serde(default)]
    pub mutable: bool,
    #[serde(default)]
    pub suspend: bool,
    #[serde(default)]
    pub inline: bool,
    /// Member-scoped generic parameters (functions).
    #[serde(default)]
    pub generics: Vec<RawGenericParameter>,
    /// Declared on a supertype rather than this declaration.
    #[serde(default)]
    pub inherited: bool,
    /// Has an open default body the fake can delegate to.
    #[serde(default)]
    pub has_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub vararg: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConstructor {
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

/// Parse a YAML declaration file into a [`RawDeclaration`].
///
/// # Errors
///
/// Returns [`ParseError::Io`] if the file cannot be read, or
/// [`ParseError::Yaml`] if the YAML is malformed.
pub fn parse_declaration(path: &Path) -> Result<RawDeclaration, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_declaration_str(&content)
}

/// Parse a YAML declaration from a string.
pub fn parse_declaration_str(yaml: &str) -> Result<RawDeclaration, ParseError> {
    let raw: RawDeclaration = serde_yaml::from_str(yaml)?;
    Ok(raw)
}
