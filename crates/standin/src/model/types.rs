use serde::{Deserialize, Serialize};

use crate::defaults::DefaultValueExpression;

/// Kind of a fakeable type contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Interface,
    OpenClass,
    AbstractClass,
    /// Kotlin `object`, a shared global instance. Always rejected by
    /// the analyzer: faking a singleton leaks state across tests.
    Object,
}

impl DeclarationKind {
    /// True for kinds whose fake extends a superclass (and therefore
    /// must satisfy its constructor).
    pub fn is_class(self) -> bool {
        matches!(self, Self::OpenClass | Self::AbstractClass)
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Interface => "interface",
            Self::OpenClass => "open_class",
            Self::AbstractClass => "abstract_class",
            Self::Object => "object",
        };
        write!(f, "{s}")
    }
}

/// Where a generic parameter was introduced.
///
/// The scope is fixed at analysis time and never reclassified; it
/// decides the representation strategy the scoping resolver picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericScope {
    /// Declared on the type itself; visible in every member.
    Declaration,
    /// Declared on a single function; visible only inside it.
    Member,
}

/// A type variable with its explicit upper bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
    /// Explicit bounds in declaration order. Empty means only the
    /// implicit `Any?` top bound.
    pub bounds: Vec<TypeRef>,
    pub scope: GenericScope,
}

/// Primitive categories with a fixed literal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Text,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Unit,
}

/// Closed set of type categories the default-value mapper dispatches
/// over. Kept closed (not an open trait hierarchy) so the mapper's
/// match stays exhaustive when a category is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Primitive(PrimitiveKind),
    Collection,
    Map,
    Array,
    AsyncWrapper,
    ResultWrapper,
    Function,
    /// A reference to an in-scope generic parameter.
    GenericVar,
    Custom,
}

/// A resolved type usage. Compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Fully qualified name. For [`TypeCategory::Function`] this is
    /// the synthetic `kotlin.Function` and `arguments` holds the
    /// parameter types followed by the result type.
    pub qualified_name: String,
    pub nullable: bool,
    pub arguments: Vec<TypeRef>,
    pub category: TypeCategory,
}

impl TypeRef {
    /// A non-null custom reference with no generic arguments.
    pub fn custom(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            nullable: false,
            arguments: Vec::new(),
            category: TypeCategory::Custom,
        }
    }

    /// The `kotlin.Unit` type.
    pub fn unit() -> Self {
        Self {
            qualified_name: "kotlin.Unit".to_string(),
            nullable: false,
            arguments: Vec::new(),
            category: TypeCategory::Primitive(PrimitiveKind::Unit),
        }
    }

    /// The universal top type `kotlin.Any?`.
    pub fn top() -> Self {
        Self {
            qualified_name: "kotlin.Any".to_string(),
            nullable: true,
            arguments: Vec::new(),
            category: TypeCategory::Custom,
        }
    }

    /// A function type `(arguments...) -> result`.
    pub fn function(parameters: Vec<TypeRef>, result: TypeRef) -> Self {
        let mut arguments = parameters;
        arguments.push(result);
        Self {
            qualified_name: "kotlin.Function".to_string(),
            nullable: false,
            arguments,
            category: TypeCategory::Function,
        }
    }

    /// Last path segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Parameter types of a function type (everything but the result).
    pub fn function_parameters(&self) -> &[TypeRef] {
        debug_assert_eq!(self.category, TypeCategory::Function);
        let n = self.arguments.len();
        &self.arguments[..n.saturating_sub(1)]
    }

    /// Result type of a function type.
    pub fn function_result(&self) -> Option<&TypeRef> {
        debug_assert_eq!(self.category, TypeCategory::Function);
        self.arguments.last()
    }

    /// Render as Kotlin source. Well-known `kotlin.*` prefixes are
    /// dropped (the compiler imports them implicitly); everything else
    /// stays fully qualified.
    pub fn render(&self) -> String {
        if self.category == TypeCategory::Function {
            let params: Vec<String> = self
                .function_parameters()
                .iter()
                .map(TypeRef::render)
                .collect();
            let result = self
                .function_result()
                .map_or_else(|| "Unit".to_string(), TypeRef::render);
            let core = format!("({}) -> {result}", params.join(", "));
            if self.nullable {
                return format!("({core})?");
            }
            return core;
        }

        let mut out = String::from(display_name(&self.qualified_name));
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(TypeRef::render).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        if self.nullable {
            out.push('?');
        }
        out
    }
}

/// Strip implicitly imported package prefixes for rendering.
fn display_name(qualified: &str) -> &str {
    const IMPLICIT: [&str; 4] = [
        "kotlin.collections.",
        "kotlinx.coroutines.flow.",
        "kotlinx.coroutines.",
        "kotlin.",
    ];
    for prefix in IMPLICIT {
        if let Some(rest) = qualified.strip_prefix(prefix) {
            // Only strip when what remains is a bare name, so nested
            // packages under kotlin.* stay qualified.
            if !rest.contains('.') {
                return rest;
            }
        }
    }
    qualified
}

/// A function (or constructor) parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub vararg: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    #[default]
    Function,
    Property,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Property => write!(f, "property"),
        }
    }
}

/// A function or property belonging to exactly one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    /// Empty for properties.
    pub parameters: Vec<Parameter>,
    /// Return type for functions; the property type for properties.
    pub return_type: TypeRef,
    /// `var` vs `val`; functions are never mutable.
    pub mutable: bool,
    pub is_suspend: bool,
    pub is_inline: bool,
    /// Member-scoped generic parameters (functions only).
    pub generics: Vec<GenericParameter>,
    /// Declared on a supertype rather than the declaration itself.
    pub inherited: bool,
    /// Carries a default (open) body the fake can delegate to.
    pub has_default: bool,
}

impl Member {
    pub fn is_function(&self) -> bool {
        self.kind == MemberKind::Function
    }

    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    /// True when the fake must supply behavior because no inherited
    /// body exists.
    pub fn requires_implementation(&self) -> bool {
        !self.has_default
    }
}

/// A class constructor the synthetic subclass must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub parameters: Vec<Parameter>,
    pub primary: bool,
}

/// The structural model of a fakeable contract. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub qualified_name: String,
    pub kind: DeclarationKind,
    /// Declaration-scoped generic parameters, in declaration order.
    pub generics: Vec<GenericParameter>,
    /// Own and inherited members as one flat list; the own/inherited
    /// and abstract/open partitions live on each [`Member`].
    pub members: Vec<Member>,
    /// Selected constructor (classes only).
    pub constructor: Option<Constructor>,
    /// Synthesized argument expressions for the super-constructor
    /// call, one per constructor parameter.
    pub super_call_args: Vec<DefaultValueExpression>,
}

impl TypeDeclaration {
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Package portion of the qualified name, if any.
    pub fn package(&self) -> Option<&str> {
        self.qualified_name
            .rsplit_once('.')
            .map(|(pkg, _)| pkg)
            .filter(|pkg| !pkg.is_empty())
    }

    pub fn own_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.inherited)
    }

    pub fn inherited_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.inherited)
    }

    /// Members the fake must implement (no inherited default body).
    pub fn abstract_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.requires_implementation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_kind_display() {
        assert_eq!(DeclarationKind::Interface.to_string(), "interface");
        assert_eq!(DeclarationKind::OpenClass.to_string(), "open_class");
        assert_eq!(DeclarationKind::AbstractClass.to_string(), "abstract_class");
        assert_eq!(DeclarationKind::Object.to_string(), "object");
    }

    #[test]
    fn class_kinds() {
        assert!(DeclarationKind::OpenClass.is_class());
        assert!(DeclarationKind::AbstractClass.is_class());
        assert!(!DeclarationKind::Interface.is_class());
        assert!(!DeclarationKind::Object.is_class());
    }

    #[test]
    fn render_strips_implicit_prefixes() {
        let t = TypeRef {
            qualified_name: "kotlin.String".to_string(),
            nullable: false,
            arguments: Vec::new(),
            category: TypeCategory::Primitive(PrimitiveKind::Text),
        };
        assert_eq!(t.render(), "String");

        let t = TypeRef {
            qualified_name: "kotlin.collections.List".to_string(),
            nullable: false,
            arguments: vec![TypeRef::custom("com.example.User")],
            category: TypeCategory::Collection,
        };
        assert_eq!(t.render(), "List<com.example.User>");
    }

    #[test]
    fn render_keeps_custom_names_qualified() {
        assert_eq!(
            TypeRef::custom("com.example.User").render(),
            "com.example.User"
        );
    }

    #[test]
    fn render_nullable() {
        let mut t = TypeRef::custom("com.example.User");
        t.nullable = true;
        assert_eq!(t.render(), "com.example.User?");
    }

    #[test]
    fn render_function_type() {
        let f = TypeRef::function(
            vec![TypeRef::custom("com.example.A")],
            TypeRef::custom("com.example.B"),
        );
        assert_eq!(f.render(), "(com.example.A) -> com.example.B");
    }

    #[test]
    fn render_nullable_function_type_parenthesizes() {
        let mut f = TypeRef::function(vec![], TypeRef::unit());
        f.nullable = true;
        assert_eq!(f.render(), "(() -> Unit)?");
    }

    #[test]
    fn top_type_is_nullable_any() {
        let t = TypeRef::top();
        assert_eq!(t.render(), "Any?");
    }

    #[test]
    fn simple_name_and_package() {
        let d = TypeDeclaration {
            qualified_name: "com.example.UserRepository".to_string(),
            kind: DeclarationKind::Interface,
            generics: Vec::new(),
            members: Vec::new(),
            constructor: None,
            super_call_args: Vec::new(),
        };
        assert_eq!(d.simple_name(), "UserRepository");
        assert_eq!(d.package(), Some("com.example"));
    }

    #[test]
    fn package_absent_for_bare_name() {
        let d = TypeDeclaration {
            qualified_name: "UserRepository".to_string(),
            kind: DeclarationKind::Interface,
            generics: Vec::new(),
            members: Vec::new(),
            constructor: None,
            super_call_args: Vec::new(),
        };
        assert_eq!(d.package(), None);
    }
}
