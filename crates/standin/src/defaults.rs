//! Default-Value Mapper: placeholder expressions per type category.
//!
//! [`DefaultValueMapper::map_to_default`] is total: every [`TypeRef`]
//! maps to *some* expression, with unknown types getting a loud
//! `TODO(..)` that fails at the call site instead of returning a
//! silently wrong value. Custom registrations take precedence over
//! every built-in rule.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{PrimitiveKind, TypeCategory, TypeRef};

/// A synthesized placeholder expression, rendered to Kotlin source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultValueExpression {
    /// A literal like `0` or `""`.
    Literal(String),
    Null,
    /// `SomeType()`.
    ConstructorCall(String),
    /// A factory invocation like `emptyList<T>()`.
    FactoryCall(String),
    /// A closure literal. `arity <= 1` renders without a parameter
    /// list (Kotlin's implicit `it`); higher arities bind underscores.
    Lambda { arity: usize, body: String },
    /// Verbatim caller-registered expression.
    CustomExpression(String),
    /// Loud failure for types nothing can synthesize.
    NotImplemented(String),
}

impl DefaultValueExpression {
    /// Render as a Kotlin expression.
    pub fn render(&self) -> String {
        match self {
            Self::Literal(lit) => lit.clone(),
            Self::Null => "null".to_string(),
            Self::ConstructorCall(name) => format!("{name}()"),
            Self::FactoryCall(call) => call.clone(),
            Self::Lambda { arity, body } => {
                if body.is_empty() {
                    "{ }".to_string()
                } else if *arity <= 1 {
                    format!("{{ {body} }}")
                } else {
                    let underscores = vec!["_"; *arity].join(", ");
                    format!("{{ {underscores} -> {body} }}")
                }
            }
            Self::CustomExpression(expr) => expr.clone(),
            Self::NotImplemented(type_name) => {
                format!("TODO(\"no default value for {type_name}\")")
            }
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

type CustomMapping = Box<dyn Fn(&TypeRef) -> DefaultValueExpression + Send + Sync>;

/// Maps type references to placeholder expressions.
///
/// Dispatch order, first match wins: custom registration, nullability,
/// then the built-in category table. Reused by the analyzer (super
/// constructor arguments) and the emitter (unconfigured members).
pub struct DefaultValueMapper {
    custom: HashMap<String, CustomMapping>,
}

impl Default for DefaultValueMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultValueMapper {
    pub fn new() -> Self {
        Self {
            custom: HashMap::new(),
        }
    }

    /// Register a custom mapping for an exact qualified name. Replaces
    /// any earlier registration and overrides every built-in rule.
    pub fn register<F>(&mut self, qualified_name: impl Into<String>, generator: F)
    where
        F: Fn(&TypeRef) -> DefaultValueExpression + Send + Sync + 'static,
    {
        self.custom.insert(qualified_name.into(), Box::new(generator));
    }

    /// Register a fixed expression for an exact qualified name.
    pub fn register_expression(
        &mut self,
        qualified_name: impl Into<String>,
        expression: impl Into<String>,
    ) {
        let expr = DefaultValueExpression::CustomExpression(expression.into());
        self.custom
            .insert(qualified_name.into(), Box::new(move |_| expr.clone()));
    }

    /// Map a type to its placeholder expression. Total; never fails.
    pub fn map_to_default(&self, ty: &TypeRef) -> DefaultValueExpression {
        if let Some(generator) = self.custom.get(&ty.qualified_name) {
            return generator(ty);
        }
        if ty.nullable {
            return DefaultValueExpression::Null;
        }

        match ty.category {
            TypeCategory::Primitive(kind) => primitive_literal(kind),
            TypeCategory::Collection | TypeCategory::Map | TypeCategory::Array => {
                DefaultValueExpression::FactoryCall(empty_factory(ty))
            }
            TypeCategory::AsyncWrapper => async_default(ty),
            TypeCategory::ResultWrapper => {
                let success = ty
                    .arguments
                    .first()
                    .map_or_else(|| "Unit".to_string(), |arg| self.map_to_default(arg).render());
                DefaultValueExpression::FactoryCall(format!("Result.success({success})"))
            }
            TypeCategory::Function => self.function_default(ty),
            TypeCategory::GenericVar | TypeCategory::Custom => {
                DefaultValueExpression::NotImplemented(ty.render())
            }
        }
    }

    /// Rule 7: a closure returning the recursively mapped default of
    /// its declared result; identity pass-through when the single
    /// parameter type matches the result type.
    fn function_default(&self, ty: &TypeRef) -> DefaultValueExpression {
        let params = ty.function_parameters();
        let result = ty.function_result();
        if let (Some(result), [single]) = (result, params) {
            if single == result {
                return DefaultValueExpression::Lambda {
                    arity: 1,
                    body: "it".to_string(),
                };
            }
        }
        let body = result.map_or_else(
            || "Unit".to_string(),
            |r| self.map_to_default(r).render(),
        );
        DefaultValueExpression::Lambda {
            arity: params.len(),
            body,
        }
    }
}

fn primitive_literal(kind: PrimitiveKind) -> DefaultValueExpression {
    let lit = match kind {
        PrimitiveKind::Text => "\"\"",
        PrimitiveKind::Int => "0",
        PrimitiveKind::Long => "0L",
        PrimitiveKind::Float => "0.0f",
        PrimitiveKind::Double => "0.0",
        PrimitiveKind::Boolean => "false",
        PrimitiveKind::Unit => "Unit",
    };
    DefaultValueExpression::Literal(lit.to_string())
}

/// Empty-collection factory, parameterized when the element types are
/// statically known.
fn empty_factory(ty: &TypeRef) -> String {
    let factory = match ty.simple_name() {
        "MutableList" => "mutableListOf",
        "MutableSet" => "mutableSetOf",
        "Set" => "emptySet",
        "MutableMap" => "mutableMapOf",
        "Map" => "emptyMap",
        "Array" => "emptyArray",
        // List, Collection, Iterable
        _ => "emptyList",
    };
    if ty.arguments.is_empty() {
        format!("{factory}()")
    } else {
        let args: Vec<String> = ty.arguments.iter().map(TypeRef::render).collect();
        format!("{factory}<{}>()", args.join(", "))
    }
}

/// An empty or never-resolving async value.
fn async_default(ty: &TypeRef) -> DefaultValueExpression {
    match ty.simple_name() {
        // Never completed, so awaiting it suspends forever instead of
        // producing a fabricated value.
        "Deferred" => DefaultValueExpression::FactoryCall("CompletableDeferred()".to_string()),
        _ => DefaultValueExpression::FactoryCall("emptyFlow()".to_string()),
    }
}
