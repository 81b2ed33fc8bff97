//! Code Emitter: Kotlin source text for one analyzed declaration.
//!
//! Four coupled units land in a single file named `<Name>Fake.kt`:
//! the synthetic implementation, its configuration builder, the
//! factory function, and (opt-in) per-member call counters. Every
//! identifier is a deterministic function of the declaration's simple
//! name, so an unchanged model regenerates byte-identical output.

mod configuration;
mod implementation;

use serde::Serialize;

use crate::defaults::DefaultValueMapper;
use crate::generics::{explicit_bounds, GenericResolution};
use crate::model::{
    GenericParameter, Member, Parameter, TypeCategory, TypeDeclaration, TypeRef,
};

/// Emission switches. Off by default; counters are the only opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    /// Emit an `AtomicInteger` call counter per member.
    pub counters: bool,
}

/// One emitted source unit plus the metadata the pipeline reports.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    /// Qualified name of the faked declaration.
    pub qualified_name: String,
    /// File the source belongs in, relative to the output root.
    pub file_name: String,
    pub source: String,
}

/// Emit the fake, its configuration builder, and its factory for one
/// declaration.
pub fn emit_artifact(
    decl: &TypeDeclaration,
    resolution: &GenericResolution,
    mapper: &DefaultValueMapper,
    options: &EmitOptions,
) -> GeneratedArtifact {
    let mut body = String::new();
    implementation::emit_implementation(decl, resolution, mapper, options, &mut body);
    body.push('\n');
    configuration::emit_configuration(decl, resolution, &mut body);
    body.push('\n');
    configuration::emit_factory(decl, &mut body);

    let mut source = header(decl, &body, options);
    source.push_str(&body);

    GeneratedArtifact {
        qualified_name: decl.qualified_name.clone(),
        file_name: format!("{}Fake.kt", decl.simple_name()),
        source,
    }
}

fn header(decl: &TypeDeclaration, body: &str, options: &EmitOptions) -> String {
    let mut out = String::from("// Generated by standin. Do not edit.\n");
    if let Some(package) = decl.package() {
        out.push_str(&format!("package {package}\n"));
    }
    out.push('\n');

    let mut imports = Vec::new();
    if options.counters {
        imports.push("java.util.concurrent.atomic.AtomicInteger");
    }
    if body.contains("CompletableDeferred(") {
        imports.push("kotlinx.coroutines.CompletableDeferred");
    }
    if body.contains("emptyFlow()") {
        imports.push("kotlinx.coroutines.flow.emptyFlow");
    }
    if !imports.is_empty() {
        for import in imports {
            out.push_str(&format!("import {import}\n"));
        }
        out.push('\n');
    }
    out
}

pub(crate) fn fake_name(decl: &TypeDeclaration) -> String {
    format!("Fake{}", decl.simple_name())
}

pub(crate) fn configuration_name(decl: &TypeDeclaration) -> String {
    format!("Fake{}Configuration", decl.simple_name())
}

pub(crate) fn factory_name(decl: &TypeDeclaration) -> String {
    format!("fake{}", decl.simple_name())
}

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A rendered `<T : Bound>` list plus a `where` clause for parameters
/// carrying more than one explicit bound.
#[derive(Debug, Default)]
pub(crate) struct TypeParameterClause {
    /// `"<T : Bound, U>"`, or empty when there are no parameters.
    pub inline: String,
    /// `" where T : A, T : B"`, or empty.
    pub where_clause: String,
}

pub(crate) fn type_parameter_clause(params: &[GenericParameter]) -> TypeParameterClause {
    if params.is_empty() {
        return TypeParameterClause::default();
    }
    let mut inline = Vec::new();
    let mut constraints = Vec::new();
    for param in params {
        let bounds = explicit_bounds(param);
        match bounds.len() {
            0 => inline.push(param.name.clone()),
            1 => inline.push(format!("{} : {}", param.name, bounds[0])),
            _ => {
                inline.push(param.name.clone());
                for bound in bounds {
                    constraints.push(format!("{} : {bound}", param.name));
                }
            }
        }
    }
    TypeParameterClause {
        inline: format!("<{}>", inline.join(", ")),
        where_clause: if constraints.is_empty() {
            String::new()
        } else {
            format!(" where {}", constraints.join(", "))
        },
    }
}

/// `"<T, U>"` for referencing a parameterized type, or empty.
pub(crate) fn type_argument_list(params: &[GenericParameter]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        format!("<{}>", names.join(", "))
    }
}

/// The type a parameter's value has inside the member body; varargs
/// arrive as an out-projected array.
pub(crate) fn parameter_value_type(param: &Parameter, ty: &TypeRef) -> String {
    if param.vararg {
        format!("Array<out {}>", ty.render())
    } else {
        ty.render()
    }
}

/// The closure type stored (or accepted) for a function member.
/// `storage` substitutes erased variables with their bounds.
pub(crate) fn closure_type(
    member: &Member,
    resolution: &GenericResolution,
    storage: bool,
) -> String {
    let ctx = Some(member.name.as_str());
    let resolved = |ty: &TypeRef| {
        if storage {
            resolution.storage_type(ctx, ty)
        } else {
            ty.clone()
        }
    };
    let params: Vec<String> = member
        .parameters
        .iter()
        .map(|p| parameter_value_type(p, &resolved(&p.ty)))
        .collect();
    let prefix = if member.is_suspend { "suspend " } else { "" };
    format!(
        "{prefix}({}) -> {}",
        params.join(", "),
        resolved(&member.return_type).render()
    )
}

/// The closure type as a [`TypeRef`], for asking the mapper about an
/// unconfigured member. Varargs become plain arrays; the projection
/// does not change which default fits.
pub(crate) fn storage_closure_ref(member: &Member, resolution: &GenericResolution) -> TypeRef {
    let ctx = Some(member.name.as_str());
    let params: Vec<TypeRef> = member
        .parameters
        .iter()
        .map(|p| {
            let stored = resolution.storage_type(ctx, &p.ty);
            if p.vararg {
                TypeRef {
                    qualified_name: "kotlin.Array".to_string(),
                    nullable: false,
                    arguments: vec![stored],
                    category: TypeCategory::Array,
                }
            } else {
                stored
            }
        })
        .collect();
    TypeRef::function(params, resolution.storage_type(ctx, &member.return_type))
}

/// `"item: T, vararg rest: T"` for an override's parameter list.
pub(crate) fn render_parameters(member: &Member) -> String {
    let rendered: Vec<String> = member
        .parameters
        .iter()
        .map(|p| {
            let prefix = if p.vararg { "vararg " } else { "" };
            format!("{prefix}{}: {}", p.name, p.ty.render())
        })
        .collect();
    rendered.join(", ")
}

/// `"item, rest"` for forwarding an override's arguments.
pub(crate) fn render_arguments(member: &Member) -> String {
    let names: Vec<&str> = member.parameters.iter().map(|p| p.name.as_str()).collect();
    names.join(", ")
}
