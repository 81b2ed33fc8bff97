//! Declaration Analyzer: raw candidate to structural model.
//!
//! Pure and deterministic: the same raw input always produces the
//! same [`TypeDeclaration`]. Rejections (singletons, empty
//! declarations) happen here, before any generation work starts.

use std::collections::HashSet;

use crate::defaults::DefaultValueMapper;
use crate::error::AnalyzeError;
use crate::model::parser::{RawDeclaration, RawGenericParameter, RawMember, RawParameter};
use crate::model::typeref::parse_type;
use crate::model::types::{
    Constructor, DeclarationKind, GenericParameter, GenericScope, Member, MemberKind, Parameter,
    TypeDeclaration, TypeRef,
};

/// Members the compiler synthesizes on data classes. Reconfiguring
/// them is meaningless, so they never reach the member list.
const SYNTHESIZED: [&str; 4] = ["equals", "hashCode", "toString", "copy"];

fn is_synthesized(member: &RawMember) -> bool {
    if member.kind != MemberKind::Function {
        return false;
    }
    if SYNTHESIZED.contains(&member.name.as_str()) {
        return true;
    }
    // Positional component accessors: component1, component2, ...
    member
        .name
        .strip_prefix("component")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// Analyze a raw declaration into the structural model.
///
/// The mapper synthesizes super-constructor arguments for class
/// declarations so the fake subclass never needs real collaborators.
pub fn analyze(
    raw: &RawDeclaration,
    mapper: &DefaultValueMapper,
) -> Result<TypeDeclaration, AnalyzeError> {
    if raw.kind == DeclarationKind::Object {
        return Err(AnalyzeError::UnsupportedDeclarationKind {
            name: raw.name.clone(),
            kind: raw.kind.to_string(),
        });
    }

    let declaration_scope: HashSet<String> =
        raw.generics.iter().map(|g| g.name.clone()).collect();

    let generics = analyze_generics(
        &raw.generics,
        GenericScope::Declaration,
        &declaration_scope,
    )?;

    let mut members = Vec::new();
    for raw_member in raw.members.iter().filter(|m| !is_synthesized(m)) {
        members.push(analyze_member(raw_member, &declaration_scope)?);
    }
    if members.is_empty() {
        return Err(AnalyzeError::EmptyDeclaration(raw.name.clone()));
    }

    let (constructor, super_call_args) = if raw.kind.is_class() {
        analyze_constructor(raw, mapper, &declaration_scope)?
    } else {
        (None, Vec::new())
    };

    Ok(TypeDeclaration {
        qualified_name: raw.name.clone(),
        kind: raw.kind,
        generics,
        members,
        constructor,
        super_call_args,
    })
}

fn analyze_generics(
    raw: &[RawGenericParameter],
    scope: GenericScope,
    names_in_scope: &HashSet<String>,
) -> Result<Vec<GenericParameter>, AnalyzeError> {
    raw.iter()
        .map(|g| {
            let bounds = g
                .bounds
                .iter()
                .map(|b| parse_member_type(b, names_in_scope, &g.name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(GenericParameter {
                name: g.name.clone(),
                bounds,
                scope,
            })
        })
        .collect()
}

fn analyze_member(
    raw: &RawMember,
    declaration_scope: &HashSet<String>,
) -> Result<Member, AnalyzeError> {
    let mut member_scope = declaration_scope.clone();
    for g in &raw.generics {
        member_scope.insert(g.name.clone());
    }

    let (parameters, return_type, generics) = match raw.kind {
        MemberKind::Function => {
            let parameters = raw
                .parameters
                .iter()
                .map(|p| analyze_parameter(p, &member_scope, &raw.name))
                .collect::<Result<Vec<_>, _>>()?;
            let return_type = match &raw.returns {
                Some(src) => parse_member_type(src, &member_scope, &raw.name)?,
                None => TypeRef::unit(),
            };
            let generics = analyze_generics(&raw.generics, GenericScope::Member, &member_scope)?;
            (parameters, return_type, generics)
        }
        MemberKind::Property => {
            let src = raw
                .ty
                .as_deref()
                .ok_or_else(|| AnalyzeError::MissingType(raw.name.clone()))?;
            let ty = parse_member_type(src, &member_scope, &raw.name)?;
            (Vec::new(), ty, Vec::new())
        }
    };

    Ok(Member {
        name: raw.name.clone(),
        kind: raw.kind,
        parameters,
        return_type,
        mutable: raw.kind == MemberKind::Property && raw.mutable,
        is_suspend: raw.suspend,
        is_inline: raw.inline,
        generics,
        inherited: raw.inherited,
        has_default: raw.has_default,
    })
}

fn analyze_parameter(
    raw: &RawParameter,
    scope: &HashSet<String>,
    member: &str,
) -> Result<Parameter, AnalyzeError> {
    Ok(Parameter {
        name: raw.name.clone(),
        ty: parse_member_type(&raw.ty, scope, member)?,
        vararg: raw.vararg,
    })
}

fn parse_member_type(
    src: &str,
    scope: &HashSet<String>,
    member: &str,
) -> Result<TypeRef, AnalyzeError> {
    parse_type(src, scope).map_err(|e| AnalyzeError::MalformedType {
        member: member.to_string(),
        type_name: e.0,
    })
}

/// Select the primary constructor (or the first declared) and
/// synthesize a default argument per parameter.
fn analyze_constructor(
    raw: &RawDeclaration,
    mapper: &DefaultValueMapper,
    declaration_scope: &HashSet<String>,
) -> Result<
    (
        Option<Constructor>,
        Vec<crate::defaults::DefaultValueExpression>,
    ),
    AnalyzeError,
> {
    let selected = raw
        .constructors
        .iter()
        .find(|c| c.primary)
        .or_else(|| raw.constructors.first());

    let Some(selected) = selected else {
        return Ok((None, Vec::new()));
    };

    let parameters = selected
        .parameters
        .iter()
        .map(|p| analyze_parameter(p, declaration_scope, "<init>"))
        .collect::<Result<Vec<_>, _>>()?;
    let super_call_args = parameters
        .iter()
        .map(|p| mapper.map_to_default(&p.ty))
        .collect();

    Ok((
        Some(Constructor {
            parameters,
            primary: selected.primary,
        }),
        super_call_args,
    ))
}
