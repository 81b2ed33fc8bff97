use std::collections::HashSet;

use crate::error::{Severity, Violation};
use crate::model::parser::RawDeclaration;
use crate::model::types::{DeclarationKind, MemberKind};

/// Lint a raw declaration before analysis.
///
/// Returns a list of violations. If any violation has
/// [`Severity::Error`], the declaration will not analyze cleanly and
/// should be reported to the caller.
pub fn validate_declaration(raw: &RawDeclaration) -> Vec<Violation> {
    let mut violations = Vec::new();

    validate_identity(raw, &mut violations);
    validate_members(raw, &mut violations);
    validate_constructors(raw, &mut violations);

    violations
}

fn validate_identity(raw: &RawDeclaration, violations: &mut Vec<Violation>) {
    if raw.name.is_empty() {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "DECL-001".to_string(),
            message: "declaration name must not be empty".to_string(),
            location: Some("name".to_string()),
        });
    }

    if raw.kind == DeclarationKind::Object {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "DECL-002".to_string(),
            message: format!(
                "`{}` is an object; shared global instances cannot be faked safely",
                raw.name
            ),
            location: Some("kind".to_string()),
        });
    }
}

fn validate_members(raw: &RawDeclaration, violations: &mut Vec<Violation>) {
    if raw.members.is_empty() {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "DECL-003".to_string(),
            message: format!("`{}` declares no members, nothing to fake", raw.name),
            location: Some("members".to_string()),
        });
    }

    let mut seen: HashSet<(String, MemberKind, usize)> = HashSet::new();
    for (i, member) in raw.members.iter().enumerate() {
        if member.name.is_empty() {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "DECL-004".to_string(),
                message: format!("members[{i}] has an empty name"),
                location: Some(format!("members[{i}].name")),
            });
        }

        if !seen.insert((member.name.clone(), member.kind, member.parameters.len())) {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "DECL-005".to_string(),
                message: format!(
                    "duplicate {} `{}` with the same arity",
                    member.kind, member.name
                ),
                location: Some(format!("members[{i}]")),
            });
        }

        if member.kind == MemberKind::Property && !member.parameters.is_empty() {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "DECL-006".to_string(),
                message: format!("property `{}` must not declare parameters", member.name),
                location: Some(format!("members[{i}].parameters")),
            });
        }

        if member.kind == MemberKind::Property && member.ty.is_none() {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "DECL-007".to_string(),
                message: format!("property `{}` is missing its type", member.name),
                location: Some(format!("members[{i}].type")),
            });
        }

        let vararg_positions: Vec<usize> = member
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| p.vararg)
            .map(|(j, _)| j)
            .collect();
        if let Some(&pos) = vararg_positions.first() {
            if vararg_positions.len() > 1 || pos + 1 != member.parameters.len() {
                violations.push(Violation {
                    severity: Severity::Error,
                    rule: "DECL-008".to_string(),
                    message: format!(
                        "`{}` must declare at most one vararg parameter, in last position",
                        member.name
                    ),
                    location: Some(format!("members[{i}].parameters")),
                });
            }
        }
    }
}

fn validate_constructors(raw: &RawDeclaration, violations: &mut Vec<Violation>) {
    if !raw.constructors.is_empty() && !raw.kind.is_class() {
        violations.push(Violation {
            severity: Severity::Warning,
            rule: "DECL-009".to_string(),
            message: format!(
                "`{}` is not a class; constructors are ignored",
                raw.name
            ),
            location: Some("constructors".to_string()),
        });
    }

    let primaries = raw.constructors.iter().filter(|c| c.primary).count();
    if primaries > 1 {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "DECL-010".to_string(),
            message: format!("`{}` declares more than one primary constructor", raw.name),
            location: Some("constructors".to_string()),
        });
    }
}
