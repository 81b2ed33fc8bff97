use thiserror::Error;

/// Failure to read or deserialize a raw declaration document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read declaration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to turn a raw declaration into a structural model.
///
/// A failing declaration never aborts the batch; the pipeline reports
/// it and moves on to the next candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error(
        "Cannot fake `{name}`: kind `{kind}` is a shared singleton; \
         faking global instances breaks test isolation"
    )]
    UnsupportedDeclarationKind { name: String, kind: String },

    #[error("Declaration `{0}` has no usable members")]
    EmptyDeclaration(String),

    #[error("Malformed type `{type_name}` in member `{member}`")]
    MalformedType { member: String, type_name: String },

    #[error("Member `{0}` is missing a type")]
    MissingType(String),
}

/// A single lint finding from declaration validation.
#[derive(Debug, Clone)]
pub struct Violation {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        write!(f, "[{prefix}] {}: {}", self.rule, self.message)
    }
}
