//! End-to-end generation over one discovered batch.
//!
//! Each declaration runs analyze, signature, cache gate, resolve,
//! emit, write, record. A failing declaration is reported in the
//! batch outcomes and skipped; the rest of the batch still runs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::{load_snapshot, write_snapshot, GenerationCache};
use crate::defaults::DefaultValueMapper;
use crate::emit::{emit_artifact, EmitOptions};
use crate::error::ParseError;
use crate::generics::resolve;
use crate::model::{analyze, parse_declaration_str, RawDeclaration, TypeDeclaration};
use crate::signature::{
    aggregate_signature, content_signature, structural_signature, SignatureStrategy,
    StructuralSignature,
};

/// One candidate handed over by the discovery step.
#[derive(Debug, Clone)]
pub struct DiscoveredDeclaration {
    pub path: PathBuf,
    /// Raw source text, kept for the content signature strategy.
    pub source: String,
    pub raw: RawDeclaration,
}

/// One file that could not be read or parsed. Reported alongside the
/// loaded declarations, never fatal to the batch.
#[derive(Debug, Clone)]
pub struct UnreadableDeclaration {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything discovered under one declaration directory.
#[derive(Debug, Default)]
pub struct DiscoveredBatch {
    pub declarations: Vec<DiscoveredDeclaration>,
    pub unreadable: Vec<UnreadableDeclaration>,
}

/// Read every `.yaml`/`.yml` file under `dir` as a batch, in sorted
/// order so batch signatures stay stable across runs. A file that
/// fails to read or parse lands in `unreadable`; the rest of the
/// directory still loads.
///
/// # Errors
///
/// Returns `ParseError::Io` only when the directory itself cannot be
/// listed.
pub fn load_batch_dir(dir: &Path) -> Result<DiscoveredBatch, ParseError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if is_yaml {
            paths.push(path);
        }
    }
    paths.sort();

    let mut batch = DiscoveredBatch::default();
    for path in paths {
        match read_declaration(&path) {
            Ok(item) => batch.declarations.push(item),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "declaration unreadable");
                batch.unreadable.push(UnreadableDeclaration {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(batch)
}

fn read_declaration(path: &Path) -> Result<DiscoveredDeclaration, ParseError> {
    let source = std::fs::read_to_string(path)?;
    let raw = parse_declaration_str(&source)?;
    Ok(DiscoveredDeclaration {
        path: path.to_path_buf(),
        source,
        raw,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Generated,
    SkippedCached,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DeclarationOutcome {
    pub qualified_name: String,
    pub outcome: Outcome,
}

/// Manifest entry for one written artifact.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DeclarationOutcome>,
    pub files: Vec<GeneratedFile>,
}

impl BatchReport {
    pub fn generated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Generated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedCached))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub emit: EmitOptions,
    pub strategy: SignatureStrategy,
    /// Model snapshot path; a matching snapshot skips re-analysis of
    /// the whole batch.
    pub snapshot: Option<PathBuf>,
}

/// Generate fakes for a batch into `output_dir`.
///
/// # Errors
///
/// Returns `io::Error` only when the output directory cannot be
/// created; per-declaration failures land in the report instead.
pub fn generate_batch(
    batch: &DiscoveredBatch,
    output_dir: &Path,
    cache: Option<&GenerationCache>,
    mapper: &DefaultValueMapper,
    options: &GenerateOptions,
) -> std::io::Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;
    let mut report = BatchReport::default();

    for bad in &batch.unreadable {
        report.outcomes.push(DeclarationOutcome {
            qualified_name: bad.path.display().to_string(),
            outcome: Outcome::Failed(bad.reason.clone()),
        });
    }

    let sources: Vec<StructuralSignature> = batch
        .declarations
        .iter()
        .map(|d| content_signature(&d.source))
        .collect();
    let aggregate = aggregate_signature(&sources);
    let snapshot_models = options
        .snapshot
        .as_deref()
        .and_then(|path| load_snapshot(path, &aggregate))
        .filter(|models| models.len() == batch.declarations.len());
    if snapshot_models.is_some() {
        debug!("model snapshot hit; batch analysis skipped");
    }

    let mut analyzed: Vec<TypeDeclaration> = Vec::with_capacity(batch.declarations.len());

    for (index, item) in batch.declarations.iter().enumerate() {
        let qualified_name = item.raw.name.clone();

        let decl = match &snapshot_models {
            Some(models) => models[index].clone(),
            None => match analyze(&item.raw, mapper) {
                Ok(decl) => decl,
                Err(e) => {
                    warn!(declaration = %qualified_name, error = %e, "analysis failed");
                    report.outcomes.push(DeclarationOutcome {
                        qualified_name,
                        outcome: Outcome::Failed(e.to_string()),
                    });
                    continue;
                }
            },
        };
        analyzed.push(decl.clone());

        let signature = match options.strategy {
            SignatureStrategy::Structural => structural_signature(&decl),
            SignatureStrategy::Content => content_signature(&item.source),
        };
        if let Some(cache) = cache {
            if !cache.needs_regeneration(&signature) {
                debug!(declaration = %qualified_name, "cache hit");
                report.outcomes.push(DeclarationOutcome {
                    qualified_name,
                    outcome: Outcome::SkippedCached,
                });
                continue;
            }
        }

        let resolution = resolve(&decl);
        let artifact = emit_artifact(&decl, &resolution, mapper, &options.emit);
        let absolute_path = output_dir.join(&artifact.file_name);
        if let Err(e) = std::fs::write(&absolute_path, &artifact.source) {
            warn!(declaration = %qualified_name, error = %e, "artifact write failed");
            report.outcomes.push(DeclarationOutcome {
                qualified_name,
                outcome: Outcome::Failed(e.to_string()),
            });
            continue;
        }

        if let Some(cache) = cache {
            cache.record_generation(&signature);
        }
        report.files.push(GeneratedFile {
            relative_path: artifact.file_name.clone(),
            absolute_path,
            bytes: artifact.source.len(),
        });
        report.outcomes.push(DeclarationOutcome {
            qualified_name,
            outcome: Outcome::Generated,
        });
    }

    if let Some(path) = options.snapshot.as_deref() {
        if batch.unreadable.is_empty() && analyzed.len() == batch.declarations.len() {
            if let Err(e) = write_snapshot(path, &aggregate, &analyzed) {
                warn!(path = %path.display(), error = %e, "snapshot write failed");
            }
        }
    }

    Ok(report)
}

/// Per-batch structural summary for status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSurvey {
    pub declarations: usize,
    pub functions: usize,
    pub properties: usize,
    pub declaration_scoped_generics: usize,
    pub member_scoped_generics: usize,
    pub failed: usize,
}

pub fn survey_batch(batch: &DiscoveredBatch, mapper: &DefaultValueMapper) -> BatchSurvey {
    let mut survey = BatchSurvey {
        failed: batch.unreadable.len(),
        ..BatchSurvey::default()
    };
    for item in &batch.declarations {
        let Ok(decl) = analyze(&item.raw, mapper) else {
            survey.failed += 1;
            continue;
        };
        survey.declarations += 1;
        survey.declaration_scoped_generics += decl.generics.len();
        for member in &decl.members {
            if member.is_function() {
                survey.functions += 1;
            } else if member.is_property() {
                survey.properties += 1;
            }
            survey.member_scoped_generics += member.generics.len();
        }
    }
    survey
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPOSITORY: &str = r#"
name: com.example.UserRepository
kind: interface
generics:
  - name: T
members:
  - name: save
    parameters:
      - name: item
        type: T
    returns: T
  - name: findAll
    returns: List<T>
"#;

    const SINGLETON: &str = r#"
name: com.example.Clock
kind: object
members:
  - name: now
    returns: Long
"#;

    fn write_decl(dir: &Path, file: &str, yaml: &str) {
        std::fs::write(dir.join(file), yaml).unwrap();
    }

    #[test]
    fn batch_generates_files_with_byte_counts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "repo.yaml", REPOSITORY);

        let batch = load_batch_dir(&input).unwrap();
        let out = dir.path().join("generated");
        let report = generate_batch(
            &batch,
            &out,
            None,
            &DefaultValueMapper::new(),
            &GenerateOptions::default(),
        )
        .unwrap();

        assert_eq!(report.generated(), 1);
        assert_eq!(report.files.len(), 1);
        let file = &report.files[0];
        assert_eq!(file.relative_path, "UserRepositoryFake.kt");
        let written = std::fs::read_to_string(&file.absolute_path).unwrap();
        assert_eq!(written.len(), file.bytes);
        assert!(written.contains("class FakeUserRepository<T>"));
    }

    #[test]
    fn cached_batch_skips_emission_on_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "repo.yaml", REPOSITORY);

        let batch = load_batch_dir(&input).unwrap();
        let out = dir.path().join("generated");
        let cache = GenerationCache::open(dir.path().join("cache/generated.txt"));
        let mapper = DefaultValueMapper::new();
        let options = GenerateOptions::default();

        let first = generate_batch(&batch, &out, Some(&cache), &mapper, &options).unwrap();
        assert_eq!(first.generated(), 1);

        // A second pass finds the recorded signature and emits nothing.
        std::fs::remove_file(out.join("UserRepositoryFake.kt")).unwrap();
        let second = generate_batch(&batch, &out, Some(&cache), &mapper, &options).unwrap();
        assert_eq!(second.generated(), 0);
        assert_eq!(second.skipped(), 1);
        assert!(!out.join("UserRepositoryFake.kt").exists());
    }

    #[test]
    fn structural_strategy_survives_cosmetic_source_change() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "repo.yaml", REPOSITORY);

        let out = dir.path().join("generated");
        let cache = GenerationCache::open(dir.path().join("generated.txt"));
        let mapper = DefaultValueMapper::new();
        let options = GenerateOptions::default();

        let batch = load_batch_dir(&input).unwrap();
        generate_batch(&batch, &out, Some(&cache), &mapper, &options).unwrap();

        // Same structure, different bytes.
        write_decl(&input, "repo.yaml", &format!("# touched\n{REPOSITORY}"));
        let batch = load_batch_dir(&input).unwrap();
        let report = generate_batch(&batch, &out, Some(&cache), &mapper, &options).unwrap();
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn content_strategy_regenerates_on_any_byte_change() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "repo.yaml", REPOSITORY);

        let out = dir.path().join("generated");
        let cache = GenerationCache::open(dir.path().join("generated.txt"));
        let mapper = DefaultValueMapper::new();
        let options = GenerateOptions {
            strategy: SignatureStrategy::Content,
            ..GenerateOptions::default()
        };

        let batch = load_batch_dir(&input).unwrap();
        generate_batch(&batch, &out, Some(&cache), &mapper, &options).unwrap();

        write_decl(&input, "repo.yaml", &format!("# touched\n{REPOSITORY}"));
        let batch = load_batch_dir(&input).unwrap();
        let report = generate_batch(&batch, &out, Some(&cache), &mapper, &options).unwrap();
        assert_eq!(report.generated(), 1);
        assert_eq!(report.skipped(), 0);
    }

    #[test]
    fn failing_declaration_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "a_clock.yaml", SINGLETON);
        write_decl(&input, "b_repo.yaml", REPOSITORY);

        let batch = load_batch_dir(&input).unwrap();
        let out = dir.path().join("generated");
        let report = generate_batch(
            &batch,
            &out,
            None,
            &DefaultValueMapper::new(),
            &GenerateOptions::default(),
        )
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.generated(), 1);
        assert!(matches!(
            &report.outcomes[0].outcome,
            Outcome::Failed(reason) if reason.contains("object")
        ));
        assert!(out.join("UserRepositoryFake.kt").exists());
    }

    #[test]
    fn load_batch_dir_sorts_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_decl(dir.path(), "b.yaml", REPOSITORY);
        write_decl(dir.path(), "a.yml", SINGLETON);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let batch = load_batch_dir(dir.path()).unwrap();
        assert_eq!(batch.declarations.len(), 2);
        assert!(batch.unreadable.is_empty());
        assert_eq!(batch.declarations[0].raw.name, "com.example.Clock");
        assert_eq!(batch.declarations[1].raw.name, "com.example.UserRepository");
    }

    #[test]
    fn unparsable_file_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "a_broken.yaml", "name: [unclosed");
        write_decl(&input, "b_repo.yaml", REPOSITORY);

        let batch = load_batch_dir(&input).unwrap();
        assert_eq!(batch.declarations.len(), 1);
        assert_eq!(batch.unreadable.len(), 1);

        let out = dir.path().join("generated");
        let report = generate_batch(
            &batch,
            &out,
            None,
            &DefaultValueMapper::new(),
            &GenerateOptions::default(),
        )
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.generated(), 1);
        assert!(matches!(&report.outcomes[0].outcome, Outcome::Failed(_)));
        assert!(report.outcomes[0].qualified_name.ends_with("a_broken.yaml"));
        assert!(out.join("UserRepositoryFake.kt").exists());
    }

    #[test]
    fn snapshot_not_written_when_a_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "broken.yaml", "kind: {");
        write_decl(&input, "repo.yaml", REPOSITORY);

        let snapshot = dir.path().join("models.json");
        let options = GenerateOptions {
            snapshot: Some(snapshot.clone()),
            ..GenerateOptions::default()
        };
        let batch = load_batch_dir(&input).unwrap();
        generate_batch(
            &batch,
            &dir.path().join("generated"),
            None,
            &DefaultValueMapper::new(),
            &options,
        )
        .unwrap();
        assert!(!snapshot.exists());
    }

    #[test]
    fn snapshot_written_and_reused_when_batch_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "repo.yaml", REPOSITORY);

        let out = dir.path().join("generated");
        let snapshot = dir.path().join("models.json");
        let mapper = DefaultValueMapper::new();
        let options = GenerateOptions {
            snapshot: Some(snapshot.clone()),
            ..GenerateOptions::default()
        };

        let batch = load_batch_dir(&input).unwrap();
        generate_batch(&batch, &out, None, &mapper, &options).unwrap();
        assert!(snapshot.exists());

        let report = generate_batch(&batch, &out, None, &mapper, &options).unwrap();
        assert_eq!(report.generated(), 1);
    }

    #[test]
    fn snapshot_not_written_when_a_declaration_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decls");
        std::fs::create_dir_all(&input).unwrap();
        write_decl(&input, "clock.yaml", SINGLETON);

        let snapshot = dir.path().join("models.json");
        let options = GenerateOptions {
            snapshot: Some(snapshot.clone()),
            ..GenerateOptions::default()
        };
        let batch = load_batch_dir(&input).unwrap();
        generate_batch(
            &batch,
            &dir.path().join("generated"),
            None,
            &DefaultValueMapper::new(),
            &options,
        )
        .unwrap();
        assert!(!snapshot.exists());
    }

    #[test]
    fn survey_counts_members_and_generic_scopes() {
        let dir = tempfile::tempdir().unwrap();
        write_decl(dir.path(), "repo.yaml", REPOSITORY);
        write_decl(
            dir.path(),
            "transformer.yaml",
            r#"
name: com.example.Transformer
kind: interface
members:
  - name: transform
    generics:
      - name: T
    parameters:
      - name: value
        type: T
    returns: T
  - name: label
    kind: property
    type: String
"#,
        );
        write_decl(dir.path(), "clock.yaml", SINGLETON);
        write_decl(dir.path(), "broken.yaml", "name: [unclosed");

        let batch = load_batch_dir(dir.path()).unwrap();
        let survey = survey_batch(&batch, &DefaultValueMapper::new());
        assert_eq!(survey.declarations, 2);
        assert_eq!(survey.failed, 2);
        assert_eq!(survey.functions, 3);
        assert_eq!(survey.properties, 1);
        assert_eq!(survey.declaration_scoped_generics, 1);
        assert_eq!(survey.member_scoped_generics, 1);
    }
}
