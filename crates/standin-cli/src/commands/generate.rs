use std::path::{Path, PathBuf};

use standin::cache::GenerationCache;
use standin::defaults::DefaultValueMapper;
use standin::emit::EmitOptions;
use standin::pipeline::{generate_batch, load_batch_dir, GenerateOptions, Outcome};
use standin::signature::SignatureStrategy;

pub fn run(
    declaration_dir: &Path,
    output_dir: &Path,
    cache_path: Option<&Path>,
    counters: bool,
    content: bool,
    snapshot: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = load_batch_dir(declaration_dir)?;
    let cache = cache_path.map(GenerationCache::open);

    let options = GenerateOptions {
        emit: EmitOptions { counters },
        strategy: if content {
            SignatureStrategy::Content
        } else {
            SignatureStrategy::Structural
        },
        snapshot,
    };

    let report = generate_batch(
        &batch,
        output_dir,
        cache.as_ref(),
        &DefaultValueMapper::new(),
        &options,
    )?;

    for outcome in &report.outcomes {
        if let Outcome::Failed(reason) = &outcome.outcome {
            println!("failed: {} ({reason})", outcome.qualified_name);
        }
    }

    println!(
        "Generated {} file(s) in {} ({} cached, {} failed):",
        report.files.len(),
        output_dir.display(),
        report.skipped(),
        report.failed()
    );
    for f in &report.files {
        println!("  {} ({} bytes)", f.relative_path, f.bytes);
    }

    Ok(())
}
