use std::path::Path;

use standin::cache::GenerationCache;
use standin::defaults::DefaultValueMapper;
use standin::pipeline::{load_batch_dir, survey_batch};

pub fn run(
    declaration_dir: &Path,
    cache_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = load_batch_dir(declaration_dir)?;
    let survey = survey_batch(&batch, &DefaultValueMapper::new());

    println!("Batch: {}", declaration_dir.display());
    println!("Fakeable declarations: {}", survey.declarations);
    println!("Unfakeable declarations: {}", survey.failed);
    println!("Functions: {}", survey.functions);
    println!("Properties: {}", survey.properties);
    println!(
        "Generic parameters: {} declaration-scoped, {} member-scoped",
        survey.declaration_scoped_generics, survey.member_scoped_generics
    );

    if let Some(path) = cache_path {
        let cache = GenerationCache::open(path);
        println!("Cache records: {} ({})", cache.len(), cache.path().display());
    }

    Ok(())
}
