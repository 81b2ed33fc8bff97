use std::path::Path;

use standin::cache::GenerationCache;

pub fn wipe(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let cache = GenerationCache::open(path);
    let before = cache.len();
    cache.wipe();
    println!("Wiped {before} record(s) from {}", cache.path().display());
    Ok(())
}
