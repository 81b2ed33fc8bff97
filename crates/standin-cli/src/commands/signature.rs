use std::path::Path;

use standin::defaults::DefaultValueMapper;
use standin::model::{analyze, parse_declaration_str};
use standin::signature::{content_signature, structural_signature};

pub fn run(path: &Path, content: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let raw = parse_declaration_str(&source)?;

    let signature = if content {
        content_signature(&source)
    } else {
        let decl = analyze(&raw, &DefaultValueMapper::new())?;
        structural_signature(&decl)
    };

    let strategy = if content { "content" } else { "structural" };
    println!("{signature}  {} ({strategy})", raw.name);
    Ok(())
}
