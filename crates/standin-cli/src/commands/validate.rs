use std::path::Path;

use standin::error::Severity;
use standin::model::{parse_declaration, validate_declaration};

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = parse_declaration(path)?;
    let violations = validate_declaration(&raw);

    let errors = violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .count();
    let warnings = violations
        .iter()
        .filter(|v| v.severity == Severity::Warning)
        .count();

    for v in &violations {
        println!("{v}");
    }

    println!("\n{errors} error(s), {warnings} warning(s)");

    if errors == 0 {
        println!("Declaration is fakeable.");
        Ok(())
    } else {
        Err(format!("Declaration has {errors} validation error(s)").into())
    }
}
