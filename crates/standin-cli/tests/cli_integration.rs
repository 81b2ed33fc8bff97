//! Integration tests invoking the `standin` binary end to end.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Helper to get the path to a declaration fixture.
fn declaration_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../declarations")
        .join(name)
}

/// Helper to get the declarations directory path.
fn declarations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../declarations")
}

fn standin_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_standin"))
}

#[test]
fn validate_accepts_fixture() {
    let output = Command::new(standin_bin())
        .arg("validate")
        .arg(declaration_path("user_repository.yaml"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Declaration is fakeable."));
}

#[test]
fn validate_rejects_object_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.yaml");
    std::fs::write(
        &path,
        "name: com.example.Registry\nkind: object\nmembers:\n  - name: lookup\n    returns: String\n",
    )
    .unwrap();

    let output = Command::new(standin_bin())
        .arg("validate")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn signature_is_stable_across_runs() {
    let run = || {
        let output = Command::new(standin_bin())
            .arg("signature")
            .arg(declaration_path("user_repository.yaml"))
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    let first = run();
    assert!(first.contains("com.example.UserRepository"));
    assert_eq!(first, run());
}

#[test]
fn generate_writes_fakes_and_caches() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("generated");
    let cache = dir.path().join("generated.txt");

    let run = || {
        Command::new(standin_bin())
            .arg("generate")
            .arg(declarations_dir())
            .arg("--output")
            .arg(&out)
            .arg("--cache")
            .arg(&cache)
            .output()
            .unwrap()
    };

    let first = run();
    assert!(first.status.success());
    assert!(out.join("UserRepositoryFake.kt").exists());
    assert!(out.join("CounterFake.kt").exists());
    assert!(out.join("UserServiceFake.kt").exists());

    let fake = std::fs::read_to_string(out.join("UserServiceFake.kt")).unwrap();
    assert!(fake.contains("override suspend fun getUser(id: String): com.example.User?"));

    // Second run hits the cache for every declaration.
    let second = run();
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Generated 0 file(s)"));
    assert!(stdout.contains("3 cached"));
}

#[test]
fn generate_continues_past_a_corrupt_declaration_file() {
    let dir = tempfile::tempdir().unwrap();
    let decls = dir.path().join("decls");
    std::fs::create_dir_all(&decls).unwrap();
    std::fs::write(decls.join("broken.yaml"), "name: [unclosed").unwrap();
    std::fs::copy(
        declaration_path("user_repository.yaml"),
        decls.join("user_repository.yaml"),
    )
    .unwrap();

    let out = dir.path().join("generated");
    let output = Command::new(standin_bin())
        .arg("generate")
        .arg(&decls)
        .arg("--output")
        .arg(&out)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 failed"));
    assert!(stdout.contains("broken.yaml"));
    assert!(out.join("UserRepositoryFake.kt").exists());
}

#[test]
fn status_reports_batch_shape() {
    let output = Command::new(standin_bin())
        .arg("status")
        .arg(declarations_dir())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fakeable declarations: 3"));
    assert!(stdout.contains("declaration-scoped"));
}

#[test]
fn cache_wipe_empties_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("generated.txt");
    std::fs::write(&cache, "aaa\nbbb\n").unwrap();

    let output = Command::new(standin_bin())
        .arg("cache-wipe")
        .arg(&cache)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Wiped 2 record(s)"));
    assert_eq!(std::fs::read_to_string(&cache).unwrap(), "");
}
