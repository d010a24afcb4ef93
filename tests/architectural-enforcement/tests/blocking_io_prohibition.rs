//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the TUI and the core MUST NOT use blocking I/O.
//! **Required**: Use `tokio::fs`, `tokio::net`, `tokio::process`, not `std::fs`, `std::net`, `std::process`
//!
//! Blocking calls are tolerated in plain functions that run before the
//! runtime starts (config loading, log file setup) and in test code.

use architectural_enforcement::{blocking_io_in, scan_dir, workspace_root, PRODUCTION_DIRS};

#[test]
fn test_no_blocking_io_in_production_code() {
    let violations: Vec<_> = PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| scan_dir(dir, blocking_io_in))
        .collect();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in async code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::read().await, tokio::fs::try_exists().await");
        eprintln!("  - tokio::time::sleep().await");
        eprintln!("  - reqwest (async client)");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

#[test]
fn test_production_dirs_exist() {
    // An empty scan must not pass silently because the layout moved
    for dir in PRODUCTION_DIRS {
        assert!(
            workspace_root().join(dir).is_dir(),
            "missing production directory {dir}"
        );
    }
}
