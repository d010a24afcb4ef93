//! Integration Test: Headless Core
//!
//! **Policy**: `docchat-core` owns all state and logic and must stay usable
//! without a terminal. Rendering crates belong to the TUI only.

use std::fs;

use architectural_enforcement::{scan_dir, ui_imports_in, workspace_root};

#[test]
fn test_core_sources_have_no_ui_imports() {
    let violations = scan_dir("conductor/core/src", ui_imports_in);

    for violation in &violations {
        eprintln!("  ❌ {violation}");
    }
    assert!(
        violations.is_empty(),
        "found {} UI reference(s) in the core",
        violations.len()
    );
}

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest should be readable");

    for krate in ["ratatui", "crossterm"] {
        assert!(
            !manifest.contains(krate),
            "docchat-core must not depend on {krate}"
        );
    }
}
