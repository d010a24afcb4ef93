//! Architectural Enforcement
//!
//! Source scanners used by the integration tests in this package:
//! - No blocking I/O inside async functions
//! - No UI framework imports in the headless core
//!
//! The scanners are line-based and deliberately simple. They work on the
//! workspace sources, so a violation fails `cargo test` before it ships.

use std::fs;
use std::path::{Path, PathBuf};

/// A rule violation at a specific source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What kind of rule was broken
    pub kind: &'static str,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.kind,
            self.text
        )
    }
}

/// Root of the workspace this package lives in
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Production source directories scanned by the rules
pub const PRODUCTION_DIRS: &[&str] = &["conductor/core/src", "tui/src"];

/// Collect every `.rs` file under `dir`
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a file: everything before the first `#[cfg(test)]`
pub fn production_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .take_while(|line| !line.trim().starts_with("#[cfg(test)]"))
        .collect()
}

/// Strip a trailing `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether a trimmed line opens a function
fn is_fn_header(line: &str) -> bool {
    line.starts_with("fn ") || line.contains(" fn ")
}

/// Whether the line at `idx` sits inside an `async fn`
///
/// Scans backwards for the nearest function header, stopping at module and
/// impl boundaries.
pub fn is_in_async_function(lines: &[&str], idx: usize) -> bool {
    for i in (0..idx).rev() {
        let line = lines[i].trim();

        if is_fn_header(line) {
            return line.contains("async fn ");
        }

        if line.starts_with("mod ") || (line.starts_with("impl") && line.contains('{')) {
            return false;
        }
    }
    false
}

/// Blocking calls that must not appear in async code
const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("use std::fs", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::thread::sleep", "Blocking sleep"),
];

/// Find blocking I/O inside async functions of one file
pub fn blocking_io_in(path: &Path, content: &str) -> Vec<Violation> {
    let lines = production_lines(content);
    let mut violations = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let code = code_part(line);
        let in_async = is_in_async_function(&lines, idx);

        for &(pattern, kind) in BLOCKING_PATTERNS {
            // Module-level imports are checked wherever they appear
            let is_import = pattern.starts_with("use ");
            if code.contains(pattern) && (is_import || in_async) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    kind,
                    text: line.trim().to_string(),
                });
            }
        }
    }

    violations
}

/// UI crates the headless core must never import
const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

/// Find UI framework references in one file
pub fn ui_imports_in(path: &Path, content: &str) -> Vec<Violation> {
    production_lines(content)
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let code = code_part(line);
            UI_CRATES
                .iter()
                .any(|krate| code.contains(&format!("{krate}::")))
        })
        .map(|(idx, line)| Violation {
            path: path.to_path_buf(),
            line: idx + 1,
            kind: "UI dependency in core",
            text: line.trim().to_string(),
        })
        .collect()
}

/// Run a per-file scanner over a directory relative to the workspace root
pub fn scan_dir(
    dir: &str,
    scanner: impl Fn(&Path, &str) -> Vec<Violation>,
) -> Vec<Violation> {
    let root = workspace_root().join(dir);
    rust_files(&root)
        .into_iter()
        .filter_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            Some(scanner(&path, &content))
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_function_detection() {
        let code = vec![
            "async fn bad_function() {",
            "    let contents = std::fs::read_to_string(\"file.txt\")?;",
            "}",
        ];
        assert!(is_in_async_function(&code, 1));
    }

    #[test]
    fn test_pub_sync_function_is_not_async() {
        let code = vec![
            "pub fn load() {",
            "    let contents = std::fs::read_to_string(\"config.toml\")?;",
            "}",
        ];
        assert!(!is_in_async_function(&code, 1));
    }

    #[test]
    fn test_blocking_in_async_flagged() {
        let content = "pub async fn upload() {\n    let b = std::fs::read(\"a.pdf\");\n}\n";
        let found = blocking_io_in(Path::new("x.rs"), content);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].kind, "Blocking file I/O");
    }

    #[test]
    fn test_blocking_in_sync_fn_allowed() {
        let content = "fn init() {\n    std::fs::create_dir_all(\"d\").ok();\n}\n";
        assert!(blocking_io_in(Path::new("x.rs"), content).is_empty());
    }

    #[test]
    fn test_test_module_ignored() {
        let content = "#[cfg(test)]\nmod tests {\n    async fn t() { std::fs::read(\"a\"); }\n}\n";
        assert!(blocking_io_in(Path::new("x.rs"), content).is_empty());
    }

    #[test]
    fn test_commented_call_ignored() {
        let content = "async fn f() {\n    // std::fs::read(\"a\")\n}\n";
        assert!(blocking_io_in(Path::new("x.rs"), content).is_empty());
    }

    #[test]
    fn test_ui_import_flagged() {
        let content = "use ratatui::widgets::Paragraph;\n";
        assert_eq!(ui_imports_in(Path::new("x.rs"), content).len(), 1);
    }
}
