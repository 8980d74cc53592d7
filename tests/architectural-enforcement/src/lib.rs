//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code (wait on I/O or intervals instead)
//! - No blocking I/O inside async functions
//! - No panicking shortcuts (`unwrap`/`expect`) in the engine crate
//!
//! The helpers here are shared by the checks under `tests/`. Each check scans
//! the production part of a source file: everything before the trailing
//! `#[cfg(test)]` module, with line comments stripped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine crate sources
pub const CORE_SRC: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../chat/core/src");

/// Terminal UI sources
pub const TUI_SRC: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tui/src");

/// A rule broken at a specific line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What kind of violation
    pub reason: &'static str,
    /// The offending line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.reason,
            self.text
        )
    }
}

/// Kind of the function enclosing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    /// Plain `fn`
    Sync,
    /// `async fn`
    Async,
}

/// All `.rs` files under `dir` (missing directories yield nothing)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = Path::new(dir);
    if !path.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Read a file's lines, or nothing if it can't be read
pub fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

/// Lines before the test module, comments stripped, with their 0-based index
pub fn production_lines(lines: &[String]) -> Vec<(usize, &str)> {
    lines
        .iter()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| (idx, code_part(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// The part of a line before any `//` comment
pub fn code_part(line: &str) -> &str {
    if line.trim_start().starts_with("//") {
        return "";
    }
    match line.find(" //") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Whether a trimmed line declares a function, and which kind
///
/// Accepts visibility and qualifier prefixes (`pub`, `pub(crate)`,
/// `const`, `unsafe`).
pub fn fn_declaration(line: &str) -> Option<FnKind> {
    let mut rest = line.trim();
    let mut is_async = false;

    loop {
        if let Some(after) = rest.strip_prefix("pub(crate) ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("pub ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("const ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("unsafe ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("async ") {
            is_async = true;
            rest = after;
        } else {
            break;
        }
    }

    rest.starts_with("fn ").then_some(if is_async {
        FnKind::Async
    } else {
        FnKind::Sync
    })
}

/// Kind of the nearest function declared at or above `idx`
///
/// Stops at `mod` and `impl` boundaries.
pub fn enclosing_fn(lines: &[String], idx: usize) -> Option<FnKind> {
    for line in lines[..=idx].iter().rev() {
        if let Some(kind) = fn_declaration(line) {
            return Some(kind);
        }
        let trimmed = line.trim();
        if trimmed.starts_with("mod ") || trimmed.starts_with("impl") {
            return None;
        }
    }
    None
}

/// Scan every production line of every file under `dirs`
pub fn scan<F>(dirs: &[&str], mut check: F) -> Vec<Violation>
where
    F: FnMut(&Path, &[String], usize, &str) -> Option<&'static str>,
{
    let mut violations = Vec::new();
    for dir in dirs {
        for path in rust_files(dir) {
            let lines = read_lines(&path);
            for (idx, code) in production_lines(&lines) {
                if let Some(reason) = check(&path, &lines, idx, code) {
                    violations.push(Violation {
                        path: path.clone(),
                        line: idx + 1,
                        reason,
                        text: lines[idx].trim().to_string(),
                    });
                }
            }
        }
    }
    violations
}

/// Print violations and fail the calling test
pub fn report(title: &str, violations: &[Violation], help: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in help {
        eprintln!("{line}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_string()).collect()
    }

    #[test]
    fn test_fn_declaration_kinds() {
        assert_eq!(fn_declaration("fn main() {"), Some(FnKind::Sync));
        assert_eq!(fn_declaration("    pub fn load(path: &Path)"), Some(FnKind::Sync));
        assert_eq!(fn_declaration("pub(crate) async fn poll(&mut self)"), Some(FnKind::Async));
        assert_eq!(fn_declaration("async fn main() {"), Some(FnKind::Async));
        assert_eq!(fn_declaration("let f = |x| x;"), None);
        assert_eq!(fn_declaration("// fn commented()"), None);
    }

    #[test]
    fn test_enclosing_fn_finds_nearest() {
        let lines = owned(&[
            "impl Foo {",
            "    pub async fn run(&self) {",
            "        let x = 1;",
            "    }",
            "    fn helper() {",
            "        let y = 2;",
            "    }",
            "}",
        ]);
        assert_eq!(enclosing_fn(&lines, 2), Some(FnKind::Async));
        assert_eq!(enclosing_fn(&lines, 5), Some(FnKind::Sync));
        assert_eq!(enclosing_fn(&lines, 0), None);
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let lines = owned(&[
            "fn real() {}",
            "// just a comment",
            "#[cfg(test)]",
            "mod tests {",
            "    fn fake() { x.unwrap(); }",
            "}",
        ]);
        let prod = production_lines(&lines);
        assert_eq!(prod, vec![(0, "fn real() {}")]);
    }

    #[test]
    fn test_code_part_strips_trailing_comment() {
        assert_eq!(code_part("let a = 1; // note"), "let a = 1;");
        assert_eq!(code_part("    // whole line"), "");
        assert_eq!(
            code_part("const URL: &str = \"http://localhost\";"),
            "const URL: &str = \"http://localhost\";"
        );
    }

    #[test]
    fn test_source_dirs_exist() {
        assert!(!rust_files(CORE_SRC).is_empty(), "engine sources not found");
        assert!(!rust_files(TUI_SRC).is_empty(), "tui sources not found");
    }
}
