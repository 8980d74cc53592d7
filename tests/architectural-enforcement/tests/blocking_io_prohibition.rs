//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions in the TUI and the engine MUST NOT use
//! blocking I/O. HTTP goes through async `reqwest`, terminal events through
//! crossterm's `EventStream`.
//! **Acceptable**: Blocking calls in plain (non-async) functions such as
//! config loading and logging setup, which run once before the event loop.

use architectural_enforcement::{enclosing_fn, report, scan, FnKind, CORE_SRC, TUI_SRC};

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan(&[CORE_SRC, TUI_SRC], |_, lines, idx, code| {
        let reason = blocking_call(code)?;
        match enclosing_fn(lines, idx) {
            Some(FnKind::Sync) => None,
            // Top-level imports would make the call sites invisible
            None if code.trim_start().starts_with("use ") => Some(reason),
            None => None,
            Some(FnKind::Async) => Some(reason),
        }
    });

    report(
        "Blocking I/O calls found in async production code!",
        &violations,
        &[
            "❌ FORBIDDEN in async fn:",
            "  - std::fs::*, std::net::*",
            "  - std::process::Command",
            "  - reqwest::blocking::*",
            "  - std::thread::sleep",
            "\n✅ ACCEPTABLE:",
            "  - Non-async functions (config loading, logging setup)",
            "  - Test code",
        ],
    );
}

fn blocking_call(code: &str) -> Option<&'static str> {
    if code.contains("std::fs") {
        Some("Blocking file I/O")
    } else if code.contains("std::net") {
        Some("Blocking network I/O")
    } else if code.contains("std::process::Command") {
        Some("Blocking process I/O")
    } else if code.contains("reqwest::blocking") {
        Some("Blocking HTTP client")
    } else if code.contains("std::thread::sleep") {
        Some("Blocking sleep")
    } else {
        None
    }
}

#[test]
fn test_blocking_io_detection() {
    assert_eq!(
        blocking_call("    let contents = std::fs::read_to_string(\"file.txt\")?;"),
        Some("Blocking file I/O")
    );
    assert_eq!(blocking_call("use std::net::TcpStream;"), Some("Blocking network I/O"));
    assert_eq!(blocking_call("let client = reqwest::Client::new();"), None);
}
