//! Integration Test: Panic Prohibition
//!
//! **Policy**: The engine crate is a library that UI surfaces embed. Its
//! production code MUST propagate errors with `Result` instead of calling
//! `unwrap()`, `expect()` or `panic!()`.

use architectural_enforcement::{report, scan, CORE_SRC};

#[test]
fn test_no_panicking_shortcuts_in_engine() {
    let violations = scan(&[CORE_SRC], |_, _, _, code| panicking_call(code));

    report(
        "Panicking calls found in engine production code!",
        &violations,
        &[
            "✅ Use instead:",
            "  - `?` with a ChatError / ConfigError variant",
            "  - unwrap_or / unwrap_or_default / unwrap_or_else",
        ],
    );
}

fn panicking_call(code: &str) -> Option<&'static str> {
    if code.contains(".unwrap()") {
        Some("unwrap()")
    } else if code.contains(".expect(") {
        Some("expect()")
    } else if code.contains("panic!(") {
        Some("panic!()")
    } else {
        None
    }
}

#[test]
fn test_panic_detection() {
    assert_eq!(panicking_call("let v = x.unwrap();"), Some("unwrap()"));
    assert_eq!(panicking_call("let v = x.expect(\"set\");"), Some("expect()"));
    assert_eq!(panicking_call("let v = x.unwrap_or(0);"), None);
    assert_eq!(panicking_call("let v = x.unwrap_or_default();"), None);
}
