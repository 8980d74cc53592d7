//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the engine MUST NOT call sleep
//! methods. Waiting happens on I/O, channels, timeouts or intervals.
//! **Exceptions**: Exponential backoff (retry logic only), test code

use architectural_enforcement::{report, scan, CORE_SRC, TUI_SRC};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(&[CORE_SRC, TUI_SRC], |_, lines, idx, code| {
        if !is_sleep_call(code) {
            return None;
        }
        if is_backoff_context(lines, idx) {
            return None;
        }
        Some("Sleep call")
    });

    report(
        "Sleep calls found in production code!",
        &violations,
        &[
            "✅ ACCEPTABLE:",
            "  - tokio::time::interval() for frame ticks and periodic refresh",
            "  - tokio::time::timeout() around awaited work",
            "  - Exponential backoff in retry logic",
            "\n❌ FORBIDDEN:",
            "  - Sleep in polling loops",
            "  - Sleep as poor man's synchronization",
        ],
    );
}

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")
}

/// Check if sleep is used for exponential backoff (acceptable for retry logic)
fn is_backoff_context(lines: &[String], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(15)..(current_idx + 5).min(lines.len());

    let mut has_backoff_calc = false;
    let mut has_retry_context = false;

    for line in &lines[context_range] {
        let line = line.to_lowercase();
        if line.contains("<<") || line.contains("pow") || line.contains("* 2") {
            has_backoff_calc = true;
        }
        if line.contains("retry") || line.contains("backoff") || line.contains("attempt") {
            has_retry_context = true;
        }
    }

    has_backoff_calc && has_retry_context
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(!is_sleep_call("let mut tick = tokio::time::interval(d);"));
}

#[test]
fn test_backoff_detection() {
    let lines: Vec<String> = [
        "async fn reconnect() {",
        "    let delay = base_delay * (1 << attempt);",
        "    tracing::warn!(attempt, \"Retrying\");",
        "    tokio::time::sleep(Duration::from_millis(delay)).await;",
        "}",
    ]
    .iter()
    .map(|l| (*l).to_string())
    .collect();

    assert!(is_backoff_context(&lines, 3));
}
