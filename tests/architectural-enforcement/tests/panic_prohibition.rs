//! Integration Test: Panic Prohibition
//!
//! **Policy**: A malformed message from one tab must never take the daemon
//! down. Production code propagates errors with `?` or logs and drops them;
//! `unwrap()`, `expect()` and `panic!` are reserved for tests.

use architectural_enforcement::{scan, Violation};

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = find_panic_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Panicking calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ REQUIRED:");
        eprintln!("  - `?` with LoomError / anyhow::Context");
        eprintln!("  - `let Some(..) = .. else {{ return }}` for absent views");
        eprintln!("  - tracing::warn! and drop the message");

        panic!(
            "\nFound {} panic violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_panic_violations() -> Vec<Violation> {
    scan(|_, _, code| {
        if code.contains(".unwrap()") {
            Some("unwrap()")
        } else if code.contains(".expect(") {
            Some("expect()")
        } else if code.contains("panic!(") || code.contains("unimplemented!(") || code.contains("todo!(") {
            Some("Explicit panic")
        } else {
            None
        }
    })
}
