//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the Loom crates MUST NOT use blocking I/O.
//! **Required**: Use `tokio::fs`, `tokio::net`, `tokio::process`, not `std::fs`, `std::net`, `std::process`
//!
//! Loading configuration and resource files happens in plain functions
//! before the runtime serves any connection, which is acceptable.

use architectural_enforcement::{is_in_async_function, scan, Violation};

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_production_code() {
    let violations = find_blocking_io_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in async code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n❌ FORBIDDEN blocking I/O in async code:");
        eprintln!("  - std::fs::read(), std::fs::write(), std::fs::File");
        eprintln!("  - std::net::TcpStream, std::net::TcpListener");
        eprintln!("  - std::process::Command::output()");
        eprintln!("  - std::io::stdin()");
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::read().await, tokio::fs::write().await");
        eprintln!("  - tokio::net::TcpListener::bind().await");
        eprintln!("  - tokio::process::Command::output().await");
        eprintln!("\n✅ ACCEPTABLE blocking I/O:");
        eprintln!("  - Non-async functions (configuration and resource loading)");
        eprintln!("  - Test code");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_blocking_io_violations() -> Vec<Violation> {
    scan(|lines, idx, code| {
        if code.contains("std::net::TcpStream") || code.contains("std::net::TcpListener") {
            return Some("Blocking network I/O");
        }
        if !is_in_async_function(lines, idx) {
            return None;
        }
        if code.contains("std::fs::") {
            Some("Blocking file I/O")
        } else if code.contains("std::process::Command") {
            Some("Blocking process I/O")
        } else if code.contains("std::io::stdin()") {
            Some("Blocking stdin in async")
        } else {
            None
        }
    })
}
