//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep to wait for something. Sessions
//! react to channel messages; the browser reports what happened.
//! **Exception**: a one-shot deadline, i.e. a task spawned to sleep once and
//! then post an event (the session auto-close timer).

use architectural_enforcement::{scan, Violation};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - One-shot deadline: tokio::spawn(async move {{ sleep(d).await; tx.send(..) }})");
        eprintln!("  - Test code (#[test] or #[tokio::test] functions)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - std::thread::sleep anywhere");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep to 'wait' for the browser (await the answer instead)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_sleep_violations() -> Vec<Violation> {
    scan(|lines, idx, code| {
        if code.contains("thread::sleep(") {
            return Some("Blocking sleep");
        }
        if (code.contains("::sleep(") || code.contains(".sleep(")) && !is_one_shot_deadline(lines, idx) {
            return Some("Sleep outside a one-shot deadline");
        }
        None
    })
}

/// The sleep is the first statement of a freshly spawned task
fn is_one_shot_deadline(lines: &[&str], idx: usize) -> bool {
    lines[..idx]
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with("tokio::spawn(async move {"))
}

#[test]
fn test_deadline_detection() {
    let lines = [
        "        tokio::spawn(async move {",
        "            tokio::time::sleep(window).await;",
        "            let _ = tx.send(SessionEvent::AutoClose(generation)).await;",
    ];
    assert!(is_one_shot_deadline(&lines, 1));

    let lines = ["        loop {", "            tokio::time::sleep(POLL).await;"];
    assert!(!is_one_shot_deadline(&lines, 1));
}
