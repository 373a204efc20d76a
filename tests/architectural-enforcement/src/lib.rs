//! Architectural Enforcement Integration Tests
//!
//! Source scanners shared by the tests in `tests/`. Each test walks the
//! production sources of the Loom crates and reports lines that break one of
//! the workspace rules:
//! - No polling sleeps: sessions wait on channels, timers are one-shot
//! - No blocking I/O inside async functions
//! - No `unwrap()` / `expect()` outside test code
//!
//! Test code is anything inside a `#[cfg(test)]` module or a function marked
//! `#[test]` / `#[tokio::test]`.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["loom/core/src", "loom/daemon/src"];

/// A rule violation found by a scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the line belongs to
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// Short description of the rule
    pub kind: &'static str,
    /// Offending line, trimmed
    pub line: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}: {}", self.path.display(), self.line_number, self.kind, self.line)
    }
}

/// Root of the workspace this crate belongs to
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file under the production directories
#[must_use]
pub fn production_sources() -> Vec<PathBuf> {
    let root = workspace_root();
    let mut files = Vec::new();
    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }
        for entry in walkdir::WalkDir::new(path).into_iter().filter_map(Result::ok) {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files
}

/// Run `check` over every production line that is not test code
///
/// `check` receives all lines of the file, the index of the current line and
/// the code part of that line (comments stripped). It returns the rule name
/// when the line violates it.
pub fn scan<F>(check: F) -> Vec<Violation>
where
    F: Fn(&[&str], usize, &str) -> Option<&'static str>,
{
    let mut violations = Vec::new();
    for path in production_sources() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        violations.extend(scan_source(&path, &content, &check));
    }
    violations
}

/// [`scan`] over a single in-memory file
pub fn scan_source<F>(path: &Path, content: &str, check: &F) -> Vec<Violation>
where
    F: Fn(&[&str], usize, &str) -> Option<&'static str>,
{
    let lines: Vec<&str> = content.lines().collect();
    let test_start = test_module_start(&lines);
    let mut violations = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if test_start.is_some_and(|start| idx >= start) || is_in_test_function(&lines, idx) {
            continue;
        }
        let code_part = code_part(line);
        if code_part.trim().is_empty() {
            continue;
        }
        if let Some(kind) = check(&lines, idx, code_part) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line_number: idx + 1,
                kind,
                line: line.trim().to_string(),
            });
        }
    }
    violations
}

/// The line without its `//` comment; doc comments yield an empty string
#[must_use]
pub fn code_part(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        return "";
    }
    line.split(" //").next().unwrap_or(line)
}

/// Index of the first line of the trailing `#[cfg(test)] mod ...` block
#[must_use]
pub fn test_module_start(lines: &[&str]) -> Option<usize> {
    lines.iter().enumerate().find_map(|(idx, line)| {
        let is_cfg_test = line.trim() == "#[cfg(test)]";
        let next_is_mod = lines
            .get(idx + 1)
            .is_some_and(|next| next.trim_start().starts_with("mod "));
        (is_cfg_test && next_is_mod).then_some(idx)
    })
}

/// Check if line is inside a test function
#[must_use]
pub fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    let mut found_fn_idx = None;
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();
        if line.starts_with("fn ") || line.contains(" fn ") {
            found_fn_idx = Some(i);
            break;
        }
        if line.starts_with("mod ") || (line.starts_with("impl ") && line.contains('{')) {
            return false;
        }
    }

    let Some(fn_idx) = found_fn_idx else {
        return false;
    };
    for i in (0..fn_idx).rev() {
        let line = lines[i].trim();
        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }
        if !line.starts_with("#[") {
            break;
        }
    }
    false
}

/// Check if line is inside an async function
#[must_use]
pub fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();
        if line.contains("async fn ") || line.contains("async move {") || line.contains("async {") {
            return true;
        }
        if line.contains("fn ") {
            return false;
        }
        if line.starts_with("mod ") || (line.starts_with("impl ") && line.contains('{')) {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_holds_the_crates() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists());
        assert!(root.join("loom/core/src/lib.rs").exists());
        assert!(!production_sources().is_empty());
    }

    #[test]
    fn test_test_module_is_skipped() {
        let source = "fn run() {\n    a.unwrap();\n}\n\n#[cfg(test)]\nmod tests {\n    fn helper() { b.unwrap(); }\n}\n";
        let check = |_: &[&str], _: usize, code: &str| code.contains(".unwrap()").then_some("unwrap");
        let violations = scan_source(Path::new("x.rs"), source, &check);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line_number, 2);
    }

    #[test]
    fn test_test_function_detection() {
        let lines = ["#[tokio::test]", "async fn test_something() {", "    x.unwrap();", "}"];
        assert!(is_in_test_function(&lines, 2));
        let lines = ["fn production() {", "    x.unwrap();", "}"];
        assert!(!is_in_test_function(&lines, 1));
    }

    #[test]
    fn test_async_detection() {
        let lines = ["async fn serve() {", "    let text = std::fs::read_to_string(path)?;", "}"];
        assert!(is_in_async_function(&lines, 1));
        let lines = ["pub fn load(path: &Path) {", "    let text = std::fs::read_to_string(path)?;", "}"];
        assert!(!is_in_async_function(&lines, 1));
        let lines = ["fn spawn() {", "    tokio::spawn(async move {", "        std::fs::write(a, b);"];
        assert!(is_in_async_function(&lines, 2));
    }

    #[test]
    fn test_comments_are_ignored() {
        assert_eq!(code_part("    // x.unwrap()"), "");
        assert_eq!(code_part("/// call `unwrap()`"), "");
        assert_eq!(code_part("let a = 1; // b.unwrap()"), "let a = 1;");
    }
}
