use std::sync::OnceLock;

use regex::Regex;

use crate::types::ErrorAnnotation;

struct Patterns {
    workflow_command: Regex,
    compiler: Regex,
    test_failure: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        // ::error file=src/lib.rs,line=10,col=5::message
        workflow_command: Regex::new(r"::error\s+file=([^,]+),line=(\d+)(?:,col=(\d+))?::(.+)")
            .expect("valid regex"),
        // src/main.go:12:3: undefined: foo
        compiler: Regex::new(r"^(\S+\.\w+):(\d+):(\d+):\s+(.+)").expect("valid regex"),
        test_failure: Regex::new(r"^--- FAIL:\s+(\S+)").expect("valid regex"),
    })
}

/// Log lines from Actions are prefixed with an RFC 3339 timestamp.
fn strip_timestamp(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.split_once(' ') {
        Some((head, rest)) if head.len() >= 20 && head.ends_with('Z') && head.contains('T') => {
            rest.trim_start()
        }
        _ => trimmed,
    }
}

pub fn parse_annotations(log: &str) -> Vec<ErrorAnnotation> {
    let p = patterns();
    log.lines()
        .map(strip_timestamp)
        .filter_map(|line| {
            if let Some(c) = p.workflow_command.captures(line) {
                return Some(ErrorAnnotation {
                    file: Some(c[1].to_string()),
                    line: c[2].parse().ok(),
                    column: c.get(3).and_then(|m| m.as_str().parse().ok()),
                    message: c[4].to_string(),
                });
            }
            if let Some(c) = p.compiler.captures(line) {
                return Some(ErrorAnnotation {
                    file: Some(c[1].to_string()),
                    line: c[2].parse().ok(),
                    column: c[3].parse().ok(),
                    message: c[4].to_string(),
                });
            }
            p.test_failure.captures(line).map(|c| ErrorAnnotation {
                file: None,
                line: None,
                column: None,
                message: format!("FAIL: {}", &c[1]),
            })
        })
        .collect()
}

pub fn is_error_line(line: &str) -> bool {
    let line = strip_timestamp(line);
    let p = patterns();
    p.workflow_command.is_match(line)
        || p.compiler.is_match(line)
        || p.test_failure.is_match(line)
        || line.contains("FAIL")
        || line.contains("ERROR")
        || line.starts_with("error")
}
