//! CLI output formatting for registry and build operations.
//!
//! Output is grouped by outcome category: every operation prints one
//! section per bucket (tracked, stale, problem, built, failed, untracked),
//! a section header followed by indented one-per-item lines. The grouping
//! is the contract; the exact wording is presentation.
//!
//! ```text
//! Pages that need building
//!     a.html: yet to be built
//!     blog.html: dep path content/blog.md modified since last build
//!
//! Pages with missing content or template file
//!     contact.html: content file content/contact.md does not exist
//! ```
//!
//! Each operation has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::build::{BuildReport, StatusReport};
use crate::registry::PageRegistry;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// A section header followed by one indented line per item. Empty
/// sections are omitted entirely.
fn section<I: IntoIterator<Item = String>>(lines: &mut Vec<String>, header: &str, items: I) {
    let mut it = items.into_iter().peekable();
    if it.peek().is_none() {
        return;
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(header.to_string());
    for item in it {
        lines.push(format!("{}{item}", indent(1)));
    }
}

// ============================================================================
// Registry listings
// ============================================================================

/// Full records of every tracked page, one labeled block per page.
pub fn format_tracked_pages(registry: &PageRegistry) -> Vec<String> {
    if registry.is_empty() {
        return vec!["no pages tracked".to_string()];
    }
    let mut lines = vec!["Tracked pages".to_string()];
    for (i, page) in registry.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        for field in page.to_string().lines() {
            lines.push(format!("{}{field}", indent(1)));
        }
    }
    lines
}

/// Page paths only, one per line.
pub fn format_tracked_paths(registry: &PageRegistry) -> Vec<String> {
    if registry.is_empty() {
        return vec!["no pages tracked".to_string()];
    }
    let mut lines = vec!["Tracked page paths".to_string()];
    for page in registry.iter() {
        lines.push(format!("{}{}", indent(1), page.page_path()));
    }
    lines
}

// ============================================================================
// Staleness and build reports
// ============================================================================

/// Grouped staleness partition: the dependency files whose removal or
/// modification caused staleness, stale pages with their reason, problem
/// pages, then a summary when everything is current.
pub fn format_status_report(report: &StatusReport) -> Vec<String> {
    let mut lines = Vec::new();
    section(
        &mut lines,
        "Removed dependency files",
        report.removed_files.iter().map(|path| path.to_string()),
    );
    section(
        &mut lines,
        "Modified dependency files",
        report.modified_files.iter().map(|path| path.to_string()),
    );
    section(
        &mut lines,
        "Pages that need building",
        report
            .stale
            .iter()
            .map(|(path, reason)| format!("{path}: {reason}")),
    );
    section(
        &mut lines,
        "Pages with missing content or template file",
        report
            .problems
            .iter()
            .map(|(path, problem)| format!("{path}: {problem}")),
    );
    if report.all_current() {
        lines.push("all pages are already up to date".to_string());
    }
    lines
}

/// Grouped build outcome: built, failed (with the error), untracked.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    section(
        &mut lines,
        "Pages successfully built",
        report.built.iter().map(|path| path.to_string()),
    );
    section(
        &mut lines,
        "Pages that failed to build",
        report
            .failed
            .iter()
            .map(|(path, error)| format!("{path}: {error}")),
    );
    section(
        &mut lines,
        "Not tracking the following pages",
        report.untracked.iter().map(|path| path.to_string()),
    );
    if report.all_succeeded() && !report.built.is_empty() {
        lines.push(String::new());
        lines.push("all pages built successfully".to_string());
    }
    lines
}

// ============================================================================
// Print wrappers
// ============================================================================

pub fn print_tracked_pages(registry: &PageRegistry) {
    print_lines(&format_tracked_pages(registry));
}

pub fn print_tracked_paths(registry: &PageRegistry) {
    print_lines(&format_tracked_paths(registry));
}

pub fn print_status_report(report: &StatusReport) {
    print_lines(&format_status_report(report));
}

pub fn print_build_report(report: &BuildReport) {
    print_lines(&format_build_report(report));
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
