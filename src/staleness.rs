//! Staleness detection: decide whether a tracked page must be rebuilt.
//!
//! The verdict for a page comes from comparing its current declared
//! metadata and on-disk dependency timestamps against the build record
//! left by its last successful build. The checks run in a fixed order and
//! the first hit wins, so a page never carries more than one reason:
//!
//! 1. content file missing → problem
//! 2. template file missing → problem
//! 3. no build record → stale ("yet to be built")
//! 4. title / content path / template path differ from the record → stale
//! 5. first recorded dependency that was removed or modified since the
//!    last build → stale
//! 6. otherwise up to date
//!
//! "Modified since the last build" compares a dependency's mtime against
//! the build-record file's own mtime — the record's timestamp doubles as
//! the last-built clock, so rewriting the record resets it. The flip side
//! is that an out-of-band touch of a record file (backup tooling, say)
//! suppresses legitimate staleness until the next rebuild.
//!
//! Problem pages are not stale pages: a missing content or template file
//! makes the page unbuildable, so it is surfaced in its own report
//! category and excluded from the rebuild set.

use crate::page::{BuildRecord, PageRecord};
use crate::paths::SitePath;
use std::fmt;
use std::fs;
use std::path::Path;

/// Why a page is unbuildable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    MissingContent(SitePath),
    MissingTemplate(SitePath),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContent(p) => write!(f, "content file {p} does not exist"),
            Self::MissingTemplate(p) => write!(f, "template file {p} does not exist"),
        }
    }
}

/// Why a page needs rebuilding. At most one reason per evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    NeverBuilt,
    TitleChanged { from: String, to: String },
    ContentPathChanged { from: SitePath, to: SitePath },
    TemplatePathChanged { from: SitePath, to: SitePath },
    DependencyRemoved(SitePath),
    DependencyModified(SitePath),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeverBuilt => write!(f, "yet to be built"),
            Self::TitleChanged { from, to } => {
                write!(f, "title changed to {to} from {from}")
            }
            Self::ContentPathChanged { from, to } => {
                write!(f, "content path changed to {to} from {from}")
            }
            Self::TemplatePathChanged { from, to } => {
                write!(f, "template path changed to {to} from {from}")
            }
            Self::DependencyRemoved(p) => write!(f, "dep path {p} removed since last build"),
            Self::DependencyModified(p) => write!(f, "dep path {p} modified since last build"),
        }
    }
}

/// Verdict for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Problem(Problem),
    Stale(StaleReason),
    UpToDate,
}

/// Evaluate one page against its persisted build record under `root`.
///
/// Pure decision function: reads the filesystem, never writes it, and
/// never looks at any page other than the one given.
pub fn check(page: &PageRecord, root: &Path) -> PageStatus {
    if !page.content_path().exists_in(root) {
        return PageStatus::Problem(Problem::MissingContent(page.content_path().clone()));
    }
    if !page.template_path().exists_in(root) {
        return PageStatus::Problem(Problem::MissingTemplate(page.template_path().clone()));
    }

    let info = page.page_path().info_location();
    if !info.exists_in(root) {
        return PageStatus::Stale(StaleReason::NeverBuilt);
    }

    // An unreadable or garbled record is treated as no record at all; the
    // next successful build rewrites it.
    let Ok(text) = fs::read_to_string(info.resolve(root)) else {
        return PageStatus::Stale(StaleReason::NeverBuilt);
    };
    let Ok(previous) = BuildRecord::parse(&text) else {
        return PageStatus::Stale(StaleReason::NeverBuilt);
    };

    if page.title() != previous.title {
        return PageStatus::Stale(StaleReason::TitleChanged {
            from: previous.title,
            to: page.title().to_string(),
        });
    }
    if page.content_path() != &previous.content_path {
        return PageStatus::Stale(StaleReason::ContentPathChanged {
            from: previous.content_path,
            to: page.content_path().clone(),
        });
    }
    if page.template_path() != &previous.template_path {
        return PageStatus::Stale(StaleReason::TemplatePathChanged {
            from: previous.template_path,
            to: page.template_path().clone(),
        });
    }

    for dep in previous.dependencies {
        if !dep.exists_in(root) {
            return PageStatus::Stale(StaleReason::DependencyRemoved(dep));
        }
        if dep.is_newer_than(&info, root) {
            return PageStatus::Stale(StaleReason::DependencyModified(dep));
        }
    }

    PageStatus::UpToDate
}
