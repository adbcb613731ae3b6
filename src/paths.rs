//! Site-relative path handling.
//!
//! Every path sitetrack touches — page paths, content files, templates,
//! recorded dependencies — is stored as a string relative to the site root.
//! Identity is pure string comparison on the normalized form: the registry
//! key, the staleness comparisons, and both durable file formats all operate
//! on these strings, never on canonicalized filesystem paths. Renaming a
//! file is therefore always visible as a path change, and a path that
//! doesn't exist yet is still a perfectly good identity.
//!
//! Filesystem predicates take the site root explicitly so nothing depends
//! on the process working directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Reserved directory holding all of sitetrack's durable state.
pub const SITE_DIR: &str = ".sitetrack";

/// The registry store, relative to the site root.
pub const REGISTRY_FILE: &str = ".sitetrack/pages.list";

/// Shadow tree mirroring page paths, one build record per page.
pub const RECORDS_DIR: &str = ".sitetrack/built";

/// Suffix appended to a page path to form its build-record filename.
const RECORD_SUFFIX: &str = ".info";

/// A normalized, site-root-relative path.
///
/// Ordering and equality are plain string comparisons; two `SitePath`
/// values compare equal only when their underlying strings are identical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SitePath(String);

impl SitePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem location of this path under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }

    /// True iff the path resolves to a readable file.
    pub fn exists_in(&self, root: &Path) -> bool {
        self.resolve(root).is_file()
    }

    /// True when this path can name a file inside a site: non-empty, not
    /// absolute, no parent-traversal segments, and single-line (the
    /// durable formats store one path per line).
    pub fn is_site_relative(&self) -> bool {
        !self.0.is_empty()
            && !self.0.starts_with('/')
            && !self.0.contains('\n')
            && self.0.split('/').all(|segment| segment != "..")
    }

    /// Where this page's build record lives.
    ///
    /// `about/index.html` → `.sitetrack/built/about/index.html.info`.
    /// Appending a suffix inside a reserved tree keeps the mapping
    /// injective: distinct page paths never share a record file.
    pub fn info_location(&self) -> SitePath {
        SitePath(format!("{RECORDS_DIR}/{}{RECORD_SUFFIX}", self.0))
    }

    /// True when this path's modification time strictly exceeds
    /// `reference`'s.
    ///
    /// Returns false when either file is missing or its mtime is
    /// unreadable; callers for whom absence is meaningful check
    /// [`exists_in`](Self::exists_in) first.
    pub fn is_newer_than(&self, reference: &SitePath, root: &Path) -> bool {
        let (Ok(own), Ok(other)) = (
            fs::metadata(self.resolve(root)),
            fs::metadata(reference.resolve(root)),
        ) else {
            return false;
        };
        match (own.modified(), other.modified()) {
            (Ok(own), Ok(other)) => own > other,
            _ => false,
        }
    }
}

impl fmt::Display for SitePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw path string: trim whitespace, unify separators to `/`,
/// collapse duplicate separators, and strip leading `./` segments.
fn normalize(raw: &str) -> String {
    let mut s = raw.trim().replace('\\', "/");
    while s.contains("//") {
        s = s.replace("//", "/");
    }
    let mut rest = s.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}
