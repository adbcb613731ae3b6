//! Shared test utilities for the sitetrack test suite.
//!
//! Fixtures are built programmatically: each test gets an initialized site
//! in its own temp directory and writes exactly the files it needs.
//! Staleness tests pin modification times explicitly with `filetime` so
//! verdicts never depend on test execution speed.

use std::fs;
use std::path::Path;

use filetime::FileTime;
use tempfile::TempDir;

use crate::page::{BuildRecord, PageRecord};
use crate::paths::SitePath;
use crate::registry::PageRegistry;

/// An initialized site root: `.sitetrack/` exists with an empty registry.
pub fn site_root() -> TempDir {
    let tmp = TempDir::new().unwrap();
    PageRegistry::init_store(tmp.path()).unwrap();
    tmp
}

/// Write a file at a site-relative path, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Pin a file's mtime to the given unix timestamp (seconds).
pub fn set_mtime(root: &Path, rel: &str, unix_secs: i64) {
    filetime::set_file_mtime(root.join(rel), FileTime::from_unix_time(unix_secs, 0)).unwrap();
}

/// A `PageRecord` from plain strings. Panics on an invalid page — tests
/// that want a construction failure call `PageRecord::new` directly.
pub fn record(page: &str, title: &str, content: &str, template: &str) -> PageRecord {
    PageRecord::new(
        title,
        SitePath::new(page),
        SitePath::new(content),
        SitePath::new(template),
    )
    .unwrap()
}

/// Write a build record for `page` at its info location, mirroring the
/// page's current fields, with the given dependency paths.
pub fn write_build_record(root: &Path, page: &PageRecord, deps: &[&str]) {
    let rec = BuildRecord {
        title: page.title().to_string(),
        content_path: page.content_path().clone(),
        template_path: page.template_path().clone(),
        dependencies: deps.iter().map(SitePath::new).collect(),
    };
    write_file(root, page.page_path().info_location().as_str(), &rec.to_text());
}
