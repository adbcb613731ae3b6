//! The durable page registry.
//!
//! One registry per site, stored at `.sitetrack/pages.list` and read fully
//! into memory at the start of every invocation. Membership is keyed by
//! page path: the in-memory form is a `BTreeMap` from [`SitePath`] to
//! [`PageRecord`], which gives uniqueness-by-path and ordered iteration
//! (the save order) for free.
//!
//! Two invariants hold at all times, both on disk and in memory:
//!
//! 1. No two entries share a page path.
//! 2. Every entry is structurally valid: a single-line non-blank title,
//!    site-relative paths, and distinct content and template files — all
//!    enforced by [`PageRecord::new`], the only way to make a record.
//!
//! Loading is all-or-nothing: the first malformed block, duplicate entry
//! or invariant violation aborts the whole load, and the caller must treat
//! the site as unusable until the store is fixed by hand. Every mutation
//! that changes membership rewrites the store completely — there is no
//! append path and no tombstone, so the file always mirrors the in-memory
//! set exactly. A crash mid-save can corrupt the store; a single process
//! per site is assumed throughout.

use crate::page::{FormatError, PageRecord};
use crate::paths::{RECORDS_DIR, REGISTRY_FILE, SITE_DIR, SitePath};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("site not initialized: {0} does not exist (run `sitetrack init` first)")]
    StoreMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(
        "duplicate entry for {page}\n----- first entry -----\n{existing}\n----- second entry -----\n{incoming}",
        page = existing.page_path()
    )]
    DuplicateEntry {
        existing: Box<PageRecord>,
        incoming: Box<PageRecord>,
    },
}

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("already tracking {page}\n----- current entry -----\n{existing}", page = existing.page_path())]
    AlreadyTracked { existing: Box<PageRecord> },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum UntrackError {
    #[error("not tracking {0}")]
    NotTracked(SitePath),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Non-fatal advisory raised by [`PageRegistry::track`]: tracking a page
/// whose input files don't exist yet is allowed (content is often authored
/// after registration), but worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackWarning {
    MissingContent(SitePath),
    MissingTemplate(SitePath),
}

impl fmt::Display for TrackWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContent(p) => write!(f, "warning: content path {p} does not exist"),
            Self::MissingTemplate(p) => write!(f, "warning: template path {p} does not exist"),
        }
    }
}

/// The full set of tracked pages for one site.
#[derive(Debug)]
pub struct PageRegistry {
    root: PathBuf,
    pages: BTreeMap<SitePath, PageRecord>,
}

impl PageRegistry {
    /// Load the registry from `root`'s durable store.
    ///
    /// Fails with [`RegistryError::StoreMissing`] when the site was never
    /// initialized, and aborts on the first malformed block, duplicate or
    /// self-referential entry.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        let store = root.join(REGISTRY_FILE);
        if !store.is_file() {
            return Err(RegistryError::StoreMissing(store));
        }

        let text = fs::read_to_string(&store)?;
        let mut registry = Self {
            root,
            pages: BTreeMap::new(),
        };
        for record in crate::page::parse_registry(&text)? {
            registry.insert(record)?;
        }
        Ok(registry)
    }

    /// Create the on-disk layout for a fresh site: the reserved directory,
    /// an empty registry store, and the build-record tree.
    pub fn init_store(root: &Path) -> io::Result<()> {
        fs::create_dir_all(root.join(SITE_DIR))?;
        fs::create_dir_all(root.join(RECORDS_DIR))?;
        let store = root.join(REGISTRY_FILE);
        if !store.is_file() {
            fs::write(&store, "")?;
        }
        Ok(())
    }

    /// Rewrite the durable store from the in-memory set, in page-path
    /// order.
    pub fn save(&self) -> io::Result<()> {
        let mut out = String::new();
        for record in self.pages.values() {
            record.write_block(&mut out);
        }
        fs::write(self.root.join(REGISTRY_FILE), out)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_tracking(&self, page_path: &SitePath) -> bool {
        self.pages.contains_key(page_path)
    }

    pub fn lookup(&self, page_path: &SitePath) -> Option<&PageRecord> {
        self.pages.get(page_path)
    }

    /// All tracked pages, in page-path order.
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Start tracking a page, then flush the store.
    ///
    /// Structurally invalid records cannot reach this point — they fail
    /// at [`PageRecord::new`]. Returns the advisory warnings for input
    /// files that don't exist yet.
    pub fn track(&mut self, record: PageRecord) -> Result<Vec<TrackWarning>, TrackError> {
        if let Some(existing) = self.pages.get(record.page_path()) {
            return Err(TrackError::AlreadyTracked {
                existing: Box::new(existing.clone()),
            });
        }

        let mut warnings = Vec::new();
        if !record.content_path().exists_in(&self.root) {
            warnings.push(TrackWarning::MissingContent(record.content_path().clone()));
        }
        if !record.template_path().exists_in(&self.root) {
            warnings.push(TrackWarning::MissingTemplate(
                record.template_path().clone(),
            ));
        }

        self.pages.insert(record.page_path().clone(), record);
        self.save()?;
        Ok(warnings)
    }

    /// Stop tracking a page, delete its build record, then flush the
    /// store. Returns the removed record.
    pub fn untrack(&mut self, page_path: &SitePath) -> Result<PageRecord, UntrackError> {
        if !self.is_tracking(page_path) {
            return Err(UntrackError::NotTracked(page_path.clone()));
        }

        // Best effort: a page untracked before its first build has no record.
        let info = page_path.info_location().resolve(&self.root);
        match fs::remove_file(&info) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let removed = self
            .pages
            .remove(page_path)
            .ok_or_else(|| UntrackError::NotTracked(page_path.clone()))?;
        self.save()?;
        Ok(removed)
    }

    /// Insert during load, surfacing duplicates with both entries' full
    /// fields for diagnostics.
    fn insert(&mut self, record: PageRecord) -> Result<(), RegistryError> {
        match self.pages.entry(record.page_path().clone()) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateEntry {
                existing: Box::new(existing.get().clone()),
                incoming: Box::new(record),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::RecordError;
    use crate::test_helpers::{record, site_root, write_file};

    fn open(root: &Path) -> PageRegistry {
        PageRegistry::load(root).unwrap()
    }

    // =========================================================================
    // Load
    // =========================================================================

    #[test]
    fn load_missing_store_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            PageRegistry::load(tmp.path()),
            Err(RegistryError::StoreMissing(_))
        ));
    }

    #[test]
    fn load_empty_store_is_empty_registry() {
        let tmp = site_root();
        let registry = open(tmp.path());
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn load_rejects_duplicate_page_path() {
        let tmp = site_root();
        write_file(
            tmp.path(),
            REGISTRY_FILE,
            "One\na.html\none.md\nt.html\n\nTwo\na.html\ntwo.md\nu.html\n\n",
        );
        let err = PageRegistry::load(tmp.path()).unwrap_err();
        match err {
            RegistryError::DuplicateEntry { existing, incoming } => {
                assert_eq!(existing.title(), "One");
                assert_eq!(incoming.title(), "Two");
            }
            other => panic!("expected DuplicateEntry, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_self_referential_entry() {
        let tmp = site_root();
        write_file(tmp.path(), REGISTRY_FILE, "Bad\na.html\nsame.md\nsame.md\n\n");
        assert!(matches!(
            PageRegistry::load(tmp.path()),
            Err(RegistryError::Format(FormatError::Invalid(
                RecordError::SelfReferential { .. }
            )))
        ));
    }

    #[test]
    fn load_rejects_store_with_blank_title_line() {
        // A blank line where a title belongs reads as a block separator,
        // leaving a three-line block behind it.
        let tmp = site_root();
        write_file(tmp.path(), REGISTRY_FILE, "\na.html\na.md\nt.html\n\n");
        assert!(matches!(
            PageRegistry::load(tmp.path()),
            Err(RegistryError::Format(FormatError::Truncated { .. }))
        ));
    }

    #[test]
    fn load_rejects_truncated_block() {
        let tmp = site_root();
        write_file(tmp.path(), REGISTRY_FILE, "Short\na.html\n\n");
        assert!(matches!(
            PageRegistry::load(tmp.path()),
            Err(RegistryError::Format(FormatError::Truncated { .. }))
        ));
    }

    #[test]
    fn duplicate_error_names_both_entries() {
        let tmp = site_root();
        write_file(
            tmp.path(),
            REGISTRY_FILE,
            "One\na.html\none.md\nt.html\n\nTwo\na.html\ntwo.md\nu.html\n\n",
        );
        let message = PageRegistry::load(tmp.path()).unwrap_err().to_string();
        assert!(message.contains("first entry"));
        assert!(message.contains("one.md"));
        assert!(message.contains("second entry"));
        assert!(message.contains("two.md"));
    }

    // =========================================================================
    // Track
    // =========================================================================

    #[test]
    fn track_inserts_and_persists() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        write_file(tmp.path(), "a.md", "content");
        write_file(tmp.path(), "t.html", "template");

        let warnings = registry
            .track(record("a.html", "About", "a.md", "t.html"))
            .unwrap();
        assert!(warnings.is_empty());
        assert!(registry.is_tracking(&SitePath::new("a.html")));

        let reloaded = open(tmp.path());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.lookup(&SitePath::new("a.html")).unwrap().title(),
            "About"
        );
    }

    #[test]
    fn track_duplicate_fails_and_leaves_registry_unchanged() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("a.html", "One", "one.md", "t.html"))
            .unwrap();

        let err = registry
            .track(record("a.html", "Two", "two.md", "u.html"))
            .unwrap_err();
        match err {
            TrackError::AlreadyTracked { existing } => assert_eq!(existing.title(), "One"),
            TrackError::Io(e) => panic!("unexpected IO error: {e}"),
        }

        assert_eq!(registry.len(), 1);
        let kept = registry.lookup(&SitePath::new("a.html")).unwrap();
        assert_eq!(kept.title(), "One");
        assert_eq!(kept.content_path(), &SitePath::new("one.md"));
    }

    #[test]
    fn track_warns_on_missing_inputs_but_succeeds() {
        let tmp = site_root();
        let mut registry = open(tmp.path());

        let warnings = registry
            .track(record("a.html", "About", "nope.md", "nope.html"))
            .unwrap();
        assert_eq!(
            warnings,
            vec![
                TrackWarning::MissingContent(SitePath::new("nope.md")),
                TrackWarning::MissingTemplate(SitePath::new("nope.html")),
            ]
        );
        assert!(registry.is_tracking(&SitePath::new("a.html")));
    }

    #[test]
    fn track_warns_on_missing_template_only() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        write_file(tmp.path(), "a.md", "content");

        let warnings = registry
            .track(record("a.html", "About", "a.md", "nope.html"))
            .unwrap();
        assert_eq!(
            warnings,
            vec![TrackWarning::MissingTemplate(SitePath::new("nope.html"))]
        );
    }

    // =========================================================================
    // Untrack
    // =========================================================================

    #[test]
    fn untrack_missing_page_fails() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        assert!(matches!(
            registry.untrack(&SitePath::new("ghost.html")),
            Err(UntrackError::NotTracked(_))
        ));
    }

    #[test]
    fn untrack_removes_page_and_survives_reload() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("a.html", "A", "a.md", "t.html"))
            .unwrap();
        registry
            .track(record("b.html", "B", "b.md", "t.html"))
            .unwrap();

        let removed = registry.untrack(&SitePath::new("a.html")).unwrap();
        assert_eq!(removed.title(), "A");
        assert!(!registry.is_tracking(&SitePath::new("a.html")));

        let reloaded = open(tmp.path());
        assert_eq!(reloaded.len(), 1);
        assert!(!reloaded.is_tracking(&SitePath::new("a.html")));
        assert!(reloaded.is_tracking(&SitePath::new("b.html")));
    }

    #[test]
    fn untrack_deletes_build_record() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("a.html", "A", "a.md", "t.html"))
            .unwrap();

        let info = SitePath::new("a.html").info_location();
        write_file(tmp.path(), info.as_str(), "A\na.md\nt.html\n");
        assert!(info.exists_in(tmp.path()));

        registry.untrack(&SitePath::new("a.html")).unwrap();
        assert!(!info.exists_in(tmp.path()));
    }

    #[test]
    fn untrack_without_build_record_is_fine() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("a.html", "A", "a.md", "t.html"))
            .unwrap();
        assert!(registry.untrack(&SitePath::new("a.html")).is_ok());
    }

    // =========================================================================
    // Save / iteration order
    // =========================================================================

    #[test]
    fn save_orders_by_page_path() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("z.html", "Z", "z.md", "t.html"))
            .unwrap();
        registry
            .track(record("a.html", "A", "a.md", "t.html"))
            .unwrap();

        let text = fs::read_to_string(tmp.path().join(REGISTRY_FILE)).unwrap();
        let a = text.find("a.html").unwrap();
        let z = text.find("z.html").unwrap();
        assert!(a < z);

        let paths: Vec<&SitePath> = registry.iter().map(PageRecord::page_path).collect();
        assert_eq!(paths, [&SitePath::new("a.html"), &SitePath::new("z.html")]);
    }

    #[test]
    fn padded_title_survives_track_and_reload() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("a.html", "  About Us  ", "a.md", "t.html"))
            .unwrap();

        let reloaded = open(tmp.path());
        assert_eq!(
            reloaded.lookup(&SitePath::new("a.html")).unwrap().title(),
            "About Us"
        );
    }

    #[test]
    fn roundtrip_preserves_full_records() {
        let tmp = site_root();
        let mut registry = open(tmp.path());
        registry
            .track(record("b.html", "Blog", "posts/b.md", "templates/post.html"))
            .unwrap();
        registry
            .track(record("a.html", "About", "a.md", "templates/page.html"))
            .unwrap();

        let reloaded = open(tmp.path());
        assert_eq!(reloaded.len(), 2);
        let blog = reloaded.lookup(&SitePath::new("b.html")).unwrap();
        assert_eq!(blog.title(), "Blog");
        assert_eq!(blog.content_path(), &SitePath::new("posts/b.md"));
        assert_eq!(blog.template_path(), &SitePath::new("templates/post.html"));
    }
}
