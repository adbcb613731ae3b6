//! Tracked-page and build-record value types plus their durable text forms.
//!
//! Both durable files are plain line-oriented text so they diff cleanly and
//! can be inspected (or repaired) in an editor:
//!
//! - **Registry block** (`.sitetrack/pages.list`): four lines per page —
//!   title, page path, content path, template path — separated by a blank
//!   line, one block per tracked page, ordered by page path.
//! - **Build record** (`.sitetrack/built/<page>.info`): title, content
//!   path, template path, then one line per dependency the last successful
//!   build consulted. The record file's own mtime doubles as the
//!   last-built clock, so the detector never stores a timestamp.

use crate::paths::SitePath;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// A structurally invalid page, rejected at construction time.
///
/// [`PageRecord::new`] is the only way to make a record, so none of these
/// can ever reach the registry or the durable store: the formats are
/// line-oriented, and a blank or multi-line title, an empty path, or a
/// path that escapes the site root would be unrepresentable or unsafe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("page {page_path} has same content and template path {path}")]
    SelfReferential { page_path: SitePath, path: SitePath },
    #[error("page {page_path} has an empty title")]
    EmptyTitle { page_path: SitePath },
    #[error("page {page_path} has a title spanning multiple lines")]
    MultiLineTitle { page_path: SitePath },
    #[error(
        "page {page_path} has an invalid {kind} path {path:?}: paths must be non-empty, relative and stay inside the site root"
    )]
    InvalidPath {
        page_path: SitePath,
        kind: &'static str,
        path: SitePath,
    },
}

/// Malformed durable text.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("registry entry starting at line {line} is truncated ({got} of 4 lines)")]
    Truncated { line: usize, got: usize },
    #[error("build record is truncated ({got} of 3 header lines)")]
    TruncatedRecord { got: usize },
    #[error(transparent)]
    Invalid(#[from] RecordError),
}

/// One tracked page: a content file and a template file producing one
/// output page.
///
/// Identity, equality and ordering are by `page_path` alone — two records
/// with the same page path are the same page for registry membership even
/// when their other fields differ (and that difference is exactly what the
/// staleness detector looks for).
#[derive(Debug, Clone, Eq)]
pub struct PageRecord {
    title: String,
    page_path: SitePath,
    content_path: SitePath,
    template_path: SitePath,
}

impl PageRecord {
    /// Build a record, rejecting anything the durable formats cannot hold.
    ///
    /// The store is line-oriented and trims lines on reload, so the title
    /// is trimmed here and must be a single non-blank line; every path must
    /// stay inside the site root; and a page may not use the same file as
    /// both content and template.
    pub fn new(
        title: impl Into<String>,
        page_path: SitePath,
        content_path: SitePath,
        template_path: SitePath,
    ) -> Result<Self, RecordError> {
        let title = title.into();
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(RecordError::EmptyTitle { page_path });
        }
        if title.lines().count() > 1 {
            return Err(RecordError::MultiLineTitle { page_path });
        }
        for (kind, path) in [
            ("page", &page_path),
            ("content", &content_path),
            ("template", &template_path),
        ] {
            if !path.is_site_relative() {
                return Err(RecordError::InvalidPath {
                    page_path: page_path.clone(),
                    kind,
                    path: path.clone(),
                });
            }
        }
        if content_path == template_path {
            return Err(RecordError::SelfReferential {
                page_path,
                path: content_path,
            });
        }
        Ok(Self {
            title,
            page_path,
            content_path,
            template_path,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_path(&self) -> &SitePath {
        &self.page_path
    }

    pub fn content_path(&self) -> &SitePath {
        &self.content_path
    }

    pub fn template_path(&self) -> &SitePath {
        &self.template_path
    }

    /// Append this record's registry block, including the trailing blank
    /// separator line.
    pub fn write_block(&self, out: &mut String) {
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(self.page_path.as_str());
        out.push('\n');
        out.push_str(self.content_path.as_str());
        out.push('\n');
        out.push_str(self.template_path.as_str());
        out.push_str("\n\n");
    }
}

impl PartialEq for PageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.page_path == other.page_path
    }
}

impl PartialOrd for PageRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PageRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.page_path.cmp(&other.page_path)
    }
}

/// Labeled four-line diagnostic form, used wherever a full record is shown
/// to the user (duplicate-entry errors, the `pages` listing).
impl fmt::Display for PageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   page title: {}", self.title)?;
        writeln!(f, "    page path: {}", self.page_path)?;
        writeln!(f, " content path: {}", self.content_path)?;
        write!(f, "template path: {}", self.template_path)
    }
}

/// Parse a full registry store into records, in file order.
///
/// Blank lines separate blocks; a block is four consecutive non-blank
/// lines. A short or interrupted block aborts the parse — no partial
/// registry is ever produced. Uniqueness is the registry's concern, not
/// the parser's.
pub fn parse_registry(text: &str) -> Result<Vec<PageRecord>, FormatError> {
    let mut records = Vec::new();
    let mut lines = text.lines().enumerate().peekable();

    while let Some(&(start, first)) = lines.peek() {
        if first.trim().is_empty() {
            lines.next();
            continue;
        }
        let mut fields: Vec<&str> = Vec::with_capacity(4);
        while fields.len() < 4 {
            match lines.next() {
                Some((_, line)) if !line.trim().is_empty() => fields.push(line.trim()),
                _ => {
                    return Err(FormatError::Truncated {
                        line: start + 1,
                        got: fields.len(),
                    });
                }
            }
        }
        let record = PageRecord::new(
            fields[0],
            SitePath::new(fields[1]),
            SitePath::new(fields[2]),
            SitePath::new(fields[3]),
        )?;
        records.push(record);
    }

    Ok(records)
}

/// Snapshot of a page's inputs as of its last successful build.
///
/// Written by the builder, read by the staleness detector. Absence of the
/// record file means "never built".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub title: String,
    pub content_path: SitePath,
    pub template_path: SitePath,
    /// Every file the rendered output was derived from, in recorded order.
    pub dependencies: Vec<SitePath>,
}

impl BuildRecord {
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let mut header = || lines.next().map(str::to_string);

        let Some(title) = header() else {
            return Err(FormatError::TruncatedRecord { got: 0 });
        };
        let Some(content) = header() else {
            return Err(FormatError::TruncatedRecord { got: 1 });
        };
        let Some(template) = header() else {
            return Err(FormatError::TruncatedRecord { got: 2 });
        };

        Ok(Self {
            title,
            content_path: SitePath::new(content),
            template_path: SitePath::new(template),
            dependencies: lines.map(SitePath::new).collect(),
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(self.content_path.as_str());
        out.push('\n');
        out.push_str(self.template_path.as_str());
        out.push('\n');
        for dep in &self.dependencies {
            out.push_str(dep.as_str());
            out.push('\n');
        }
        out
    }
}
