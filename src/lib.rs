//! # sitetrack
//!
//! The incremental-build core of a static site generator: a durable
//! registry of pages (one content file + one template file → one output
//! page) and the staleness detection that decides, on each invocation,
//! which pages must be rebuilt.
//!
//! # Architecture
//!
//! Everything durable lives under the site's reserved `.sitetrack/`
//! directory, in plain line-oriented text:
//!
//! ```text
//! .sitetrack/
//! ├── config.toml          # output dir, content dir, default template
//! ├── pages.list           # the registry: 4-line blocks, one per page
//! └── built/               # shadow tree of per-page build records
//!     └── about.html.info  # inputs + dependency list of the last build
//! ```
//!
//! An invocation loads the registry fully into memory, performs one
//! operation, and rewrites the store on any membership change. A page is
//! rebuilt when its declared metadata drifted from its build record, or
//! when any recorded dependency was removed or modified since the record
//! was written — the record file's own mtime is the last-built clock.
//! Execution is single-threaded and synchronous; one process per site.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`paths`] | [`SitePath`](paths::SitePath) — normalized site-relative paths, mtime predicates, build-record locations |
//! | [`page`] | [`PageRecord`](page::PageRecord) and [`BuildRecord`](page::BuildRecord) plus their durable text forms |
//! | [`registry`] | [`PageRegistry`](registry::PageRegistry) — load/save, track/untrack, uniqueness and self-reference invariants |
//! | [`staleness`] | the rebuild decision ladder: problems, stale reasons, up-to-date |
//! | [`build`] | [`Builder`](build::Builder) seam, stock [`TemplateBuilder`](build::TemplateBuilder), batch [`BuildCoordinator`](build::BuildCoordinator) |
//! | [`config`] | `.sitetrack/config.toml` loading, validation, stock template |
//! | [`output`] | grouped CLI reporting — pure `format_*` functions plus `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Paths are strings
//!
//! Page identity and dependency comparisons are pure string comparisons on
//! normalized site-relative paths. Canonicalizing would make identity
//! depend on what currently exists on disk; a string key keeps "tracked"
//! meaningful for files that haven't been authored yet and makes every
//! rename visible as a path change.
//!
//! ## The record's mtime is the clock
//!
//! "Modified since last build" compares a dependency's mtime against the
//! build-record file's own mtime rather than a stored timestamp. Rewriting
//! the record on a successful build resets the clock automatically. Known
//! sharp edge: touching a record file out of band (backup tooling) hides
//! legitimate staleness until the next rebuild.
//!
//! ## Fail fast on structure, never on a page
//!
//! A malformed store, a duplicate entry or a self-referential page aborts
//! the whole operation — no partial registry is ever accepted. A single
//! page failing to *build*, on the other hand, is just a bucket in the
//! report; batch operations always run to completion.

pub mod build;
pub mod config;
pub mod output;
pub mod page;
pub mod paths;
pub mod registry;
pub mod staleness;

#[cfg(test)]
pub(crate) mod test_helpers;
