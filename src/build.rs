//! Building pages and orchestrating batch builds.
//!
//! The [`Builder`] trait is the seam between the tracking core and the
//! rendering step. A builder turns one page's content + template into its
//! output file and, only on success, rewrites that page's build record —
//! including the complete list of files the output was derived from. The
//! coordinator never writes build records itself.
//!
//! [`BuildCoordinator`] runs the batch operations: build a selected set,
//! build everything, build only what the staleness detector flags, or
//! report status without building. Per-page build failures are bucketed
//! into the report, never propagated — one broken page must not stop the
//! rest of the site.

use crate::page::{BuildRecord, PageRecord};
use crate::paths::SitePath;
use crate::registry::PageRegistry;
use crate::staleness::{self, PageStatus, Problem, StaleReason};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("content file {0} does not exist")]
    MissingContent(SitePath),
    #[error("template file {0} does not exist")]
    MissingTemplate(SitePath),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Renders one page and refreshes its build record on success.
pub trait Builder {
    fn build(&self, page: &PageRecord, root: &Path) -> Result<(), BuildError>;
}

/// Token in a template replaced by the content file's text.
pub const CONTENT_TOKEN: &str = "{{content}}";

/// Token in a template replaced by the page title.
pub const TITLE_TOKEN: &str = "{{title}}";

/// The stock builder: plain token substitution.
///
/// Reads the template, substitutes `{{title}}` and `{{content}}`, and
/// writes the result to `<output_dir>/<page_path>`. The dependency list it
/// records is exactly the two input files — rendering stays deliberately
/// minimal, since the interesting machinery here is the tracking around
/// it.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    output_dir: PathBuf,
}

impl TemplateBuilder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Builder for TemplateBuilder {
    fn build(&self, page: &PageRecord, root: &Path) -> Result<(), BuildError> {
        if !page.content_path().exists_in(root) {
            return Err(BuildError::MissingContent(page.content_path().clone()));
        }
        if !page.template_path().exists_in(root) {
            return Err(BuildError::MissingTemplate(page.template_path().clone()));
        }

        let content = fs::read_to_string(page.content_path().resolve(root))?;
        let template = fs::read_to_string(page.template_path().resolve(root))?;
        let rendered = template
            .replace(TITLE_TOKEN, page.title())
            .replace(CONTENT_TOKEN, content.trim_end());

        let output = root.join(&self.output_dir).join(page.page_path().as_str());
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output, rendered)?;

        // Record only after the output landed, so the record's mtime marks
        // a completed build.
        let record = BuildRecord {
            title: page.title().to_string(),
            content_path: page.content_path().clone(),
            template_path: page.template_path().clone(),
            dependencies: vec![page.content_path().clone(), page.template_path().clone()],
        };
        let info = page.page_path().info_location().resolve(root);
        if let Some(parent) = info.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&info, record.to_text())?;
        Ok(())
    }
}

/// Outcome buckets for one batch build. Failures carry their error so the
/// report can say why, not just which.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub built: Vec<SitePath>,
    pub failed: Vec<(SitePath, BuildError)>,
    pub untracked: Vec<SitePath>,
}

impl BuildReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.untracked.is_empty()
    }
}

/// Staleness partition of the whole registry.
///
/// Besides the per-page buckets, the report aggregates the dependency
/// files the stale reasons point at, deduplicated across pages — one
/// edited template shared by fifty pages shows up once.
#[derive(Debug, Default)]
pub struct StatusReport {
    pub stale: Vec<(SitePath, StaleReason)>,
    pub problems: Vec<(SitePath, Problem)>,
    pub up_to_date: Vec<SitePath>,
    /// Dependencies named by a removed-since-last-build reason.
    pub removed_files: Vec<SitePath>,
    /// Dependencies named by a modified-since-last-build reason.
    pub modified_files: Vec<SitePath>,
}

impl StatusReport {
    pub fn all_current(&self) -> bool {
        self.stale.is_empty() && self.problems.is_empty()
    }
}

/// Runs batch operations over a registry and a builder.
pub struct BuildCoordinator<'a, B: Builder> {
    registry: &'a PageRegistry,
    builder: &'a B,
}

impl<'a, B: Builder> BuildCoordinator<'a, B> {
    pub fn new(registry: &'a PageRegistry, builder: &'a B) -> Self {
        Self { registry, builder }
    }

    /// Build the given pages; untracked paths are bucketed, not errors.
    pub fn build_selected(&self, paths: &[SitePath]) -> BuildReport {
        let mut report = BuildReport::default();
        for path in paths {
            match self.registry.lookup(path) {
                Some(page) => self.build_into(page, &mut report),
                None => report.untracked.push(path.clone()),
            }
        }
        report
    }

    /// Build every tracked page, regardless of staleness.
    pub fn build_all(&self) -> BuildReport {
        let mut report = BuildReport::default();
        for page in self.registry.iter() {
            self.build_into(page, &mut report);
        }
        report
    }

    /// Partition the registry by staleness without building anything.
    pub fn status(&self) -> StatusReport {
        let mut report = StatusReport::default();
        let mut removed = BTreeSet::new();
        let mut modified = BTreeSet::new();
        for page in self.registry.iter() {
            let path = page.page_path().clone();
            match staleness::check(page, self.registry.root()) {
                PageStatus::Problem(problem) => report.problems.push((path, problem)),
                PageStatus::Stale(reason) => {
                    match &reason {
                        StaleReason::DependencyRemoved(dep) => {
                            removed.insert(dep.clone());
                        }
                        StaleReason::DependencyModified(dep) => {
                            modified.insert(dep.clone());
                        }
                        _ => {}
                    }
                    report.stale.push((path, reason));
                }
                PageStatus::UpToDate => report.up_to_date.push(path),
            }
        }
        report.removed_files = removed.into_iter().collect();
        report.modified_files = modified.into_iter().collect();
        report
    }

    /// Build only the stale partition. Problem pages are excluded — there
    /// is no point invoking the builder against a missing input.
    pub fn build_stale(&self) -> (StatusReport, BuildReport) {
        let status = self.status();
        let mut report = BuildReport::default();
        for (path, _) in &status.stale {
            // Stale paths come straight from the registry iteration.
            if let Some(page) = self.registry.lookup(path) {
                self.build_into(page, &mut report);
            }
        }
        (status, report)
    }

    fn build_into(&self, page: &PageRecord, report: &mut BuildReport) {
        let path = page.page_path().clone();
        match self.builder.build(page, self.registry.root()) {
            Ok(()) => report.built.push(path),
            Err(e) => report.failed.push((path, e)),
        }
    }
}
