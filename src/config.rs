//! Site configuration.
//!
//! Loaded from `.sitetrack/config.toml`. Every value has a default, so a
//! site needs no config file at all; the file only carries overrides.
//! Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "site"                       # Where built pages land
//! content_dir = "content"                   # Root for derived content paths
//! default_template = "templates/page.html"  # Template used when track omits one
//! ```
//!
//! The config feeds two places: the builder (output directory) and the
//! `track` command's path derivation — `track blog/post.html "Post"`
//! without explicit paths declares `content/blog/post.md` as content and
//! the default template as template.

use crate::paths::{SITE_DIR, SitePath};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file location, relative to the site root.
pub const CONFIG_FILE: &str = ".sitetrack/config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory built pages are written to, relative to the site root.
    pub output_dir: String,
    /// Directory content paths are derived from when `track` doesn't name
    /// one explicitly.
    pub content_dir: String,
    /// Template used when `track` doesn't name one explicitly.
    pub default_template: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: "site".to_string(),
            content_dir: "content".to_string(),
            default_template: "templates/page.html".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("output_dir", &self.output_dir),
            ("content_dir", &self.content_dir),
            ("default_template", &self.default_template),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} must not be empty")));
            }
        }
        if SitePath::new(&self.output_dir).as_str() == SITE_DIR {
            return Err(ConfigError::Validation(format!(
                "output_dir must not be the reserved {SITE_DIR} directory"
            )));
        }
        Ok(())
    }

    /// Default content path for a page: the page path re-rooted under the
    /// content directory with a `.md` extension.
    ///
    /// `blog/post.html` → `content/blog/post.md`.
    pub fn content_path_for(&self, page_path: &SitePath) -> SitePath {
        let stem = Path::new(page_path.as_str()).with_extension("md");
        SitePath::new(format!("{}/{}", self.content_dir, stem.display()))
    }

    pub fn default_template_path(&self) -> SitePath {
        SitePath::new(&self.default_template)
    }
}

/// Load the site config from `root`, falling back to defaults when no
/// config file exists.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let config = if path.is_file() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A documented stock config, printed by `gen-config` and written by
/// `init`. Matches `SiteConfig::default()`.
pub fn stock_config_toml() -> &'static str {
    r#"# sitetrack configuration
# All options are optional - defaults shown below.

# Where built pages land, relative to the site root.
output_dir = "site"

# Root for content paths derived by `track` when --content is omitted:
# tracking blog/post.html declares content/blog/post.md as its content.
content_dir = "content"

# Template used by `track` when --template is omitted.
default_template = "templates/page.html"
"#
}
