use clap::{Parser, Subcommand};
use sitetrack::build::{BuildCoordinator, TemplateBuilder};
use sitetrack::page::PageRecord;
use sitetrack::paths::SitePath;
use sitetrack::registry::PageRegistry;
use sitetrack::{config, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sitetrack")]
#[command(about = "Incremental page tracking for static sites")]
#[command(long_about = "\
Incremental page tracking for static sites

sitetrack keeps a durable registry of pages (a content file + a template
file producing one output page) and decides on each invocation which pages
are stale and must be rebuilt.

Site layout:

  mysite/
  ├── .sitetrack/
  │   ├── config.toml          # output dir, content dir, default template
  │   ├── pages.list           # the page registry
  │   └── built/               # per-page build records
  ├── content/
  │   └── about.md             # content files
  ├── templates/
  │   └── page.html            # templates ({{title}}, {{content}} tokens)
  └── site/                    # built output

A page is rebuilt when its title, content path or template path changed
since the last build, or when any file that build depended on was removed
or modified. Pages with a missing content or template file are reported
separately and skipped.

Run 'sitetrack init' in a site directory to get started.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a site: create .sitetrack/ with an empty registry
    Init,
    /// Start tracking a page
    Track {
        /// Output path of the page, relative to the output directory
        page_path: String,
        /// Page title
        title: String,
        /// Content file (default: derived from the page path under content_dir)
        #[arg(long)]
        content: Option<String>,
        /// Template file (default: default_template from config)
        #[arg(long)]
        template: Option<String>,
    },
    /// Stop tracking a page and drop its build record
    Untrack { page_path: String },
    /// List all tracked pages with full details
    Pages,
    /// List tracked page paths only
    Paths,
    /// Report which pages would be rebuilt, without building
    Status,
    /// Build the given pages, tracked or not
    Build { page_paths: Vec<String> },
    /// Build every tracked page, regardless of staleness
    BuildAll,
    /// Build only the pages that are stale
    BuildUpdated,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let root = cli.root.as_path();

    match cli.command {
        Command::Init => init(root)?,
        Command::Track {
            page_path,
            title,
            content,
            template,
        } => track(root, &page_path, &title, content, template)?,
        Command::Untrack { page_path } => {
            let mut registry = PageRegistry::load(root)?;
            let removed = registry.untrack(&SitePath::new(&page_path))?;
            println!("successfully untracked {}", removed.page_path());
        }
        Command::Pages => {
            let registry = PageRegistry::load(root)?;
            output::print_tracked_pages(&registry);
        }
        Command::Paths => {
            let registry = PageRegistry::load(root)?;
            output::print_tracked_paths(&registry);
        }
        Command::Status => {
            let (registry, builder) = open_site(root)?;
            let coordinator = BuildCoordinator::new(&registry, &builder);
            output::print_status_report(&coordinator.status());
        }
        Command::Build { page_paths } => {
            let (registry, builder) = open_site(root)?;
            let coordinator = BuildCoordinator::new(&registry, &builder);
            let paths: Vec<SitePath> = page_paths.iter().map(SitePath::new).collect();
            output::print_build_report(&coordinator.build_selected(&paths));
        }
        Command::BuildAll => {
            let (registry, builder) = open_site(root)?;
            if registry.is_empty() {
                println!("no pages tracked, nothing to build");
                return Ok(());
            }
            let coordinator = BuildCoordinator::new(&registry, &builder);
            output::print_build_report(&coordinator.build_all());
        }
        Command::BuildUpdated => {
            let (registry, builder) = open_site(root)?;
            let coordinator = BuildCoordinator::new(&registry, &builder);
            let (status, report) = coordinator.build_stale();
            output::print_status_report(&status);
            if !status.stale.is_empty() {
                println!();
                output::print_build_report(&report);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the registry and construct the builder from config.
fn open_site(root: &Path) -> Result<(PageRegistry, TemplateBuilder), Box<dyn std::error::Error>> {
    let site_config = config::load_config(root)?;
    let registry = PageRegistry::load(root)?;
    Ok((registry, TemplateBuilder::new(site_config.output_dir)))
}

fn init(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    PageRegistry::init_store(root)?;
    let config_path = root.join(config::CONFIG_FILE);
    if !config_path.is_file() {
        std::fs::write(&config_path, config::stock_config_toml())?;
    }
    println!("initialized sitetrack site in {}", root.display());
    Ok(())
}

fn track(
    root: &Path,
    page_path: &str,
    title: &str,
    content: Option<String>,
    template: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let site_config = config::load_config(root)?;
    let page_path = SitePath::new(page_path);
    let content_path = content
        .map(SitePath::new)
        .unwrap_or_else(|| site_config.content_path_for(&page_path));
    let template_path = template
        .map(SitePath::new)
        .unwrap_or_else(|| site_config.default_template_path());

    let record = PageRecord::new(title, page_path.clone(), content_path, template_path)?;

    let mut registry = PageRegistry::load(root)?;
    let warnings = registry.track(record)?;
    for warning in &warnings {
        println!("{warning}");
    }
    println!("successfully tracking {page_path}");
    Ok(())
}
