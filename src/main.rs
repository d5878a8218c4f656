use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use modcatalog::catalog::Catalog;
use modcatalog::config::load_config;
use modcatalog::export::{export, ExportData, ExportFormat};
use modcatalog::filter::{
    ApprovedFilter, CorporateFilter, DoNotUseFilter, FilterSet, LicenseIdFilter, PromotedFilter,
    ScopeFilter,
};
use modcatalog::graph::Granularity;
use modcatalog::ingest::ModuleSubmission;
use modcatalog::store::{snapshot, MemoryStore};
use modcatalog::version::FreshnessFilter;

#[derive(Parser)]
#[command(name = "modcatalog")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Module and artifact dependency catalog with promotion checks", long_about = None)]
struct Cli {
    /// Catalog snapshot (JSON)
    #[arg(short, long, global = true, default_value = "catalog.json")]
    catalog: PathBuf,

    /// Engine configuration (TOML); defaults apply when the file is absent
    #[arg(long, global = true, default_value = "modcatalog.toml")]
    config: PathBuf,

    /// Output format: json or markdown
    #[arg(short, long, global = true, default_value = "markdown")]
    format: ExportFormat,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Scoping options shared by every query.
#[derive(Args)]
struct FilterArgs {
    /// Only artifacts whose groupId matches a configured corporate prefix
    #[arg(long, global = true)]
    corporate: bool,

    /// Only modules and artifacts with this promotion state
    #[arg(long, global = true)]
    promoted: Option<bool>,

    /// Only artifacts with this do-not-use flag
    #[arg(long, global = true)]
    do_not_use: Option<bool>,

    /// Only dependency edges with one of these scopes
    #[arg(long, global = true, value_delimiter = ',')]
    scope: Vec<String>,

    /// Only artifacts carrying this license
    #[arg(long, global = true)]
    license: Option<String>,

    /// Only licenses with this approval state
    #[arg(long, global = true)]
    approved: Option<bool>,

    /// Maximum number of module hops (overrides the configuration)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Follow dependency modules transitively (overrides the configuration)
    #[arg(long, global = true)]
    full_recursion: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the modules depending on an artifact
    Ancestors {
        /// Artifact GAVC (group:artifact:version[:classifier])
        gavc: String,
    },
    /// List the modules depending on any artifact of a module
    ModuleAncestors {
        /// Module ID (name:version)
        module: String,
    },
    /// Build the dependency graph of a module
    Graph {
        module: String,

        /// Node granularity: artifact or module
        #[arg(short, long, default_value = "artifact")]
        granularity: Granularity,
    },
    /// Build the dependency tree of a module
    Tree { module: String },
    /// Report on the promotion feasibility of a module
    Promotion { module: String },
    /// Check whether a module can be promoted
    CanPromote { module: String },
    /// Promote a module and its artifacts, then save the catalog
    Promote {
        module: String,

        /// Promote even if the feasibility check fails
        #[arg(long)]
        force: bool,
    },
    /// List the external dependencies of a module
    Deps {
        module: String,

        /// Compute freshness and keep: all, up-to-date or outdated
        #[arg(long)]
        freshness: Option<FreshnessFilter>,
    },
    /// List the known versions of an artifact
    Versions { gavc: String },
    /// Show the latest known version of an artifact
    Latest { gavc: String },
    /// List the licenses of an artifact
    Licenses { gavc: String },
    /// List the licenses of every artifact of a module
    ModuleLicenses { module: String },
    /// Submit module metadata (JSON) and save the catalog
    Submit { path: PathBuf },
    /// Set or clear the do-not-use flag of an artifact and save the catalog
    DoNotUse {
        gavc: String,

        /// Clear the flag instead of setting it
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let snapshot = snapshot::parse_file(&cli.catalog)
        .with_context(|| format!("Failed to load catalog {}", cli.catalog.display()))?;
    let store = MemoryStore::from_snapshot(snapshot).context("Failed to index catalog")?;
    let catalog = Catalog::new(store, config);
    let filters = build_filters(&catalog, &cli.filters)?;

    let data = match cli.command {
        Commands::Ancestors { gavc } => ExportData::Ancestors {
            ancestors: catalog.artifact_ancestors(&gavc, &filters)?,
            subject: gavc,
        },
        Commands::ModuleAncestors { module } => ExportData::Ancestors {
            ancestors: catalog.module_ancestors(&module, &filters)?,
            subject: module,
        },
        Commands::Graph {
            module,
            granularity,
        } => ExportData::Graph(catalog.module_graph(&module, &filters, granularity)?.to_view()),
        Commands::Tree { module } => ExportData::Tree(catalog.module_tree(&module, &filters)?),
        Commands::Promotion { module } => {
            ExportData::Promotion(catalog.promotion_report(&module, &filters)?)
        }
        Commands::CanPromote { module } => ExportData::Promotable {
            can_be_promoted: catalog.can_be_promoted(&module, &filters)?,
            module,
        },
        Commands::Promote { module, force } => {
            let report = catalog.promotion_report(&module, &filters)?;
            if !report.can_be_promoted && !force {
                write_output(cli.format, &ExportData::Promotion(report))?;
                bail!("{} cannot be promoted (use --force to override)", module);
            }
            catalog.promote(&module)?;
            save(&catalog, &cli.catalog)?;
            ExportData::Promotable {
                module,
                can_be_promoted: true,
            }
        }
        Commands::Deps { module, freshness } => {
            ExportData::Dependencies(catalog.dependency_report(&module, &filters, freshness)?)
        }
        Commands::Versions { gavc } => ExportData::Versions {
            versions: catalog.artifact_versions(&gavc)?,
            latest: catalog.latest_version(&gavc)?,
            artifact: gavc,
        },
        Commands::Latest { gavc } => ExportData::Latest {
            latest: catalog.latest_version(&gavc)?,
            artifact: gavc,
        },
        Commands::Licenses { gavc } => ExportData::Licenses {
            licenses: catalog.artifact_licenses(&gavc, &filters)?,
            subject: gavc,
        },
        Commands::ModuleLicenses { module } => ExportData::Licenses {
            licenses: catalog.module_licenses(&module, &filters)?,
            subject: module,
        },
        Commands::Submit { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let submission: ModuleSubmission = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            let module = catalog.submit(&submission)?;
            save(&catalog, &cli.catalog)?;
            ExportData::Promotion(catalog.promotion_report(&module.id(), &filters)?)
        }
        Commands::DoNotUse { gavc, clear } => {
            catalog.set_do_not_use(&gavc, !clear)?;
            save(&catalog, &cli.catalog)?;
            ExportData::Ancestors {
                ancestors: catalog.artifact_ancestors(&gavc, &filters)?,
                subject: gavc,
            }
        }
    };

    write_output(cli.format, &data)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MODCATALOG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "modcatalog=debug,info"
        } else {
            "modcatalog=info,warn"
        })
    });

    let format = env::var("MODCATALOG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

/// Combines the configured defaults with the command-line filters.
fn build_filters(catalog: &Catalog<MemoryStore>, args: &FilterArgs) -> Result<FilterSet> {
    let mut filters = catalog.filters();

    if args.corporate {
        let prefixes = catalog.config().corporate_group_ids.clone();
        let corporate = CorporateFilter::new(prefixes)
            .context("--corporate needs corporate_group_ids in the configuration")?;
        filters.add_filter(corporate);
    }
    if let Some(promoted) = args.promoted {
        filters.add_filter(PromotedFilter::new(promoted));
    }
    if let Some(do_not_use) = args.do_not_use {
        filters.add_filter(DoNotUseFilter::new(do_not_use));
    }
    if !args.scope.is_empty() {
        filters.add_filter(ScopeFilter::new(args.scope.iter().cloned())?);
    }
    if let Some(license) = &args.license {
        filters.add_filter(LicenseIdFilter::new(license.clone())?);
    }
    if let Some(approved) = args.approved {
        filters.add_filter(ApprovedFilter::new(approved));
    }
    if args.max_depth.is_some() {
        filters = filters.with_max_depth(args.max_depth);
    }
    if args.full_recursion {
        filters = filters.with_full_recursion(true);
    }

    Ok(filters)
}

fn save(catalog: &Catalog<MemoryStore>, path: &Path) -> Result<()> {
    let content = catalog.store().snapshot()?;
    snapshot::write_file(path, &content)
        .with_context(|| format!("Failed to write catalog {}", path.display()))?;
    tracing::debug!(path = %path.display(), "catalog saved");
    Ok(())
}

fn write_output(format: ExportFormat, data: &ExportData) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    export(format, data, &mut handle).context("Failed to write output")?;
    handle.flush()?;
    Ok(())
}
