use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use diig_database::MemoryDatabase;
use diig_releases::AccessGate;
use diig_releases::BrowseConfig;
use diig_releases::FetchOutcome;
use diig_releases::FilterSelection;
use diig_releases::GateDecision;
use diig_releases::PersistedState;
use diig_releases::Release;
use diig_releases::Session;
use diig_releases::SystemClock;
use tracing::debug;
use tracing::warn;

use crate::oracle::EnvOracle;

/// Browse scraped record-store releases from a database dump.
#[derive(Debug, Parser)]
#[command(name = "diig", version)]
pub struct Cli {
    /// Browse settings (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where the filter selection and taxonomy cache are kept between runs
    /// (defaults to .diig)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List releases for a store, section and view
    Browse(BrowseArgs),

    /// Show the stores, sections and views to choose from
    Taxonomy(TaxonomyArgs),
}

#[derive(Debug, Parser)]
pub struct BrowseArgs {
    /// JSON export of the release database
    #[arg(long, value_name = "DUMP")]
    pub data: PathBuf,

    /// Store to browse ("all" for every store). Omit all three filters to
    /// reuse the previous selection.
    #[arg(long)]
    pub store: Option<String>,

    #[arg(long)]
    pub section: Option<String>,

    #[arg(long)]
    pub view: Option<String>,

    /// Number of pages to load, counting the first
    #[arg(short = 'n', long, default_value_t = 1)]
    pub pages: usize,

    /// Route checked against the access gate
    #[arg(long, default_value = "/releases")]
    pub path: String,
}

#[derive(Debug, Parser)]
pub struct TaxonomyArgs {
    /// JSON export of the release database
    #[arg(long, value_name = "DUMP")]
    pub data: PathBuf,

    /// List the sections of this store
    #[arg(long)]
    pub store: Option<String>,

    /// List the views of this section (needs --store)
    #[arg(long, requires = "store")]
    pub section: Option<String>,

    /// Route checked against the access gate
    #[arg(long, default_value = "/taxonomy")]
    pub path: String,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let config = match &self.config {
            Some(path) => BrowseConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => BrowseConfig::default(),
        };
        let state_dir = self.state_dir.unwrap_or_else(|| PathBuf::from(".diig"));

        let gate = AccessGate::new(Arc::new(EnvOracle), config.login_path.clone());
        let path = match &self.command {
            Command::Browse(args) => &args.path,
            Command::Taxonomy(args) => &args.path,
        };
        if let GateDecision::Redirect { to } = gate.check(path).await {
            eprintln!("Sign in required: redirecting to {to}");
            return Ok(ExitCode::from(2));
        }

        match self.command {
            Command::Browse(args) => run_browse(args, config, &state_dir).await?,
            Command::Taxonomy(args) => run_taxonomy(args, config, &state_dir).await?,
        }
        Ok(ExitCode::SUCCESS)
    }
}

async fn open_session(data: &Path, config: BrowseConfig, state_dir: &Path) -> Result<Session> {
    let db = MemoryDatabase::from_json_file(data)
        .await
        .with_context(|| format!("Failed to load database dump {}", data.display()))?;
    let state = PersistedState::load(state_dir).context("Failed to load browse state")?;
    let session = Session::restore(Arc::new(db), config, Arc::new(SystemClock), state);

    if let Err(err) = session.initialize().await {
        warn!("Filters limited to \"all\": {err}");
    }
    Ok(session)
}

fn save_session(session: &Session, state_dir: &Path) -> Result<()> {
    session
        .persisted()
        .save(state_dir)
        .with_context(|| format!("Failed to save browse state to {}", state_dir.display()))
}

async fn run_browse(args: BrowseArgs, config: BrowseConfig, state_dir: &Path) -> Result<()> {
    let session = open_session(&args.data, config, state_dir).await?;

    if args.store.is_some() || args.section.is_some() || args.view.is_some() {
        let mut selection = FilterSelection::all();
        selection.set_store(args.store.into());
        selection.set_section(args.section.into())?;
        selection.set_view(args.view.into())?;
        session.select(selection).await?;
    } else {
        session.load_releases().await?;
    }

    for _ in 1..args.pages {
        match session.load_more().await? {
            FetchOutcome::Loaded(summary) => debug!("Continuation: {summary:?}"),
            FetchOutcome::Skipped(reason) => {
                debug!("No more pages: {reason:?}");
                break;
            }
            FetchOutcome::Stale => break,
        }
    }

    let page = session.page();
    for release in page.items() {
        println!("{}", release_line(release));
    }
    let tail = if page.is_exhausted() {
        "end of list"
    } else {
        "more available"
    };
    println!(
        "{} releases for {} ({tail})",
        page.items().len(),
        session.selection()
    );

    save_session(&session, state_dir)
}

async fn run_taxonomy(args: TaxonomyArgs, config: BrowseConfig, state_dir: &Path) -> Result<()> {
    let session = open_session(&args.data, config, state_dir).await?;

    println!("stores: {}", session.available_stores().join(", "));
    if let Some(store) = &args.store {
        let sections = match session.taxonomy() {
            Some(taxonomy) => taxonomy.available_sections(store),
            None => vec![diig_releases::ALL.to_string()],
        };
        println!("sections ({store}): {}", sections.join(", "));

        if let Some(section) = &args.section {
            let views = match session.taxonomy() {
                Some(taxonomy) => taxonomy.available_views(store, section),
                None => vec![diig_releases::ALL.to_string()],
            };
            println!("views ({store}/{section}): {}", views.join(", "));
        }
    }

    save_session(&session, state_dir)
}

fn release_line(release: &Release) -> String {
    let mut line = format!(
        "{}\t{}/{}/{}",
        release.id,
        release.store,
        release.section.as_deref().unwrap_or("-"),
        release.view.as_deref().unwrap_or("-"),
    );
    match (release.text("artist"), release.text("title")) {
        (Some(artist), Some(title)) => line.push_str(&format!("\t{artist} - {title}")),
        (None, Some(title)) => line.push_str(&format!("\t{title}")),
        _ => {}
    }
    line
}
