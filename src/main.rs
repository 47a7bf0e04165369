mod db;
mod display;
mod fetch;
mod parser;
mod pipeline;
mod settings;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use db::Store;
use fetch::HttpFetcher;
use pipeline::{AppContext, PipelineError, RunOutcome};
use settings::Settings;

#[derive(Parser)]
#[command(name = "ncut_contacts", about = "Harvest staff contacts from an NCUT directory page")]
struct Cli {
    /// Config file (default: ./contacts.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database path, overrides the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the contacts table
    Init,
    /// Fetch a directory page, store its contacts and show them
    Run {
        url: String,
        /// Print contacts as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Prompt for directory URLs, one run per line
    Interactive,
    /// Extract contacts from a saved HTML page without storing them
    Parse {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show stored contacts
    List {
        /// Max rows to display
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show store totals
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = settings::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }

    match cli.command {
        Commands::Parse { file, json } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let correlator = settings.correlation.correlator();
            let contacts = parser::process_page(&html, correlator.as_ref());
            display::write_contacts(&mut io::stdout(), &contacts, json)
        }
        Commands::Init => {
            open_store(&settings)?;
            println!("Contacts table ready at {}", settings.db_path.display());
            Ok(())
        }
        Commands::List { limit } => {
            let store = open_store(&settings)?;
            let contacts = store.contacts(limit)?;
            display::write_contacts(&mut io::stdout(), &contacts, false)
        }
        Commands::Stats => {
            let store = open_store(&settings)?;
            let s = store.stats()?;
            println!("Contacts:      {}", s.total);
            println!("Unknown email: {}", s.unknown_email);
            Ok(())
        }
        Commands::Run { url, json } => {
            let ctx = build_context(&settings)?;
            let outcome = run_with_spinner(&ctx, &url)?;
            display::write_contacts(&mut io::stdout(), &outcome.contacts, json)?;
            if !json {
                println!("\n{}", display::summary(&outcome.report));
            }
            Ok(())
        }
        Commands::Interactive => {
            let ctx = build_context(&settings)?;
            interactive(&ctx, io::stdin().lock(), &mut io::stdout())
        }
    }
}

fn open_store(settings: &Settings) -> Result<Store> {
    let store = Store::open(&settings.db_path)
        .with_context(|| format!("Failed to open {}", settings.db_path.display()))?;
    store.initialize().context("Failed to create contacts table")?;
    Ok(store)
}

fn build_context(settings: &Settings) -> Result<AppContext> {
    Ok(AppContext {
        store: open_store(settings)?,
        fetcher: Box::new(HttpFetcher::new(&settings.user_agent, settings.timeout())?),
        correlator: settings.correlation.correlator(),
    })
}

fn run_with_spinner(ctx: &AppContext, url: &str) -> Result<RunOutcome, PipelineError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Fetching {}", url.trim()));
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = pipeline::run(ctx, url);
    pb.finish_and_clear();
    result
}

/// One run per input line. Each run finishes before the next line is read,
/// and a failed run or unreadable line is reported without leaving the loop.
fn interactive(ctx: &AppContext, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut lines = input.lines();
    loop {
        write!(out, "URL> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            return Ok(());
        };
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Unreadable input line: {}", e);
                writeln!(out, "Error: could not read input: {}\n", e)?;
                continue;
            }
            Err(e) => return Err(e).context("reading interactive input"),
        };
        if matches!(line.trim(), "quit" | "exit") {
            return Ok(());
        }

        match run_with_spinner(ctx, &line) {
            Ok(outcome) => {
                display::write_contacts(&mut *out, &outcome.contacts, false)?;
                writeln!(out, "{}\n", display::summary(&outcome.report))?;
            }
            Err(e) => {
                warn!("Run failed: {}", e);
                writeln!(out, "Error: {}\n", e)?;
            }
        }
    }
}
