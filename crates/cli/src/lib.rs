use anyhow::{Context as AnyhowContext, Result};
use citenet_graph::{ExplorerConfig, YearDomain};
use citenet_protocol::{serialize_json, ErrorEnvelope};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod commands;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "citenet")]
#[command(about = "Explore a year-sharded citation network", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML or JSON)
    #[arg(long, global = true, env = "CITENET_CONFIG")]
    config: Option<PathBuf>,

    /// Shard directory (overrides shards.dir from the config file)
    #[arg(long, global = true, env = "CITENET_SHARD_DIR")]
    shard_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the network over a year range
    Compose(ComposeArgs),

    /// Print elements and stylesheet for a year range and filter state
    Render(RenderArgs),

    /// Show info panel content for one element
    Details(DetailsArgs),

    /// Write the citation rows of one publication as CSV
    Export(ExportArgs),

    /// Encode a JSON element list into a shard file
    Pack(PackArgs),

    /// Print the JSON Schema of the render payload
    Schema,
}

impl Commands {
    fn json_output(&self) -> bool {
        match self {
            Commands::Compose(args) => args.json,
            Commands::Render(_) | Commands::Details(_) | Commands::Schema => true,
            Commands::Export(_) | Commands::Pack(_) => false,
        }
    }
}

#[derive(Args, Clone, Copy)]
pub(crate) struct RangeArgs {
    /// First year (default: first year of the domain)
    #[arg(long)]
    pub from: Option<i32>,

    /// Last year (default: last year of the domain)
    #[arg(long)]
    pub to: Option<i32>,
}

impl RangeArgs {
    pub(crate) fn resolve(&self, domain: &YearDomain) -> (i32, i32) {
        (
            self.from.unwrap_or_else(|| domain.min()),
            self.to.unwrap_or_else(|| domain.max()),
        )
    }
}

#[derive(Args)]
pub(crate) struct ComposeArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Print the composed elements as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Selected publication
    #[arg(long)]
    pub node: Option<String>,

    /// Sector prefix to highlight
    #[arg(long)]
    pub sector: Option<String>,

    /// Publication id prefix to highlight
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub(crate) struct DetailsArgs {
    /// Node or edge id
    #[arg(long)]
    pub id: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Publication id
    #[arg(long)]
    pub id: String,

    /// Citation table (CSV with "Publication A" and "Publication B" columns)
    #[arg(long)]
    pub table: PathBuf,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["year", "full"])))]
pub(crate) struct PackArgs {
    /// JSON array of elements
    #[arg(long)]
    pub input: PathBuf,

    /// Year the shard covers
    #[arg(long)]
    pub year: Option<i32>,

    /// Write the full-domain shard
    #[arg(long)]
    pub full: bool,

    /// Output directory (default: the configured shard directory)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<ExplorerConfig> {
    let mut config = match &cli.config {
        Some(path) => ExplorerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExplorerConfig::default(),
    };
    if let Some(dir) = &cli.shard_dir {
        config.shards.dir = dir.clone();
    }
    log::debug!(
        "Shards: {} ({}..={})",
        config.shards.dir.display(),
        config.shards.min_year,
        config.shards.max_year
    );
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Commands::Compose(args) => commands::run_compose(&config, &args),
        Commands::Render(args) => commands::run_render(&config, &args),
        Commands::Details(args) => commands::run_details(&config, &args),
        Commands::Export(args) => commands::run_export(&args),
        Commands::Pack(args) => commands::run_pack(&config, &args),
        Commands::Schema => print_stdout(&serde_json::to_string_pretty(
            &citenet_protocol::render_payload_schema()?,
        )?),
    }
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    let json_output = cli.command.json_output();
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let result = run(cli);
    if let Err(err) = &result {
        if json_output {
            print_stdout(&serialize_json(&ErrorEnvelope::from_anyhow(err))?)?;
        }
    }
    result
}
