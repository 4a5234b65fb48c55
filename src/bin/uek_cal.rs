use std::fs::{self, File, OpenOptions};
use std::process::ExitCode;
use std::sync::Mutex;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use uek_calendar::app::{Session, resolve_link, search_hits};
use uek_calendar::catalog::{Catalog, load_source};
use uek_calendar::clipboard::{ClipboardSink, SystemClipboard};
use uek_calendar::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use uek_calendar::domain::GroupId;
use uek_calendar::error::CalendarError;
use uek_calendar::output::{JsonOutput, OutputMode, TextOutput};
use uek_calendar::telemetry::{HttpTelemetry, NoopTelemetry, TelemetrySink};
use uek_calendar::tui::Tui;

#[derive(Parser)]
#[command(name = "uek-cal")]
#[command(about = "Find your class group and get a calendar subscription link")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    /// Read the group catalog from a local JSON file.
    #[arg(long, global = true, conflicts_with = "remote")]
    catalog: Option<Utf8PathBuf>,

    /// Fetch the group catalog over HTTP (default URL when no value is given).
    #[arg(long, global = true, num_args = 0..=1, value_name = "URL")]
    remote: Option<Option<String>>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Search groups by name, ID or faculty")]
    Search(SearchArgs),
    #[command(about = "Print the calendar URL of a group")]
    Link(LinkArgs),
    #[command(about = "List group categories")]
    Categories,
}

#[derive(Args)]
struct SearchArgs {
    query: String,
}

#[derive(Args)]
struct LinkArgs {
    id: String,

    #[arg(long)]
    copy: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<CalendarError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CalendarError) -> u8 {
    match error {
        CalendarError::GroupNotFound(_) | CalendarError::InvalidGroupId(_) => 2,
        err if err.load_failure().is_some() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let interactive_screen = cli.command.is_none() && !cli.non_interactive;
    init_tracing(interactive_screen);

    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?.apply(ConfigOverrides {
        catalog_path: cli.catalog,
        remote: cli.remote,
    });

    match cli.command {
        Some(Commands::Search(args)) => run_search(args, &config, output_mode),
        Some(Commands::Link(args)) => run_link(args, &config, output_mode),
        Some(Commands::Categories) => run_categories(&config, output_mode),
        None => {
            if matches!(output_mode, OutputMode::Interactive) {
                run_interactive(config)
            } else {
                Err(miette::Report::msg(
                    "command required (try `uek-cal --help`)",
                ))
            }
        }
    }
}

// The TUI draws on the terminal, so log lines go to a file while it runs.
fn init_tracing(interactive_screen: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false);
    if !interactive_screen {
        builder.with_writer(std::io::stderr).init();
        return;
    }
    match open_log_file() {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        None => builder.with_writer(std::io::sink).init(),
    }
}

fn open_log_file() -> Option<File> {
    let path = ConfigLoader::log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn load_catalog(config: &ResolvedConfig) -> Result<Catalog, CalendarError> {
    load_source(&config.catalog)
}

fn run_interactive(config: ResolvedConfig) -> miette::Result<()> {
    let telemetry: Box<dyn TelemetrySink> = match &config.telemetry_endpoint {
        Some(endpoint) => Box::new(HttpTelemetry::new(endpoint.as_str())?),
        None => Box::new(NoopTelemetry),
    };
    let mut session = Session::new(config.links.clone(), SystemClipboard::new(), telemetry);
    let mut tui = Tui::new();
    tui.run(&mut session, move || load_catalog(&config))
}

fn run_search(
    args: SearchArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let catalog = load_catalog(config)?;
    let hits = search_hits(&catalog, &config.links, &args.query);
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_search(&args.query, &hits),
        OutputMode::Interactive => TextOutput::print_search(&args.query, &hits),
    }
    .into_diagnostic()
}

fn run_link(
    args: LinkArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let id: GroupId = args.id.parse()?;
    let catalog = load_catalog(config)?;
    let mut result = resolve_link(&catalog, &config.links, &id)?;
    if args.copy {
        SystemClipboard::new().write_text(&result.url)?;
        result.copied = true;
    }
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_link(&result),
        OutputMode::Interactive => TextOutput::print_link(&result),
    }
    .into_diagnostic()
}

fn run_categories(config: &ResolvedConfig, output_mode: OutputMode) -> miette::Result<()> {
    let catalog = load_catalog(config)?;
    let categories = catalog.categories();
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_categories(categories),
        OutputMode::Interactive => TextOutput::print_categories(categories),
    }
    .into_diagnostic()
}
