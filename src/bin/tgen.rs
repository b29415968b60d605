//! tgen CLI - Procedural table layouts from shared symbols and layer styles

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use futures::executor::block_on;
use table_generator::data::constants::{WINDOW_HEIGHT, WINDOW_IDENTIFIER, WINDOW_WIDTH};
use table_generator::{
    normalize_with, preview_table, validate, Command, Config, Dispatcher, HostDocument, Libraries,
    MemoryDocument, Mode, NodeId, Outcome, RawOptions,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tgen")]
#[command(version)]
#[command(
    about = "Table Generator - procedural table layouts from shared symbols and layer styles",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print the planned node tree of a table
    Plan {
        /// Options as JSON, a JSON file, or `-` for stdin
        options: Option<String>,

        /// Library file (JSON); the standard library when omitted
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Print an indented outline instead of JSON
        #[arg(long)]
        outline: bool,
    },

    /// Insert a new table into a document
    Build {
        /// Options as JSON, a JSON file, or `-` for stdin
        options: Option<String>,

        /// Library file (JSON)
        #[arg(short, long)]
        library: PathBuf,

        /// Document snapshot to build into; an empty document when omitted
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Output file for the document snapshot (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Regenerate an existing table
    Edit {
        /// Changed options as JSON, a JSON file, or `-` for stdin
        options: Option<String>,

        /// Library file (JSON)
        #[arg(short, long)]
        library: PathBuf,

        /// Document snapshot holding the table
        #[arg(short, long)]
        document: PathBuf,

        /// Id of the table root, or of any node inside the table
        #[arg(short, long)]
        target: u64,

        /// Output file for the document snapshot (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective default options
    Defaults,

    /// Show version and feature info
    Info,
}

type CliResult<T> = Result<T, Box<dyn Error>>;

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> CliResult<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan {
            options,
            library,
            outline,
        } => {
            let raw = read_options(options)?;
            let options = validate(normalize_with(&raw, &config.default_options()?)?)?;
            let libraries = match library {
                Some(path) => load_libraries(&path)?,
                None => Libraries::standard(),
            };
            let plan = preview_table(&libraries, &options, &config.catalog)?;

            if outline {
                print!("{}", plan.outline());
            } else {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
        }

        Commands::Build {
            options,
            library,
            document,
            output,
        } => {
            let raw = read_options(options)?.with("mode", "new");
            let document = match document {
                Some(path) => load_document(&path)?,
                None => MemoryDocument::new(),
            };
            let mut dispatcher = Dispatcher::new(load_libraries(&library)?, Some(document), config);
            dispatcher.open()?;

            let outcome = block_on(dispatcher.dispatch(Command::Submit { fields: raw }));
            finish(outcome, dispatcher.into_document(), output.as_deref())?;
        }

        Commands::Edit {
            options,
            library,
            document,
            target,
            output,
        } => {
            let mut snapshot = load_document(&document)?;
            snapshot.set_selection(&[NodeId(target)]);

            let mut dispatcher = Dispatcher::new(load_libraries(&library)?, Some(snapshot), config);
            let state = dispatcher.open()?;
            if state.mode != Mode::Edit {
                return Err(format!("node {} is not part of a generated table", target).into());
            }

            // Omitted fields keep the values stored on the table
            let fields = read_options(options)?.with("mode", "edit");
            let outcome = block_on(dispatcher.dispatch(Command::Submit { fields }));
            finish(outcome, dispatcher.into_document(), output.as_deref())?;
        }

        Commands::Defaults => {
            let defaults = config.default_options()?;
            println!("{}", serde_json::to_string_pretty(&defaults)?);
        }

        Commands::Info => {
            println!(
                "Table Generator - procedural table layouts from shared symbols and layer styles"
            );
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Features:");
            println!("  ✓ Row and column grouping");
            println!("  ✓ Header labels and alternating row styles");
            println!("  ✓ Edit mode keeping manual cell overrides");
            println!("  ✓ Configurable library names and defaults");
            println!();
            println!("Options window: {} ({}x{})", WINDOW_IDENTIFIER, WINDOW_WIDTH, WINDOW_HEIGHT);
            println!("Confirmation locale: {:?}", config.locale);
            println!();
        }
    }

    Ok(())
}

/// Print the confirmation and write the resulting snapshot
#[cfg(feature = "cli")]
fn finish(
    outcome: Outcome,
    document: Option<MemoryDocument>,
    output: Option<&Path>,
) -> CliResult<()> {
    let result = match outcome {
        Outcome::Built(result) | Outcome::Edited(result) => result,
        Outcome::Failed { message } => return Err(message.into()),
        other => return Err(format!("unexpected outcome {:?}", other).into()),
    };

    eprintln!("✓ {}", result.message);
    for warning in &result.warnings {
        eprintln!("⚠ {}", warning);
    }
    if let Some(edits) = result.edits {
        eprintln!("  manual edits kept: {}, discarded: {}", edits.kept, edits.discarded);
    }

    let snapshot = document.map(|d| d.to_json()).unwrap_or_default();
    match output {
        Some(path) => {
            fs::write(path, snapshot)?;
            eprintln!("✓ Document written to: {}", path.display());
        }
        None => println!("{}", snapshot),
    }
    Ok(())
}

/// Options given inline, as a file path, or on stdin
fn read_options(arg: Option<String>) -> CliResult<RawOptions> {
    let text = match arg.as_deref() {
        None => return Ok(RawOptions::new()),
        Some("-") => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        Some(path) if Path::new(path).is_file() => fs::read_to_string(path)?,
        Some(json) => json.to_string(),
    };
    Ok(RawOptions::from_json(&text)?)
}

fn load_libraries(path: &Path) -> CliResult<Libraries> {
    Ok(Libraries::from_json(&fs::read_to_string(path)?)?)
}

fn load_document(path: &Path) -> CliResult<MemoryDocument> {
    Ok(MemoryDocument::from_json(&fs::read_to_string(path)?)?)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install table-generator --features cli");
    eprintln!("  tgen <COMMAND>");
}
