use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use jxview::config::Config;
use jxview::file_types::DocumentFormat;
use jxview::outline;
use jxview::parsers;
use jxview::reactive::ViewModelExt;
use jxview::viewmodels::DocumentViewModel;
use jxview::viewmodels::document::{
    COMMIT_EDIT, EDIT_SELECTED, SAVE, SAVE_AS, SELECT_FILE, SELECT_NODE,
};

#[derive(Parser)]
#[command(name = "jxview")]
#[command(about = "Browse, edit and convert JSON and XML documents", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a document as an indented outline
    Show {
        /// Document to show
        file: PathBuf,

        /// Start the outline at this node (slash-separated names, e.g. `servers/[0]`)
        #[arg(short, long)]
        path: Option<String>,

        /// Levels to show below the starting node
        #[arg(short, long)]
        depth: Option<usize>,

        /// Print names only
        #[arg(long)]
        no_values: bool,
    },
    /// Convert a document between JSON and XML
    Convert {
        /// Document to convert
        file: PathBuf,

        /// Target file; its extension picks the format
        #[arg(short, long, conflicts_with = "to")]
        output: Option<PathBuf>,

        /// Format to print to stdout when no target file is given
        #[arg(short, long, value_enum)]
        to: Option<DocumentFormat>,

        /// Write without indentation
        #[arg(long)]
        compact: bool,
    },
    /// Replace the value of one leaf and save the document
    Edit {
        /// Document to edit
        file: PathBuf,

        /// Node to change (slash-separated names, e.g. `servers/[0]/port`)
        #[arg(short, long)]
        path: String,

        /// New value
        #[arg(short, long)]
        value: String,

        /// Save to this file instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Profile document parsing (for use with cargo-flamegraph)
    ProfileParse {
        /// Document to parse
        #[arg(short, long)]
        file: PathBuf,

        /// Number of iterations (for meaningful profiling)
        #[arg(short, long, default_value = "1000")]
        iterations: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Show {
            file,
            path,
            depth,
            no_values,
        } => run_show(config, &file, path.as_deref(), depth, no_values),
        Commands::Convert {
            file,
            output,
            to,
            compact,
        } => run_convert(config, &file, output.as_deref(), to, compact),
        Commands::Edit {
            file,
            path,
            value,
            output,
        } => run_edit(config, &file, &path, &value, output.as_deref()),
        Commands::ProfileParse { file, iterations } => run_profile_parse(config, &file, iterations),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

/// Document view-model with `file` loaded through the `SelectFile` command
fn open(config: Config, file: &Path) -> anyhow::Result<DocumentViewModel> {
    let mut document = DocumentViewModel::new(config)?;
    let path = path_param(file)?;
    document.invoke(SELECT_FILE, Some(path))?;
    Ok(document)
}

fn path_param(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}

fn run_show(
    config: Config,
    file: &Path,
    path: Option<&str>,
    depth: Option<usize>,
    no_values: bool,
) -> anyhow::Result<()> {
    let mut display = config.display.clone();
    display.show_values &= !no_values;

    let mut document = open(config, file)?;
    if let Some(path) = path {
        document.invoke(SELECT_NODE, Some(path))?;
    }

    let selection = document
        .selection()
        .context("document has no selectable node")?;
    println!("{}", document.title());
    println!("{} nodes\n", document.node_count());
    print!("{}", outline::render(&selection.to_node(), &display, depth));
    Ok(())
}

fn run_convert(
    mut config: Config,
    file: &Path,
    output: Option<&Path>,
    to: Option<DocumentFormat>,
    compact: bool,
) -> anyhow::Result<()> {
    config.serializer.pretty &= !compact;
    let mut document = open(config, file)?;

    match output {
        Some(output) => {
            document.invoke(SAVE_AS, Some(path_param(output)?))?;
            eprintln!("Wrote {}", document.selected_file_text());
        }
        None => {
            let format = to
                .or(document.format())
                .context("no target format given")?;
            println!("{}", document.render(format)?);
        }
    }
    Ok(())
}

fn run_edit(
    config: Config,
    file: &Path,
    path: &str,
    value: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut document = open(config, file)?;
    document.invoke(SELECT_NODE, Some(path))?;

    if !document.execute(EDIT_SELECTED, None)? {
        bail!("'{path}' is not a value and cannot be edited");
    }
    if !document.execute(COMMIT_EDIT, Some(value))? {
        let reason = document
            .selection()
            .and_then(|selection| selection.validation_error())
            .unwrap_or("rejected");
        bail!("cannot set '{}': {}", path, reason);
    }

    match output {
        Some(output) => document.invoke(SAVE_AS, Some(path_param(output)?))?,
        None => {
            if !document.execute(SAVE, None)? {
                eprintln!("Value unchanged, nothing to save");
                return Ok(());
            }
        }
    }
    eprintln!("Updated {} in {}", path, document.selected_file_text());
    Ok(())
}

fn run_profile_parse(config: Config, file: &Path, iterations: usize) -> anyhow::Result<()> {
    let format = DocumentFormat::from_path(file)
        .with_context(|| format!("unsupported file type: {}", file.display()))?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let parser = parsers::parser_for(format, &config.xml);

    eprintln!("Profiling parse operations for: {}", file.display());
    eprintln!("Iterations: {iterations}");
    eprintln!("File size: {} bytes", content.len());

    let start = Instant::now();
    let mut nodes = 0;
    for _ in 0..iterations {
        let root = parser.parse(&content)?;
        nodes = std::hint::black_box(root).count();
    }
    let elapsed = start.elapsed();

    eprintln!("\nProfiling complete!");
    eprintln!("Nodes per document: {nodes}");
    eprintln!("Total time: {elapsed:?}");
    if iterations > 0 {
        eprintln!("Average per iteration: {:?}", elapsed / iterations as u32);
    }
    Ok(())
}
