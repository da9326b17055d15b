//! kbwire CLI: read, normalize and inspect knowledge-base wire text.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use kbwire::algebra::{find_free_variables, tree_gather};
use kbwire::config::CodecConfig;
use kbwire::registry::ConstantRegistry;
use kbwire::term::{Constant, Guid, Nart, Term};
use kbwire::wire::{Reader, Writer};

#[derive(Parser)]
#[command(name = "kbwire", version, about = "Knowledge-base wire codec")]
struct Cli {
    /// Codec configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Function name whose forms read as reified terms (repeatable).
    #[arg(long = "function", global = true, value_name = "NAME")]
    functions: Vec<String>,

    /// Constant to intern before reading, as NAME=GUID (repeatable).
    #[arg(
        long = "constant",
        global = true,
        value_name = "NAME=GUID",
        value_parser = parse_constant
    )]
    constants: Vec<(String, Guid)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read every form and print it back in canonical wire text.
    Fmt {
        /// Input file; standard input when omitted.
        file: Option<PathBuf>,
    },

    /// Print one JSON object per form describing its structure.
    Inspect {
        /// Input file; standard input when omitted.
        file: Option<PathBuf>,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn parse_constant(s: &str) -> std::result::Result<(String, Guid), String> {
    let (name, guid) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=GUID, got \"{s}\""))?;
    if name.is_empty() {
        return Err("constant name must not be empty".into());
    }
    let guid = guid.parse::<Guid>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), guid))
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).into_diagnostic(),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
            Ok(text)
        }
    }
}

fn describe(term: &Term, writer: &Writer) -> Result<serde_json::Value> {
    let free: Vec<String> = find_free_variables(term)
        .iter()
        .map(ToString::to_string)
        .collect();
    let constants: Vec<serde_json::Value> = tree_gather::<Constant>(term)
        .iter()
        .map(|c| serde_json::json!({ "name": c.name(), "guid": c.guid() }))
        .collect();
    let narts = tree_gather::<Nart>(term).len();
    Ok(serde_json::json!({
        "kind": term.kind(),
        "size": term.size(),
        "text": writer.write(term)?,
        "free_variables": free,
        "constants": constants,
        "narts": narts,
    }))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    };
    config.oracle.functions.extend(cli.functions.iter().cloned());
    config.constants.extend(cli.constants.iter().cloned());
    config.validate()?;

    let registry = ConstantRegistry::new();
    let preloaded = config.preload(&registry)?;
    tracing::debug!(preloaded, functions = config.oracle.functions.len(), "codec ready");

    let oracle = config.oracle();
    let reader = Reader::new(&registry)
        .with_oracle(&oracle)
        .with_options(config.reader_options());
    let writer = Writer::new(config.write_options());

    match cli.command {
        Commands::Fmt { file } => {
            let text = read_input(file.as_deref())?;
            for term in reader.read_all(&text)? {
                println!("{}", writer.write(&term)?);
            }
        }

        Commands::Inspect { file, pretty } => {
            let text = read_input(file.as_deref())?;
            for term in reader.read_all(&text)? {
                let report = describe(&term, &writer)?;
                let line = if pretty {
                    serde_json::to_string_pretty(&report)
                } else {
                    serde_json::to_string(&report)
                }
                .into_diagnostic()?;
                println!("{line}");
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
