/*!
graphspec Command Line Interface

Renders, parses and validates `<graph_spec>` blocks from a file or stdin.
Set `GRAPHSPEC_LOG` (e.g. `GRAPHSPEC_LOG=debug`) to see build diagnostics.
*/

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use graphspec::execute::{execute_all, execute_document};
use graphspec::parser::{self, TokenizeResult};
use graphspec::validate::validate_traces_with;
use graphspec::writer::{PlotlyWriter, Theme};
use graphspec::{build_traces, RenderConfig, VERSION};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphspec")]
#[command(about = "Render <graph_spec> blocks from chat text as Plotly figures")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON file with render limits (missing fields keep defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the first block (or every block) as a Plotly figure
    Render {
        /// Input document; reads stdin when omitted
        file: Option<PathBuf>,

        /// Page theme (light, dark)
        #[arg(long, default_value = "light")]
        theme: Theme,

        /// Render every block in the document
        #[arg(long)]
        all: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Parse the first block and print the spec (for debugging)
    Parse {
        /// Input document; reads stdin when omitted
        file: Option<PathBuf>,

        /// Output format (json, debug)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Build traces for the first block and report whether they are drawable
    Validate {
        /// Input document; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GRAPHSPEC_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            file,
            theme,
            all,
            pretty,
        } => {
            let text = read_input(file.as_deref())?;
            let writer = PlotlyWriter::new().with_theme(theme);

            let (output, ok) = if all {
                let outcomes = execute_all(&text, &config, &writer)?;
                let ok = outcomes.iter().all(|o| o.is_chart());
                (serde_json::to_value(&outcomes)?, ok)
            } else {
                let Some(outcome) = execute_document(&text, &config, &writer) else {
                    bail!("no <graph_spec> block found");
                };
                (serde_json::to_value(&outcome)?, outcome.is_chart())
            };

            print_json(&output, pretty)?;
            if !ok {
                std::process::exit(1);
            }
        }

        Commands::Parse { file, format } => {
            let text = read_input(file.as_deref())?;
            match parser::tokenize(&text) {
                Some(TokenizeResult::Success { spec, .. }) => match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&spec)?),
                    "debug" => println!("{:#?}", spec),
                    _ => bail!("Unknown format: {}", format),
                },
                Some(TokenizeResult::Error { error, .. }) => {
                    eprintln!("Parse error: {}", error);
                    std::process::exit(1);
                }
                None => bail!("no <graph_spec> block found"),
            }
        }

        Commands::Validate { file } => {
            let text = read_input(file.as_deref())?;
            let spec = match parser::tokenize(&text) {
                Some(TokenizeResult::Success { spec, .. }) => spec,
                Some(TokenizeResult::Error { error, .. }) => bail!("Parse error: {}", error),
                None => bail!("no <graph_spec> block found"),
            };

            let output = build_traces(&spec, &config);
            for diagnostic in &output.diagnostics {
                eprintln!("{}", diagnostic);
            }
            let validation = validate_traces_with(&output.traces, config.invalid_threshold);
            println!("{}", serde_json::to_string_pretty(&validation)?);
            if !validation.valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RenderConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(RenderConfig::from_json(&text)?)
        }
        None => Ok(RenderConfig::default()),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
