use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use spc_sensitize::analysis::control_sensitizing_graph;
use spc_sensitize::cli::{Cli, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(cli: &Cli) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if cli.reads_stdin() {
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
    } else {
        bytes = std::fs::read(&cli.input)
            .with_context(|| format!("failed to read {}", cli.input.display()))?;
    }
    Ok(bytes)
}

fn run(cli: &Cli) -> Result<bool> {
    let bytes = read_input(cli)?;
    let mut report = control_sensitizing_graph(&bytes, &cli.column);

    if let Some(path) = &cli.chart {
        if let Some(svg) = report.chart_svg() {
            std::fs::write(path, svg)
                .with_context(|| format!("failed to write chart to {}", path.display()))?;
            tracing::info!(path = %path.display(), "chart written");
        }
    }
    if !cli.embed_chart {
        report.take_chart();
    }

    match cli.format {
        OutputFormat::Json => {
            let json = if cli.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", report.to_text()),
    }

    Ok(report.is_ok())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
