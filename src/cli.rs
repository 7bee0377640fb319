//! CLI argument parsing for spc-sensitize

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON report (default)
    Json,
    /// Human-readable summary
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "spc-sensitize")]
#[command(version)]
#[command(
    about = "Check a measurement column against the eight sensitizing control-chart rules",
    long_about = None
)]
pub struct Cli {
    /// CSV file to analyze ("-" reads stdin)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Measurement column to analyze
    #[arg(short, long, value_name = "NAME")]
    pub column: String,

    /// Write the SVG chart to this path
    #[arg(long, value_name = "PATH")]
    pub chart: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Include the SVG chart in the JSON report
    #[arg(long = "embed-chart")]
    pub embed_chart: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Enable debug tracing to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Whether the input should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal() {
        let cli = Cli::parse_from(["spc-sensitize", "data.csv", "--column", "width"]);
        assert_eq!(cli.input, PathBuf::from("data.csv"));
        assert_eq!(cli.column, "width");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.chart.is_none());
        assert!(!cli.embed_chart);
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn test_cli_all_flags() {
        let cli = Cli::parse_from([
            "spc-sensitize",
            "-",
            "-c",
            "len",
            "--chart",
            "out.svg",
            "--format",
            "text",
            "--embed-chart",
            "--pretty",
            "--debug",
        ]);
        assert!(cli.reads_stdin());
        assert_eq!(cli.chart, Some(PathBuf::from("out.svg")));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.embed_chart && cli.pretty && cli.debug);
    }

    #[test]
    fn test_cli_requires_column() {
        assert!(Cli::try_parse_from(["spc-sensitize", "data.csv"]).is_err());
    }
}
