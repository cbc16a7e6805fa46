mod logging;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use geomscan_core::{DeviceClass, GeomCommand, GeomRequest};
use geomscan_discovery::config::GeomConfig;
use geomscan_discovery::output::{OutputFormat, format_report};
use geomscan_discovery::report::GeomReport;
use geomscan_discovery::runner::{SystemExecutor, run_geom};
use geomscan_discovery::{DiscoverError, parse_output_with_report};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Table => Self::Table,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "geomscan")]
#[command(about = "Read FreeBSD GEOM state as structured data")]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run `geom <CLASS> list` and print the parsed geoms.
    List(LiveArgs),
    /// Run `geom <CLASS> status -s` and print the parsed status rows.
    Status(LiveArgs),
    /// Parse captured geom output from a file without running geom.
    ParseFile(ParseFileArgs),
    /// Parse captured geom output from stdin without running geom.
    ParseStdin(ParseStdinArgs),
}

#[derive(Debug, Args)]
struct LiveArgs {
    /// GEOM class to query.
    #[arg(long, default_value_t = DeviceClass::Part)]
    class: DeviceClass,
    /// Restrict the query to one device (e.g. ada0, mirror/gm0).
    #[arg(long)]
    device: Option<String>,
    /// YAML runner configuration (geom path, timeout, environment).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Which geom sub-command produced the output (list or status).
    #[arg(long, default_value_t = GeomCommand::List)]
    mode: GeomCommand,
    /// Path to file containing captured output.
    #[arg(long)]
    input: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ParseStdinArgs {
    /// Which geom sub-command produced the output (list or status).
    #[arg(long, default_value_t = GeomCommand::List)]
    mode: GeomCommand,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::List(args) => run_live(GeomCommand::List, args),
        Command::Status(args) => run_live(GeomCommand::Status, args),
        Command::ParseFile(args) => run_parse_file(args),
        Command::ParseStdin(args) => run_parse_stdin(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_live(command: GeomCommand, args: LiveArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => GeomConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => GeomConfig::default(),
    };

    let mut request = GeomRequest::new(command, args.class);
    request.device = args.device;

    let executor = SystemExecutor::from_config(&config).map_err(describe_error)?;
    let report = run_geom(&executor, &request).map_err(describe_error)?;
    print_report(&report, args.format.into())
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), String> {
    let text = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    run_parse_text(args.mode, &text, args.format.into())
}

fn run_parse_stdin(args: ParseStdinArgs) -> Result<(), String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| format!("Failed to read stdin: {err}"))?;
    run_parse_text(args.mode, &text, args.format.into())
}

fn run_parse_text(mode: GeomCommand, text: &str, format: OutputFormat) -> Result<(), String> {
    let run = parse_output_with_report(mode, text)
        .map_err(|err| format!("Failed to parse {mode} output: {err}"))?;
    print_report(&GeomReport::offline(mode, run), format)
}

fn print_report(report: &GeomReport, format: OutputFormat) -> Result<(), String> {
    let output = format_report(report, format)?;
    println!("{}", output.trim_end());
    Ok(())
}

/// Formats an error for stderr, including captured output for failed runs.
fn describe_error(err: DiscoverError) -> String {
    match err {
        DiscoverError::SubprocessFailure {
            ref stdout,
            ref stderr,
            ..
        } => {
            let mut message = err.to_string();
            for (label, stream) in [("stdout", stdout), ("stderr", stderr)] {
                let stream = stream.trim_end();
                if !stream.is_empty() {
                    message.push_str(&format!("\n--- {label} ---\n{stream}"));
                }
            }
            message
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::describe_error;
    use geomscan_discovery::DiscoverError;

    #[test]
    fn test_describe_error_appends_captured_streams() {
        let err = DiscoverError::SubprocessFailure {
            command: "geom PART list".into(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "geom: No such geom: ada9.\n".into(),
        };
        let message = describe_error(err);
        assert_eq!(
            message,
            "'geom PART list' failed with exit code 1\n--- stderr ---\ngeom: No such geom: ada9."
        );
    }

    #[test]
    fn test_describe_error_passes_other_errors_through() {
        let err = DiscoverError::BinaryNotFound("/sbin/geom".into());
        assert_eq!(describe_error(err), "geom binary not found: /sbin/geom");
    }
}
