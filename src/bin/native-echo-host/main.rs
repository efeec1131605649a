mod cmd;
mod exit;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use native_frame::HostConfig;

use crate::cmd::Command;
use crate::exit::{CliError, CliResult};
use crate::logging::{init_logging, parse_config_value, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "native-echo-host",
    version,
    about = "Native messaging host that echoes every message back"
)]
struct Cli {
    /// TOML config file (falls back to $NATIVE_FRAME_CONFIG).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log output format (stderr). Overrides the config file.
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// Minimum log level (stderr). Overrides the config file.
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    /// Caller identity the browser appends when launching the host: the extension
    /// origin (Chromium) or the manifest path and add-on ID (Firefox).
    #[arg(value_name = "CALLER", hide = true)]
    caller: Vec<String>,

    /// Native window handle Chrome passes on Windows.
    #[arg(long, value_name = "HANDLE", hide = true)]
    parent_window: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn logging_from(cli: &Cli, config: &HostConfig) -> CliResult<(LogFormat, LogLevel)> {
    let format = match cli.log_format {
        Some(format) => format,
        None => parse_config_value("format", &config.log.format).map_err(CliError::usage)?,
    };
    let level = match cli.log_level {
        Some(level) => level,
        None => parse_config_value("level", &config.log.level).map_err(CliError::usage)?,
    };
    Ok((format, level))
}

fn start(cli: Cli) -> CliResult<i32> {
    let config = HostConfig::load(cli.config.as_deref())?;
    let (format, level) = logging_from(&cli, &config)?;
    init_logging(format, level);

    if !cli.caller.is_empty() || cli.parent_window.is_some() {
        tracing::debug!(caller = ?cli.caller, parent_window = ?cli.parent_window, "launched by browser");
    }

    cmd::run(cli.command.unwrap_or(Command::Run), &config)
}

fn main() {
    let cli = Cli::parse();
    match start(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
