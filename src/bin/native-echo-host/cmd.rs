use std::path::PathBuf;

use clap::{Args, Subcommand};
use native_frame::install::{self, Manifest, Scope};
use native_frame::{echo, host, Channel, HostConfig};

use crate::exit::{CliError, CliResult, SUCCESS};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer native messages on stdin/stdout (what browsers launch).
    Run,
    /// Write host manifests so browsers can launch this executable.
    Install(InstallArgs),
    /// Delete host manifests.
    Remove(TargetArgs),
    /// Exit 0 if manifests are installed, 1 otherwise.
    Verify(TargetArgs),
    /// Print the manifest that `install` would write for one browser.
    Manifest(ManifestArgs),
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Browser key (repeatable). Defaults to the config's `browsers`.
    #[arg(long = "browser", value_name = "BROWSER")]
    pub browsers: Vec<String>,

    /// Machine-wide manifests instead of per-user.
    #[arg(long)]
    pub system: bool,

    /// Host name override.
    #[arg(long, value_name = "NAME")]
    pub host_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub allow: AllowArgs,

    /// Host executable. Defaults to this binary.
    #[arg(long, value_name = "PATH")]
    pub exe: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AllowArgs {
    /// Chromium-family origin, e.g. chrome-extension://<id>/ (repeatable).
    #[arg(long = "allowed-origin", value_name = "ORIGIN")]
    pub allowed_origins: Vec<String>,

    /// Firefox-family add-on ID (repeatable).
    #[arg(long = "allowed-extension", value_name = "ID")]
    pub allowed_extensions: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ManifestArgs {
    #[arg(long, value_name = "BROWSER")]
    pub browser: String,

    #[arg(long, value_name = "NAME")]
    pub host_name: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub exe: Option<PathBuf>,

    #[command(flatten)]
    pub allow: AllowArgs,
}

pub fn run(command: Command, config: &HostConfig) -> CliResult<i32> {
    match command {
        Command::Run => run_host(config),
        Command::Install(args) => run_install(args, config),
        Command::Remove(args) => run_remove(args, config),
        Command::Verify(args) => run_verify(args, config),
        Command::Manifest(args) => run_manifest(args, config),
    }
}

pub fn run_host(config: &HostConfig) -> CliResult<i32> {
    let mut channel = Channel::stdio();
    channel.set_config(config.frame_config());
    tracing::info!(
        host = %config.host_name,
        max_incoming = config.max_incoming,
        max_outgoing = config.max_outgoing,
        "echo host ready"
    );

    match host::serve(&mut channel, echo::reply) {
        Ok(answered) => {
            tracing::info!(answered, "stdin closed, exiting");
            Ok(SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, "channel failed");
            Err(err.into())
        }
    }
}

struct Target {
    host_name: String,
    browsers: Vec<String>,
    scope: Scope,
}

impl Target {
    fn resolve(args: TargetArgs, config: &HostConfig) -> CliResult<Self> {
        let host_name = args.host_name.unwrap_or_else(|| config.host_name.clone());
        native_frame::config::validate_host_name(&host_name)?;
        let browsers = if args.browsers.is_empty() {
            config.browsers.clone()
        } else {
            args.browsers
        };
        if browsers.is_empty() {
            return Err(CliError::usage("no browsers selected"));
        }
        let scope = if args.system { Scope::System } else { Scope::User };
        Ok(Self {
            host_name,
            browsers,
            scope,
        })
    }

    fn browser_refs(&self) -> Vec<&str> {
        self.browsers.iter().map(String::as_str).collect()
    }
}

fn exe_or_current(exe: Option<PathBuf>) -> CliResult<PathBuf> {
    match exe {
        Some(path) => Ok(path),
        None => Ok(std::env::current_exe()?),
    }
}

fn allow_lists(allow: AllowArgs, config: &HostConfig) -> (Vec<String>, Vec<String>) {
    let origins = if allow.allowed_origins.is_empty() {
        config.allowed_origins.clone()
    } else {
        allow.allowed_origins
    };
    let extensions = if allow.allowed_extensions.is_empty() {
        config.allowed_extensions.clone()
    } else {
        allow.allowed_extensions
    };
    (origins, extensions)
}

fn run_install(args: InstallArgs, config: &HostConfig) -> CliResult<i32> {
    let target = Target::resolve(args.target, config)?;
    let exe = exe_or_current(args.exe)?;
    let (origins, extensions) = allow_lists(args.allow, config);
    if origins.is_empty() && extensions.is_empty() {
        tracing::warn!("no allowed origins or extensions; browsers will refuse to connect");
    }

    install::install(
        &target.host_name,
        &config.description,
        &exe,
        &origins,
        &extensions,
        &target.browser_refs(),
        target.scope,
    )?;
    Ok(SUCCESS)
}

fn run_remove(args: TargetArgs, config: &HostConfig) -> CliResult<i32> {
    let target = Target::resolve(args, config)?;
    install::remove(&target.host_name, &target.browser_refs(), target.scope)?;
    Ok(SUCCESS)
}

fn run_verify(args: TargetArgs, config: &HostConfig) -> CliResult<i32> {
    let target = Target::resolve(args, config)?;
    let browsers = target.browser_refs();
    if install::verify_installed(&target.host_name, Some(browsers.as_slice()), target.scope)? {
        eprintln!("{}: installed", target.host_name);
        Ok(SUCCESS)
    } else {
        eprintln!("{}: not installed", target.host_name);
        Ok(crate::exit::FAILURE)
    }
}

fn run_manifest(args: ManifestArgs, config: &HostConfig) -> CliResult<i32> {
    let host_name = args.host_name.unwrap_or_else(|| config.host_name.clone());
    native_frame::config::validate_host_name(&host_name)?;
    let exe = exe_or_current(args.exe)?;
    let (origins, extensions) = allow_lists(args.allow, config);
    let manifest = Manifest::for_browser(
        &args.browser,
        &host_name,
        &config.description,
        &exe,
        &origins,
        &extensions,
    )?;
    println!("{}", manifest.to_json()?);
    Ok(SUCCESS)
}
