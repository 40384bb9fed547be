//! Application orchestrator.
//! Loads/merges config, initializes logging, type-checks the six parameters,
//! runs the relocation and turns its outcome into stdout text and an exit status.

use anyhow::{bail, Context, Result};
use tracing::{debug, error};

use move_partition::cli::Args;
use move_partition::config::{
    default_config_path, load_config, load_config_from_xml_path, Config, CONFIG_ENV,
};
use move_partition::output as out;
use move_partition::{LogLevel, RelocationOutcome, RelocationRequest};

use crate::logging::init_tracing;

/// Run the CLI application. Returns the process exit status.
pub fn run(args: Args) -> Result<i32> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location(&args);
        return Ok(0);
    }

    if let Some(lvl) = args.log_level.as_deref()
        && LogLevel::parse(lvl).is_none()
    {
        bail!("invalid --log-level '{lvl}' (expected quiet, normal, info or debug)");
    }

    let cfg = build_config(&args)?;

    // Hold the guard until the end of run so file logs are flushed
    let _guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    let request = match RelocationRequest::from_arguments(&args.arguments()) {
        Ok(r) => r,
        Err(e) => {
            error!(code = e.code(), kind = e.kind(), error = %e, "Rejected parameters");
            let outcome = RelocationOutcome::from_error(&e);
            out::print_outcome(&outcome);
            return Ok(outcome.exit_code());
        }
    };
    debug!(?request, "Starting move_partition");

    let outcome = relocate(cfg, &request)?;
    out::print_outcome(&outcome);
    Ok(outcome.exit_code())
}

/// XML (explicit path or default location), then CLI overrides, then validation.
fn build_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => load_config_from_xml_path(path)?,
        None => load_config()?,
    };
    args.apply_overrides(&mut cfg);
    cfg.validate().context("invalid settings")?;
    Ok(cfg)
}

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        println!("{}", p.display());
        out::print_info("Using the file given with --config.");
        return;
    }
    if std::env::var_os(CONFIG_ENV).is_some() {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit). Unset it to use the default location."
        ));
    }
    match default_config_path() {
        Some(p) => {
            println!("{}", p.display());
            if !p.exists() {
                out::print_info("No config file exists there; built-in defaults apply.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

#[cfg(feature = "mysql")]
fn relocate(cfg: Config, request: &RelocationRequest) -> Result<RelocationOutcome> {
    use move_partition::{MysqlConnector, PartitionRelocator};

    let relocator = PartitionRelocator::new(MysqlConnector, cfg.connection);
    Ok(relocator.relocate(request))
}

#[cfg(not(feature = "mysql"))]
fn relocate(_cfg: Config, _request: &RelocationRequest) -> Result<RelocationOutcome> {
    bail!("move_partition was built without the `mysql` feature; no database driver is available")
}
