//! Compiles the layered product model into its derived artifacts.
//!
//! With no arguments the binary finds the model root (the nearest directory
//! holding `model/vision.*`), reads `model/` and replaces `build/model/`.
//! Validation findings go to stderr through `tracing`; the exit code is 0 only
//! when every artifact was written (or, with `--check`, when the model is
//! valid).

use anyhow::{Result, anyhow, bail};
use product_model::config::{OUT_ENV, ROOT_ENV, SRC_ENV};
use product_model::{CompileConfig, ConfigOverrides};
use std::io::IsTerminal;
use std::{env, path::PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let default_level = "info";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let config = CompileConfig::resolve(cli.overrides)?;
    product_model::run(&config)?;
    Ok(())
}

struct Cli {
    overrides: ConfigOverrides,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();
        let mut overrides = ConfigOverrides::default();

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--src" => overrides.source_dir = Some(next_path("--src", &mut args)?),
                "--out" => overrides.output_dir = Some(next_path("--out", &mut args)?),
                "--check" => overrides.check_only = true,
                "--help" | "-h" => usage(0),
                other => bail!("unknown argument: {other}"),
            }
        }

        Ok(Self { overrides })
    }
}

fn next_path(flag: &str, args: &mut env::ArgsOs) -> Result<PathBuf> {
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?;
    let path = PathBuf::from(
        value
            .into_string()
            .map_err(|_| anyhow!("{flag} must be valid UTF-8"))?,
    );
    if path.as_os_str().is_empty() {
        bail!("{flag} must not be empty");
    }
    Ok(path)
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: compile-model [--src DIR] [--out DIR] [--check]\n\nOptions:\n  --src DIR                 Layer source directory (or set {SRC_ENV}; default <root>/model).\n  --out DIR                 Artifact output directory (or set {OUT_ENV}; default <root>/build/model).\n  --check                   Load and validate only; write nothing.\n  --help                    Show this help text.\n\nThe model root is found by searching upward for model/vision.yaml (or set {ROOT_ENV})."
    );
    std::process::exit(code);
}
