use alblocks_core::{CodeGenerator, GeneratorConfig, Workspace};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "alblocks")]
#[command(version, about = "Generate AL source code from a block workspace", long_about = None)]
struct Cli {
    /// Workspace file saved by the block editor's JSON serializer
    input: PathBuf,

    /// Write the generated code here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Generator configuration (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Indentation unit
    #[arg(long)]
    indent: Option<String>,

    /// Code emitted before every statement; %1 is replaced by the block id
    #[arg(long)]
    statement_prefix: Option<String>,

    /// Code emitted after every statement; %1 is replaced by the block id
    #[arg(long)]
    statement_suffix: Option<String>,

    /// Code emitted at the top of every loop body; %1 is replaced by the block id
    #[arg(long)]
    loop_trap: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli)?;
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let workspace = Workspace::from_json(&source)
        .with_context(|| format!("Failed to load workspace {}", cli.input.display()))?;

    let code = CodeGenerator::with_config(config)
        .workspace_to_code(&workspace)
        .with_context(|| format!("Failed to generate code for {}", cli.input.display()))?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &code)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{code}"),
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configuration file values, overridden by command line flags.
fn build_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(indent) = &cli.indent {
        config.indent = indent.clone();
    }
    if let Some(prefix) = &cli.statement_prefix {
        config.statement_prefix = Some(hook_line(prefix));
    }
    if let Some(suffix) = &cli.statement_suffix {
        config.statement_suffix = Some(hook_line(suffix));
    }
    if let Some(trap) = &cli.loop_trap {
        config.infinite_loop_trap = Some(hook_line(trap));
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON config {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML config {}", path.display()))?
    };
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Hooks given on the command line are single statements; terminate them.
fn hook_line(hook: &str) -> String {
    if hook.is_empty() || hook.ends_with('\n') {
        hook.to_string()
    } else {
        format!("{hook}\n")
    }
}
