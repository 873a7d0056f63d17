use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Context;
use clap::{Parser, Subcommand};
use procpatch_core::{
    PatchOptions, PatchResult, Patcher,
    patch::hint_sql::helper_schema_sql,
    split::split_statements,
};


static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "procpatch_core=debug,procpatch_cli=info";
const HELPER_FILE_NAME: &str = "__procpatch_helper.sql";

#[derive(Debug, Parser)]
#[command(
    name = "procpatch",
    author,
    version,
    about = "Insert, strip or refresh call hints in stored procedures",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Remove hint inserts instead of adding them
    #[arg(short = 'd', long, conflicts_with = "repatch")]
    depatch: bool,

    /// Remove existing hints (including legacy ones), then patch again
    #[arg(short = 'r', long)]
    repatch: bool,

    /// TOML file with patch options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not write the hint table schema file
    #[arg(long)]
    no_helper: bool,

    /// Print warnings to stderr as a JSON array
    #[arg(long)]
    warnings_json: bool,

    /// SQL file to process
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Where to write the result; stdout if omitted
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the statements of a file as JSON, as the patcher sees them.
    Split {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Print the hint table schema.
    Helper {
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Patch,
    Depatch,
    Repatch,
}

impl Mode {
    fn from_flags(depatch: bool, repatch: bool) -> Self {
        match (depatch, repatch) {
            (true, _) => Mode::Depatch,
            (_, true) => Mode::Repatch,
            _ => Mode::Patch,
        }
    }

    fn writes_helper(self) -> bool {
        self != Mode::Depatch
    }
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn maybe_init_tracing() {
    let raw = match std::env::var("PROCPATCH_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn load_options(config: Option<&Path>) -> anyhow::Result<PatchOptions> {
    match config {
        Some(path) => PatchOptions::load(path),
        None => Ok(PatchOptions::default()),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read input file '{}'", path.display()))
}

/// The helper schema goes next to the output file, or into the working directory.
fn helper_path(output: Option<&Path>) -> PathBuf {
    let dir = output.and_then(Path::parent).unwrap_or_else(|| Path::new(""));
    dir.join(HELPER_FILE_NAME)
}

fn report_warnings(result: &PatchResult, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let json = serde_json::to_string_pretty(&result.warnings).context("Failed to encode warnings")?;
        eprintln!("{}", json);
    } else {
        for warning in &result.warnings {
            eprintln!("{}", warning);
        }
    }
    Ok(())
}

fn run_split(input: &Path) -> anyhow::Result<()> {
    let sql = read_input(input)?;
    let statements = split_statements(&sql);
    let json = serde_json::to_string_pretty(&statements).context("Failed to encode statements")?;
    println!("{}", json);
    Ok(())
}

fn run_patch(args: &CliArgs, input: &Path) -> anyhow::Result<()> {
    let mode = Mode::from_flags(args.depatch, args.repatch);
    let options = load_options(args.config.as_deref())?;
    let sql = read_input(input)?;

    tracing::info!(input = %input.display(), ?mode, "processing");
    let patcher = Patcher::with_options(options);
    let result = match mode {
        Mode::Patch => patcher.patch(&sql),
        Mode::Depatch => patcher.depatch(&sql),
        Mode::Repatch => patcher.repatch(&sql),
    };
    report_warnings(&result, args.warnings_json)?;

    match &args.output {
        Some(output) => std::fs::write(output, &result.patched_sql)
            .with_context(|| format!("Failed to write output file '{}'", output.display()))?,
        None => print!("{}", result.patched_sql),
    }

    if mode.writes_helper() && !args.no_helper {
        let path = helper_path(args.output.as_deref());
        std::fs::write(&path, helper_schema_sql(patcher.options()))
            .with_context(|| format!("Failed to write helper file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote helper schema");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    maybe_init_tracing();

    let args = CliArgs::parse();

    match &args.command {
        Some(Commands::Split { input }) => run_split(input),
        Some(Commands::Helper { config }) => {
            let options = load_options(config.as_deref())?;
            print!("{}", helper_schema_sql(&options));
            Ok(())
        }
        None => match &args.input {
            Some(input) => run_patch(&args, input),
            None => anyhow::bail!("Missing INPUT file. Usage: procpatch [-d|-r] <INPUT> [OUTPUT]"),
        },
    }
}
