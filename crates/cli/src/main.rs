// bomcheck CLI - merge supplier BOM exports and validate them against the OEM structure report

mod exit_codes;
mod logging;
mod run;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use bomcheck_io::IoError;
use bomcheck_recon::ReconError;
use clap::{Parser, Subcommand};

use exit_codes::{io_exit_code, recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bomcheck")]
#[command(about = "Merge BOM exports and validate part numbers against a structure report")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log filter when BOMCHECK_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the BOM exports, reconcile against the structure report, write the result workbook
    #[command(after_help = "\
Exit codes: 0 ok, 2 missing input, 3 no BOM rows, 4 bad structure report,
5 file error, 6 bad config, 7 discrepancies (with --fail-on-mismatch).

Examples:
  bomcheck run --bom GA_ENGINE_01.xlsx --bom GA_AXLE_02.xlsx --authority structure.xlsx
  bomcheck run --bom exports/*.xlsx --authority structure.xlsx --out-dir results --json
  bomcheck run --bom exports/*.xlsx --authority structure.xlsx --fail-on-mismatch")]
    Run {
        /// Per-assembly BOM export (.xlsx/.xls/.csv). Repeatable.
        #[arg(long, value_name = "FILE", num_args = 1..)]
        bom: Vec<PathBuf>,

        /// OEM structure report workbook
        #[arg(long, value_name = "FILE")]
        authority: Option<PathBuf>,

        /// Config file (default: ./bomcheck.toml, then the user config dir)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Directory for the result workbook (overrides output.dir)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Exit 7 when any part is flagged
        #[arg(long)]
        fail_on_mismatch: bool,

        /// Leave the merged BOM sheet out of the result workbook
        #[arg(long)]
        no_merged_sheet: bool,
    },

    /// Merge the BOM exports only and write them to one workbook
    Merge {
        /// Per-assembly BOM export. Repeatable.
        #[arg(long, value_name = "FILE", num_args = 1..)]
        bom: Vec<PathBuf>,

        /// Output workbook (.xlsx)
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,

        /// Config file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print the join key for each part number
    #[command(after_help = "\
Examples:
  bomcheck normalize '(REV2) ABC-123_X'     # ABC
  bomcheck normalize ' 7 123 456 ' 'a.b/c'")]
    Normalize {
        /// Raw part numbers
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Parse and validate a config file
    Validate {
        path: PathBuf,
    },
    /// Print the effective config as TOML
    Show {
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("BOMCHECK_GIT_DESCRIBE"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("BOMCHECK_GIT_DESCRIBE"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Run {
            bom,
            authority,
            config,
            out_dir,
            json,
            fail_on_mismatch,
            no_merged_sheet,
        } => run::cmd_run(run::RunOptions {
            bom,
            authority,
            config,
            out_dir,
            json,
            fail_on_mismatch,
            no_merged_sheet,
        }),
        Commands::Merge { bom, output, config } => run::cmd_merge(bom, output, config),
        Commands::Normalize { parts } => run::cmd_normalize(parts),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Validate { path } => settings::cmd_config_validate(path),
            ConfigCommands::Show { config } => settings::cmd_config_show(config),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Engine error with its registry code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::EmptyInput { .. } => {
                Some("each BOM needs a level column (DGLVL) and a description column (OJTXP)".to_string())
            }
            ReconError::MalformedAuthority { .. } => {
                Some("check [authority] header_row and the column names in your config".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// File error with its registry code.
    pub fn file(err: IoError) -> Self {
        let code = io_exit_code(&err);
        let hint = match &err {
            IoError::SheetNotFound { .. } => Some("set [authority] sheet in your config".to_string()),
            IoError::HeaderRowMissing { .. } => Some("set [authority] header_row in your config".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
