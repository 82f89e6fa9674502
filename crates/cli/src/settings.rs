// Config discovery and the `config` subcommands

use std::path::{Path, PathBuf};

use bomcheck_recon::ReconConfig;

use crate::exit_codes::recon_exit_code;
use crate::CliError;

pub const LOCAL_CONFIG: &str = "bomcheck.toml";

/// `<config_dir>/bomcheck/config.toml`, when the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bomcheck").join("config.toml"))
}

/// Which file (if any) the effective config comes from.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return Some(local);
    }
    user_config_path().filter(|p| p.is_file())
}

pub fn load_file(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {}", path.display(), e)))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: recon_exit_code(&e),
        message: format!("{}: {}", path.display(), e),
        hint: Some("run `bomcheck config show` to print the defaults".to_string()),
    })
}

/// Load the effective config, falling back to built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<ReconConfig, CliError> {
    match discover(explicit) {
        Some(path) => {
            log::debug!("using config {}", path.display());
            load_file(&path)
        }
        None => Ok(ReconConfig::default()),
    }
}

// ============================================================================
// config validate / show
// ============================================================================

pub fn cmd_config_validate(path: PathBuf) -> Result<(), CliError> {
    load_file(&path)?;
    println!("{}: ok", path.display());
    Ok(())
}

pub fn cmd_config_show(config: Option<PathBuf>) -> Result<(), CliError> {
    let source = discover(config.as_deref());
    let effective = load(config.as_deref())?;
    let text = effective.to_toml().map_err(|e| CliError::eval(e.to_string()))?;

    match source {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    print!("{}", text);
    Ok(())
}
