use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// File name of the per-solution config, stored at the solution root.
pub const PROJECT_CONFIG_FILE: &str = "svcgen.json";

/// Base svcgen config directory (~/.config/svcgen/ on all platforms)
pub fn svcgen() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected("APPDATA environment variable not set on Windows".to_string())
        })?;
        Ok(PathBuf::from(appdata).join("svcgen"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("svcgen"))
    }
}

/// User-level defaults file
pub fn svcgen_json() -> Result<PathBuf> {
    Ok(svcgen()?.join(PROJECT_CONFIG_FILE))
}

/// Per-solution config file under `root`
pub fn project_config(root: &Path) -> PathBuf {
    root.join(PROJECT_CONFIG_FILE)
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
