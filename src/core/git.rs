use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command;

// ============================================================================
// Low-level Git Primitives (path-based)
// ============================================================================

pub fn ensure_available() -> Result<()> {
    if command::succeeds("git", &["--version"]) {
        Ok(())
    } else {
        Err(Error::tool_not_found("git"))
    }
}

/// Clone a git repository to a target directory.
pub fn clone_repo(url: &str, target_dir: &Path) -> Result<()> {
    crate::log_status!("git", "Cloning {} into {}", url, target_dir.display());
    command::run(
        "git",
        &["clone", url, &target_dir.to_string_lossy()],
        "git clone",
    )
    .map_err(|e| {
        let reason = e.details["error"].as_str().unwrap_or("git clone failed");
        Error::git_command_failed(reason.to_string())
    })?;
    Ok(())
}

/// Drop the template's history so the new solution starts clean.
pub fn detach_history(repo_dir: &Path) -> Result<()> {
    let git_dir = repo_dir.join(".git");
    if git_dir.is_dir() {
        std::fs::remove_dir_all(&git_dir).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("remove {}", git_dir.display())))
        })?;
    }
    Ok(())
}
