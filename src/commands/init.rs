use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use svcgen::config::{discover_solution_name, ScaffoldConfig};
use svcgen::naming::{normalize, validate_identifier, Identifier};
use svcgen::refactor::RenameResult;
use svcgen::{defaults, git, paths, solution, validation, Error};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct InitArgs {
    /// Template repository URL (defaults to template_repo in the user config)
    pub url: Option<String>,

    /// Target directory, relative to --root (defaults to the repository name)
    #[arg(long)]
    pub dir: Option<String>,

    /// Rename the cloned solution (free text, normalized)
    #[arg(long)]
    pub solution: Option<String>,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub command: &'static str,
    pub url: String,
    pub path: String,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameResult>,
    pub next_steps: Vec<String>,
}

/// `https://host/org/PlayTicket.Template.git` → `PlayTicket.Template`
fn repo_dir_name(url: &str) -> Option<String> {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()?
        .trim_end_matches(".git");
    if last.is_empty() {
        None
    } else {
        Some(last.to_string())
    }
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

pub fn run(args: InitArgs, global: &GlobalArgs) -> CmdResult<InitOutput> {
    let user_defaults = defaults::load_defaults();

    let url = match args.url.as_deref().or(user_defaults.template_repo.as_deref()) {
        Some(url) => validation::require_non_empty(url, "url", "Template URL cannot be empty")?
            .to_string(),
        None => {
            return Err(Error::validation_missing_argument(vec!["url".to_string()])
                .with_hint(format!(
                    "Pass a URL or set defaults.template_repo in {}",
                    defaults::config_path().unwrap_or_else(|_| "svcgen.json".to_string())
                )))
        }
    };

    let dir_name = match args.dir {
        Some(dir) => dir,
        None => validation::require(
            repo_dir_name(&url),
            "dir",
            "Cannot derive a directory name from the URL; pass --dir",
        )?,
    };
    let target: PathBuf = global.root.join(paths::expand(&dir_name));
    if target.exists() && !is_empty_dir(&target) {
        return Err(Error::validation_invalid_argument(
            "dir",
            "Target directory exists and is not empty",
            Some(target.display().to_string()),
            None,
        ));
    }

    let new_name: Option<Identifier> = match args.solution.as_deref() {
        Some(raw) => {
            let id = normalize(raw);
            validate_identifier(&id, "solution")?;
            Some(id)
        }
        None => None,
    };

    let mut output = InitOutput {
        command: "init",
        url: url.clone(),
        path: target.display().to_string(),
        dry_run: args.dry_run,
        solution: new_name.as_ref().map(|id| id.to_string()),
        rename: None,
        next_steps: vec![
            format!("cd {}", target.display()),
            "svcgen new <service names>".to_string(),
        ],
    };

    if args.dry_run {
        return Ok((output, 0));
    }

    git::ensure_available()?;
    git::clone_repo(&url, &target)?;
    git::detach_history(&target)?;

    let existing = discover_solution_name(&target)?;
    let mut config = ScaffoldConfig::from_defaults(&target, &existing, &user_defaults);
    config.template_repo = Some(url);
    config.validate()?;
    config.save()?;

    match new_name {
        Some(to) if to.as_str() != existing => {
            let outcome = solution::rename_solution(&config, &to)?;
            output.solution = Some(outcome.config.solution_name.clone());
            output.rename = Some(outcome.rename);
        }
        _ => output.solution = Some(existing),
    }

    Ok((output, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_dir_name_strips_git_suffix() {
        assert_eq!(
            repo_dir_name("https://github.com/acme/PlayTicket.Template.git").as_deref(),
            Some("PlayTicket.Template")
        );
        assert_eq!(repo_dir_name("git@github.com:acme/shop/").as_deref(), Some("shop"));
        assert_eq!(repo_dir_name("git@host:shop.git").as_deref(), Some("shop"));
        assert!(repo_dir_name("/").is_none());
    }
}
