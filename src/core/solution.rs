//! Solution rename: propagate a new solution name through the whole checkout.

use serde::Serialize;

use crate::config::ScaffoldConfig;
use crate::error::{Error, Result};
use crate::naming::Identifier;
use crate::refactor::{self, RenameResult};
use crate::service;

#[derive(Debug, Serialize)]
pub struct SolutionRenameOutcome {
    pub from: Identifier,
    pub to: Identifier,
    pub rename: RenameResult,
    /// Config after the rename, already saved to `svcgen.json`.
    pub config: ScaffoldConfig,
}

/// Reject renames that can't be applied cleanly.
///
/// A new name that contains the old one would be rewritten again on a second
/// run (`Shop` → `ShopPlus` → `ShopPlusPlus`), so it's refused up front.
pub fn validate_rename(from: &Identifier, to: &Identifier) -> Result<()> {
    if from == to {
        return Err(Error::validation_invalid_argument(
            "solution",
            format!("Solution is already named '{}'", to),
            Some(to.to_string()),
            None,
        ));
    }

    if to.contains_ignore_case(from) {
        return Err(Error::validation_invalid_argument(
            "solution",
            format!("New name '{}' contains the current name '{}'", to, from),
            Some(to.to_string()),
            None,
        )
        .with_hint("Rename in two steps through an unrelated intermediate name"));
    }

    Ok(())
}

/// What a rename to `to` would change, without touching disk.
pub fn preview_rename(config: &ScaffoldConfig, to: &Identifier) -> Result<RenameResult> {
    let from = config.solution()?;
    validate_rename(&from, to)?;
    let spec = service::rename_spec(config, &from, to);
    Ok(refactor::generate_renames(&spec, &config.root))
}

/// Rename the solution under `config.root` and return the updated config.
pub fn rename_solution(config: &ScaffoldConfig, to: &Identifier) -> Result<SolutionRenameOutcome> {
    let from = config.solution()?;
    validate_rename(&from, to)?;

    let spec = service::rename_spec(config, &from, to);
    let rename = refactor::propagate(&spec, &config.root)?;

    let renamed = config.renamed(to);
    renamed.save()?;
    crate::log_status!("rename", "Solution {} is now {}", from, to);

    Ok(SolutionRenameOutcome {
        from,
        to: to.clone(),
        rename,
        config: renamed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::normalize;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn checkout() -> (TempDir, ScaffoldConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "PlayTicket.sln", "Project(\"PlayTicket.AppHost\")\n");
        write(
            root,
            "aspire/PlayTicket.AppHost/Program.cs",
            "builder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\n",
        );
        write(
            root,
            "services/user/src/PlayTicket.UserService.Domain/User.cs",
            "namespace PlayTicket.UserService.Domain;\n",
        );
        let config = ScaffoldConfig::load(root).unwrap();
        (dir, config)
    }

    #[test]
    fn rename_rewrites_contents_paths_and_config() {
        let (dir, config) = checkout();
        let to = normalize("box office");

        let outcome = rename_solution(&config, &to).unwrap();

        let root = dir.path();
        assert!(root.join("BoxOffice.sln").exists());
        assert!(!root.join("PlayTicket.sln").exists());
        assert_eq!(
            fs::read_to_string(root.join("aspire/BoxOffice.AppHost/Program.cs")).unwrap(),
            "builder.AddProject<Projects.BoxOffice_UserService_HttpApi_Host>(\"user-service\");\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("services/user/src/BoxOffice.UserService.Domain/User.cs"))
                .unwrap(),
            "namespace BoxOffice.UserService.Domain;\n"
        );

        assert_eq!(outcome.config.solution_name, "BoxOffice");
        let reloaded = ScaffoldConfig::load(root).unwrap();
        assert_eq!(reloaded.solution_name, "BoxOffice");
        assert_eq!(reloaded.composition_path(), root.join("aspire/BoxOffice.AppHost/Program.cs"));
    }

    #[test]
    fn rename_rejects_containing_name() {
        let (_dir, config) = checkout();
        let err = rename_solution(&config, &normalize("play ticket pro")).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn rename_rejects_same_name() {
        let (_dir, config) = checkout();
        assert!(rename_solution(&config, &normalize("play ticket")).is_err());
    }

    #[test]
    fn preview_leaves_disk_alone() {
        let (dir, config) = checkout();
        let preview = preview_rename(&config, &normalize("box office")).unwrap();

        assert!(!preview.applied);
        assert!(preview.file_renames.iter().any(|r| r.to == "BoxOffice.sln"));
        assert!(dir.path().join("PlayTicket.sln").exists());
    }
}
