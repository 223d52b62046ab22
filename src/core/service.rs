//! Service create/delete: template copy, name propagation and registration.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::ScaffoldConfig;
use crate::dotnet::{self, BuildTool};
use crate::error::{Error, Result};
use crate::naming::Identifier;
use crate::output::OperationWarning;
use crate::refactor::{self, RenameResult, RenameSpec, RuleSet};
use crate::registration::{self, EditResult};
use crate::utils::io;

/// Directories never copied out of the template service.
const COPY_SKIP_DIRS: &[&str] = &["bin", "obj", ".vs", ".idea", "node_modules"];

#[derive(Debug, Serialize)]
pub struct CreateOutcome {
    pub service: Identifier,
    pub path: String,
    pub files_copied: usize,
    pub rename: RenameResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<EditResult>,
    pub projects: Vec<String>,
    pub warnings: Vec<OperationWarning>,
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub service: Identifier,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<EditResult>,
    pub projects: Vec<String>,
    pub warnings: Vec<OperationWarning>,
}

/// Substitution rules for turning a copy of `template` into `target`.
///
/// Adds the solution-qualified forms (`PlayTicket.User`, `PlayTicket_User`) and
/// the services-folder form (`services/user`) ahead of the bare variants.
pub fn service_rules(config: &ScaffoldConfig, template: &Identifier, target: &Identifier) -> RuleSet {
    RuleSet::for_content(template, target)
        .qualified_by(&config.solution_name, &[".", "_"], template.as_str(), target.as_str())
        .qualified_by(&config.services_dir, &["/"], &template.kebab(), &target.kebab())
}

pub fn rename_spec(config: &ScaffoldConfig, from: &Identifier, to: &Identifier) -> RenameSpec {
    RenameSpec::new(from, to)
        .with_extensions(config.content_extensions.clone())
        .with_ignore(config.ignore.clone())
}

/// Copy the template service to `services/<target>` and rebrand the copy.
///
/// The template subtree is only read. Registration and solution-manifest
/// failures become warnings on the outcome.
pub fn create_service(
    config: &ScaffoldConfig,
    target: &Identifier,
    tool: &dyn BuildTool,
) -> Result<CreateOutcome> {
    let template = config.template()?;
    let template_dir = config.template_dir()?;
    let target_dir = config.service_dir(target);
    let display = config.display_path(&target_dir);

    if !template_dir.is_dir() {
        return Err(Error::template_not_found(
            template.as_str(),
            config.display_path(&template_dir),
        ));
    }
    if target_dir.exists() {
        return Err(Error::service_exists(target.as_str(), display));
    }

    let files_copied = match io::copy_dir_recursive(&template_dir, &target_dir, COPY_SKIP_DIRS) {
        Ok(count) => count,
        Err(e) => {
            // No partial copy survives a failed create
            if target_dir.exists() {
                let _ = io::remove_dir(&target_dir, &format!("clean up {}", display));
            }
            return Err(e);
        }
    };
    crate::log_status!("new", "Copied {} file(s) to {}", files_copied, display);

    let spec = rename_spec(config, &template, target)
        .with_content_rules(service_rules(config, &template, target));
    let rename = refactor::propagate(&spec, &target_dir)?;

    let mut warnings = Vec::new();
    let registration = match registration::register_service(config, target) {
        Ok(edit) => Some(edit),
        Err(e) => {
            warnings.push(OperationWarning::from_error(
                "register",
                config.display_path(&config.composition_path()),
                &e,
            ));
            None
        }
    };

    let projects = dotnet::discover_projects(&target_dir);
    for project in &projects {
        if let Err(e) = tool.solution_add(&config.solution_file(), project) {
            warnings.push(OperationWarning::from_error(
                "solution_add",
                config.display_path(project),
                &e,
            ));
        }
    }
    link_host(config, &projects, tool, true, &mut warnings);

    Ok(CreateOutcome {
        service: target.clone(),
        path: display,
        files_copied,
        rename,
        registration,
        projects: projects.iter().map(|p| config.display_path(p)).collect(),
        warnings,
    })
}

/// Remove `services/<target>` and reverse its registrations.
pub fn delete_service(
    config: &ScaffoldConfig,
    target: &Identifier,
    tool: &dyn BuildTool,
) -> Result<DeleteOutcome> {
    let target_dir = config.service_dir(target);
    let display = config.display_path(&target_dir);

    if !target_dir.is_dir() {
        return Err(Error::service_not_found(target.as_str(), display));
    }

    let mut warnings = Vec::new();

    // Manifest entries first, while the project files still exist
    let projects = dotnet::discover_projects(&target_dir);
    link_host(config, &projects, tool, false, &mut warnings);
    for project in &projects {
        if let Err(e) = tool.solution_remove(&config.solution_file(), project) {
            warnings.push(OperationWarning::from_error(
                "solution_remove",
                config.display_path(project),
                &e,
            ));
        }
    }

    io::remove_dir(&target_dir, &format!("remove {}", display))?;
    crate::log_status!("remove", "Deleted {}", display);

    let registration = match registration::unregister_service(config, target) {
        Ok(edit) => Some(edit),
        Err(e) => {
            warnings.push(OperationWarning::from_error(
                "unregister",
                config.display_path(&config.composition_path()),
                &e,
            ));
            None
        }
    };

    Ok(DeleteOutcome {
        service: target.clone(),
        path: display,
        registration,
        projects: projects.iter().map(|p| config.display_path(p)).collect(),
        warnings,
    })
}

/// Add or remove the AppHost's reference to the service's host project.
fn link_host(
    config: &ScaffoldConfig,
    projects: &[PathBuf],
    tool: &dyn BuildTool,
    add: bool,
    warnings: &mut Vec<OperationWarning>,
) {
    let Some(host) = dotnet::host_project(projects, &config.host_project_suffix) else {
        return;
    };
    let apphost = config.apphost_project_path();
    if !apphost.is_file() {
        warnings.push(OperationWarning::new(
            if add { "reference_add" } else { "reference_remove" },
            config.display_path(&apphost),
            "AppHost project not found",
        ));
        return;
    }

    let result = if add {
        tool.reference_add(&apphost, host)
    } else {
        tool.reference_remove(&apphost, host)
    };
    if let Err(e) = result {
        warnings.push(OperationWarning::from_error(
            if add { "reference_add" } else { "reference_remove" },
            config.display_path(host),
            &e,
        ));
    }
}

/// Existing service folders under the services directory, sorted.
pub fn list_services(config: &ScaffoldConfig) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(config.services_path())
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().is_dir())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub fn service_exists(config: &ScaffoldConfig, service: &Identifier) -> bool {
    config.service_dir(service).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotnet::BuildSummary;
    use crate::naming::normalize;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn log(&self, op: &str, a: &Path, b: &Path) -> Result<()> {
            let name = |p: &Path| p.file_name().unwrap().to_string_lossy().to_string();
            self.calls.borrow_mut().push(format!("{} {} {}", op, name(a), name(b)));
            Ok(())
        }
    }

    impl BuildTool for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn ensure_available(&self) -> Result<()> {
            Ok(())
        }
        fn solution_add(&self, solution: &Path, project: &Path) -> Result<()> {
            self.log("sln-add", solution, project)
        }
        fn solution_remove(&self, solution: &Path, project: &Path) -> Result<()> {
            self.log("sln-remove", solution, project)
        }
        fn reference_add(&self, host: &Path, project: &Path) -> Result<()> {
            self.log("ref-add", host, project)
        }
        fn reference_remove(&self, host: &Path, project: &Path) -> Result<()> {
            self.log("ref-remove", host, project)
        }
        fn build(&self, _solution: &Path) -> Result<BuildSummary> {
            Ok(BuildSummary {
                success: true,
                command: "build".to_string(),
                output_tail: Vec::new(),
            })
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn solution() -> (TempDir, ScaffoldConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "PlayTicket.sln", "");
        write(
            root,
            "aspire/PlayTicket.AppHost/Program.cs",
            "var builder = DistributedApplication.CreateBuilder(args);\nbuilder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\nbuilder.Build().Run();\n",
        );
        write(root, "aspire/PlayTicket.AppHost/PlayTicket.AppHost.csproj", "<Project />");
        write(
            root,
            "services/user/src/PlayTicket.UserService.HttpApi.Host/PlayTicket.UserService.HttpApi.Host.csproj",
            "<Project><RootNamespace>PlayTicket.UserService</RootNamespace></Project>",
        );
        write(
            root,
            "services/user/src/PlayTicket.UserService.HttpApi.Host/bin/Debug/stale.json",
            "{}",
        );
        write(
            root,
            "services/user/UserService.config",
            "PlayTicket.UserService\n",
        );
        let config = ScaffoldConfig::load(root).unwrap();
        (dir, config)
    }

    #[test]
    fn create_copies_and_rebrands() {
        let (dir, config) = solution();
        let tool = Recorder::default();

        let outcome = create_service(&config, &normalize("order"), &tool).unwrap();

        let root = dir.path();
        assert_eq!(outcome.path, "services/order");
        assert_eq!(
            fs::read_to_string(root.join("services/order/OrderService.config")).unwrap(),
            "PlayTicket.OrderService\n"
        );
        assert!(root
            .join("services/order/src/PlayTicket.OrderService.HttpApi.Host/PlayTicket.OrderService.HttpApi.Host.csproj")
            .exists());
        assert!(!root.join("services/order/src/PlayTicket.OrderService.HttpApi.Host/bin").exists());
        // Template untouched
        assert_eq!(
            fs::read_to_string(root.join("services/user/UserService.config")).unwrap(),
            "PlayTicket.UserService\n"
        );

        let program =
            fs::read_to_string(root.join("aspire/PlayTicket.AppHost/Program.cs")).unwrap();
        assert!(program.contains(
            "builder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\");\nbuilder.Build().Run();"
        ));

        let calls = tool.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                "sln-add PlayTicket.sln PlayTicket.OrderService.HttpApi.Host.csproj",
                "ref-add PlayTicket.AppHost.csproj PlayTicket.OrderService.HttpApi.Host.csproj",
            ]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn create_refuses_existing_folder() {
        let (_dir, config) = solution();
        let err = create_service(&config, &normalize("user"), &Recorder::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "service.already_exists");
    }

    #[test]
    fn create_without_template_is_precondition() {
        let (_dir, mut config) = solution();
        config.template_service = "Account".to_string();
        let err = create_service(&config, &normalize("order"), &Recorder::default()).unwrap_err();
        assert!(err.code.is_precondition());
    }

    #[cfg(unix)]
    #[test]
    fn failed_copy_leaves_no_partial_service() {
        let (dir, config) = solution();
        let root = dir.path();
        std::os::unix::fs::symlink(
            root.join("nowhere.txt"),
            root.join("services/user/dangling.txt"),
        )
        .unwrap();

        let err = create_service(&config, &normalize("order"), &Recorder::default()).unwrap_err();

        assert_eq!(err.code.as_str(), "internal.io_error");
        assert!(!root.join("services/order").exists());
        assert_eq!(list_services(&config), vec!["user"]);
    }

    #[test]
    fn delete_removes_folder_and_registration() {
        let (dir, config) = solution();
        let tool = Recorder::default();
        create_service(&config, &normalize("order"), &tool).unwrap();

        let outcome = delete_service(&config, &normalize("order"), &tool).unwrap();

        assert!(!dir.path().join("services/order").exists());
        assert_eq!(outcome.registration.unwrap().changes_made.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("aspire/PlayTicket.AppHost/Program.cs")).unwrap(),
            "var builder = DistributedApplication.CreateBuilder(args);\nbuilder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\nbuilder.Build().Run();\n"
        );
        let calls = tool.calls.borrow();
        assert!(calls.contains(
            &"sln-remove PlayTicket.sln PlayTicket.OrderService.HttpApi.Host.csproj".to_string()
        ));
    }

    #[test]
    fn delete_missing_service_is_not_found() {
        let (_dir, config) = solution();
        let err = delete_service(&config, &normalize("ticket"), &Recorder::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "service.not_found");
    }

    #[test]
    fn missing_composition_file_is_a_warning() {
        let (dir, config) = solution();
        fs::remove_file(dir.path().join("aspire/PlayTicket.AppHost/Program.cs")).unwrap();

        let outcome = create_service(&config, &normalize("order"), &Recorder::default()).unwrap();

        assert!(outcome.registration.is_none());
        assert_eq!(outcome.warnings[0].step, "register");
        assert!(dir.path().join("services/order").is_dir());
    }

    #[test]
    fn list_services_reads_folders() {
        let (_dir, config) = solution();
        assert_eq!(list_services(&config), vec!["user"]);
        assert!(service_exists(&config, &normalize("user")));
    }
}
