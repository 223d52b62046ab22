//! Build tool collaborator: solution manifest, project references, builds.
//!
//! Operations talk to a [`BuildTool`]; [`DotnetCli`] shells out to the `dotnet`
//! CLI. Tests substitute a recorder.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::command::{self, CapturedOutput};

/// Lines of build output kept in a summary.
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub success: bool,
    pub command: String,
    /// Last lines of the build output.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_tail: Vec<String>,
}

pub trait BuildTool {
    fn name(&self) -> &str;

    /// Fail with `precondition.tool_not_found` when the tool can't run.
    fn ensure_available(&self) -> Result<()>;

    fn solution_add(&self, solution: &Path, project: &Path) -> Result<()>;

    fn solution_remove(&self, solution: &Path, project: &Path) -> Result<()>;

    /// Add a project reference from `host` to `project`.
    fn reference_add(&self, host: &Path, project: &Path) -> Result<()>;

    fn reference_remove(&self, host: &Path, project: &Path) -> Result<()>;

    fn build(&self, solution: &Path) -> Result<BuildSummary>;
}

/// The `dotnet` CLI.
#[derive(Debug, Clone)]
pub struct DotnetCli {
    program: String,
}

impl Default for DotnetCli {
    fn default() -> Self {
        Self {
            program: "dotnet".to_string(),
        }
    }
}

impl DotnetCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, cwd: &Path, args: &[&str]) -> Result<CapturedOutput> {
        let captured = command::run_in(cwd, &self.program, args)?;
        if !captured.success {
            return Err(Error::build_tool_failed(
                &self.program,
                format!("{} {}", self.program, args.join(" ")),
                captured.stderr,
            ));
        }
        Ok(captured)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl BuildTool for DotnetCli {
    fn name(&self) -> &str {
        &self.program
    }

    fn ensure_available(&self) -> Result<()> {
        if command::succeeds(&self.program, &["--version"]) {
            Ok(())
        } else {
            Err(Error::tool_not_found(&self.program))
        }
    }

    fn solution_add(&self, solution: &Path, project: &Path) -> Result<()> {
        let sln = solution.to_string_lossy();
        let proj = project.to_string_lossy();
        self.run(parent_dir(solution), &["sln", &sln, "add", &proj])?;
        Ok(())
    }

    fn solution_remove(&self, solution: &Path, project: &Path) -> Result<()> {
        let sln = solution.to_string_lossy();
        let proj = project.to_string_lossy();
        self.run(parent_dir(solution), &["sln", &sln, "remove", &proj])?;
        Ok(())
    }

    fn reference_add(&self, host: &Path, project: &Path) -> Result<()> {
        let host_str = host.to_string_lossy();
        let proj = project.to_string_lossy();
        self.run(parent_dir(host), &["add", &host_str, "reference", &proj])?;
        Ok(())
    }

    fn reference_remove(&self, host: &Path, project: &Path) -> Result<()> {
        let host_str = host.to_string_lossy();
        let proj = project.to_string_lossy();
        self.run(parent_dir(host), &["remove", &host_str, "reference", &proj])?;
        Ok(())
    }

    fn build(&self, solution: &Path) -> Result<BuildSummary> {
        let sln = solution.to_string_lossy();
        let args = ["build", &*sln];
        crate::log_status!("build", "Running {} build {}", self.program, sln);

        let captured = command::run_in(parent_dir(solution), &self.program, &args)?;
        let text = if captured.success {
            &captured.stdout
        } else {
            &captured.stderr
        };

        Ok(BuildSummary {
            success: captured.success,
            command: format!("{} {}", self.program, args.join(" ")),
            output_tail: tail_lines(text, OUTPUT_TAIL_LINES),
        })
    }
}

fn tail_lines(text: &str, count: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(count);
    lines[skip..].iter().map(|l| l.to_string()).collect()
}

// ============================================================================
// Project discovery
// ============================================================================

/// Every `*.csproj` under `dir`, sorted, skipping build output.
pub fn discover_projects(dir: &Path) -> Vec<PathBuf> {
    let mut projects = Vec::new();
    collect_projects(dir, &mut projects);
    projects.sort();
    projects
}

fn collect_projects(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            let name = entry.file_name();
            if matches!(name.to_str(), Some("bin" | "obj" | ".git" | ".vs" | ".idea" | "node_modules")) {
                continue;
            }
            collect_projects(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("csproj") {
            out.push(path);
        }
    }
}

/// The project the composition host references, by file-name suffix.
pub fn host_project<'a>(projects: &'a [PathBuf], suffix: &str) -> Option<&'a PathBuf> {
    projects.iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix))
    })
}
