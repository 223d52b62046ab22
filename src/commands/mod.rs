use serde::Serialize;
use std::path::PathBuf;

use svcgen::dotnet::DotnetCli;
use svcgen::naming::{self, Identifier, NamingMode};
use svcgen::refactor::RenameResult;
use svcgen::{plan, solution, ApplyReport, Plan, Request, ScaffoldConfig, Step};

pub type CmdResult<T> = svcgen::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Solution root, `~` already expanded.
    pub root: PathBuf,
}

impl GlobalArgs {
    pub fn load_config(&self) -> svcgen::Result<ScaffoldConfig> {
        ScaffoldConfig::load(&self.root)
    }
}

pub mod build;
pub mod init;
pub mod interactive;
pub mod normalize;
pub mod rename;
pub mod service;

// ============================================================================
// Shared plan/apply flow
// ============================================================================

/// Output of a planned operation: a preview on `--dry-run`, the report otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Planned(PlannedOutput),
    Applied(Box<ApplyReport>),
}

#[derive(Debug, Serialize)]
pub struct PlannedOutput {
    pub dry_run: bool,
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_preview: Option<RenameResult>,
}

/// Normalize raw CLI names; each argument may itself be a comma list.
pub(crate) fn parse_names(raw: &[String], simple: bool) -> Vec<Identifier> {
    let mode = if simple {
        NamingMode::Simple
    } else {
        NamingMode::Enhanced
    };
    naming::parse_args(raw, mode)
}

/// Plan `request`, then either preview it or apply it with the dotnet CLI.
pub(crate) fn execute(
    request: &Request,
    config: &ScaffoldConfig,
    dry_run: bool,
) -> CmdResult<OperationOutput> {
    let planned = plan::plan_operation(request, config)?;

    if dry_run {
        let solution_preview = planned
            .steps
            .iter()
            .find_map(|s| match s {
                Step::RenameSolution { to, .. } => Some(to),
                _ => None,
            })
            .map(|to| solution::preview_rename(config, to))
            .transpose()?;

        return Ok((
            OperationOutput::Planned(PlannedOutput {
                dry_run: true,
                plan: planned,
                solution_preview,
            }),
            0,
        ));
    }

    let tool = DotnetCli::default();
    let report = plan::apply(&planned, &tool)?;
    let exit_code = if report.has_failures() { 1 } else { 0 };

    Ok((OperationOutput::Applied(Box::new(report)), exit_code))
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (svcgen::Result<serde_json::Value>, i32) {
    if !matches!(command, crate::Commands::Interactive(_)) {
        crate::tty::status("svcgen is working...");
    }

    match command {
        // Commands without solution context
        crate::Commands::Normalize(args) => dispatch!(args, normalize),

        // Commands with solution context
        crate::Commands::Init(args) => dispatch!(args, global, init),
        crate::Commands::New(args) => {
            crate::output::map_cmd_result_to_json(service::run_new(args, global))
        }
        crate::Commands::Remove(args) => {
            crate::output::map_cmd_result_to_json(service::run_remove(args, global))
        }
        crate::Commands::RenameSolution(args) => dispatch!(args, global, rename),
        crate::Commands::Build(args) => dispatch!(args, global, build),
        crate::Commands::Interactive(args) => dispatch!(args, global, interactive),
    }
}
