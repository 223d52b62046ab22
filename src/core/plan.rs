//! Operation planner: validate a request into an ordered plan, then apply it.
//!
//! `plan_operation` never writes: it validates the request against the config
//! it's given. `apply` performs the mutation, step by step, after fatal
//! preconditions pass.

use serde::Serialize;

use crate::config::ScaffoldConfig;
use crate::dotnet::{BuildSummary, BuildTool};
use crate::error::{Error, Result};
use crate::naming::{validate_identifier, Identifier};
use crate::output::{BulkResult, OperationWarning};
use crate::service::{self, CreateOutcome, DeleteOutcome};
use crate::solution::{self, SolutionRenameOutcome};

/// What the user asked for, already normalized.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub create: Vec<Identifier>,
    pub delete: Vec<Identifier>,
    /// Empty or `None` means no rename.
    pub rename_solution: Option<Identifier>,
    pub build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Delete {
        service: Identifier,
        path: String,
    },
    Create {
        service: Identifier,
        template: Identifier,
        path: String,
    },
    RenameSolution {
        from: Identifier,
        to: Identifier,
    },
    Build {
        solution: String,
    },
}

/// Ordered steps: deletes, creates, solution rename, build.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub steps: Vec<Step>,
    #[serde(skip)]
    config: ScaffoldConfig,
}

impl Plan {
    fn creates(&self) -> impl Iterator<Item = &Identifier> {
        self.steps.iter().filter_map(|s| match s {
            Step::Create { service, .. } => Some(service),
            _ => None,
        })
    }

    fn deletes(&self) -> impl Iterator<Item = &Identifier> {
        self.steps.iter().filter_map(|s| match s {
            Step::Delete { service, .. } => Some(service),
            _ => None,
        })
    }

    fn needs_tool(&self) -> bool {
        self.steps
            .iter()
            .any(|s| !matches!(s, Step::RenameSolution { .. }))
    }

    /// Fatal checks, run before anything is written.
    ///
    /// The template must exist when creating, targets must be free, services
    /// being deleted must exist, and the build tool must run when needed.
    pub fn preflight(&self, tool: &dyn BuildTool) -> Result<()> {
        let config = &self.config;

        if self.creates().next().is_some() {
            let template_dir = config.template_dir()?;
            if !template_dir.is_dir() {
                return Err(Error::template_not_found(
                    config.template_service.clone(),
                    config.display_path(&template_dir),
                ));
            }
        }

        if self.needs_tool() {
            tool.ensure_available()?;
        }

        for target in self.creates() {
            let dir = config.service_dir(target);
            if dir.exists() {
                return Err(Error::service_exists(target.as_str(), config.display_path(&dir)));
            }
        }

        for target in self.deletes() {
            let dir = config.service_dir(target);
            if !dir.is_dir() {
                return Err(Error::service_not_found(
                    target.as_str(),
                    config.display_path(&dir),
                ));
            }
        }

        Ok(())
    }
}

/// Validate `request` against `config` and order it into steps.
pub fn plan_operation(request: &Request, config: &ScaffoldConfig) -> Result<Plan> {
    let template = config.template()?;
    let mut steps = Vec::new();

    for target in &request.delete {
        validate_identifier(target, "delete")?;
        if request.create.contains(target) {
            return Err(Error::validation_invalid_argument(
                "service",
                format!("'{}' is both created and deleted", target),
                Some(target.to_string()),
                None,
            ));
        }
        if *target == template {
            return Err(Error::validation_invalid_argument(
                "delete",
                format!("'{}' is the template service", target),
                Some(target.to_string()),
                None,
            ));
        }
        steps.push(Step::Delete {
            service: target.clone(),
            path: config.display_path(&config.service_dir(target)),
        });
    }

    for target in &request.create {
        validate_identifier(target, "create")?;
        if *target == template {
            return Err(Error::validation_invalid_argument(
                "create",
                format!("'{}' is the template service", target),
                Some(target.to_string()),
                None,
            ));
        }
        steps.push(Step::Create {
            service: target.clone(),
            template: template.clone(),
            path: config.display_path(&config.service_dir(target)),
        });
    }

    let mut solution_file = config.display_path(&config.solution_file());
    if let Some(to) = request.rename_solution.as_ref().filter(|id| !id.is_empty()) {
        validate_identifier(to, "solution")?;
        let from = config.solution()?;
        solution::validate_rename(&from, to)?;
        solution_file = config.display_path(&config.renamed(to).solution_file());
        steps.push(Step::RenameSolution {
            from,
            to: to.clone(),
        });
    }

    if request.build && !steps.is_empty() {
        steps.push(Step::Build {
            solution: solution_file,
        });
    }

    if steps.is_empty() {
        return Err(Error::validation_missing_argument(vec![
            "create".to_string(),
            "delete".to_string(),
            "solution".to_string(),
        ]));
    }

    Ok(Plan {
        steps,
        config: config.clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub deleted: BulkResult<DeleteOutcome>,
    pub created: BulkResult<CreateOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionRenameOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSummary>,
    pub warnings: Vec<OperationWarning>,
    /// Config in effect after the run.
    pub config: ScaffoldConfig,
}

impl ApplyReport {
    /// True when any step failed or the build didn't pass.
    pub fn has_failures(&self) -> bool {
        self.deleted.summary.failed > 0
            || self.created.summary.failed > 0
            || self.build.as_ref().is_some_and(|b| !b.success)
    }
}

/// Run every step of `plan` in order.
///
/// Preconditions are fatal. After that, a failing service step is recorded in
/// the report and the run continues. A failed solution rename stops the run,
/// since later steps would see a half-renamed tree.
pub fn apply(plan: &Plan, tool: &dyn BuildTool) -> Result<ApplyReport> {
    plan.preflight(tool)?;

    let mut config = plan.config.clone();
    let mut report = ApplyReport {
        deleted: BulkResult::new("delete"),
        created: BulkResult::new("create"),
        solution: None,
        build: None,
        warnings: Vec::new(),
        config: config.clone(),
    };

    for step in &plan.steps {
        match step {
            Step::Delete { service: target, .. } => {
                let result = service::delete_service(&config, target, tool);
                report.deleted.record(target.as_str(), result);
            }
            Step::Create { service: target, .. } => {
                let result = service::create_service(&config, target, tool);
                report.created.record(target.as_str(), result);
            }
            Step::RenameSolution { to, .. } => {
                let outcome = solution::rename_solution(&config, to)?;
                config = outcome.config.clone();
                report.solution = Some(outcome);
            }
            Step::Build { .. } => match tool.build(&config.solution_file()) {
                Ok(summary) => report.build = Some(summary),
                Err(e) => report.warnings.push(OperationWarning::from_error(
                    "build",
                    config.display_path(&config.solution_file()),
                    &e,
                )),
            },
        }
    }

    report.config = config;
    Ok(report)
}
