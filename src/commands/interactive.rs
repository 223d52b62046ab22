use clap::Args;

use svcgen::naming::{self, NamingMode};
use svcgen::{plan, service, Error, Request};

use super::{execute, CmdResult, GlobalArgs, OperationOutput};
use crate::tty;

#[derive(Args)]
pub struct InteractiveArgs {
    /// Treat each name as one word
    #[arg(long)]
    pub simple: bool,
}

pub fn run(args: InteractiveArgs, global: &GlobalArgs) -> CmdResult<OperationOutput> {
    let config = global.load_config()?;
    let mode = if args.simple {
        NamingMode::Simple
    } else {
        NamingMode::Enhanced
    };

    tty::status(&format!(
        "Solution {} in {}\nExisting services: {}",
        config.solution_name,
        config.root.display(),
        service::list_services(&config).join(", ")
    ));

    let create = naming::parse_list(
        &tty::prompt("Services to create (comma separated, blank for none): ")?,
        mode,
    );
    let delete = naming::parse_list(
        &tty::prompt("Services to delete (comma separated, blank for none): ")?,
        mode,
    );
    let rename_raw = tty::prompt(&format!(
        "New solution name (blank to keep {}): ",
        config.solution_name
    ))?;
    let rename_solution = Some(naming::normalize_with(&rename_raw, mode)).filter(|id| !id.is_empty());
    let build = tty::confirm("Build the solution afterwards?", true)?;

    let request = Request {
        create,
        delete,
        rename_solution,
        build,
    };

    // Show the plan before touching anything
    let preview = plan::plan_operation(&request, &config)?;
    for step in &preview.steps {
        tty::status(&format!("  - {}", describe_step(step)));
    }

    if !tty::confirm("Apply these changes?", false)? {
        return Err(Error::validation_invalid_argument(
            "confirm",
            "Cancelled by user",
            None,
            None,
        ));
    }

    execute(&request, &config, false)
}

fn describe_step(step: &svcgen::Step) -> String {
    match step {
        svcgen::Step::Delete { service, path } => format!("delete {} ({})", service, path),
        svcgen::Step::Create {
            service,
            template,
            path,
        } => format!("create {} from {} ({})", service, template, path),
        svcgen::Step::RenameSolution { from, to } => format!("rename solution {} → {}", from, to),
        svcgen::Step::Build { solution } => format!("build {}", solution),
    }
}
