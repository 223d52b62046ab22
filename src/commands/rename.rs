use clap::Args;

use svcgen::naming::{normalize, normalize_simple};
use svcgen::Request;

use super::{execute, CmdResult, GlobalArgs, OperationOutput};

#[derive(Args)]
pub struct RenameSolutionArgs {
    /// New solution name (free text, normalized)
    pub name: String,

    #[arg(long)]
    pub simple: bool,

    #[arg(long)]
    pub no_build: bool,

    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: RenameSolutionArgs, global: &GlobalArgs) -> CmdResult<OperationOutput> {
    let to = if args.simple {
        normalize_simple(&args.name)
    } else {
        normalize(&args.name)
    };

    let config = global.load_config()?;
    let request = Request {
        rename_solution: Some(to),
        build: !args.no_build,
        ..Request::default()
    };
    execute(&request, &config, args.dry_run)
}
