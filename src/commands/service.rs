use clap::Args;

use svcgen::validation;
use svcgen::Request;

use super::{execute, parse_names, CmdResult, GlobalArgs, OperationOutput};

#[derive(Args)]
pub struct NewArgs {
    /// Service names; free text, comma-separated lists allowed ("cash voucher, order")
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Treat each name as one word ("cash voucher" → Cashvoucher)
    #[arg(long)]
    pub simple: bool,

    /// Skip the solution build afterwards
    #[arg(long)]
    pub no_build: bool,

    /// Show the plan without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Service names to delete
    #[arg(required = true)]
    pub names: Vec<String>,

    #[arg(long)]
    pub simple: bool,

    #[arg(long)]
    pub no_build: bool,

    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_new(args: NewArgs, global: &GlobalArgs) -> CmdResult<OperationOutput> {
    let names = parse_names(&args.names, args.simple);
    validation::require_non_empty_vec(&names, "names")?;

    let config = global.load_config()?;
    let request = Request {
        create: names,
        build: !args.no_build,
        ..Request::default()
    };
    execute(&request, &config, args.dry_run)
}

pub fn run_remove(args: RemoveArgs, global: &GlobalArgs) -> CmdResult<OperationOutput> {
    let names = parse_names(&args.names, args.simple);
    validation::require_non_empty_vec(&names, "names")?;

    let config = global.load_config()?;
    let request = Request {
        delete: names,
        build: !args.no_build,
        ..Request::default()
    };
    execute(&request, &config, args.dry_run)
}
