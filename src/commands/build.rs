use clap::Args;

use svcgen::dotnet::{BuildSummary, BuildTool, DotnetCli};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct BuildArgs {
    /// Build tool executable
    #[arg(long, default_value = "dotnet")]
    pub tool: String,
}

pub fn run(args: BuildArgs, global: &crate::commands::GlobalArgs) -> CmdResult<BuildSummary> {
    let config = global.load_config()?;
    let tool = DotnetCli::new(args.tool);
    tool.ensure_available()?;

    let summary = tool.build(&config.solution_file())?;
    let exit_code = if summary.success { 0 } else { 20 };
    Ok((summary, exit_code))
}
