use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{build, init, interactive, normalize, rename, service};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "svcgen")]
#[command(version = VERSION)]
#[command(about = "Scaffold, remove and rename services in a .NET microservices solution")]
struct Cli {
    /// Solution root directory
    #[arg(long, global = true, default_value = ".")]
    root: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone a solution template and write svcgen.json
    Init(init::InitArgs),
    /// Create services by copying the template service
    #[command(visible_alias = "create")]
    New(service::NewArgs),
    /// Delete services and their registrations
    #[command(visible_alias = "delete")]
    Remove(service::RemoveArgs),
    /// Rename the whole solution
    RenameSolution(rename::RenameSolutionArgs),
    /// Show how names are normalized
    Normalize(normalize::NormalizeArgs),
    /// Build the solution
    Build(build::BuildArgs),
    /// Prompt for services to create/delete and a new solution name
    Interactive(interactive::InteractiveArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        root: svcgen::paths::expand(&cli.root),
    };

    if matches!(cli.command, Commands::Interactive(_)) && !tty::require_tty_for_interactive() {
        let err = svcgen::Error::validation_invalid_argument(
            "tty",
            "This command requires an interactive TTY",
            None,
            None,
        );
        let _ = output::print_json_result(Err(err));
        return std::process::ExitCode::from(2);
    }

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
