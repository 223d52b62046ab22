use clap::Args;
use serde::Serialize;

use svcgen::naming::{self, Identifier, NamingMode};
use svcgen::validation;

use super::CmdResult;

#[derive(Args)]
pub struct NormalizeArgs {
    /// Free text; words are joined, commas separate names
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Skip compound-word splitting
    #[arg(long)]
    pub simple: bool,
}

#[derive(Debug, Serialize)]
pub struct NormalizeOutput {
    pub mode: &'static str,
    pub names: Vec<NameForms>,
}

#[derive(Debug, Serialize)]
pub struct NameForms {
    pub identifier: Identifier,
    pub kebab: String,
    pub lower_camel: String,
    pub snake: String,
    pub shouty: String,
}

pub fn run(args: NormalizeArgs) -> CmdResult<NormalizeOutput> {
    let mode = if args.simple {
        NamingMode::Simple
    } else {
        NamingMode::Enhanced
    };

    let raw = args.text.join(" ");
    let ids = naming::parse_list(&raw, mode);
    validation::require_non_empty_vec(&ids, "text")?;

    let names = ids
        .into_iter()
        .map(|id| NameForms {
            kebab: id.kebab(),
            lower_camel: id.lower_camel(),
            snake: id.snake(),
            shouty: id.shouty(),
            identifier: id,
        })
        .collect();

    Ok((
        NormalizeOutput {
            mode: if args.simple { "simple" } else { "enhanced" },
            names,
        },
        0,
    ))
}
