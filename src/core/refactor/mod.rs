//! Structural refactoring: propagate a name change across a directory tree.
//!
//! Builds case-variant substitution rules for an identifier, rewrites file
//! contents, then renames files and folders deepest-first.

mod rename;
mod rules;

pub use rename::{
    apply_renames, generate_renames, propagate, FileEdit, FileRename, RenameResult, RenameSpec,
    RenameWarning, DEFAULT_CONTENT_EXTENSIONS,
};
pub use rules::{
    find_literal_matches, find_term_matches, Matching, RuleMatch, RuleSet, Substitution,
    SubstitutionRule,
};
