//! Composition file edits: add and remove a service's host registration.
//!
//! The pure functions work on text; `register_service` / `unregister_service`
//! read and write the configured composition file.

use serde::Serialize;

use crate::config::ScaffoldConfig;
use crate::error::{Error, Result};
use crate::naming::Identifier;
use crate::utils::io;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    pub line_number: usize,
    pub original: String,
    pub modified: String,
    pub operation: String,
}

/// Edited text plus the lines that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub content: String,
    pub changes: Vec<LineChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditResult {
    pub path: String,
    pub changes_made: Vec<LineChange>,
    pub written: bool,
}

/// The code part of a line: everything before a `//` comment outside a string.
fn code_part(line: &str) -> &str {
    let mut in_string = false;
    let mut prev = '\0';
    for (i, c) in line.char_indices() {
        match c {
            '"' if prev != '\\' => in_string = !in_string,
            '/' if !in_string && prev == '/' => return &line[..i - 1],
            _ => {}
        }
        prev = c;
    }
    line
}

/// True when the code on `line` is an expression still waiting for more lines.
fn is_unterminated(line: &str) -> bool {
    let code = code_part(line).trim();
    !code.is_empty()
        && !code.starts_with('#')
        && !code.ends_with(';')
        && !code.ends_with('{')
        && !code.ends_with('}')
}

fn is_fluent_continuation(line: &str) -> bool {
    code_part(line).trim_start().starts_with('.')
}

fn paren_balance(line: &str) -> i32 {
    code_part(line).chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

/// Remove every statement whose code mentions `pattern`.
///
/// Comments are never matched. A fluent chain (`builder` / `.AddProject(..)` /
/// `.WithReference(..);`) or a call whose arguments wrap onto following lines
/// is removed whole. All other lines, including their line endings, are kept
/// byte for byte.
pub fn remove_registration(content: &str, pattern: &str) -> TextEdit {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut remove = vec![false; lines.len()];

    if !pattern.is_empty() {
        for (i, line) in lines.iter().enumerate() {
            if remove[i] || !code_part(line).contains(pattern) {
                continue;
            }

            // Back over the head of a fluent chain
            let mut start = i;
            while start > 0
                && !remove[start - 1]
                && is_fluent_continuation(lines[start])
                && is_unterminated(lines[start - 1])
            {
                start -= 1;
            }

            // Forward through wrapped arguments and chained calls
            let mut end = i;
            let mut depth: i32 = lines[start..=i].iter().map(|l| paren_balance(l)).sum();
            while end + 1 < lines.len() && is_unterminated(lines[end]) {
                let next = lines[end + 1];
                if depth <= 0 && !is_fluent_continuation(next) {
                    break;
                }
                if code_part(next).trim_start().starts_with('#') {
                    break;
                }
                end += 1;
                depth += paren_balance(next);
            }

            for flag in &mut remove[start..=end] {
                *flag = true;
            }
        }
    }

    let mut out = String::with_capacity(content.len());
    let mut changes = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if remove[i] {
            changes.push(LineChange {
                line_number: i + 1,
                original: line.trim_end_matches(['\r', '\n']).to_string(),
                modified: String::new(),
                operation: "delete".to_string(),
            });
        } else {
            out.push_str(line);
        }
    }

    TextEdit {
        content: out,
        changes,
    }
}

/// Insert `line` before the first line containing `anchor`, at the anchor's indentation.
///
/// Returns `None` when the anchor is missing. When an identical line (ignoring
/// surrounding whitespace) already exists the content comes back unchanged.
pub fn insert_registration(content: &str, line: &str, anchor: &str) -> Option<TextEdit> {
    let wanted = line.trim();
    let lines: Vec<&str> = content.split_inclusive('\n').collect();

    if lines.iter().any(|l| l.trim() == wanted) {
        return Some(TextEdit {
            content: content.to_string(),
            changes: Vec::new(),
        });
    }

    let anchor_index = lines.iter().position(|l| l.contains(anchor))?;
    let anchor_line = lines[anchor_index];
    let indent: String = anchor_line
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    let eol = if anchor_line.ends_with("\r\n") { "\r\n" } else { "\n" };
    let inserted = format!("{}{}", indent, wanted);

    let mut out = String::with_capacity(content.len() + inserted.len() + eol.len());
    for (i, l) in lines.iter().enumerate() {
        if i == anchor_index {
            out.push_str(&inserted);
            out.push_str(eol);
        }
        out.push_str(l);
    }

    Some(TextEdit {
        content: out,
        changes: vec![LineChange {
            line_number: anchor_index + 1,
            original: String::new(),
            modified: inserted,
            operation: "insert".to_string(),
        }],
    })
}

/// Add `service`'s registration line to the composition file.
pub fn register_service(config: &ScaffoldConfig, service: &Identifier) -> Result<EditResult> {
    let path = config.composition_path();
    let display = config.display_path(&path);
    let content = io::read_file(&path, &format!("read {}", display))?;

    let line = config.render(&config.registration_line, Some(service));
    let anchor = config.render(&config.registration_anchor, Some(service));
    let edit = insert_registration(&content, &line, &anchor)
        .ok_or_else(|| Error::composition_anchor_missing(display.clone(), anchor.clone()))?;

    write_edit(&path, display, &content, edit)
}

/// Remove every statement naming `service` from the composition file.
pub fn unregister_service(config: &ScaffoldConfig, service: &Identifier) -> Result<EditResult> {
    let path = config.composition_path();
    let display = config.display_path(&path);
    let content = io::read_file(&path, &format!("read {}", display))?;

    let pattern = config.render(&config.registration_pattern, Some(service));
    let edit = remove_registration(&content, &pattern);

    write_edit(&path, display, &content, edit)
}

fn write_edit(
    path: &std::path::Path,
    display: String,
    original: &str,
    edit: TextEdit,
) -> Result<EditResult> {
    let written = edit.content != original;
    if written {
        io::write_file(path, &edit.content, &format!("write {}", display))?;
        crate::log_status!("registration", "Updated {} ({} line(s))", display, edit.changes.len());
    }

    Ok(EditResult {
        path: display,
        changes_made: edit.changes,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::normalize;
    use std::fs;
    use tempfile::TempDir;

    const PROGRAM: &str = "var builder = DistributedApplication.CreateBuilder(args);\n\nbuilder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\nbuilder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\");\n\nbuilder.Build().Run();\n";

    #[test]
    fn remove_deletes_only_matching_line() {
        let edit = remove_registration(PROGRAM, "Projects.PlayTicket_OrderService_");

        assert_eq!(edit.changes.len(), 1);
        assert_eq!(edit.changes[0].line_number, 4);
        assert_eq!(
            edit.content,
            PROGRAM.replace(
                "builder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\");\n",
                ""
            )
        );
    }

    #[test]
    fn remove_handles_multiline_statement() {
        let content = "var db = builder.AddPostgres(\"pg\");\nbuilder\n    .AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\")\n    .WithReference(db);\nbuilder.Build().Run();\n";

        let edit = remove_registration(content, "Projects.PlayTicket_OrderService_");

        assert_eq!(edit.changes.len(), 3);
        assert_eq!(
            edit.content,
            "var db = builder.AddPostgres(\"pg\");\nbuilder.Build().Run();\n"
        );
    }

    #[test]
    fn remove_keeps_next_statement_after_trailing_comment() {
        let content = "var builder = X;\nbuilder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\"); // orders\nbuilder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\nbuilder.Build().Run();\n";

        let edit = remove_registration(content, "Projects.PlayTicket_OrderService_");

        assert_eq!(edit.changes.len(), 1);
        assert_eq!(
            edit.content,
            "var builder = X;\nbuilder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\nbuilder.Build().Run();\n"
        );
    }

    #[test]
    fn remove_leaves_preprocessor_directives_balanced() {
        let content = "var builder = X;\n#if DEBUG\nbuilder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\");\n#endif\nbuilder.Build().Run();\n";

        let edit = remove_registration(content, "Projects.PlayTicket_OrderService_");

        assert_eq!(
            edit.content,
            "var builder = X;\n#if DEBUG\n#endif\nbuilder.Build().Run();\n"
        );
    }

    #[test]
    fn remove_ignores_mentions_in_comments() {
        let content = "var builder = X;\n// TODO: split Projects.PlayTicket_OrderService_HttpApi_Host\nbuilder.AddProject<Projects.PlayTicket_UserService_HttpApi_Host>(\"user-service\");\nbuilder.Build().Run();\n";

        let edit = remove_registration(content, "Projects.PlayTicket_OrderService_");

        assert!(edit.changes.is_empty());
        assert_eq!(edit.content, content);
    }

    #[test]
    fn remove_handles_wrapped_arguments() {
        let content = "builder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\n    \"order-service\");\nbuilder.Build().Run();\n";

        let edit = remove_registration(content, "Projects.PlayTicket_OrderService_");

        assert_eq!(edit.changes.len(), 2);
        assert_eq!(edit.content, "builder.Build().Run();\n");
    }

    #[test]
    fn code_part_keeps_slashes_inside_strings() {
        assert_eq!(code_part("var u = \"http://x\"; // note"), "var u = \"http://x\"; ");
        assert_eq!(code_part("// all comment"), "");
    }

    #[test]
    fn remove_is_noop_without_match() {
        let edit = remove_registration(PROGRAM, "Projects.PlayTicket_TicketService_");
        assert!(edit.changes.is_empty());
        assert_eq!(edit.content, PROGRAM);
    }

    #[test]
    fn remove_does_not_match_longer_service_prefix() {
        let content = "builder.AddProject<Projects.PlayTicket_OrderItemService_HttpApi_Host>(\"x\");\n";
        let edit = remove_registration(content, "Projects.PlayTicket_OrderService_");
        assert!(edit.changes.is_empty());
    }

    #[test]
    fn insert_goes_before_anchor_with_indent() {
        let content = "{\n    var app = 1;\n    builder.Build().Run();\n}\n";
        let edit = insert_registration(content, "builder.AddProject<X>(\"x\");", "builder.Build().Run();")
            .unwrap();

        assert_eq!(
            edit.content,
            "{\n    var app = 1;\n    builder.AddProject<X>(\"x\");\n    builder.Build().Run();\n}\n"
        );
        assert_eq!(edit.changes[0].operation, "insert");
    }

    #[test]
    fn insert_is_idempotent() {
        let line = "builder.AddProject<Projects.PlayTicket_OrderService_HttpApi_Host>(\"order-service\");";
        let edit = insert_registration(PROGRAM, line, "builder.Build().Run();").unwrap();
        assert!(edit.changes.is_empty());
        assert_eq!(edit.content, PROGRAM);
    }

    #[test]
    fn insert_without_anchor_is_none() {
        assert!(insert_registration("app.Run();\n", "x;", "builder.Build().Run();").is_none());
    }

    #[test]
    fn insert_keeps_crlf_endings() {
        let edit = insert_registration("a;\r\nbuilder.Build().Run();\r\n", "b;", "builder.Build().Run();")
            .unwrap();
        assert_eq!(edit.content, "a;\r\nb;\r\nbuilder.Build().Run();\r\n");
    }

    fn solution(dir: &TempDir) -> ScaffoldConfig {
        let config = ScaffoldConfig {
            solution_name: "PlayTicket".to_string(),
            root: dir.path().to_path_buf(),
            ..ScaffoldConfig::default()
        };
        let program = config.composition_path();
        fs::create_dir_all(program.parent().unwrap()).unwrap();
        fs::write(&program, PROGRAM).unwrap();
        config
    }

    #[test]
    fn register_and_unregister_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let config = solution(&dir);
        let ticket = normalize("ticket");

        let added = register_service(&config, &ticket).unwrap();
        assert!(added.written);
        assert_eq!(added.path, "aspire/PlayTicket.AppHost/Program.cs");

        let removed = unregister_service(&config, &ticket).unwrap();
        assert!(removed.written);
        assert_eq!(fs::read_to_string(config.composition_path()).unwrap(), PROGRAM);
    }

    #[test]
    fn register_reports_missing_anchor() {
        let dir = TempDir::new().unwrap();
        let mut config = solution(&dir);
        config.registration_anchor = "app.Run();".to_string();

        let err = register_service(&config, &normalize("ticket")).unwrap_err();
        assert_eq!(err.code.as_str(), "composition.anchor_missing");
    }
}
