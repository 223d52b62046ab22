//! Rename engine: propagate an identifier rename through a directory tree.
//!
//! Given a `RenameSpec` (from → to), this module:
//! 1. Walks the tree collecting allow-listed files and every entry name
//! 2. Generates content edits and file/directory renames (dry-run preview)
//! 3. Applies content edits (phase 1), then renames deepest-first (phase 2)
//!
//! Per-file and per-entry failures become warnings; the walk never aborts halfway.

use glob_match::glob_match;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::rules::{RuleSet, SubstitutionRule};
use crate::error::{Error, Result};
use crate::naming::Identifier;
use crate::utils::io;

// ============================================================================
// Types
// ============================================================================

/// File extensions (or whole lowercase file names) whose contents are rewritten.
pub const DEFAULT_CONTENT_EXTENSIONS: &[&str] = &[
    "cs", "csproj", "sln", "slnx", "props", "targets", "json", "xml", "config", "yml", "yaml",
    "md", "razor", "cshtml", "html", "js", "ts", "css", "sh", "ps1", "txt", "http", "env",
    "dockerfile",
];

/// Directories skipped at any depth (VCS, IDE state, build output).
const ALWAYS_SKIP_DIRS: &[&str] = &[".git", ".vs", ".idea", "node_modules", "bin", "obj"];

/// A rename specification: what to replace and where to look.
#[derive(Debug, Clone)]
pub struct RenameSpec {
    pub from: Identifier,
    pub to: Identifier,
    pub content_rules: RuleSet,
    pub path_rules: RuleSet,
    pub extensions: Vec<String>,
    /// Glob patterns (relative, `/`-separated) excluded from both phases.
    pub ignore: Vec<String>,
}

impl RenameSpec {
    /// Create a rename spec with generated case-variant rules and default allow-list.
    pub fn new(from: &Identifier, to: &Identifier) -> Self {
        RenameSpec {
            from: from.clone(),
            to: to.clone(),
            content_rules: RuleSet::for_content(from, to),
            path_rules: RuleSet::for_paths(from, to),
            extensions: DEFAULT_CONTENT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            ignore: Vec::new(),
        }
    }

    pub fn with_content_rules(mut self, rules: RuleSet) -> Self {
        self.content_rules = rules;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    fn is_content_file(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_lowercase());

        self.extensions
            .iter()
            .any(|allowed| ext.as_deref() == Some(allowed) || name.as_deref() == Some(allowed))
    }

    fn is_ignored(&self, relative: &str) -> bool {
        self.ignore.iter().any(|pattern| glob_match(pattern, relative))
    }
}

/// An edit to apply to a file's content.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdit {
    /// File path relative to root.
    pub file: String,
    /// Number of replacements in this file.
    pub replacements: usize,
    /// New content after all replacements.
    #[serde(skip)]
    pub new_content: String,
}

/// A file or directory rename of one path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRename {
    /// Original path relative to root.
    pub from: String,
    /// Target path relative to root (parent unchanged, last segment replaced).
    pub to: String,
}

impl FileRename {
    fn depth(&self) -> usize {
        self.from.matches('/').count()
    }
}

/// Something skipped or suspicious, with enough context to fix it by hand.
#[derive(Debug, Clone, Serialize)]
pub struct RenameWarning {
    /// Warning category.
    pub kind: String,
    /// Path relative to root.
    pub file: String,
    /// Human-readable description.
    pub message: String,
}

impl RenameWarning {
    fn new(kind: &str, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            file: file.into(),
            message: message.into(),
        }
    }
}

/// The full result of a rename operation.
#[derive(Debug, Clone, Serialize)]
pub struct RenameResult {
    pub from: Identifier,
    pub to: Identifier,
    /// Content rules in evaluation order.
    pub rules: Vec<SubstitutionRule>,
    /// File content edits (phase 1).
    pub edits: Vec<FileEdit>,
    /// File/directory renames, deepest first (phase 2).
    pub file_renames: Vec<FileRename>,
    /// Renames actually performed by `apply_renames`.
    pub applied_renames: Vec<FileRename>,
    /// Files actually rewritten by `apply_renames`.
    pub files_written: usize,
    pub warnings: Vec<RenameWarning>,
    pub total_replacements: usize,
    /// Whether changes were written to disk.
    pub applied: bool,
}

impl RenameResult {
    pub fn is_noop(&self) -> bool {
        self.edits.is_empty() && self.file_renames.is_empty()
    }
}

// ============================================================================
// File walking
// ============================================================================

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Every non-skipped entry under `root` (files and directories, root excluded).
fn walk_entries(root: &Path, spec: &RenameSpec, warnings: &mut Vec<RenameWarning>) -> Vec<PathBuf> {
    let mut entries = Vec::new();
    walk_recursive(root, root, spec, &mut entries, warnings);
    entries
}

fn walk_recursive(
    dir: &Path,
    root: &Path,
    spec: &RenameSpec,
    out: &mut Vec<PathBuf>,
    warnings: &mut Vec<RenameWarning>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warnings.push(RenameWarning::new(
                "unreadable_dir",
                relative_path(root, dir),
                format!("Could not list directory: {}", e),
            ));
            return;
        }
    };

    let mut children: Vec<(PathBuf, bool)> = entries
        .flatten()
        .filter_map(|entry| {
            let file_type = entry.file_type().ok()?;
            Some((entry.path(), file_type.is_dir()))
        })
        .collect();
    children.sort();

    for (path, is_dir) in children {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if is_dir && ALWAYS_SKIP_DIRS.contains(&name.as_str()) {
            continue;
        }
        if spec.is_ignored(&relative_path(root, &path)) {
            continue;
        }

        out.push(path.clone());
        if is_dir {
            walk_recursive(&path, root, spec, out, warnings);
        }
    }
}

// ============================================================================
// Rename generation
// ============================================================================

/// Generate content edits and path renames without touching disk.
pub fn generate_renames(spec: &RenameSpec, root: &Path) -> RenameResult {
    let mut warnings = Vec::new();
    let entries = walk_entries(root, spec, &mut warnings);

    let mut edits = Vec::new();
    for path in entries.iter().filter(|p| p.is_file() && spec.is_content_file(p)) {
        let relative = relative_path(root, path);
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warnings.push(RenameWarning::new(
                    "unreadable_file",
                    relative,
                    format!("Skipped content rewrite: {}", e),
                ));
                continue;
            }
        };

        let substitution = spec.content_rules.apply(&content);
        if substitution.replacements > 0 && substitution.text != content {
            edits.push(FileEdit {
                file: relative,
                replacements: substitution.replacements,
                new_content: substitution.text,
            });
        }
    }

    let mut file_renames = Vec::new();
    for path in &entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let renamed = spec.path_rules.apply(name).text;
        if renamed == name {
            continue;
        }

        let from = relative_path(root, path);
        let to = match from.rsplit_once('/') {
            Some((parent, _)) => format!("{}/{}", parent, renamed),
            None => renamed,
        };
        file_renames.push(FileRename { from, to });
    }

    // Children before parents: a child's path is built from its ancestors' names
    file_renames.sort_by(|a, b| {
        b.depth()
            .cmp(&a.depth())
            .then(b.from.len().cmp(&a.from.len()))
            .then(a.from.cmp(&b.from))
    });

    warnings.extend(detect_collisions(&file_renames, root));

    let total_replacements = edits.iter().map(|e| e.replacements).sum();

    RenameResult {
        from: spec.from.clone(),
        to: spec.to.clone(),
        rules: spec.content_rules.ordered().into_iter().cloned().collect(),
        edits,
        file_renames,
        applied_renames: Vec::new(),
        files_written: 0,
        warnings,
        total_replacements,
        applied: false,
    }
}

// ============================================================================
// Collision detection
// ============================================================================

/// Rename targets that already exist on disk or are claimed twice.
fn detect_collisions(file_renames: &[FileRename], root: &Path) -> Vec<RenameWarning> {
    let mut warnings = Vec::new();
    let mut targets: HashSet<&str> = HashSet::new();

    for rename in file_renames {
        if root.join(&rename.to).symlink_metadata().is_ok() {
            warnings.push(RenameWarning::new(
                "file_collision",
                rename.to.clone(),
                format!(
                    "Rename target '{}' already exists on disk (from '{}')",
                    rename.to, rename.from
                ),
            ));
        } else if !targets.insert(rename.to.as_str()) {
            warnings.push(RenameWarning::new(
                "file_collision",
                rename.to.clone(),
                format!(
                    "Rename target '{}' is produced by more than one entry (from '{}')",
                    rename.to, rename.from
                ),
            ));
        }
    }

    warnings
}

// ============================================================================
// Apply renames
// ============================================================================

/// Apply content edits, then path renames deepest-first.
///
/// A failed write or rename is recorded in `result.warnings` and skipped. An
/// existing rename target is never overwritten.
pub fn apply_renames(result: &mut RenameResult, root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(Error::internal_io(
            format!("Rename root is not a directory: {}", root.display()),
            Some("apply renames".to_string()),
        ));
    }

    // Phase 1: contents, resolved by original paths
    for edit in &result.edits {
        let path = root.join(&edit.file);
        match io::write_file(&path, &edit.new_content, &format!("write {}", edit.file)) {
            Ok(()) => result.files_written += 1,
            Err(e) => {
                crate::log_status!("rename", "Failed to write {}: {}", edit.file, e.details);
                result.warnings.push(RenameWarning::new(
                    "write_failed",
                    edit.file.clone(),
                    format!("Content not rewritten: {}", e.details),
                ));
            }
        }
    }

    // Phase 2: paths, deepest first
    for rename in &result.file_renames {
        let from = root.join(&rename.from);
        let to = root.join(&rename.to);

        if from.symlink_metadata().is_err() {
            result.warnings.push(RenameWarning::new(
                "rename_skipped",
                rename.from.clone(),
                "Source no longer exists",
            ));
            continue;
        }

        if to.symlink_metadata().is_ok() {
            crate::log_status!("rename", "Skipping {}: {} already exists", rename.from, rename.to);
            result.warnings.push(RenameWarning::new(
                "rename_skipped",
                rename.from.clone(),
                format!("Target '{}' already exists", rename.to),
            ));
            continue;
        }

        match std::fs::rename(&from, &to) {
            Ok(()) => result.applied_renames.push(rename.clone()),
            Err(e) => {
                crate::log_status!("rename", "Failed to rename {}: {}", rename.from, e);
                result.warnings.push(RenameWarning::new(
                    "rename_failed",
                    rename.from.clone(),
                    format!("Rename to '{}' failed: {}", rename.to, e),
                ));
            }
        }
    }

    result.applied = true;
    Ok(())
}

/// Generate and apply in one step.
pub fn propagate(spec: &RenameSpec, root: &Path) -> Result<RenameResult> {
    let mut result = generate_renames(spec, root);
    apply_renames(&mut result, root)?;
    crate::log_status!(
        "rename",
        "{} → {}: {} file(s) rewritten, {} entr(ies) renamed",
        spec.from,
        spec.to,
        result.files_written,
        result.applied_renames.len()
    );
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::normalize;
    use std::fs;
    use tempfile::TempDir;

    fn spec(from: &str, to: &str) -> RenameSpec {
        RenameSpec::new(&normalize(from), &normalize(to))
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn generate_renames_produces_edits_without_writing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "UserService.cs", "namespace PlayTicket.UserService;\n");

        let result = generate_renames(&spec("user", "order"), dir.path());

        assert_eq!(result.edits.len(), 1);
        assert_eq!(result.edits[0].new_content, "namespace PlayTicket.OrderService;\n");
        assert_eq!(result.file_renames[0].to, "OrderService.cs");
        assert!(!result.applied);
        assert!(dir.path().join("UserService.cs").exists());
    }

    #[test]
    fn renames_are_sorted_deepest_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "user/src/User.Domain/UserEntity.cs", "class UserEntity {}\n");

        let result = generate_renames(&spec("user", "order"), dir.path());
        let froms: Vec<&str> = result.file_renames.iter().map(|r| r.from.as_str()).collect();

        assert_eq!(
            froms,
            vec!["user/src/User.Domain/UserEntity.cs", "user/src/User.Domain", "user"]
        );
    }

    #[test]
    fn apply_renames_rewrites_contents_and_paths() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "user/src/User.Domain/UserEntity.cs",
            "namespace PlayTicket.User.Domain;\npublic class UserEntity {}\n",
        );

        let result = propagate(&spec("user", "order"), dir.path()).unwrap();

        assert!(result.applied);
        assert_eq!(result.files_written, 1);
        assert_eq!(result.applied_renames.len(), 3);
        let moved = dir.path().join("order/src/Order.Domain/OrderEntity.cs");
        assert_eq!(
            fs::read_to_string(moved).unwrap(),
            "namespace PlayTicket.Order.Domain;\npublic class OrderEntity {}\n"
        );
        assert!(!dir.path().join("user").exists());
    }

    #[test]
    fn second_run_is_noop() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "user/UserService.config", "PlayTicket.UserService\n");

        propagate(&spec("user", "order"), dir.path()).unwrap();
        let second = propagate(&spec("user", "order"), dir.path()).unwrap();

        assert!(second.is_noop());
        assert_eq!(second.files_written, 0);
        assert!(second.applied_renames.is_empty());
    }

    #[test]
    fn existing_target_is_skipped_not_overwritten() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "UserNotes.txt", "old\n");
        write(dir.path(), "OrderNotes.txt", "keep me\n");

        let result = propagate(&spec("user", "order"), dir.path()).unwrap();

        assert!(result.applied_renames.is_empty());
        assert!(result.warnings.iter().any(|w| w.kind == "file_collision"));
        assert!(result.warnings.iter().any(|w| w.kind == "rename_skipped"));
        assert_eq!(
            fs::read_to_string(dir.path().join("OrderNotes.txt")).unwrap(),
            "keep me\n"
        );
        assert!(dir.path().join("UserNotes.txt").exists());
    }

    #[test]
    fn duplicate_targets_keep_unique_paths() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "user.txt", "a\n");
        write(dir.path(), "User.txt", "b\n");

        let mut result = generate_renames(&spec("user", "order"), dir.path());
        // "User.txt" → "Order.txt", "user.txt" → "order.txt": distinct targets
        let targets: HashSet<&str> = result.file_renames.iter().map(|r| r.to.as_str()).collect();
        assert_eq!(targets.len(), result.file_renames.len());

        apply_renames(&mut result, dir.path()).unwrap();
        let applied: HashSet<&str> = result.applied_renames.iter().map(|r| r.to.as_str()).collect();
        assert_eq!(applied.len(), result.applied_renames.len());
    }

    #[test]
    fn unrelated_identifiers_untouched() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Program.cs", "var username = superuser;\n");

        let result = generate_renames(&spec("user", "order"), dir.path());
        assert!(result.edits.is_empty());
    }

    #[test]
    fn non_allowlisted_files_keep_content_but_are_renamed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "User.png", "User");

        let result = propagate(&spec("user", "order"), dir.path()).unwrap();

        assert!(result.edits.is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("Order.png")).unwrap(), "User");
    }

    #[test]
    fn dockerfile_matched_by_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Dockerfile", "COPY services/user/ .\n");

        let result = generate_renames(&spec("user", "order"), dir.path());
        assert_eq!(result.edits.len(), 1);
        assert_eq!(result.edits[0].new_content, "COPY services/order/ .\n");
    }

    #[test]
    fn skip_dirs_and_ignore_globs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bin/Debug/User.dll.config", "User\n");
        write(dir.path(), ".git/User", "User\n");
        write(dir.path(), "docs/User.md", "User\n");
        write(dir.path(), "src/User.cs", "User\n");

        let s = spec("user", "order").with_ignore(vec!["docs/**".to_string()]);
        let result = generate_renames(&s, dir.path());

        let files: Vec<&str> = result.edits.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["src/User.cs"]);
        assert!(result.file_renames.iter().all(|r| r.from.starts_with("src/")));
    }

    #[test]
    fn invalid_utf8_is_warned_and_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blob.txt"), [0xff, 0xfe, 0x00]).unwrap();
        write(dir.path(), "User.cs", "class User {}\n");

        let result = propagate(&spec("user", "order"), dir.path()).unwrap();

        assert!(result.warnings.iter().any(|w| w.kind == "unreadable_file" && w.file == "blob.txt"));
        assert_eq!(
            fs::read_to_string(dir.path().join("Order.cs")).unwrap(),
            "class Order {}\n"
        );
    }

    #[test]
    fn apply_on_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let mut result = generate_renames(&spec("user", "order"), &missing);
        assert!(result.warnings.iter().any(|w| w.kind == "unreadable_dir"));
        assert!(apply_renames(&mut result, &missing).is_err());
    }

    #[test]
    fn failed_write_and_rename_do_not_stop_the_walk() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "UserA.txt", "User a\n");
        write(root, "UserB.txt", "User b\n");
        write(root, "UserC.txt", "plain\n");

        let mut result = generate_renames(&spec("user", "order"), root);

        // A directory where a file was planned makes the write fail
        fs::remove_file(root.join("UserA.txt")).unwrap();
        fs::create_dir(root.join("UserA.txt")).unwrap();
        // A target under a missing folder makes the rename fail
        result.file_renames.insert(
            0,
            FileRename {
                from: "UserC.txt".to_string(),
                to: "missing/OrderC.txt".to_string(),
            },
        );

        apply_renames(&mut result, root).unwrap();

        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == "write_failed" && w.file == "UserA.txt"));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == "rename_failed" && w.file == "UserC.txt"));

        assert_eq!(fs::read_to_string(root.join("OrderB.txt")).unwrap(), "Order b\n");
        assert!(root.join("OrderA.txt").is_dir());
        assert!(root.join("OrderC.txt").is_file());
        assert!(!root.join("UserB.txt").exists());
    }
}
