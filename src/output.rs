//! Output formatting and styling module.
//!
//! All terminal output goes through [`OutputFormatter`]: status lines, the
//! preview tree, the plan summary, the execution report and the progress bar.
//! The multi-line renderers return plain strings so they can be tested; the
//! `print_*` helpers add color on the way out.

use crate::executor::OrganizeResult;
use crate::file_category::Category;
use crate::plan::{FileOperation, Plan};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

/// Files listed per folder before the rest are collapsed.
const PREVIEW_FILES_PER_FOLDER: usize = 3;
/// Conflicts and errors listed before the rest are collapsed.
const MAX_LISTED: usize = 5;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// OutputFormatter::success("Completed: 3/3 files organized");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}\n", format!("=== {} ===", header).bold());
    }

    /// Creates a progress bar for moving `total` files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydir::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.set_position(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Prints the preview tree followed by the plan summary.
    pub fn print_preview(plan: &Plan, target_dir: &Path, old_files_days: u32) {
        Self::header("PREVIEW");
        if plan.is_empty() {
            Self::plain("No files to organize.");
            return;
        }
        Self::plain(&Self::preview_tree(plan, target_dir));
        Self::header("SUMMARY");
        Self::plain(&Self::plan_summary(plan, old_files_days));
    }

    /// Prints the outcome of an execution.
    pub fn print_result(result: &OrganizeResult) {
        let completed = format!(
            "Completed: {}/{} files organized",
            result.moved_count, result.total_count
        );
        println!();
        if result.is_complete_success() {
            Self::success(&completed);
        } else {
            Self::warning(&completed);
        }
        if !result.errors.is_empty() {
            println!();
            Self::error(&format!("Errors: {} files failed", result.failed_count()));
            eprintln!("{}", Self::error_lines(result));
        }
    }

    /// Renders the target tree as it will look after execution.
    ///
    /// Recent files appear under their category folder, old files under the
    /// archive folder. Folders are sorted by name and list at most three
    /// file names each. The archive folder name is the one the plan was
    /// built with.
    pub fn preview_tree(plan: &Plan, target_dir: &Path) -> String {
        let mut recent: BTreeMap<&'static str, Vec<&FileOperation>> = BTreeMap::new();
        let mut archived: BTreeMap<&'static str, Vec<&FileOperation>> = BTreeMap::new();
        for op in plan.operations() {
            let branch = if op.is_old { &mut archived } else { &mut recent };
            branch.entry(op.category.dir_name()).or_default().push(op);
        }

        let root_name = target_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| target_dir.display().to_string());

        let mut lines = vec![format!("📁 {}/", root_name)];
        let has_archive = !archived.is_empty();
        let recent_count = recent.len();
        for (i, (name, ops)) in recent.iter().enumerate() {
            let last = !has_archive && i + 1 == recent_count;
            push_folder(&mut lines, "", last, name, ops);
        }
        if has_archive {
            lines.push(format!("└── 📁 {}/", plan.archive_dir()));
            let archived_count = archived.len();
            for (i, (name, ops)) in archived.iter().enumerate() {
                push_folder(&mut lines, "    ", i + 1 == archived_count, name, ops);
            }
        }
        lines.join("\n")
    }

    /// Renders totals, per-category counts, the old-file count and conflicts.
    pub fn plan_summary(plan: &Plan, old_files_days: u32) -> String {
        let mut lines = vec![format!("Total files to organize: {}", plan.len())];

        let mut counts: Vec<(Category, usize)> = plan.category_counts().into_iter().collect();
        counts.sort_by_key(|(category, _)| category.dir_name());
        lines.push(String::new());
        lines.push("Files by category:".to_string());
        for (category, count) in counts {
            lines.push(format!("  {}: {}", category, count));
        }

        lines.push(String::new());
        lines.push(format!(
            "Old files (>{} days): {}",
            old_files_days,
            plan.old_count()
        ));

        let conflicts = plan.conflicts();
        if !conflicts.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "⚠ Conflicts detected: {} files will be renamed",
                conflicts.len()
            ));
            for conflict in conflicts.iter().take(MAX_LISTED) {
                lines.push(format!(
                    "  {} → {}",
                    display_name(&conflict.source),
                    display_name(&conflict.target)
                ));
            }
            if conflicts.len() > MAX_LISTED {
                lines.push(format!("  ... and {} more", conflicts.len() - MAX_LISTED));
            }
        }

        let unreadable = plan.discovery_errors();
        if !unreadable.is_empty() {
            lines.push(String::new());
            lines.push(format!("⚠ Skipped {} unreadable paths", unreadable.len()));
            for err in unreadable.iter().take(MAX_LISTED) {
                lines.push(format!("  {}: {}", err.path.display(), err.message));
            }
            if unreadable.len() > MAX_LISTED {
                lines.push(format!("  ... and {} more", unreadable.len() - MAX_LISTED));
            }
        }

        lines.join("\n")
    }

    /// Renders at most five failed moves, then a count of the rest.
    pub fn error_lines(result: &OrganizeResult) -> String {
        let mut lines: Vec<String> = result
            .errors
            .iter()
            .take(MAX_LISTED)
            .map(|failure| format!("  {}: {}", display_name(&failure.source), failure.message))
            .collect();
        if result.errors.len() > MAX_LISTED {
            lines.push(format!("  ... and {} more", result.errors.len() - MAX_LISTED));
        }
        lines.join("\n")
    }
}

fn push_folder(lines: &mut Vec<String>, indent: &str, last: bool, name: &str, ops: &[&FileOperation]) {
    let (branch, child_indent) = if last {
        ("└── ", "    ")
    } else {
        ("├── ", "│   ")
    };
    let file_word = if ops.len() == 1 { "file" } else { "files" };
    lines.push(format!(
        "{indent}{branch}📁 {name}/ ({} {file_word})",
        ops.len()
    ));

    let hidden = ops.len().saturating_sub(PREVIEW_FILES_PER_FOLDER);
    let shown = &ops[..ops.len().min(PREVIEW_FILES_PER_FOLDER)];
    for (i, op) in shown.iter().enumerate() {
        let connector = if hidden == 0 && i + 1 == shown.len() {
            "└── "
        } else {
            "├── "
        };
        lines.push(format!(
            "{indent}{child_indent}{connector}📄 {}",
            display_name(&op.source)
        ));
    }
    if hidden > 0 {
        lines.push(format!(
            "{indent}{child_indent}└── ... and {hidden} more files"
        ));
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
