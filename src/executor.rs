/// Applies a plan to the filesystem.
///
/// Moves are performed one at a time, in plan order, with a plain rename.
/// A failure is recorded against the file and the batch carries on.
use crate::error::FsErrorKind;
use crate::log_sink::LogSink;
use crate::path_resolver::Conflict;
use crate::plan::{FileOperation, Plan};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveFailure {
    pub source: PathBuf,
    pub kind: FsErrorKind,
    pub message: String,
}

/// Summary of one executed plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeResult {
    /// Files actually relocated.
    pub moved_count: usize,
    /// Files the plan tried to relocate.
    pub total_count: usize,
    pub errors: Vec<MoveFailure>,
    pub conflicts: Vec<Conflict>,
}

impl OrganizeResult {
    /// Returns true if every planned file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.moved_count == self.total_count
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }
}

/// Creates the plan's directories and moves its files.
///
/// `on_progress` is called after every file with the number of files
/// processed so far and the total.
pub fn apply_plan(
    plan: &Plan,
    mut sink: Option<&mut dyn LogSink>,
    on_progress: &mut dyn FnMut(usize, usize),
) -> OrganizeResult {
    let total = plan.len();
    let mut result = OrganizeResult {
        total_count: total,
        conflicts: plan.conflicts().to_vec(),
        ..OrganizeResult::default()
    };
    let mut processed = 0;

    for (dir, operations) in plan.groups() {
        let dir_error = fs::create_dir_all(dir).err();
        if let Some(e) = &dir_error {
            tracing::warn!(path = %dir.display(), error = %e, "cannot create target directory");
        }

        for op in operations {
            let outcome = match &dir_error {
                Some(e) => Err(io::Error::new(
                    e.kind(),
                    format!("cannot create {}: {}", dir.display(), e),
                )),
                None => move_file(op),
            };

            match outcome {
                Ok(()) => {
                    result.moved_count += 1;
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.info(&format!(
                            "Moved: {} → {}",
                            op.source.display(),
                            op.target.display()
                        ));
                    }
                }
                Err(e) => {
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.error(&format!("Failed to move {}: {}", op.source.display(), e));
                    }
                    result.errors.push(MoveFailure {
                        source: op.source.clone(),
                        kind: FsErrorKind::of(&e),
                        message: e.to_string(),
                    });
                }
            }

            processed += 1;
            on_progress(processed, total);
        }
    }

    result
}

/// Renames one file, refusing to overwrite anything that appeared at the
/// target since the plan was built.
///
/// A rename across filesystems falls back to copy and remove.
fn move_file(op: &FileOperation) -> io::Result<()> {
    if op.target.try_exists()? {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("target already exists: {}", op.target.display()),
        ));
    }
    match fs::rename(&op.source, &op.target) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::warn!(
                source = %op.source.display(),
                target = %op.target.display(),
                "rename crosses filesystems, falling back to copy+remove"
            );
            copy_then_remove(&op.source, &op.target)
        }
        other => other,
    }
}

/// Copies `source` to `target`, then removes `source`.
///
/// On failure the partial or duplicate copy at `target` is removed, so the
/// file only ever exists at one of the two paths.
fn copy_then_remove(source: &Path, target: &Path) -> io::Result<()> {
    let result = fs::copy(source, target).and_then(|_| fs::remove_file(source));
    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_file(target)
            && cleanup.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(path = %target.display(), error = %cleanup, "cannot remove partial copy");
        }
        return Err(e);
    }
    Ok(())
}
