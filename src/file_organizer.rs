/// File organization front end.
///
/// `FileOrganizer` ties the pipeline together for one source/target pair:
/// it validates the directories, checks permissions, builds previews and
/// executes plans, and owns the optional move log.
use crate::classifier::{Classifier, cutoff_for};
use crate::config::CompiledFilters;
use crate::error::OrganizeError;
use crate::executor::{OrganizeResult, apply_plan};
use crate::file_category::Category;
use crate::log_sink::{FileLogSink, LogSink};
use crate::plan::{Plan, PlanBuilder};
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};

/// Settings for one organizer.
#[derive(Debug, Clone)]
pub struct OrganizerOptions {
    /// Directory whose files are organized.
    pub source_dir: PathBuf,
    /// Root under which category folders are created. Defaults to `source_dir`.
    pub target_dir: Option<PathBuf>,
    /// Also organize files found in subdirectories.
    pub include_subdirs: bool,
    /// Files not modified for more than this many days go to the archive folder.
    pub old_files_days: u32,
    /// Write a move log into the target directory.
    pub enable_logging: bool,
    /// Which discovered files take part.
    pub filters: CompiledFilters,
}

impl OrganizerOptions {
    /// Options with the usual defaults for `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: None,
            include_subdirs: false,
            old_files_days: 365,
            enable_logging: false,
            filters: CompiledFilters::default(),
        }
    }
}

/// Organizes files into category subdirectories.
///
/// # Examples
///
/// ```no_run
/// use tidydir::file_organizer::{FileOrganizer, OrganizerOptions};
///
/// let mut organizer = FileOrganizer::new(OrganizerOptions::new("/home/user/Downloads"))
///     .expect("valid source");
/// let plan = organizer.preview();
/// println!("{} files to organize", plan.len());
/// let result = organizer.execute();
/// println!("moved {}/{}", result.moved_count, result.total_count);
/// organizer.close_logging();
/// ```
pub struct FileOrganizer {
    source_dir: PathBuf,
    target_dir: PathBuf,
    include_subdirs: bool,
    old_files_days: u32,
    cutoff: DateTime<Local>,
    classifier: Classifier,
    filters: CompiledFilters,
    log: Option<FileLogSink>,
}

impl FileOrganizer {
    /// Creates an organizer.
    ///
    /// Paths are made absolute. When logging is enabled the target directory
    /// is created and the log file opened right away.
    ///
    /// # Errors
    ///
    /// Fails if the source does not exist or is not a directory, if the
    /// target cannot be made absolute, or if the log file cannot be opened.
    pub fn new(options: OrganizerOptions) -> Result<Self, OrganizeError> {
        let source_dir =
            options
                .source_dir
                .canonicalize()
                .map_err(|e| OrganizeError::InvalidSource {
                    path: options.source_dir.clone(),
                    source: e,
                })?;
        if !source_dir.is_dir() {
            return Err(OrganizeError::NotADirectory {
                path: options.source_dir,
            });
        }

        let target_dir = match &options.target_dir {
            Some(target) => resolve_dir(target).map_err(|e| OrganizeError::InvalidTarget {
                path: target.clone(),
                source: e,
            })?,
            None => source_dir.clone(),
        };

        let log = if options.enable_logging {
            let sink = FileLogSink::open(&target_dir, &source_dir).map_err(|e| {
                OrganizeError::LogSetup {
                    path: target_dir.clone(),
                    source: e,
                }
            })?;
            Some(sink)
        } else {
            None
        };

        tracing::debug!(
            source = %source_dir.display(),
            target = %target_dir.display(),
            include_subdirs = options.include_subdirs,
            old_files_days = options.old_files_days,
            "organizer ready"
        );

        Ok(Self {
            source_dir,
            target_dir,
            include_subdirs: options.include_subdirs,
            old_files_days: options.old_files_days,
            cutoff: cutoff_for(Local::now(), options.old_files_days),
            classifier: Classifier::default(),
            filters: options.filters,
            log,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Age threshold in days.
    pub fn old_files_days(&self) -> u32 {
        self.old_files_days
    }

    /// Files modified strictly before this instant are archived.
    pub fn cutoff(&self) -> DateTime<Local> {
        self.cutoff
    }

    /// Path of the move log, if logging is enabled and still open.
    pub fn log_path(&self) -> Option<&Path> {
        self.log
            .as_ref()
            .filter(|sink| !sink.is_closed())
            .map(FileLogSink::path)
    }

    /// Category a file would be sorted into.
    pub fn category_of(&self, path: &Path) -> Category {
        self.classifier.category_of(path)
    }

    /// Whether a file would be archived.
    pub fn is_old_file(&self, path: &Path) -> bool {
        self.classifier.is_old(path, self.cutoff)
    }

    /// Checks that the source can be read and the target written.
    ///
    /// Returns one human-readable line per problem; an empty list means the
    /// run may proceed.
    pub fn check_permissions(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.source_dir.exists() {
            issues.push(format!(
                "Source directory does not exist: {}",
                self.source_dir.display()
            ));
        } else if !access::readable(&self.source_dir) {
            issues.push(format!(
                "No read permission for source: {}",
                self.source_dir.display()
            ));
        }

        if self.target_dir.exists() {
            if !access::writable(&self.target_dir) {
                issues.push(format!(
                    "No write permission for target: {}",
                    self.target_dir.display()
                ));
            }
        } else {
            let writable_ancestor = self
                .target_dir
                .ancestors()
                .skip(1)
                .find(|dir| dir.exists())
                .is_some_and(access::writable);
            if !writable_ancestor {
                issues.push(format!(
                    "No write permission to create target: {}",
                    self.target_dir.display()
                ));
            }
        }

        issues
    }

    /// Builds a fresh plan without touching the filesystem.
    ///
    /// Discovery errors are reported to the move log, if any.
    pub fn preview(&mut self) -> Plan {
        let now = Local::now();
        let mut builder = PlanBuilder::new(&self.classifier).with_filters(&self.filters);
        if let Some(sink) = self.log.as_ref() {
            builder = builder.skip_path(sink.path());
        }
        let plan = builder.build(
            &self.source_dir,
            self.include_subdirs,
            self.cutoff,
            &self.target_dir,
            now.date_naive(),
        );

        if let Some(sink) = self.log.as_mut() {
            for err in plan.discovery_errors() {
                sink.error(&format!(
                    "Error reading directory {}: {}",
                    err.path.display(),
                    err.message
                ));
            }
        }

        plan
    }

    /// Rebuilds the plan and applies it.
    pub fn execute(&mut self) -> OrganizeResult {
        self.execute_with_progress(|_, _| {})
    }

    /// Rebuilds the plan and applies it, reporting progress after each file.
    pub fn execute_with_progress<F>(&mut self, mut on_progress: F) -> OrganizeResult
    where
        F: FnMut(usize, usize),
    {
        let plan = self.preview();
        let sink = self.log.as_mut().map(|s| s as &mut dyn LogSink);
        let result = apply_plan(&plan, sink, &mut on_progress);

        tracing::debug!(
            moved = result.moved_count,
            total = result.total_count,
            failed = result.errors.len(),
            "execution finished"
        );
        result
    }

    /// Flushes and closes the move log. Safe to call more than once.
    pub fn close_logging(&mut self) {
        if let Some(sink) = self.log.as_mut() {
            sink.close();
        }
    }
}

impl Drop for FileOrganizer {
    fn drop(&mut self) {
        self.close_logging();
    }
}

fn resolve_dir(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        path.canonicalize()
    } else {
        std::path::absolute(path)
    }
}

#[cfg(unix)]
mod access {
    use nix::unistd::{AccessFlags, access};
    use std::path::Path;

    pub fn readable(path: &Path) -> bool {
        access(path, AccessFlags::R_OK | AccessFlags::X_OK).is_ok()
    }

    pub fn writable(path: &Path) -> bool {
        access(path, AccessFlags::W_OK | AccessFlags::X_OK).is_ok()
    }
}

#[cfg(not(unix))]
mod access {
    use std::fs;
    use std::path::Path;

    pub fn readable(path: &Path) -> bool {
        fs::read_dir(path).is_ok()
    }

    pub fn writable(path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| !m.permissions().readonly())
    }
}
