//! Organize plans.
//!
//! A [`Plan`] lists every move one organize run would make, grouped by
//! destination directory. Building a plan only reads the filesystem; nothing
//! is created or moved until the plan is handed to the executor.

use crate::classifier::Classifier;
use crate::config::CompiledFilters;
use crate::error::FsErrorKind;
use crate::file_category::Category;
use crate::path_resolver::{Conflict, PathResolver};
use chrono::{DateTime, Local, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single pending move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperation {
    pub source: PathBuf,
    pub target: PathBuf,
    pub category: Category,
    pub is_old: bool,
}

/// A directory or entry that could not be read while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryError {
    pub path: PathBuf,
    pub kind: FsErrorKind,
    pub message: String,
}

impl DiscoveryError {
    fn new(path: &Path, error: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: FsErrorKind::of(error),
            message: error.to_string(),
        }
    }
}

/// Moves grouped by destination directory.
///
/// Groups keep the order in which their first file was discovered, and
/// files keep discovery order within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    groups: Vec<(PathBuf, Vec<FileOperation>)>,
    conflicts: Vec<Conflict>,
    discovery_errors: Vec<DiscoveryError>,
    archive_dir: String,
}

impl Plan {
    fn push(&mut self, index: &mut HashMap<PathBuf, usize>, operation: FileOperation) {
        let parent = operation
            .target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        match index.get(&parent) {
            Some(&i) => self.groups[i].1.push(operation),
            None => {
                index.insert(parent.clone(), self.groups.len());
                self.groups.push((parent, vec![operation]));
            }
        }
    }

    /// Name of the archive folder old files are routed to, e.g. `archive_20240309`.
    ///
    /// Fixed when the plan is built. Empty for a default plan.
    pub fn archive_dir(&self) -> &str {
        &self.archive_dir
    }

    /// Destination directories with the moves headed into each.
    pub fn groups(&self) -> impl Iterator<Item = (&Path, &[FileOperation])> {
        self.groups
            .iter()
            .map(|(dir, ops)| (dir.as_path(), ops.as_slice()))
    }

    /// Every move, in plan order.
    pub fn operations(&self) -> impl Iterator<Item = &FileOperation> {
        self.groups.iter().flat_map(|(_, ops)| ops.iter())
    }

    /// Destination directories the executor has to create.
    pub fn target_dirs(&self) -> impl Iterator<Item = &Path> {
        self.groups.iter().map(|(dir, _)| dir.as_path())
    }

    /// Total number of files in the plan.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, ops)| ops.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Files whose natural destination was taken, with their renamed target.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Parts of the source tree that could not be scanned.
    pub fn discovery_errors(&self) -> &[DiscoveryError] {
        &self.discovery_errors
    }

    /// Number of files routed to the archive folder.
    pub fn old_count(&self) -> usize {
        self.operations().filter(|op| op.is_old).count()
    }

    /// Number of files per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for op in self.operations() {
            *counts.entry(op.category).or_insert(0) += 1;
        }
        counts
    }
}

/// Scans a source directory and builds a [`Plan`].
///
/// # Examples
///
/// ```no_run
/// use tidydir::classifier::{cutoff_for, Classifier};
/// use tidydir::plan::PlanBuilder;
/// use chrono::Local;
/// use std::path::Path;
///
/// let classifier = Classifier::default();
/// let now = Local::now();
/// let plan = PlanBuilder::new(&classifier).build(
///     Path::new("/home/user/Downloads"),
///     false,
///     cutoff_for(now, 365),
///     Path::new("/home/user/Downloads"),
///     now.date_naive(),
/// );
/// println!("{} files to organize", plan.len());
/// ```
#[derive(Debug, Clone)]
pub struct PlanBuilder<'a> {
    classifier: &'a Classifier,
    filters: Option<&'a CompiledFilters>,
    skip: Vec<PathBuf>,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            filters: None,
            skip: Vec::new(),
        }
    }

    /// Only plan files the filters accept.
    pub fn with_filters(mut self, filters: &'a CompiledFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Never plan this exact path (used for the run's own log file).
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip.push(path.into());
        self
    }

    /// Builds a plan.
    ///
    /// Files already sitting at their natural destination are left out. A
    /// source that cannot be listed yields an empty plan with the failure
    /// recorded in [`Plan::discovery_errors`].
    pub fn build(
        &self,
        source_root: &Path,
        include_subdirs: bool,
        cutoff: DateTime<Local>,
        target_root: &Path,
        today: NaiveDate,
    ) -> Plan {
        let mut plan = Plan::default();
        let files = self.discover(source_root, include_subdirs, &mut plan.discovery_errors);

        let resolver = PathResolver::new(target_root, today);
        plan.archive_dir = resolver.archive_dir().to_string();
        let mut reserved: HashSet<PathBuf> = HashSet::new();
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for source in files {
            let category = self.classifier.category_of(&source);
            let is_old = self.classifier.is_old(&source, cutoff);

            if resolver
                .natural_target(&source, category, is_old)
                .is_some_and(|natural| natural == source)
            {
                tracing::debug!(path = %source.display(), "already in place");
                continue;
            }

            let Some(resolution) =
                resolver.resolve_with(&source, category, is_old, |p| reserved.contains(p))
            else {
                continue;
            };

            if let Some(conflict) = resolution.conflict {
                plan.conflicts.push(conflict);
            }
            reserved.insert(resolution.target.clone());

            tracing::debug!(
                source = %source.display(),
                target = %resolution.target.display(),
                category = %category,
                is_old,
                "planned move"
            );

            plan.push(
                &mut index,
                FileOperation {
                    source,
                    target: resolution.target,
                    category,
                    is_old,
                },
            );
        }

        plan
    }

    fn discover(
        &self,
        source_root: &Path,
        include_subdirs: bool,
        errors: &mut Vec<DiscoveryError>,
    ) -> Vec<PathBuf> {
        let found = if include_subdirs {
            walk_files(source_root, errors)
        } else {
            list_files(source_root, errors)
        };

        found
            .into_iter()
            .filter(|path| !self.skip.contains(path))
            .filter(|path| match self.filters {
                Some(filters) => {
                    let relative = path.strip_prefix(source_root).unwrap_or(path);
                    filters.should_include(relative)
                }
                None => true,
            })
            .collect()
    }
}

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path, errors: &mut Vec<DiscoveryError>) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "cannot list directory");
            errors.push(DiscoveryError::new(dir, &e));
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                if let Ok(file_type) = entry.file_type()
                    && file_type.is_file()
                {
                    files.push(entry.path());
                }
            }
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "cannot read directory entry");
                errors.push(DiscoveryError::new(dir, &e));
            }
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// Regular files anywhere below `root`, depth-first with siblings sorted by
/// name. Symlinks are not followed; unreadable subtrees are skipped.
fn walk_files(root: &Path, errors: &mut Vec<DiscoveryError>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let io_error = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                tracing::warn!(path = %path.display(), error = %io_error, "cannot scan directory");
                errors.push(DiscoveryError::new(&path, &io_error));
            }
        }
    }
    files
}

/// Builds a plan with the built-in extension table, no filters, and today's date.
pub fn build_plan(
    source_root: &Path,
    include_subdirs: bool,
    cutoff: DateTime<Local>,
    target_root: &Path,
) -> Plan {
    let classifier = Classifier::default();
    PlanBuilder::new(&classifier).build(
        source_root,
        include_subdirs,
        cutoff,
        target_root,
        Local::now().date_naive(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::cutoff_for;
    use chrono::Duration;
    use std::fs::File;
    use tempfile::TempDir;

    fn write(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(path, "content").expect("Failed to write file");
    }

    fn age(path: &Path, days: i64) {
        let file = File::options()
            .write(true)
            .open(path)
            .expect("Failed to open file");
        file.set_modified((Local::now() - Duration::days(days)).into())
            .expect("Failed to set modification time");
    }

    fn build(root: &Path, include_subdirs: bool) -> Plan {
        let classifier = Classifier::default();
        let now = Local::now();
        PlanBuilder::new(&classifier).build(
            root,
            include_subdirs,
            cutoff_for(now, 365),
            root,
            now.date_naive(),
        )
    }

    #[test]
    fn test_plan_groups_by_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("a.jpg"));
        write(&root.join("b.pdf"));
        write(&root.join("c.jpg"));

        let plan = build(root, false);

        assert_eq!(plan.len(), 3);
        let groups: Vec<_> = plan.groups().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, root.join("Images"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].source, root.join("a.jpg"));
        assert_eq!(groups[0].1[1].source, root.join("c.jpg"));
        assert_eq!(groups[1].0, root.join("Documents"));
        assert!(plan.conflicts().is_empty());
    }

    #[test]
    fn test_plan_does_not_touch_filesystem() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("a.jpg"));

        let first = build(root, false);
        let second = build(root, false);

        assert_eq!(first, second);
        assert!(root.join("a.jpg").exists());
        assert!(!root.join("Images").exists());
    }

    #[test]
    fn test_plan_non_recursive_ignores_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("top.txt"));
        write(&root.join("sub").join("nested.txt"));

        assert_eq!(build(root, false).len(), 1);
        assert_eq!(build(root, true).len(), 2);
    }

    #[test]
    fn test_plan_intra_plan_collision_gets_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("photo.jpg"));
        write(&root.join("sub").join("photo.jpg"));

        let plan = build(root, true);
        let targets: Vec<_> = plan.operations().map(|op| op.target.clone()).collect();

        assert_eq!(
            targets,
            vec![
                root.join("Images").join("photo.jpg"),
                root.join("Images").join("photo_1.jpg"),
            ]
        );
        assert_eq!(plan.conflicts().len(), 1);
        assert_eq!(plan.conflicts()[0].source, root.join("sub").join("photo.jpg"));
    }

    #[test]
    fn test_plan_conflict_with_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("Images").join("test.jpg"));
        write(&root.join("test.jpg"));

        let plan = build(root, false);
        let op = plan.operations().next().expect("one operation");

        assert_eq!(op.target, root.join("Images").join("test_1.jpg"));
        assert_eq!(plan.conflicts().len(), 1);
    }

    #[test]
    fn test_plan_routes_old_files_to_archive() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("report.pdf"));
        age(&root.join("report.pdf"), 400);
        write(&root.join("fresh.pdf"));

        let plan = build(root, false);
        let archive = format!("archive_{}", Local::now().format("%Y%m%d"));

        let report = plan
            .operations()
            .find(|op| op.source.ends_with("report.pdf"))
            .expect("report planned");
        assert!(report.is_old);
        assert_eq!(
            report.target,
            root.join(&archive).join("Documents").join("report.pdf")
        );
        assert_eq!(plan.old_count(), 1);
        assert_eq!(plan.archive_dir(), archive);
    }

    #[test]
    fn test_plan_keeps_its_build_date() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("report.pdf"));
        age(&root.join("report.pdf"), 400);

        let classifier = Classifier::default();
        let day = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let plan = PlanBuilder::new(&classifier).build(
            root,
            false,
            cutoff_for(Local::now(), 365),
            root,
            day,
        );

        assert_eq!(plan.archive_dir(), "archive_20231231");
        let op = plan.operations().next().expect("report planned");
        assert!(op.target.starts_with(root.join(plan.archive_dir())));
        assert_eq!(Plan::default().archive_dir(), "");
    }

    #[test]
    fn test_plan_skips_files_already_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("Images").join("photo.jpg"));
        write(&root.join("new.jpg"));

        let plan = build(root, true);

        assert_eq!(plan.len(), 1);
        assert!(plan.conflicts().is_empty());
    }

    #[test]
    fn test_plan_unreadable_source_is_empty_with_error() {
        let plan = build(Path::new("/non/existent/source"), false);
        assert!(plan.is_empty());
        assert_eq!(plan.discovery_errors().len(), 1);
        assert_eq!(plan.discovery_errors()[0].kind, FsErrorKind::NotFound);

        let plan = build(Path::new("/non/existent/source"), true);
        assert!(plan.is_empty());
        assert_eq!(plan.discovery_errors().len(), 1);
    }

    #[test]
    fn test_plan_applies_filters_and_skip_list() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("keep.jpg"));
        write(&root.join("drop.part"));
        write(&root.join("tidydir_run.log"));

        let filters = crate::config::FilterRules {
            exclude: crate::config::ExcludeRules {
                extensions: vec!["part".to_string()],
                ..Default::default()
            },
            ..Default::default()
        }
        .compile()
        .unwrap();

        let classifier = Classifier::default();
        let now = Local::now();
        let plan = PlanBuilder::new(&classifier)
            .with_filters(&filters)
            .skip_path(root.join("tidydir_run.log"))
            .build(root, false, cutoff_for(now, 365), root, now.date_naive());

        let sources: Vec<_> = plan.operations().map(|op| op.source.clone()).collect();
        assert_eq!(sources, vec![root.join("keep.jpg")]);
    }

    #[test]
    fn test_plan_category_counts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        write(&root.join("a.jpg"));
        write(&root.join("b.png"));
        write(&root.join("c.mp3"));
        write(&root.join("d"));

        let counts = build(root, false).category_counts();
        assert_eq!(counts.get(&Category::Images), Some(&2));
        assert_eq!(counts.get(&Category::Audio), Some(&1));
        assert_eq!(counts.get(&Category::Files), Some(&1));
    }

    #[test]
    fn test_build_plan_with_separate_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("in");
        let target = temp_dir.path().join("out");
        write(&source.join("song.mp3"));

        let plan = build_plan(&source, false, cutoff_for(Local::now(), 365), &target);
        let op = plan.operations().next().expect("one operation");
        assert_eq!(op.target, target.join("Audio").join("song.mp3"));
    }
}
