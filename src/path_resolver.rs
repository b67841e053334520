/// Destination path resolution.
///
/// Turns a classified file into the path it should be moved to, probing
/// `<stem>_1<ext>`, `<stem>_2<ext>`, ... when the natural name is taken.
use crate::file_category::Category;
use chrono::NaiveDate;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A file whose natural destination was taken and had to be renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Where the file currently lives.
    pub source: PathBuf,
    /// The suffixed path it will be moved to.
    pub target: PathBuf,
}

/// Outcome of resolving one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The collision-free destination.
    pub target: PathBuf,
    /// Set when the natural destination was occupied.
    pub conflict: Option<Conflict>,
}

/// Returns the name of the archive folder for a given day, e.g. `archive_20240131`.
pub fn archive_dir_name(today: NaiveDate) -> String {
    format!("archive_{}", today.format("%Y%m%d"))
}

/// Computes destinations under one target root for one organize run.
///
/// The archive folder is fixed when the resolver is created, so every old
/// file of a run lands in the same `archive_<date>` folder.
#[derive(Debug, Clone)]
pub struct PathResolver {
    target_root: PathBuf,
    archive_dir: String,
}

impl PathResolver {
    pub fn new(target_root: impl Into<PathBuf>, today: NaiveDate) -> Self {
        Self {
            target_root: target_root.into(),
            archive_dir: archive_dir_name(today),
        }
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Name of the archive folder old files are routed to in this run.
    pub fn archive_dir(&self) -> &str {
        &self.archive_dir
    }

    /// Directory a file of this category and age belongs in.
    pub fn base_dir(&self, category: Category, is_old: bool) -> PathBuf {
        if is_old {
            self.target_root
                .join(&self.archive_dir)
                .join(category.dir_name())
        } else {
            self.target_root.join(category.dir_name())
        }
    }

    /// Destination the file would get if nothing were in the way.
    ///
    /// Returns `None` for paths without a file name component.
    pub fn natural_target(&self, source: &Path, category: Category, is_old: bool) -> Option<PathBuf> {
        source
            .file_name()
            .map(|name| self.base_dir(category, is_old).join(name))
    }

    /// Resolves a destination, treating paths on disk as taken.
    pub fn resolve(&self, source: &Path, category: Category, is_old: bool) -> Option<Resolution> {
        self.resolve_with(source, category, is_old, |_| false)
    }

    /// Resolves a destination, treating paths on disk and any path for which
    /// `reserved` returns true as taken.
    ///
    /// `reserved` lets a plan account for destinations it has already handed
    /// out but not yet moved anything into.
    pub fn resolve_with<F>(
        &self,
        source: &Path,
        category: Category,
        is_old: bool,
        reserved: F,
    ) -> Option<Resolution>
    where
        F: Fn(&Path) -> bool,
    {
        let candidate = self.natural_target(source, category, is_old)?;
        let is_taken = |path: &Path| path.exists() || reserved(path);

        if !is_taken(&candidate) {
            return Some(Resolution {
                target: candidate,
                conflict: None,
            });
        }

        let base = self.base_dir(category, is_old);
        let stem = source.file_stem().unwrap_or_default();
        let ext = source.extension();

        let mut counter: u64 = 1;
        let target = loop {
            let mut name = OsString::from(stem);
            name.push(format!("_{counter}"));
            if let Some(ext) = ext {
                name.push(".");
                name.push(ext);
            }
            let probe = base.join(name);
            if !is_taken(&probe) {
                break probe;
            }
            counter += 1;
        };

        tracing::debug!(source = %source.display(), target = %target.display(), "destination taken, renaming");

        Some(Resolution {
            conflict: Some(Conflict {
                source: source.to_path_buf(),
                target: target.clone(),
            }),
            target,
        })
    }
}

/// Resolves the destination of a single file against what is on disk.
///
/// Returns `None` when `source` has no file name.
pub fn resolve_target(
    source: &Path,
    category: Category,
    is_old: bool,
    target_root: &Path,
    today: NaiveDate,
) -> Option<(PathBuf, Option<Conflict>)> {
    PathResolver::new(target_root, today)
        .resolve(source, category, is_old)
        .map(|r| (r.target, r.conflict))
}
