/// Per-file classification: which category a file belongs to and whether it
/// is old enough to be archived.
use crate::file_category::{Category, ExtensionTable};
use chrono::{DateTime, Duration, Local};
use std::fs;
use std::path::Path;

/// Classifies files by extension and modification time.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: ExtensionTable,
}

impl Classifier {
    /// Creates a classifier backed by the given extension table.
    pub fn new(table: ExtensionTable) -> Self {
        Self { table }
    }

    /// Returns the extension table this classifier looks up.
    pub fn table(&self) -> &ExtensionTable {
        &self.table
    }

    /// Determines the category of a file from its extension.
    ///
    /// Only the final extension is considered, so `backup.tar.gz` is looked
    /// up as `.gz`. Files without an extension fall into `Category::Files`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidydir::classifier::Classifier;
    /// use tidydir::file_category::Category;
    /// use std::path::Path;
    ///
    /// let classifier = Classifier::default();
    /// assert_eq!(classifier.category_of(Path::new("photo.JPG")), Category::Images);
    /// assert_eq!(classifier.category_of(Path::new("Makefile")), Category::Files);
    /// ```
    pub fn category_of(&self, path: &Path) -> Category {
        match path.extension() {
            Some(ext) => self
                .table
                .lookup(&format!(".{}", ext.to_string_lossy().to_lowercase())),
            None => Category::Files,
        }
    }

    /// Checks whether a file was last modified strictly before `cutoff`.
    ///
    /// Unreadable metadata (permissions, a file deleted mid-scan) counts as
    /// not old so the file is sorted normally instead of archived.
    pub fn is_old(&self, path: &Path, cutoff: DateTime<Local>) -> bool {
        match modified_time(path) {
            Ok(mtime) => mtime < cutoff,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read modification time, treating file as recent");
                false
            }
        }
    }
}

/// Largest accepted age threshold, roughly 270 years.
pub const MAX_OLD_FILES_DAYS: u32 = 100_000;

/// Computes the cutoff instant for a threshold in days, counted back from `now`.
///
/// Thresholds above [`MAX_OLD_FILES_DAYS`] are clamped to it.
pub fn cutoff_for(now: DateTime<Local>, old_files_days: u32) -> DateTime<Local> {
    now - Duration::days(i64::from(old_files_days.min(MAX_OLD_FILES_DAYS)))
}

fn modified_time(path: &Path) -> std::io::Result<DateTime<Local>> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn touch(path: &Path, modified: SystemTime) {
        let file = File::create(path).expect("Failed to create file");
        file.set_modified(modified)
            .expect("Failed to set modification time");
    }

    #[test]
    fn test_category_of_known_extensions() {
        let classifier = Classifier::default();
        assert_eq!(classifier.category_of(Path::new("test.jpg")), Category::Images);
        assert_eq!(classifier.category_of(Path::new("test.pdf")), Category::Documents);
        assert_eq!(classifier.category_of(Path::new("test.mp3")), Category::Audio);
        assert_eq!(classifier.category_of(Path::new("test.unknown")), Category::Files);
    }

    #[test]
    fn test_category_of_is_case_insensitive() {
        let classifier = Classifier::default();
        let lower = classifier.category_of(Path::new("test.jpg"));
        assert_eq!(classifier.category_of(Path::new("test.JPG")), lower);
        assert_eq!(classifier.category_of(Path::new("test.Jpg")), lower);
        assert_eq!(classifier.category_of(Path::new("test.PDF")), Category::Documents);
    }

    #[test]
    fn test_category_of_is_stable() {
        let classifier = Classifier::default();
        let path = Path::new("dir/notes.md");
        assert_eq!(classifier.category_of(path), classifier.category_of(path));
    }

    #[test]
    fn test_category_of_uses_last_extension_only() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.category_of(Path::new("backup.tar.gz")),
            Category::Archives
        );
        assert_eq!(
            classifier.category_of(Path::new("report.pdf.unknown")),
            Category::Files
        );
    }

    #[test]
    fn test_category_of_without_extension() {
        let classifier = Classifier::default();
        assert_eq!(classifier.category_of(Path::new("README")), Category::Files);
        assert_eq!(classifier.category_of(Path::new(".bashrc")), Category::Files);
    }

    #[test]
    fn test_is_old_before_and_after_cutoff() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::default();
        let now = Local::now();
        let cutoff = cutoff_for(now, 365);

        let old_file = temp_dir.path().join("old.txt");
        touch(&old_file, (now - Duration::days(400)).into());
        let new_file = temp_dir.path().join("new.txt");
        touch(&new_file, (now - Duration::days(10)).into());

        assert!(classifier.is_old(&old_file, cutoff));
        assert!(!classifier.is_old(&new_file, cutoff));
    }

    #[test]
    fn test_is_old_exactly_at_cutoff_is_not_old() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::default();
        let file = temp_dir.path().join("edge.txt");
        touch(&file, (Local::now() - Duration::days(30)).into());

        let mtime = modified_time(&file).expect("Failed to read mtime");
        assert!(!classifier.is_old(&file, mtime));
        assert!(classifier.is_old(&file, mtime + Duration::seconds(1)));
    }

    #[test]
    fn test_is_old_missing_file_is_not_old() {
        let classifier = Classifier::default();
        let cutoff = Local::now() + Duration::days(1);
        assert!(!classifier.is_old(Path::new("/non/existent/file.txt"), cutoff));
    }

    #[test]
    fn test_cutoff_for_threshold() {
        let now = Local::now();
        assert_eq!(cutoff_for(now, 0), now);
        assert_eq!(now - cutoff_for(now, 365), Duration::days(365));
        assert_eq!(
            now - cutoff_for(now, u32::MAX),
            Duration::days(i64::from(MAX_OLD_FILES_DAYS))
        );
    }
}
