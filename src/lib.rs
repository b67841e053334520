//! tidydir - sort a directory's files into category folders
//!
//! Files are classified by extension, files untouched for longer than a
//! threshold go to a dated archive folder, and name collisions get a numeric
//! suffix instead of overwriting anything. A run is always planned first, so
//! the plan can be previewed before any file moves.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod file_category;
pub mod file_organizer;
pub mod log_sink;
pub mod output;
pub mod path_resolver;
pub mod plan;

pub use classifier::Classifier;
pub use config::{CompiledFilters, ConfigError, TidyConfig};
pub use error::{FsErrorKind, OrganizeError};
pub use executor::{MoveFailure, OrganizeResult, apply_plan};
pub use file_category::{Category, ExtensionTable};
pub use file_organizer::{FileOrganizer, OrganizerOptions};
pub use log_sink::{FileLogSink, LogSink};
pub use path_resolver::{Conflict, PathResolver, resolve_target};
pub use plan::{FileOperation, Plan, PlanBuilder, build_plan};
