//! Command-line interface module for tidydir.
//!
//! This module handles argument parsing, merging flags with the configuration
//! file, and driving an organize run: permission check, preview, confirmation
//! and execution.

use crate::classifier::MAX_OLD_FILES_DAYS;
use crate::config::{ConfigError, TidyConfig};
use crate::file_organizer::{FileOrganizer, OrganizerOptions};
use crate::output::OutputFormatter;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Exit code for a run that finished, was cancelled or had nothing to do.
pub const EXIT_OK: i32 = 0;
/// Exit code for a run that failed or left files unmoved.
pub const EXIT_FAILURE: i32 = 1;

/// Organize files into categories based on their type.
#[derive(Parser, Debug, Clone)]
#[command(name = "tidydir", version)]
#[command(about = "Organize files into categories based on their type")]
#[command(after_help = "Example: tidydir ~/Downloads --preview --subdirs")]
pub struct Args {
    /// Source directory to organize
    pub source: PathBuf,

    /// Target directory (default: source directory)
    #[arg(short, long, visible_alias = "target-dir")]
    pub target: Option<PathBuf>,

    /// Include subdirectories
    #[arg(short, long, visible_alias = "include-subdirs")]
    pub subdirs: bool,

    /// Days threshold for old files [default: 365]
    #[arg(
        short,
        long,
        visible_alias = "old-files-days",
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_OLD_FILES_DAYS))
    )]
    pub days: Option<u32>,

    /// Preview only, don't move files
    #[arg(short, long)]
    pub preview: bool,

    /// Enable logging to file
    #[arg(short, long, visible_alias = "enable-logging")]
    pub log: bool,

    /// Path to a configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show diagnostic output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds organizer options from these flags on top of `config`.
    ///
    /// Flags win over the configuration file's `[defaults]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured filters do not compile.
    pub fn organizer_options(&self, config: &TidyConfig) -> Result<OrganizerOptions, ConfigError> {
        Ok(OrganizerOptions {
            source_dir: self.source.clone(),
            target_dir: self.target.clone(),
            include_subdirs: self.subdirs || config.defaults.include_subdirs,
            old_files_days: self.days.unwrap_or(config.defaults.old_files_days),
            enable_logging: self.log || config.defaults.enable_logging,
            filters: config.filters.compile()?,
        })
    }
}

/// Asks a yes/no question until it gets an answer.
///
/// Accepts `yes`, `y`, `no` and `n` in any case. End of input counts as no.
///
/// # Examples
///
/// ```
/// use tidydir::cli::confirm_action;
///
/// let mut input = "maybe\nY\n".as_bytes();
/// let mut output = Vec::new();
/// assert!(confirm_action("Proceed? (yes/no): ", &mut input, &mut output).unwrap());
/// ```
pub fn confirm_action<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut response = String::new();
        if input.read_line(&mut response)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        match response.trim().to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(output, "Please answer 'yes' or 'no'")?,
        }
    }
}

/// Runs the command line program, reading the confirmation from stdin.
///
/// Returns the process exit code.
pub fn run(args: &Args) -> i32 {
    let stdin = io::stdin();
    run_with_input(args, &mut stdin.lock())
}

/// Runs the command line program, reading the confirmation from `input`.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use tidydir::cli::{Args, run_with_input};
///
/// let args = Args::parse_from(["tidydir", "/home/user/Downloads"]);
/// let code = run_with_input(&args, &mut "yes\n".as_bytes());
/// std::process::exit(code);
/// ```
pub fn run_with_input<R: BufRead>(args: &Args, input: &mut R) -> i32 {
    let config = match TidyConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return EXIT_FAILURE;
        }
    };

    let options = match args.organizer_options(&config) {
        Ok(options) => options,
        Err(e) => {
            OutputFormatter::error(&format!("Error compiling filters: {}", e));
            return EXIT_FAILURE;
        }
    };
    let old_files_days = options.old_files_days;

    let mut organizer = match FileOrganizer::new(options) {
        Ok(organizer) => organizer,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            return EXIT_FAILURE;
        }
    };

    let code = organize(&mut organizer, args.preview, old_files_days, input);
    organizer.close_logging();
    code
}

fn organize<R: BufRead>(
    organizer: &mut FileOrganizer,
    preview_only: bool,
    old_files_days: u32,
    input: &mut R,
) -> i32 {
    let issues = organizer.check_permissions();
    if !issues.is_empty() {
        OutputFormatter::error("Permission issues detected:");
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        return EXIT_FAILURE;
    }

    OutputFormatter::info(&format!(
        "Organizing contents of: {}",
        organizer.source_dir().display()
    ));

    let plan = organizer.preview();
    OutputFormatter::print_preview(&plan, organizer.target_dir(), old_files_days);

    if plan.is_empty() {
        return EXIT_OK;
    }

    if preview_only {
        OutputFormatter::plain("\n(Preview mode - no files were moved)");
        return EXIT_OK;
    }

    let stdout = io::stdout();
    let confirmed = confirm_action(
        "\nProceed with organization? (yes/no): ",
        input,
        &mut stdout.lock(),
    );
    match confirmed {
        Ok(true) => {}
        Ok(false) => {
            OutputFormatter::plain("Operation cancelled");
            return EXIT_OK;
        }
        Err(e) => {
            OutputFormatter::error(&format!("Error reading confirmation: {}", e));
            return EXIT_FAILURE;
        }
    }

    OutputFormatter::info(&format!("\nMoving {} files...", plan.len()));
    let pb = OutputFormatter::create_progress_bar(plan.len() as u64);
    let result = organizer.execute_with_progress(|done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    OutputFormatter::print_result(&result);
    if let Some(path) = organizer.log_path() {
        OutputFormatter::plain(&format!("Log written to {}", path.display()));
    }

    if result.is_complete_success() {
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}
