use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use qbank_sync::{sync_question_banks, AppConfig, MergeReport, MirrorReport, SyncReport};
use std::env;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

const SOURCE_ENV: &str = "QUESTION_BANKS_SOURCE";
const DEST_ENV: &str = "QUESTION_BANKS_DEST";

fn main() -> Result<()> {
    let matches = Command::new("qbank-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publish question banks to the static site and build the merged bank")
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("DIR")
                .help("Question bank source directory [env: QUESTION_BANKS_SOURCE]"),
        )
        .arg(
            Arg::new("dest")
                .long("dest")
                .value_name("DIR")
                .help("Publishing directory, wiped on every run [env: QUESTION_BANKS_DEST]"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .help("Compare source and destination digests after syncing")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-merge")
                .long("skip-merge")
                .help("Only mirror files, do not write the merged bank")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // A missing .env is fine; report it once logging is up
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let config = create_app_config(&matches);

    initialize_logging(&config.log_level)?;

    if !dotenv_loaded {
        info!("No .env file found, using system environment variables");
    }

    run_application(config)
}

/// Resolve a directory setting: CLI flag, then environment, then default
fn resolve_dir(matches: &ArgMatches, arg: &str, var: &str, default: PathBuf) -> PathBuf {
    matches
        .get_one::<String>(arg)
        .cloned()
        .or_else(|| env::var(var).ok().filter(|value| !value.is_empty()))
        .map(PathBuf::from)
        .unwrap_or(default)
}

fn create_app_config(matches: &ArgMatches) -> AppConfig {
    let defaults = AppConfig::default();

    let source_dir = resolve_dir(matches, "source", SOURCE_ENV, defaults.mirror.source_dir);
    let destination_dir =
        resolve_dir(matches, "dest", DEST_ENV, defaults.mirror.destination_dir);

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or(defaults.log_level);

    AppConfig {
        log_level,
        verify: matches.get_flag("verify"),
        skip_merge: matches.get_flag("skip-merge"),
        ..AppConfig::for_paths(source_dir, destination_dir)
    }
}

/// Initialize structured logging with tracing
fn initialize_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("walkdir=warn".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

fn run_application(config: AppConfig) -> Result<()> {
    info!("Starting question bank sync");
    info!("Configuration: {:#?}", config);

    let report = match sync_question_banks(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("Sync failed: {:#}", e);
            return Err(e);
        }
    };

    print_mirror_report(&report.mirror);
    if let Some(merge) = &report.merge {
        print_merge_report(merge);
    }
    print_final_summary(&report);

    Ok(())
}

fn print_mirror_report(report: &MirrorReport) {
    info!("=== MIRROR REPORT ===");
    info!("Entries removed: {}", report.removed_entries);
    info!("Directories created: {}", report.directories_created);
    info!("Files copied: {}", report.copied_files.len());
    info!("Bytes copied: {}", report.total_bytes());
    info!("Files ignored: {}", report.ignored_files);
}

fn print_merge_report(report: &MergeReport) {
    info!("=== MERGE REPORT ===");
    for bank in &report.merged_banks {
        info!("  {}: {} questions", bank.file_name, bank.question_count);
    }
    if !report.skipped_banks.is_empty() {
        error!("Skipped banks:");
        for bank in &report.skipped_banks {
            error!("  {}: {}", bank.file_name, bank.reason);
        }
    }
}

fn print_final_summary(report: &SyncReport) {
    if let Some(verify) = &report.verify {
        info!("Verified {} files against source", verify.files_checked);
    }

    match &report.merge {
        Some(merge) => println!(
            "Synced {} files and merged {} questions into {}",
            report.mirror.copied_files.len(),
            merge.total_questions,
            merge.output_path.display()
        ),
        None => println!("Synced {} files", report.mirror.copied_files.len()),
    }
}
