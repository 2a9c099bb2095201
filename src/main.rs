//! Exif Editor - inspect and edit EXIF metadata from the command line.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::DateTime;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exif_editor::{
    config::{Cli, Command, DumpConfig, GetConfig, GpsConfig, SetConfig, ThumbnailConfig},
    format::tiff::coerce::display_value,
    AttributeValue, DirectoryGroup, ExifFile,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.command.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Dump(config) => run_dump(config),
        Command::Get(config) => run_get(config),
        Command::Set(config) => run_set(config),
        Command::Thumbnail(config) => run_thumbnail(config),
        Command::Gps(config) => run_gps(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "exif_editor=debug"
    } else {
        "exif_editor=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load a file, logging the failure.
fn load(path: &Path) -> Option<ExifFile> {
    match ExifFile::load(path) {
        Ok(file) => {
            if !file.is_supported() {
                warn!("No readable Exif data in {}", path.display());
            }
            Some(file)
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

// =============================================================================
// Dump Command
// =============================================================================

#[derive(Serialize)]
struct DumpReport {
    file: String,
    byte_order: &'static str,
    has_thumbnail: bool,
    groups: Vec<GroupReport>,
}

#[derive(Serialize)]
struct GroupReport {
    group: &'static str,
    entries: Vec<EntryReport>,
}

#[derive(Serialize)]
struct EntryReport {
    tag: &'static str,
    number: String,
    format: &'static str,
    count: usize,
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hex: Option<String>,
}

fn build_report(path: &Path, file: &ExifFile, groups: &[DirectoryGroup]) -> DumpReport {
    let store = file.store();
    let groups = groups
        .iter()
        .map(|&group| GroupReport {
            group: group.name(),
            entries: store
                .entries(group)
                .map(|(descriptor, value)| EntryReport {
                    tag: descriptor.name,
                    number: format!("0x{:04X}", descriptor.number),
                    format: value.field_type().name(),
                    count: value.component_count(),
                    value: display_value(descriptor.name, value),
                    hex: match value {
                        AttributeValue::Undefined(bytes) => Some(hex::encode(bytes)),
                        _ => None,
                    },
                })
                .collect(),
        })
        .collect();

    DumpReport {
        file: path.display().to_string(),
        byte_order: file.byte_order().name(),
        has_thumbnail: file.has_thumbnail(),
        groups,
    }
}

fn run_dump(config: DumpConfig) -> ExitCode {
    let Some(file) = load(&config.file) else {
        return ExitCode::FAILURE;
    };
    let report = build_report(&config.file, &file, &config.groups());

    if config.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("{} ({} byte order)", report.file, report.byte_order);
    for group in &report.groups {
        if group.entries.is_empty() {
            continue;
        }
        println!();
        println!("[{}]", group.group);
        for entry in &group.entries {
            println!(
                "  {:<28} {} {:>9}[{}] = {}",
                entry.tag,
                entry.number,
                entry.format,
                entry.count,
                entry.value.as_deref().unwrap_or("(unreadable)")
            );
        }
    }
    if report.has_thumbnail {
        println!();
        println!("Thumbnail: present");
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Get Command
// =============================================================================

fn run_get(config: GetConfig) -> ExitCode {
    let Some(file) = load(&config.file) else {
        return ExitCode::FAILURE;
    };

    let mut missing = 0usize;
    for tag in &config.tags {
        match file.attribute(tag) {
            Some(value) => println!("{}: {}", tag, value),
            None => {
                println!("{}: (not set)", tag);
                missing += 1;
            }
        }
    }
    debug!(requested = config.tags.len(), missing, "Lookup finished");

    if missing == config.tags.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// =============================================================================
// Set Command
// =============================================================================

fn run_set(config: SetConfig) -> ExitCode {
    let assignments = match config.parse_assignments() {
        Ok(assignments) => assignments,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(mut file) = load(&config.file) else {
        return ExitCode::FAILURE;
    };

    for (tag, value) in &assignments {
        match file.try_set_attribute(tag, Some(value.as_str())) {
            Ok(groups) => debug!(tag = %tag, groups, "Attribute set"),
            Err(e) => {
                error!("Cannot set {}: {}", tag, e);
                return ExitCode::FAILURE;
            }
        }
    }
    for tag in &config.remove {
        if file.remove_attribute(tag) == 0 {
            warn!("{} is not set, nothing to remove", tag);
        }
    }

    if let Err(e) = file.save_attributes() {
        error!("Failed to save {}: {}", config.file.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Updated {} ({} set, {} removed)",
        config.file.display(),
        assignments.len(),
        config.remove.len()
    );
    ExitCode::SUCCESS
}

// =============================================================================
// Thumbnail Command
// =============================================================================

fn run_thumbnail(config: ThumbnailConfig) -> ExitCode {
    let Some(file) = load(&config.file) else {
        return ExitCode::FAILURE;
    };

    let thumbnail = match file.thumbnail() {
        Ok(Some(thumbnail)) => thumbnail,
        Ok(None) => {
            eprintln!("{} has no embedded thumbnail", config.file.display());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("Failed to read thumbnail: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::write(&config.output, &thumbnail) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    println!(
        "Wrote {} bytes to {}",
        thumbnail.len(),
        config.output.display()
    );
    ExitCode::SUCCESS
}

// =============================================================================
// GPS Command
// =============================================================================

fn run_gps(config: GpsConfig) -> ExitCode {
    let Some(file) = load(&config.file) else {
        return ExitCode::FAILURE;
    };

    match file.lat_long() {
        Some((latitude, longitude)) => {
            println!("Latitude:  {:.6}", latitude);
            println!("Longitude: {:.6}", longitude);
        }
        None => println!("Position:  (not set)"),
    }

    let altitude = file.altitude(f64::NAN);
    if altitude.is_nan() {
        println!("Altitude:  (not set)");
    } else {
        println!("Altitude:  {} m", altitude);
    }

    match file
        .gps_date_time()
        .and_then(DateTime::from_timestamp_millis)
    {
        Some(timestamp) => println!("Time:      {}", timestamp.to_rfc3339()),
        None => println!("Time:      (not set)"),
    }

    ExitCode::SUCCESS
}
