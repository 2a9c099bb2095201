//! Command-line configuration for the `exif-editor` binary.
//!
//! Each subcommand has its own config struct with a `validate()` method
//! that is called before any file is opened.
//!
//! # Example
//!
//! ```ignore
//! use exif_editor::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Get(config) => println!("{:?}", config.tags),
//!     _ => {}
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `EXIF_VERBOSE` - Enable debug logging (default: false)

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::format::tiff::DirectoryGroup;

/// Separator between tag name and value in `set` assignments.
pub const ASSIGNMENT_SEPARATOR: char = '=';

// =============================================================================
// CLI Arguments
// =============================================================================

/// Exif Editor - Read and edit EXIF metadata of JPEG files.
///
/// Rewrites only the Exif segment; the compressed image data is never
/// re-encoded.
#[derive(Parser, Debug, Clone)]
#[command(name = "exif-editor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false, env = "EXIF_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List every attribute, grouped by directory.
    Dump(DumpConfig),

    /// Print the value of one or more tags.
    Get(GetConfig),

    /// Set or remove tags and save the file in place.
    Set(SetConfig),

    /// Extract the embedded thumbnail.
    Thumbnail(ThumbnailConfig),

    /// Print GPS position, altitude and timestamp.
    Gps(GpsConfig),
}

impl Command {
    /// Validate the selected subcommand's configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Command::Dump(config) => config.validate(),
            Command::Get(config) => config.validate(),
            Command::Set(config) => config.validate(),
            Command::Thumbnail(config) => config.validate(),
            Command::Gps(config) => config.validate(),
        }
    }
}

/// Directory group selector for `dump --group`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFilter {
    Primary,
    Exif,
    Gps,
    Interop,
    Thumbnail,
}

impl From<GroupFilter> for DirectoryGroup {
    fn from(filter: GroupFilter) -> Self {
        match filter {
            GroupFilter::Primary => DirectoryGroup::Primary,
            GroupFilter::Exif => DirectoryGroup::Exif,
            GroupFilter::Gps => DirectoryGroup::Gps,
            GroupFilter::Interop => DirectoryGroup::Interop,
            GroupFilter::Thumbnail => DirectoryGroup::Thumbnail,
        }
    }
}

fn require_file(file: &Path) -> Result<(), String> {
    if file.as_os_str().is_empty() {
        return Err("An input file is required".to_string());
    }
    Ok(())
}

// =============================================================================
// Dump
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct DumpConfig {
    /// JPEG file to read.
    pub file: PathBuf,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Only list this directory group.
    #[arg(long, value_enum)]
    pub group: Option<GroupFilter>,
}

impl DumpConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.file)
    }

    /// Groups to list, in directory order.
    pub fn groups(&self) -> Vec<DirectoryGroup> {
        match self.group {
            Some(filter) => vec![filter.into()],
            None => DirectoryGroup::ALL.to_vec(),
        }
    }
}

// =============================================================================
// Get
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct GetConfig {
    /// JPEG file to read.
    pub file: PathBuf,

    /// Tag names, e.g. `Model` or `GPSLatitude`.
    #[arg(required = true)]
    pub tags: Vec<String>,
}

impl GetConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.file)?;
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err("Tag names must not be empty".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Set
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct SetConfig {
    /// JPEG file to modify in place.
    pub file: PathBuf,

    /// Assignments in `TAG=VALUE` form.
    #[arg(value_name = "TAG=VALUE")]
    pub assignments: Vec<String>,

    /// Tags to remove from every directory.
    #[arg(long = "remove", value_name = "TAG")]
    pub remove: Vec<String>,
}

impl SetConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.file)?;
        if self.assignments.is_empty() && self.remove.is_empty() {
            return Err("Nothing to do: pass TAG=VALUE assignments or --remove TAG".to_string());
        }
        self.parse_assignments()?;
        Ok(())
    }

    /// Split assignments into `(tag, value)` pairs.
    ///
    /// Only the first `=` separates; the value may contain more.
    pub fn parse_assignments(&self) -> Result<Vec<(String, String)>, String> {
        self.assignments
            .iter()
            .map(|assignment| {
                let (tag, value) = assignment
                    .split_once(ASSIGNMENT_SEPARATOR)
                    .ok_or_else(|| format!("Invalid assignment '{}': expected TAG=VALUE", assignment))?;
                let tag = tag.trim();
                if tag.is_empty() {
                    return Err(format!("Invalid assignment '{}': empty tag name", assignment));
                }
                Ok((tag.to_string(), value.to_string()))
            })
            .collect()
    }
}

// =============================================================================
// Thumbnail
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ThumbnailConfig {
    /// JPEG file to read.
    pub file: PathBuf,

    /// Where to write the thumbnail.
    #[arg(short, long)]
    pub output: PathBuf,
}

impl ThumbnailConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.file)?;
        if self.output.as_os_str().is_empty() {
            return Err("An output path is required".to_string());
        }
        if self.output == self.file {
            return Err("Output path must differ from the input file".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// GPS
// =============================================================================

#[derive(Parser, Debug, Clone)]
pub struct GpsConfig {
    /// JPEG file to read.
    pub file: PathBuf,
}

impl GpsConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.file)
    }
}

// =============================================================================
// Tests
// =============================================================================
