//! Preview configuration

use std::path::{Path, PathBuf};
use chrono::Local;
use clap::ValueEnum;
use tracing::info;
use crate::automation::native::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::error::{Error, Result};
use crate::fonts::FontFilter;

/// Text rendered in every font under test
pub const DEFAULT_SAMPLE_TEXT: &str = concat!(
    "abcdefghijklmnopqrstuvwxyz  12345 ABCDEFGHIJKLMNOPQRSTUVWXYZ  67890 ",
    "{}[]()<>$*-+=/#_%^@\\&|~?'\"`!,.;: ",
    "the quick brown fox jumps over the lazy dog THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG ",
    "float Fox.quick(h){ is_brown && it_jumps_over(doges.lazy) } ",
    "!= := -> => || == !== && www *** 0xFF /* <!-- >=<= </> #! i++ 9:0 /* /// |>",
);

/// File name used when no output path is given
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "Installed_Fonts_Preview.docx";

/// Typeface used for every heading
pub const DEFAULT_HEADING_FONT: &str = "Calibri";

/// What to do when the output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverwritePolicy {
    /// Replace the existing file
    #[default]
    Overwrite,
    /// Stop without building anything
    Refuse,
    /// Rename the existing file with a timestamp suffix first
    Backup,
}

/// Settings for building a font preview document
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Where the document is saved
    pub output_path: PathBuf,
    /// Body text rendered in each font
    pub sample_text: String,
    /// Body font size in points
    pub body_font_size: f32,
    /// Heading font size in points
    pub heading_font_size: f32,
    /// Typeface for the font name headings
    pub heading_font: String,
    /// Handling of an existing output file
    pub overwrite: OverwritePolicy,
    /// Open the saved document in the default viewer
    pub open_when_done: bool,
    /// Only include the first N fonts
    pub limit: Option<usize>,
    /// Which reported font names to skip
    pub filter: FontFilter,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            sample_text: DEFAULT_SAMPLE_TEXT.to_string(),
            body_font_size: 14.0,
            heading_font_size: 18.0,
            heading_font: DEFAULT_HEADING_FONT.to_string(),
            overwrite: OverwritePolicy::default(),
            open_when_done: true,
            limit: None,
            filter: FontFilter::default(),
        }
    }
}

impl PreviewConfig {
    /// Check values the document application would reject outright
    pub fn validate(&self) -> Result<()> {
        for (label, size) in [
            ("body font size", self.body_font_size),
            ("heading font size", self.heading_font_size),
        ] {
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
                return Err(Error::Config(format!(
                    "{} {} must be between {} and {} points",
                    label, size, MIN_FONT_SIZE, MAX_FONT_SIZE
                )));
            }
        }

        if self.heading_font.trim().is_empty() {
            return Err(Error::Config("heading font must not be empty".to_string()));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(Error::Config("output path must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Default output location: the user's desktop, or home, or the working directory
pub fn default_output_path() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_OUTPUT_FILE_NAME)
}

/// Apply the overwrite policy to `path` before anything is written
pub fn prepare_output_path(path: &Path, policy: OverwritePolicy) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    match policy {
        OverwritePolicy::Overwrite => Ok(()),
        OverwritePolicy::Refuse => Err(Error::OutputExists(path.to_path_buf())),
        OverwritePolicy::Backup => {
            let backup = unused_backup_path(path, &Local::now().format("%Y%m%d-%H%M%S").to_string());
            std::fs::rename(path, &backup)?;
            info!("Moved existing file to '{}'", backup.display());
            Ok(())
        }
    }
}

/// `dir/name.ext` becomes `dir/name.<stamp>.ext`
fn backup_path(path: &Path, stamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}.{}", stem, stamp),
    };
    path.with_file_name(name)
}

/// First backup name for `stamp` that is not taken, adding `-1`, `-2`, ... as needed
fn unused_backup_path(path: &Path, stamp: &str) -> PathBuf {
    let mut candidate = backup_path(path, stamp);
    let mut suffix = 1;
    while candidate.exists() {
        candidate = backup_path(path, &format!("{}-{}", stamp, suffix));
        suffix += 1;
    }
    candidate
}
