//! Font preview document assembly
//!
//! Every font gets a block of the form
//!
//! ```text
//! <font name>             heading typeface, heading size, bold
//! <sample text>           the font itself, body size, regular
//! <page break>
//! ```
//!
//! A font that cannot be applied gets an error marker block instead and the
//! remaining fonts are still written.

use std::path::PathBuf;
use tracing::{info, warn};
use crate::automation::{
    AppSession, Application, BreakKind, DocSession, Document, Launcher, Range, RunFormat,
    SaveFormat,
};
use crate::config::{prepare_output_path, PreviewConfig};
use crate::error::Result;

/// Text of the block written in place of a font that failed
///
/// Control characters in the name are shown as U+FFFD so the marker stays
/// printable in the saved document.
pub fn error_marker(font_name: &str) -> String {
    let name: String = font_name
        .chars()
        .map(|c| if c.is_control() { char::REPLACEMENT_CHARACTER } else { c })
        .collect();
    format!("--- ERROR with {} ---\n", name)
}

/// Heading and sample text for one font
#[derive(Debug, Clone)]
pub struct SampleBlock<'a> {
    font_name: &'a str,
    config: &'a PreviewConfig,
}

impl<'a> SampleBlock<'a> {
    pub fn new(font_name: &'a str, config: &'a PreviewConfig) -> Self {
        Self { font_name, config }
    }

    pub fn heading_text(&self) -> String {
        format!("{}\n", self.font_name)
    }

    pub fn heading_format(&self) -> RunFormat {
        RunFormat {
            font_name: self.config.heading_font.clone(),
            size: self.config.heading_font_size,
            bold: true,
        }
    }

    pub fn body_text(&self) -> String {
        format!("{}\n", self.config.sample_text)
    }

    pub fn body_format(&self) -> RunFormat {
        RunFormat {
            font_name: self.font_name.to_string(),
            size: self.config.body_font_size,
            bold: false,
        }
    }

    /// Insert the block at `range`, leaving it collapsed after the page break
    pub fn write<D: Document>(&self, doc: &mut D, range: &mut Range) -> Result<()> {
        doc.insert_after(range, &self.heading_text())?;
        doc.format_range(range, &self.heading_format())?;
        range.collapse_end();

        doc.insert_after(range, &self.body_text())?;
        doc.format_range(range, &self.body_format())?;
        range.collapse_end();

        doc.insert_break(range, BreakKind::Page)
    }
}

/// Result of writing one font's block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    /// Heading and sample were written in the font
    Rendered { font: String },
    /// The font failed and an error marker was written instead
    Failed { font: String, reason: String },
}

impl BlockOutcome {
    pub fn font(&self) -> &str {
        match self {
            BlockOutcome::Rendered { font } | BlockOutcome::Failed { font, .. } => font,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BlockOutcome::Failed { .. })
    }
}

/// Summary of a saved preview document
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Where the document was saved
    pub output_path: PathBuf,
    /// One outcome per font, in document order
    pub blocks: Vec<BlockOutcome>,
}

impl BuildReport {
    /// Number of fonts replaced by an error marker
    pub fn failed_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_failed()).count()
    }
}

/// Replace whatever part of a failed block was written with an error marker
fn write_error_block<D: Document>(
    doc: &mut D,
    range: &mut Range,
    block_start: usize,
    font_name: &str,
) -> Result<()> {
    let partial = Range::new(block_start, range.end);
    if !partial.is_empty() {
        doc.delete_range(&partial)?;
    }

    *range = Range::collapsed(block_start);
    doc.insert_after(range, &error_marker(font_name))?;
    range.collapse_end();
    doc.insert_break(range, BreakKind::Page)
}

/// Append one block per font to the end of `doc`
///
/// Failures while applying a font are recorded in the returned outcomes.
/// Only a failure to write the error marker itself is returned as an error.
pub fn build_document<D: Document>(
    doc: &mut D,
    fonts: &[String],
    config: &PreviewConfig,
) -> Result<Vec<BlockOutcome>> {
    let mut range = Range::collapsed(doc.content_end()?);

    fonts
        .iter()
        .map(|font| {
            let block_start = range.start;
            match SampleBlock::new(font, config).write(doc, &mut range) {
                Ok(()) => {
                    info!("Applied font: {}", font);
                    Ok(BlockOutcome::Rendered { font: font.clone() })
                }
                Err(e) => {
                    warn!("Font '{}' failed: {}", font, e);
                    write_error_block(doc, &mut range, block_start, font)?;
                    Ok(BlockOutcome::Failed {
                        font: font.clone(),
                        reason: e.to_string(),
                    })
                }
            }
        })
        .collect()
}

/// Launch a fresh application, build the preview document and save it
///
/// The document and the application are released on every path, and the
/// document is always closed without saving. Once the save succeeds, a
/// failure to release either handle is only logged.
pub fn create_font_document<L: Launcher>(
    launcher: &L,
    fonts: &[String],
    config: &PreviewConfig,
) -> Result<BuildReport> {
    let format = SaveFormat::XmlDocument;
    let extension = config.output_path.extension().and_then(|e| e.to_str());
    if extension != Some(format.extension()) {
        warn!(
            "Output '{}' does not end in .{}; the file is still saved as a Word document",
            config.output_path.display(),
            format.extension()
        );
    }

    prepare_output_path(&config.output_path, config.overwrite)?;

    info!("2-> Initializing document application...");
    let mut app = AppSession::launch(launcher)?;
    let mut doc = DocSession::new(app.add_document()?);

    info!("3-> Starting document generation...");
    let blocks = build_document(&mut *doc, fonts, config)?;

    info!("-------------------------------------");
    info!("Saving document...");
    doc.save_as(&config.output_path, format)?;
    doc.close();
    app.quit();

    info!("Document successfully created at '{}'", config.output_path.display());

    Ok(BuildReport {
        output_path: config.output_path.clone(),
        blocks,
    })
}
