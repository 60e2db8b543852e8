//! In-process document application
//!
//! Fonts are discovered with `fontdb`, and documents are kept as a flat list of
//! character cells that is packed into a `.docx` with `docx-rs` on save.

use std::fs::File;
use std::path::{Path, PathBuf};
use docx_rs::{BreakType, Docx, Paragraph, Run, RunFonts};
use tracing::debug;
use crate::automation::{Application, BreakKind, Document, Launcher, Range, RunFormat, SaveFormat};
use crate::error::{Error, Result};

/// Smallest font size the document accepts, in points
pub const MIN_FONT_SIZE: f32 = 1.0;
/// Largest font size the document accepts, in points
pub const MAX_FONT_SIZE: f32 = 1638.0;

/// Launches [`NativeApplication`] instances
#[derive(Debug, Clone)]
pub struct NativeLauncher {
    /// Load the fonts installed on the system
    pub system_fonts: bool,
    /// Additional directories to scan for font files
    pub font_dirs: Vec<PathBuf>,
}

impl Default for NativeLauncher {
    fn default() -> Self {
        Self {
            system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl NativeLauncher {
    /// Launcher that only sees the given directories
    pub fn with_font_dirs(font_dirs: Vec<PathBuf>) -> Self {
        Self {
            system_fonts: false,
            font_dirs,
        }
    }
}

impl Launcher for NativeLauncher {
    type App = NativeApplication;

    fn launch(&self) -> Result<NativeApplication> {
        let mut db = fontdb::Database::new();

        for dir in &self.font_dirs {
            if !dir.is_dir() {
                return Err(Error::Connect(format!(
                    "font directory not found: {}",
                    dir.display()
                )));
            }
            db.load_fonts_dir(dir);
        }

        if self.system_fonts {
            db.load_system_fonts();
        }

        debug!("Font database loaded with {} faces", db.len());

        Ok(NativeApplication { db, running: true })
    }
}

/// A running in-process document application
pub struct NativeApplication {
    db: fontdb::Database,
    running: bool,
}

impl NativeApplication {
    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(Error::Closed("application"))
        }
    }
}

impl Application for NativeApplication {
    type Doc = NativeDocument;

    fn font_names(&mut self) -> Result<Vec<String>> {
        self.ensure_running()?;

        // The first family entry is the English name when the font has one
        Ok(self
            .db
            .faces()
            .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .collect())
    }

    fn add_document(&mut self) -> Result<NativeDocument> {
        self.ensure_running()?;
        Ok(NativeDocument::new())
    }

    fn quit(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.running = false;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Char(char, Option<RunFormat>),
    Break(BreakKind),
}

/// A document held in memory until saved
#[derive(Debug, Default)]
pub struct NativeDocument {
    cells: Vec<Cell>,
    closed: bool,
}

impl NativeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain text of the document, with page breaks rendered as form feeds
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Char(c, _) => *c,
                Cell::Break(BreakKind::Page) => '\u{c}',
            })
            .collect()
    }

    /// Number of page breaks in the document
    pub fn page_breaks(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, Cell::Break(BreakKind::Page)))
            .count()
    }

    /// Formatting of the character at `position`, if it has any
    pub fn format_at(&self, position: usize) -> Option<&RunFormat> {
        match self.cells.get(position) {
            Some(Cell::Char(_, format)) => format.as_ref(),
            _ => None,
        }
    }

    /// Whether the document has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed("document"))
        } else {
            Ok(())
        }
    }

    fn ensure_in_bounds(&self, range: &Range) -> Result<()> {
        if range.start > range.end || range.end > self.cells.len() {
            return Err(Error::Document(format!(
                "range {}..{} is outside the document (length {})",
                range.start,
                range.end,
                self.cells.len()
            )));
        }
        Ok(())
    }

    /// Group cells into paragraphs and runs
    fn to_docx(&self) -> Docx {
        let mut docx = Docx::new();
        let mut paragraph = Paragraph::new();
        let mut paragraph_has_content = false;
        let mut text = String::new();
        let mut format: Option<&RunFormat> = None;

        for cell in &self.cells {
            match cell {
                Cell::Char('\n', _) => {
                    if !text.is_empty() {
                        paragraph = paragraph.add_run(build_run(&text, format));
                        text.clear();
                    }
                    docx = docx.add_paragraph(paragraph);
                    paragraph = Paragraph::new();
                    paragraph_has_content = false;
                }
                Cell::Char(c, cell_format) => {
                    if !text.is_empty() && cell_format.as_ref() != format {
                        paragraph = paragraph.add_run(build_run(&text, format));
                        text.clear();
                    }
                    format = cell_format.as_ref();
                    text.push(*c);
                    paragraph_has_content = true;
                }
                Cell::Break(BreakKind::Page) => {
                    if !text.is_empty() {
                        paragraph = paragraph.add_run(build_run(&text, format));
                        text.clear();
                    }
                    paragraph = paragraph.add_run(Run::new().add_break(BreakType::Page));
                    paragraph_has_content = true;
                }
            }
        }

        if !text.is_empty() {
            paragraph = paragraph.add_run(build_run(&text, format));
        }
        if paragraph_has_content {
            docx = docx.add_paragraph(paragraph);
        }

        docx
    }
}

/// Font sizes in WordprocessingML are measured in half-points
fn half_points(size: f32) -> usize {
    (size * 2.0).round() as usize
}

/// Characters XML 1.0 cannot carry are written as U+FFFD
fn xml_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => c,
            '\u{fffe}' | '\u{ffff}' => char::REPLACEMENT_CHARACTER,
            c if c < ' ' => char::REPLACEMENT_CHARACTER,
            c => c,
        })
        .collect()
}

fn build_run(text: &str, format: Option<&RunFormat>) -> Run {
    let mut run = Run::new().add_text(xml_safe(text));
    if let Some(format) = format {
        let name = format.font_name.as_str();
        run = run
            .size(half_points(format.size))
            .fonts(RunFonts::new().ascii(name).hi_ansi(name).east_asia(name).cs(name));
        if format.bold {
            run = run.bold();
        }
    }
    run
}

fn check_format(format: &RunFormat) -> Result<()> {
    let name = format.font_name.trim();
    if name.is_empty() {
        return Err(Error::Font {
            name: format.font_name.clone(),
            reason: "font name is empty".to_string(),
        });
    }
    if name.chars().any(char::is_control) {
        return Err(Error::Font {
            name: format.font_name.clone(),
            reason: "font name contains control characters".to_string(),
        });
    }
    if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&format.size) {
        return Err(Error::Document(format!(
            "font size {} is outside {}-{} points",
            format.size, MIN_FONT_SIZE, MAX_FONT_SIZE
        )));
    }
    Ok(())
}

impl Document for NativeDocument {
    fn content_end(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.cells.len())
    }

    fn insert_after(&mut self, range: &mut Range, text: &str) -> Result<()> {
        self.ensure_open()?;
        self.ensure_in_bounds(range)?;

        let at = range.end;
        let before = self.cells.len();
        self.cells.splice(at..at, text.chars().map(|c| Cell::Char(c, None)));
        range.end += self.cells.len() - before;
        Ok(())
    }

    fn format_range(&mut self, range: &Range, format: &RunFormat) -> Result<()> {
        self.ensure_open()?;
        self.ensure_in_bounds(range)?;
        check_format(format)?;

        for cell in &mut self.cells[range.start..range.end] {
            if let Cell::Char(_, cell_format) = cell {
                *cell_format = Some(format.clone());
            }
        }
        Ok(())
    }

    fn insert_break(&mut self, range: &mut Range, kind: BreakKind) -> Result<()> {
        self.ensure_open()?;
        self.ensure_in_bounds(range)?;

        self.cells.insert(range.end, Cell::Break(kind));
        *range = Range::collapsed(range.end + 1);
        Ok(())
    }

    fn delete_range(&mut self, range: &Range) -> Result<()> {
        self.ensure_open()?;
        self.ensure_in_bounds(range)?;

        self.cells.drain(range.start..range.end);
        Ok(())
    }

    fn save_as(&mut self, path: &Path, format: SaveFormat) -> Result<()> {
        self.ensure_open()?;

        match format {
            SaveFormat::XmlDocument => {
                let file = File::create(path).map_err(|e| Error::Save {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
                self.to_docx().build().pack(file).map_err(|e| Error::Save {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }

        debug!("Saved {} cells to {}", self.cells.len(), path.display());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
