//! Automation object model of the document application
//!
//! The preview is built entirely through these traits: a [`Launcher`] starts an
//! [`Application`], the application enumerates fonts and creates [`Document`]s,
//! and documents are edited through a caller-owned [`Range`] cursor.

pub mod native;
pub mod session;

use std::path::Path;
use crate::error::Result;

// Re-export commonly used items
pub use native::{NativeApplication, NativeDocument, NativeLauncher};
pub use session::{AppSession, DocSession};

/// A span of character positions in a document
///
/// Inserting after a range extends its end, so after a sequence of inserts the
/// range covers everything inserted since it was last collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    /// Create a range spanning `start..end`
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end: end.max(start) }
    }

    /// Create an empty range at a single position
    pub fn collapsed(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Move the start of the range to its end
    pub fn collapse_end(&mut self) {
        self.start = self.end;
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers nothing
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Character formatting applied to a range
#[derive(Debug, Clone, PartialEq)]
pub struct RunFormat {
    /// Font family name
    pub font_name: String,
    /// Font size in points
    pub size: f32,
    /// Bold weight
    pub bold: bool,
}

/// Kinds of breaks a document can insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    Page,
}

/// File formats a document can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Office Open XML word processing document (`.docx`)
    XmlDocument,
}

impl SaveFormat {
    /// Conventional file extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::XmlDocument => "docx",
        }
    }
}

/// Starts a fresh application instance
pub trait Launcher {
    type App: Application;

    fn launch(&self) -> Result<Self::App>;
}

/// A running document application
pub trait Application {
    type Doc: Document;

    /// Font names known to the application, unfiltered
    fn font_names(&mut self) -> Result<Vec<String>>;

    /// Create a new blank document
    fn add_document(&mut self) -> Result<Self::Doc>;

    /// Shut the application down
    fn quit(&mut self) -> Result<()>;
}

/// An open document
pub trait Document {
    /// Position just after the last character of the document
    fn content_end(&self) -> Result<usize>;

    /// Insert text at the end of `range` and extend the range over it
    fn insert_after(&mut self, range: &mut Range, text: &str) -> Result<()>;

    /// Apply character formatting to every character in `range`
    fn format_range(&mut self, range: &Range, format: &RunFormat) -> Result<()>;

    /// Insert a break at the end of `range`; the range collapses after it
    fn insert_break(&mut self, range: &mut Range, kind: BreakKind) -> Result<()>;

    /// Remove the content covered by `range`
    fn delete_range(&mut self, range: &Range) -> Result<()>;

    /// Write the document to `path`
    fn save_as(&mut self, path: &Path, format: SaveFormat) -> Result<()>;

    /// Close the document, discarding unsaved changes
    fn close(&mut self) -> Result<()>;
}
