//! Integration tests for the font preview library

use font_preview::automation::{
    Application, BreakKind, Document, Launcher, NativeLauncher, Range, RunFormat, SaveFormat,
};
use font_preview::config::{OverwritePolicy, PreviewConfig};
use font_preview::document::{create_font_document, error_marker};
use font_preview::fonts::FontFilter;
use font_preview::preview::{collect_fonts, run, Outcome};
use font_preview::viewer::Viewer;
use font_preview::{Error, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Every call the fake application receives, in order
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Launch,
    FontNames,
    AddDocument,
    Insert(String),
    Format(String),
    Break,
    Delete,
    Save(PathBuf),
    Close,
    Quit,
}

type CallLog = Rc<RefCell<Vec<Call>>>;

/// Scripted behaviour for the fake application
#[derive(Debug, Clone, Default)]
struct Script {
    fonts: Vec<String>,
    fail_launch: bool,
    /// Fonts that fail when applied to a range
    bad_fonts: HashSet<String>,
    /// Inserting any text that mentions one of these fails
    poison: HashSet<String>,
    fail_save: bool,
    /// Quitting any instance reports an error
    fail_quit: bool,
    /// Closing any document reports an error
    fail_close: bool,
}

struct FakeLauncher {
    script: Script,
    log: CallLog,
}

impl FakeLauncher {
    fn new(script: Script) -> Self {
        Self {
            script,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    fn count(&self, call: &Call) -> usize {
        self.log.borrow().iter().filter(|c| *c == call).count()
    }
}

impl Launcher for FakeLauncher {
    type App = FakeApp;

    fn launch(&self) -> Result<FakeApp> {
        self.log.borrow_mut().push(Call::Launch);
        if self.script.fail_launch {
            return Err(Error::Connect("application not installed".to_string()));
        }
        Ok(FakeApp {
            script: self.script.clone(),
            log: self.log.clone(),
            open_documents: Rc::new(RefCell::new(0)),
        })
    }
}

struct FakeApp {
    script: Script,
    log: CallLog,
    open_documents: Rc<RefCell<usize>>,
}

impl Application for FakeApp {
    type Doc = FakeDoc;

    fn font_names(&mut self) -> Result<Vec<String>> {
        self.log.borrow_mut().push(Call::FontNames);
        if *self.open_documents.borrow() == 0 {
            return Err(Error::FontEnumeration("no document open".to_string()));
        }
        Ok(self.script.fonts.clone())
    }

    fn add_document(&mut self) -> Result<FakeDoc> {
        self.log.borrow_mut().push(Call::AddDocument);
        *self.open_documents.borrow_mut() += 1;
        Ok(FakeDoc {
            script: self.script.clone(),
            log: self.log.clone(),
            open_documents: self.open_documents.clone(),
            len: 0,
        })
    }

    fn quit(&mut self) -> Result<()> {
        self.log.borrow_mut().push(Call::Quit);
        if self.script.fail_quit {
            return Err(Error::Connect("application stopped responding".to_string()));
        }
        Ok(())
    }
}

struct FakeDoc {
    script: Script,
    log: CallLog,
    open_documents: Rc<RefCell<usize>>,
    len: usize,
}

impl Document for FakeDoc {
    fn content_end(&self) -> Result<usize> {
        Ok(self.len)
    }

    fn insert_after(&mut self, range: &mut Range, text: &str) -> Result<()> {
        if self.script.poison.iter().any(|p| text.contains(p.as_str())) {
            return Err(Error::Document("application stopped responding".to_string()));
        }
        self.log.borrow_mut().push(Call::Insert(text.to_string()));
        let added = text.chars().count();
        self.len += added;
        range.end += added;
        Ok(())
    }

    fn format_range(&mut self, _range: &Range, format: &RunFormat) -> Result<()> {
        if self.script.bad_fonts.contains(&format.font_name) {
            return Err(Error::Font {
                name: format.font_name.clone(),
                reason: "corrupted font".to_string(),
            });
        }
        self.log.borrow_mut().push(Call::Format(format.font_name.clone()));
        Ok(())
    }

    fn insert_break(&mut self, range: &mut Range, _kind: BreakKind) -> Result<()> {
        self.log.borrow_mut().push(Call::Break);
        self.len += 1;
        *range = Range::collapsed(range.end + 1);
        Ok(())
    }

    fn delete_range(&mut self, range: &Range) -> Result<()> {
        self.log.borrow_mut().push(Call::Delete);
        self.len -= range.len();
        Ok(())
    }

    fn save_as(&mut self, path: &Path, _format: SaveFormat) -> Result<()> {
        if self.script.fail_save {
            return Err(Error::Save {
                path: path.to_path_buf(),
                reason: "disk full".to_string(),
            });
        }
        self.log.borrow_mut().push(Call::Save(path.to_path_buf()));
        std::fs::write(path, b"fake document")?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.log.borrow_mut().push(Call::Close);
        *self.open_documents.borrow_mut() -= 1;
        if self.script.fail_close {
            return Err(Error::Document("document is locked".to_string()));
        }
        Ok(())
    }
}

/// Viewer that remembers what it was asked to open
#[derive(Default)]
struct RecordingViewer {
    opened: RefCell<Vec<PathBuf>>,
}

impl Viewer for RecordingViewer {
    fn open(&self, path: &Path) -> Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn test_config(dir: &TempDir) -> PreviewConfig {
    PreviewConfig {
        output_path: dir.path().join("preview.docx"),
        sample_text: "sample".to_string(),
        ..Default::default()
    }
}

/// Assert every opened handle was released exactly once
fn assert_released_once(launcher: &FakeLauncher) {
    assert_eq!(
        launcher.count(&Call::AddDocument),
        launcher.count(&Call::Close),
        "every document should be closed exactly once: {:?}",
        launcher.calls()
    );
    assert_eq!(
        launcher.count(&Call::Launch),
        launcher.count(&Call::Quit),
        "every application should quit exactly once: {:?}",
        launcher.calls()
    );
}

#[test]
fn test_collect_fonts_filters_and_sorts() {
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Verdana", "@MS Mincho", "Arial", "Verdana", "MS Mincho"]),
        ..Default::default()
    });

    let fonts = collect_fonts(&launcher, &FontFilter::default()).expect("Failed to list fonts");

    assert_eq!(fonts, names(&["Arial", "MS Mincho", "Verdana"]));
    assert_eq!(
        launcher.calls(),
        vec![Call::Launch, Call::AddDocument, Call::FontNames, Call::Close, Call::Quit]
    );
}

#[test]
fn test_run_writes_one_block_per_font_in_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Georgia", "Arial", "Consolas"]),
        ..Default::default()
    });
    let viewer = RecordingViewer::default();

    let outcome = run(&launcher, &viewer, &config);

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(outcome.exit_code(), 0);

    // Each block: heading, heading format, sample, sample format, page break
    let edits: Vec<Call> = launcher
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Insert(_) | Call::Format(_) | Call::Break))
        .collect();
    let mut expected = Vec::new();
    for font in ["Arial", "Consolas", "Georgia"] {
        expected.push(Call::Insert(format!("{}\n", font)));
        expected.push(Call::Format("Calibri".to_string()));
        expected.push(Call::Insert("sample\n".to_string()));
        expected.push(Call::Format(font.to_string()));
        expected.push(Call::Break);
    }
    assert_eq!(edits, expected);

    assert_eq!(launcher.count(&Call::Save(config.output_path.clone())), 1);
    assert!(config.output_path.exists());
    assert_eq!(*viewer.opened.borrow(), vec![config.output_path.clone()]);
    assert_released_once(&launcher);
}

#[test]
fn test_bad_font_gets_marker_and_loop_continues() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Alpha", "Broken", "Gamma"]),
        bad_fonts: ["Broken".to_string()].into_iter().collect(),
        ..Default::default()
    });

    let report = create_font_document(&launcher, &names(&["Alpha", "Broken", "Gamma"]), &config)
        .expect("Per-font failures should not abort the document");

    assert_eq!(report.blocks.len(), 3);
    assert_eq!(report.failed_count(), 1);
    assert!(report.blocks[1].is_failed());
    assert_eq!(report.blocks[1].font(), "Broken");

    let calls = launcher.calls();
    assert!(calls.contains(&Call::Delete), "partial block should be removed");
    assert!(calls.contains(&Call::Insert(error_marker("Broken"))));
    assert!(calls.contains(&Call::Format("Gamma".to_string())));
    assert_eq!(launcher.count(&Call::Break), 3);
    assert_released_once(&launcher);
}

#[test]
fn test_empty_font_list_builds_empty_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script::default());
    let viewer = RecordingViewer::default();

    let outcome = run(&launcher, &viewer, &config);

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(launcher.count(&Call::Break), 0);
    assert!(!launcher.calls().iter().any(|c| matches!(c, Call::Insert(_))));
    assert!(config.output_path.exists());
    assert_released_once(&launcher);
}

#[test]
fn test_listing_connection_failure_exits_with_one() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script {
        fail_launch: true,
        ..Default::default()
    });
    let viewer = RecordingViewer::default();

    let outcome = run(&launcher, &viewer, &config);

    assert_eq!(outcome, Outcome::ListingFailed);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(launcher.calls(), vec![Call::Launch]);
    assert!(!config.output_path.exists(), "No output should be produced");
    assert!(viewer.opened.borrow().is_empty());
}

#[test]
fn test_fatal_error_mid_loop_releases_handles_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Alpha", "Poison", "Zeta"]),
        poison: ["Poison".to_string()].into_iter().collect(),
        ..Default::default()
    });
    let viewer = RecordingViewer::default();

    let outcome = run(&launcher, &viewer, &config);

    assert_eq!(outcome, Outcome::BuildFailed);
    assert_eq!(outcome.exit_code(), 2);
    assert!(!launcher.calls().iter().any(|c| matches!(c, Call::Save(_))));
    // Nothing after the fatal font is written
    assert!(!launcher.calls().contains(&Call::Insert("Zeta\n".to_string())));
    assert!(!config.output_path.exists());
    assert!(viewer.opened.borrow().is_empty());
    assert_released_once(&launcher);
}

#[test]
fn test_save_failure_releases_handles_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Arial"]),
        fail_save: true,
        ..Default::default()
    });

    let result = create_font_document(&launcher, &names(&["Arial"]), &config);

    assert!(matches!(result, Err(Error::Save { .. })));
    assert_eq!(launcher.count(&Call::Close), 1);
    assert_eq!(launcher.count(&Call::Quit), 1);
}

#[test]
fn test_release_failures_after_save_still_complete() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Arial", "Georgia"]),
        fail_quit: true,
        fail_close: true,
        ..Default::default()
    });
    let viewer = RecordingViewer::default();

    let outcome = run(&launcher, &viewer, &config);

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert!(config.output_path.exists());
    assert_eq!(*viewer.opened.borrow(), vec![config.output_path.clone()]);
    // Both instances and both documents, released once each despite the errors
    assert_eq!(launcher.count(&Call::Launch), 2);
    assert_released_once(&launcher);
}

#[test]
fn test_listing_quit_failure_keeps_collected_fonts() {
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Verdana", "Arial"]),
        fail_quit: true,
        ..Default::default()
    });

    let fonts = collect_fonts(&launcher, &FontFilter::default())
        .expect("A failed quit should not discard the font list");

    assert_eq!(fonts, names(&["Arial", "Verdana"]));
    assert_eq!(launcher.count(&Call::Quit), 1);
}

#[test]
fn test_refuse_policy_keeps_existing_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = PreviewConfig {
        overwrite: OverwritePolicy::Refuse,
        ..test_config(&temp_dir)
    };
    std::fs::write(&config.output_path, b"previous run").unwrap();

    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Arial"]),
        ..Default::default()
    });
    let viewer = RecordingViewer::default();

    let outcome = run(&launcher, &viewer, &config);

    assert_eq!(outcome, Outcome::BuildFailed);
    // Only the listing instance was launched
    assert_eq!(launcher.count(&Call::Launch), 1);
    assert_eq!(std::fs::read(&config.output_path).unwrap(), b"previous run");
    assert_released_once(&launcher);
}

#[test]
fn test_limit_keeps_first_fonts() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = PreviewConfig {
        limit: Some(2),
        open_when_done: false,
        ..test_config(&temp_dir)
    };
    let launcher = FakeLauncher::new(Script {
        fonts: names(&["Delta", "Alpha", "Charlie", "Bravo"]),
        ..Default::default()
    });
    let viewer = RecordingViewer::default();

    assert_eq!(run(&launcher, &viewer, &config), Outcome::Completed);

    assert_eq!(launcher.count(&Call::Break), 2);
    assert!(launcher.calls().contains(&Call::Insert("Bravo\n".to_string())));
    assert!(!launcher.calls().contains(&Call::Insert("Charlie\n".to_string())));
    assert!(viewer.opened.borrow().is_empty());
}

#[test]
fn test_native_backend_saves_docx() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let font_dir = TempDir::new().expect("Failed to create font directory");
    let config = test_config(&temp_dir);
    let launcher = NativeLauncher::with_font_dirs(vec![font_dir.path().to_path_buf()]);

    let report = create_font_document(&launcher, &names(&["Arial", "Courier New"]), &config)
        .expect("Failed to build document");

    assert_eq!(report.blocks.len(), 2);
    assert_eq!(report.failed_count(), 0);

    let bytes = std::fs::read(&config.output_path).expect("Document was not saved");
    assert!(bytes.starts_with(b"PK"), "docx should be a zip package");
}

#[test]
fn test_native_failed_font_marker_is_valid_xml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let font_dir = TempDir::new().expect("Failed to create font directory");
    let config = test_config(&temp_dir);
    let launcher = NativeLauncher::with_font_dirs(vec![font_dir.path().to_path_buf()]);

    let report = create_font_document(&launcher, &names(&["Bad\u{1}Font", "Arial"]), &config)
        .expect("Failed to build document");
    assert_eq!(report.failed_count(), 1);

    let file = std::fs::File::open(&config.output_path).expect("Document was not saved");
    let mut archive = zip::ZipArchive::new(file).expect("docx should be a zip package");
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("Missing word/document.xml")
        .read_to_string(&mut xml)
        .expect("document.xml should be UTF-8");

    assert!(
        !xml.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')),
        "document.xml must not contain C0 control characters"
    );
    assert!(xml.contains("--- ERROR with Bad\u{fffd}Font ---"));
}

#[test]
fn test_native_backend_missing_font_dir_fails_listing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    let launcher = NativeLauncher::with_font_dirs(vec![temp_dir.path().join("missing")]);
    let viewer = RecordingViewer::default();

    assert_eq!(run(&launcher, &viewer, &config), Outcome::ListingFailed);
    assert!(!config.output_path.exists());
}
