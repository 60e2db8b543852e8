//! Font Preview Library
//!
//! Builds a word processing document that shows every installed font, one
//! page per font. This library provides functionality to:
//! - List the fonts a document application knows about
//! - Drive the application's automation model to write heading and sample blocks
//! - Save the result as a `.docx` and open it in the default viewer
//!
//! # Example
//!
//! ```no_run
//! use font_preview::automation::NativeLauncher;
//! use font_preview::config::PreviewConfig;
//! use font_preview::preview::run;
//! use font_preview::viewer::SystemViewer;
//!
//! let outcome = run(&NativeLauncher::default(), &SystemViewer, &PreviewConfig::default());
//! std::process::exit(outcome.exit_code());
//! ```

pub mod automation;
pub mod config;
pub mod document;
pub mod error;
pub mod fonts;
pub mod preview;
pub mod viewer;

// Re-export commonly used items
pub use error::{Error, Result};
