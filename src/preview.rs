//! Two-phase preview run: list the fonts, then build the document
//!
//! Each phase launches its own application instance and releases it before
//! the run moves on.

use tracing::{error, info, warn};
use crate::automation::{AppSession, Launcher};
use crate::config::PreviewConfig;
use crate::document::{create_font_document, BuildReport};
use crate::error::Result;
use crate::fonts::{list_installed_fonts, FontFilter};
use crate::viewer::Viewer;

/// How a preview run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The document was saved, possibly with per-font warnings
    Completed,
    /// The fonts could not be listed; nothing was written
    ListingFailed,
    /// Building or saving the document failed after cleanup
    BuildFailed,
}

impl Outcome {
    /// Process exit status for the outcome
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::ListingFailed => 1,
            Outcome::BuildFailed => 2,
        }
    }
}

/// Launch an application just long enough to list its fonts
pub fn collect_fonts<L: Launcher>(launcher: &L, filter: &FontFilter) -> Result<Vec<String>> {
    let mut app = AppSession::launch(launcher)?;
    let fonts = list_installed_fonts(&mut *app, filter)?;
    app.quit();
    Ok(fonts)
}

/// Run both phases and open the finished document
pub fn run<L: Launcher, V: Viewer>(launcher: &L, viewer: &V, config: &PreviewConfig) -> Outcome {
    let mut fonts = match collect_fonts(launcher, &config.filter) {
        Ok(fonts) => fonts,
        Err(e) => {
            error!("Could not initialize the document application to list fonts. Error: {}", e);
            return Outcome::ListingFailed;
        }
    };

    if fonts.is_empty() {
        warn!("No fonts found; the document will be empty");
    }

    if let Some(limit) = config.limit {
        if limit < fonts.len() {
            info!("Limiting preview to the first {} of {} fonts", limit, fonts.len());
            fonts.truncate(limit);
        }
    }

    let report = match create_font_document(launcher, &fonts, config) {
        Ok(report) => report,
        Err(e) => {
            error!("FATAL: document generation failed: {}", e);
            return Outcome::BuildFailed;
        }
    };

    summarize(&report);

    if config.open_when_done {
        if let Err(e) = viewer.open(&report.output_path) {
            warn!("Could not open '{}': {}", report.output_path.display(), e);
        }
    }

    Outcome::Completed
}

fn summarize(report: &BuildReport) {
    let failed = report.failed_count();
    if failed > 0 {
        warn!(
            "{} of {} fonts could not be applied and were marked as errors",
            failed,
            report.blocks.len()
        );
    }
}
