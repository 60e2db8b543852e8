//! Opening finished documents

use std::path::Path;
use std::process::Command;
use crate::error::Result;

/// Something that can show a saved document to the user
pub trait Viewer {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Opens files with the system default application
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> Result<()> {
        viewer_command(path).spawn()?;
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", &path.display().to_string()]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
