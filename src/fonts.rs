//! Installed font enumeration

use std::collections::BTreeSet;
use glob::Pattern;
use tracing::info;
use crate::automation::{Application, DocSession};
use crate::error::{Error, Result};

/// Prefix the application uses for vertical-writing and symbol font aliases
pub const DEFAULT_MARKER: char = '@';

/// Decides which reported font names are left out of the preview
#[derive(Debug, Clone)]
pub struct FontFilter {
    markers: Vec<char>,
    excludes: Vec<Pattern>,
}

impl Default for FontFilter {
    fn default() -> Self {
        Self {
            markers: vec![DEFAULT_MARKER],
            excludes: Vec::new(),
        }
    }
}

impl FontFilter {
    /// Filter that skips names starting with any of `markers`
    pub fn with_markers(markers: Vec<char>) -> Self {
        Self {
            markers,
            excludes: Vec::new(),
        }
    }

    /// Also skip names matching any of the glob `patterns`
    pub fn exclude_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern)
                .map_err(|e| Error::InvalidPattern(format!("{}: {}", pattern, e)))?;
            self.excludes.push(compiled);
        }
        Ok(self)
    }

    /// Whether `name` should be left out
    pub fn is_excluded(&self, name: &str) -> bool {
        name.starts_with(self.markers.as_slice())
            || self.excludes.iter().any(|pattern| pattern.matches(name))
    }

    /// Trim, drop excluded and empty names, then sort and deduplicate
    pub fn apply<I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && !self.is_excluded(name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// List the fonts known to a running application
///
/// A blank document is opened around the query because some applications
/// only report their full font list while a document is open. It is closed
/// without saving before returning.
pub fn list_installed_fonts<A: Application>(app: &mut A, filter: &FontFilter) -> Result<Vec<String>> {
    info!("-------------------------------------");
    info!("1-> Searching for installed fonts...");

    let temp_doc = DocSession::new(app.add_document()?);
    let names = app
        .font_names()
        .map_err(|e| Error::FontEnumeration(e.to_string()))?;
    temp_doc.close();

    let fonts = filter.apply(names);
    info!("1-> Found {} unique fonts.", fonts.len());

    Ok(fonts)
}
