//! Scoped application and document handles
//!
//! Each session releases its handle exactly once: either through an explicit
//! [`AppSession::quit`] / [`DocSession::close`], or on drop. Errors raised while
//! releasing are logged and discarded, never returned.

use std::ops::{Deref, DerefMut};
use tracing::warn;
use crate::automation::{Application, Document, Launcher};
use crate::error::Result;

/// A launched application that quits when dropped
pub struct AppSession<A: Application> {
    app: A,
    released: bool,
}

impl<A: Application> AppSession<A> {
    /// Launch a new application instance
    pub fn launch<L>(launcher: &L) -> Result<Self>
    where
        L: Launcher<App = A>,
    {
        Ok(Self::new(launcher.launch()?))
    }

    /// Take ownership of an already running application
    pub fn new(app: A) -> Self {
        Self { app, released: false }
    }

    /// Quit the application now instead of at the end of the scope
    pub fn quit(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.app.quit() {
            warn!("Ignoring error while quitting application: {}", e);
        }
    }
}

impl<A: Application> Deref for AppSession<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.app
    }
}

impl<A: Application> DerefMut for AppSession<A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut self.app
    }
}

impl<A: Application> Drop for AppSession<A> {
    fn drop(&mut self) {
        self.release();
    }
}

/// An open document that closes without saving when dropped
pub struct DocSession<D: Document> {
    doc: D,
    released: bool,
}

impl<D: Document> DocSession<D> {
    pub fn new(doc: D) -> Self {
        Self { doc, released: false }
    }

    /// Close the document without saving now instead of at the end of the scope
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.doc.close() {
            warn!("Ignoring error while closing document: {}", e);
        }
    }
}

impl<D: Document> Deref for DocSession<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.doc
    }
}

impl<D: Document> DerefMut for DocSession<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.doc
    }
}

impl<D: Document> Drop for DocSession<D> {
    fn drop(&mut self) {
        self.release();
    }
}
