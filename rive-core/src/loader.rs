//! Document loading.
//!
//! The binary animation format parser is an external collaborator; the
//! [`DocumentLoader`] trait is the seam it plugs into. [`JsonDocumentLoader`]
//! reads the JSON interchange form of a [`DocumentDef`].

use std::rc::Rc;

use crate::document::{Document, DocumentDef};
use crate::factory::Factory;
use crate::CoreResult;

/// Turns raw document bytes into a [`Document`].
///
/// Embedded assets must be decoded through `factory` so they match the
/// active backend.
pub trait DocumentLoader {
    /// Parse and validate a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid document.
    fn load(&self, bytes: &[u8], factory: Rc<dyn Factory>) -> CoreResult<Document>;
}

/// Loader for the JSON interchange format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentLoader;

impl DocumentLoader for JsonDocumentLoader {
    fn load(&self, bytes: &[u8], factory: Rc<dyn Factory>) -> CoreResult<Document> {
        let def: DocumentDef = serde_json::from_slice(bytes)?;
        tracing::debug!(
            "Parsed document: {} artboards, {} assets",
            def.artboards.len(),
            def.assets.len()
        );
        Document::from_def(def, factory)
    }
}
