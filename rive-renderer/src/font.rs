//! Font registration.
//!
//! Embedded font assets are loaded into a `fontdb` database owned by the
//! factory; the face metrics are read back with `ttf-parser`.

use std::any::Any;
use std::sync::Arc;

use fontdb::{Database, Source};
use rive_core::Font;

use crate::error::{RenderError, RenderResult};

/// A font face registered with the factory's font database.
#[derive(Debug, Clone)]
pub struct FontFace {
    id: fontdb::ID,
    family: String,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

impl FontFace {
    /// Database id of the face.
    #[must_use]
    pub fn id(&self) -> fontdb::ID {
        self.id
    }
}

impl Font for FontFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn ascender(&self) -> i16 {
        self.ascender
    }

    fn descender(&self) -> i16 {
        self.descender
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Font database of embedded faces.
#[derive(Default)]
pub struct FontRegistry {
    db: Database,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontRegistry {
    /// Create an empty registry. System fonts are never loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether no face has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Register font bytes and describe the first face they contain.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes contain no parsable face or the face
    /// has no family name.
    pub fn register(&mut self, bytes: &[u8]) -> RenderResult<FontFace> {
        let ids = self
            .db
            .load_font_source(Source::Binary(Arc::new(bytes.to_vec())));
        let id = *ids
            .first()
            .ok_or_else(|| RenderError::FontDecode("no font face found".to_string()))?;

        let family = self
            .db
            .face(id)
            .and_then(|info| info.families.first())
            .map(|(name, _)| name.clone());
        let Some(family) = family else {
            self.db.remove_face(id);
            return Err(RenderError::FontDecode("font face has no family".to_string()));
        };

        let metrics = self
            .db
            .with_face_data(id, |data, index| {
                ttf_parser::Face::parse(data, index)
                    .map(|face| (face.units_per_em(), face.ascender(), face.descender()))
                    .ok()
            })
            .flatten();
        let Some((units_per_em, ascender, descender)) = metrics else {
            self.db.remove_face(id);
            return Err(RenderError::FontDecode(format!(
                "failed to parse metrics for '{family}'"
            )));
        };

        tracing::debug!("Registered font '{family}' ({units_per_em} units/em)");
        Ok(FontFace {
            id,
            family,
            units_per_em,
            ascender,
            descender,
        })
    }
}
