//! # Rive Renderer
//!
//! Concrete [`Factory`] for the animation core, with one resource family per
//! rendering backend.
//!
//! ## Rendering Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            RendererFactory                  │
//! ├─────────────┬─────────────┬─────────────────┤
//! │ Painter     │ OpenGL      │ Modern GPU      │
//! │ (tiny-skia) │ (triangles) │ (wgpu meshes)   │
//! └─────────────┴─────────────┴─────────────────┘
//! ```
//!
//! Paints, gradients, buffers, images and fonts are shared by every
//! backend; only paths differ. The render type is fixed by the first
//! non-`None` selection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod font;
pub mod image;
pub mod resources;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

pub use backend::gpu::{GpuMesh, GpuPath, GpuVertex};
pub use backend::opengl::{GlClipRegion, GlDrawCommand, OpenGlDrawList, OpenGlPath};
pub use backend::painter::{PainterPath, PainterRenderer};
pub use error::{RenderError, RenderResult};
pub use font::{FontFace, FontRegistry};
pub use crate::image::{DecodedImage, ImageFormat};
pub use resources::{Buffer, Gradient, GradientKind, GradientStop, Paint};

use rive_core::{
    ColorInt, Factory, FillRule, Font, RawPath, RenderBuffer, RenderImage, RenderPaint,
    RenderPath, RenderShader, Vec2D,
};
use serde::{Deserialize, Serialize};

/// Available rendering backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderType {
    /// Not selected yet; paths use the painter representation.
    #[default]
    None,
    /// Software rasterization via tiny-skia.
    Painter,
    /// Triangle lists for an OpenGL scene pass.
    OpenGl,
    /// Indexed meshes for wgpu.
    Gpu,
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Painter => "painter",
            Self::OpenGl => "opengl",
            Self::Gpu => "gpu",
        })
    }
}

impl FromStr for RenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "painter" | "software" => Ok(Self::Painter),
            "opengl" | "gl" => Ok(Self::OpenGl),
            "gpu" | "wgpu" => Ok(Self::Gpu),
            other => Err(format!(
                "unknown render type '{other}' (expected painter, opengl or gpu)"
            )),
        }
    }
}

/// Configuration for the renderer factory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Initial render type.
    pub render_type: RenderType,
    /// Curve flattening tolerance for tessellated backends.
    pub tolerance: f32,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            render_type: RenderType::None,
            tolerance: 0.1,
        }
    }
}

/// Renderer factory handing out resources for the selected backend.
pub struct RendererFactory {
    render_type: Cell<RenderType>,
    tolerance: f32,
    fonts: RefCell<FontRegistry>,
}

impl fmt::Debug for RendererFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererFactory")
            .field("render_type", &self.render_type.get())
            .field("tolerance", &self.tolerance)
            .field("fonts", &self.fonts)
            .finish()
    }
}

impl Default for RendererFactory {
    fn default() -> Self {
        Self::with_config(FactoryConfig::default())
    }
}

impl RendererFactory {
    /// Create a factory for `render_type`.
    #[must_use]
    pub fn new(render_type: RenderType) -> Self {
        Self::with_config(FactoryConfig {
            render_type,
            ..FactoryConfig::default()
        })
    }

    /// Create a factory from configuration.
    #[must_use]
    pub fn with_config(config: FactoryConfig) -> Self {
        tracing::debug!("Renderer factory created with render type {}", config.render_type);
        Self {
            render_type: Cell::new(config.render_type),
            tolerance: config.tolerance,
            fonts: RefCell::new(FontRegistry::new()),
        }
    }

    /// The active render type.
    #[must_use]
    pub fn render_type(&self) -> RenderType {
        self.render_type.get()
    }

    /// Select the render type. Only the first selection away from
    /// [`RenderType::None`] takes effect; returns whether it did.
    pub fn set_render_type(&self, render_type: RenderType) -> bool {
        let current = self.render_type.get();
        if current != RenderType::None {
            tracing::debug!("Render type already {current}; ignoring {render_type}");
            return false;
        }
        self.render_type.set(render_type);
        tracing::debug!("Render type set to {render_type}");
        true
    }

    /// Number of fonts registered through [`Factory::decode_font`].
    #[must_use]
    pub fn font_count(&self) -> usize {
        self.fonts.borrow().len()
    }
}

impl Factory for RendererFactory {
    fn make_buffer_u16(&self, data: &[u16]) -> Rc<dyn RenderBuffer> {
        Rc::new(Buffer::new(data))
    }

    fn make_buffer_u32(&self, data: &[u32]) -> Rc<dyn RenderBuffer> {
        Rc::new(Buffer::new(data))
    }

    fn make_buffer_f32(&self, data: &[f32]) -> Rc<dyn RenderBuffer> {
        Rc::new(Buffer::new(data))
    }

    fn make_linear_gradient(
        &self,
        sx: f32,
        sy: f32,
        ex: f32,
        ey: f32,
        colors: &[ColorInt],
        stops: &[f32],
    ) -> Rc<dyn RenderShader> {
        Rc::new(Gradient::new(
            GradientKind::Linear {
                start: Vec2D::new(sx, sy),
                end: Vec2D::new(ex, ey),
            },
            colors,
            stops,
        ))
    }

    fn make_radial_gradient(
        &self,
        cx: f32,
        cy: f32,
        radius: f32,
        colors: &[ColorInt],
        stops: &[f32],
    ) -> Rc<dyn RenderShader> {
        Rc::new(Gradient::new(
            GradientKind::Radial {
                center: Vec2D::new(cx, cy),
                radius,
            },
            colors,
            stops,
        ))
    }

    fn make_render_path(&self, raw: &RawPath, fill_rule: FillRule) -> Box<dyn RenderPath> {
        match self.render_type.get() {
            RenderType::None | RenderType::Painter => Box::new(PainterPath::new(raw, fill_rule)),
            RenderType::OpenGl => Box::new(OpenGlPath::new(raw, fill_rule, self.tolerance)),
            RenderType::Gpu => Box::new(GpuPath::new(raw, fill_rule, self.tolerance)),
        }
    }

    fn make_empty_render_path(&self) -> Box<dyn RenderPath> {
        self.make_render_path(&RawPath::new(), FillRule::NonZero)
    }

    fn make_render_paint(&self) -> Box<dyn RenderPaint> {
        Box::new(Paint::default())
    }

    fn decode_image(&self, bytes: &[u8]) -> Option<Rc<dyn RenderImage>> {
        match crate::image::decode_image(bytes) {
            Ok(image) => {
                tracing::debug!(
                    "Decoded {:?} image {}x{}",
                    image.format(),
                    image.width(),
                    image.height()
                );
                Some(Rc::new(image))
            }
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }

    fn decode_font(&self, bytes: &[u8]) -> Option<Rc<dyn Font>> {
        let Ok(mut fonts) = self.fonts.try_borrow_mut() else {
            tracing::warn!("Font registry busy; font dropped");
            return None;
        };
        match fonts.register(bytes) {
            Ok(face) => Some(Rc::new(face)),
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }
}
