//! Backend-neutral renderer resource contract.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Factory                      │
//! │  paths · paints · shaders · buffers          │
//! │  images · fonts                              │
//! ├───────────────┬───────────────┬──────────────┤
//! │ Painter       │ OpenGL        │ Modern GPU   │
//! └───────────────┴───────────────┴──────────────┘
//! ```
//!
//! The animation core only ever holds these trait objects. Concrete
//! resources live in the renderer crate and are recovered there with
//! `as_any()` downcasts.

use std::any::Any;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::color::ColorInt;
use crate::math::Mat2D;
use crate::path::{FillRule, RawPath};

/// Whether a paint fills or strokes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintStyle {
    /// Fill the path interior.
    #[default]
    Fill,
    /// Stroke the path outline.
    Stroke,
}

/// Stroke corner style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeJoin {
    /// Sharp corners.
    #[default]
    Miter,
    /// Rounded corners.
    Round,
    /// Cut-off corners.
    Bevel,
}

/// Stroke end style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeCap {
    /// Flat end at the path end point.
    #[default]
    Butt,
    /// Semicircular end.
    Round,
    /// Square end extending past the end point.
    Square,
}

/// Compositing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)] // Standard separable/non-separable blend mode names
pub enum BlendMode {
    #[default]
    SrcOver,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// Element type of a [`RenderBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    /// 16-bit indices.
    U16,
    /// 32-bit indices.
    U32,
    /// 32-bit float vertex data.
    F32,
}

/// Vertex or index data uploaded for mesh drawing.
pub trait RenderBuffer {
    /// Element type of the buffer.
    fn buffer_type(&self) -> BufferType;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the element data in bytes.
    fn size_in_bytes(&self) -> usize;

    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// A gradient (or other) shader attached to a paint.
pub trait RenderShader {
    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// Paint state used for one fill or stroke.
pub trait RenderPaint {
    /// Set fill or stroke.
    fn set_style(&mut self, style: PaintStyle);
    /// Set the solid color.
    fn set_color(&mut self, color: ColorInt);
    /// Set the stroke thickness.
    fn set_thickness(&mut self, thickness: f32);
    /// Set the stroke join.
    fn set_join(&mut self, join: StrokeJoin);
    /// Set the stroke cap.
    fn set_cap(&mut self, cap: StrokeCap);
    /// Set the compositing mode.
    fn set_blend_mode(&mut self, blend_mode: BlendMode);
    /// Attach or clear a shader. A shader overrides the solid color.
    fn set_shader(&mut self, shader: Option<Rc<dyn RenderShader>>);
    /// Drop any cached stroke geometry derived from this paint.
    fn invalidate_stroke(&mut self);
    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// A path prepared for a specific backend.
pub trait RenderPath {
    /// Remove all geometry.
    fn rewind(&mut self);
    /// Current fill rule.
    fn fill_rule(&self) -> FillRule;
    /// Change the fill rule.
    fn set_fill_rule(&mut self, fill_rule: FillRule);
    /// Append raw geometry.
    fn add_raw_path(&mut self, raw: &RawPath);
    /// Whether the path has no drawable geometry.
    fn is_empty(&self) -> bool;
    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// A decoded bitmap.
pub trait RenderImage {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// A registered font face.
pub trait Font {
    /// Family name reported by the font system.
    fn family(&self) -> &str;
    /// Design units per em.
    fn units_per_em(&self) -> u16;
    /// Ascender in design units.
    fn ascender(&self) -> i16;
    /// Descender in design units (usually negative).
    fn descender(&self) -> i16;
    /// Downcast support for backends.
    fn as_any(&self) -> &dyn Any;
}

/// Single entry point for constructing renderer resources.
///
/// Decode failures are reported as `None`; callers treat that as
/// "no image" / "no font".
pub trait Factory {
    /// Build a 16-bit index buffer.
    fn make_buffer_u16(&self, data: &[u16]) -> Rc<dyn RenderBuffer>;

    /// Build a 32-bit index buffer.
    fn make_buffer_u32(&self, data: &[u32]) -> Rc<dyn RenderBuffer>;

    /// Build a float vertex buffer.
    fn make_buffer_f32(&self, data: &[f32]) -> Rc<dyn RenderBuffer>;

    /// Build a linear gradient from `(sx, sy)` to `(ex, ey)`.
    ///
    /// `colors` and `stops` are paired by position.
    fn make_linear_gradient(
        &self,
        sx: f32,
        sy: f32,
        ex: f32,
        ey: f32,
        colors: &[ColorInt],
        stops: &[f32],
    ) -> Rc<dyn RenderShader>;

    /// Build a radial gradient around `(cx, cy)`.
    fn make_radial_gradient(
        &self,
        cx: f32,
        cy: f32,
        radius: f32,
        colors: &[ColorInt],
        stops: &[f32],
    ) -> Rc<dyn RenderShader>;

    /// Build a backend path from raw geometry.
    fn make_render_path(&self, raw: &RawPath, fill_rule: FillRule) -> Box<dyn RenderPath>;

    /// Build a path with no geometry.
    fn make_empty_render_path(&self) -> Box<dyn RenderPath>;

    /// Build a paint in its default state.
    fn make_render_paint(&self) -> Box<dyn RenderPaint>;

    /// Decode encoded image bytes.
    fn decode_image(&self, bytes: &[u8]) -> Option<Rc<dyn RenderImage>>;

    /// Register encoded font bytes with the font system.
    fn decode_font(&self, bytes: &[u8]) -> Option<Rc<dyn Font>>;
}

/// Draw sink for one frame.
///
/// Artboards emit their geometry through this trait; each backend provides
/// its own implementation.
pub trait Renderer {
    /// Push the current transform and clip.
    fn save(&mut self);
    /// Pop the last saved transform and clip.
    fn restore(&mut self);
    /// Concatenate `transform` onto the current transform.
    fn transform(&mut self, transform: &Mat2D);
    /// Fill or stroke a path.
    fn draw_path(&mut self, path: &dyn RenderPath, paint: &dyn RenderPaint);
    /// Intersect the clip with a path.
    fn clip_path(&mut self, path: &dyn RenderPath);
    /// Draw an image with its top-left corner at the origin.
    fn draw_image(&mut self, image: &dyn RenderImage, blend_mode: BlendMode, opacity: f32);
}
