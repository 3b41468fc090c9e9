//! Backend-shared render resources: paints, gradients and buffers.

use std::any::Any;
use std::rc::Rc;

use bytemuck::Pod;
use rive_core::{
    BlendMode, BufferType, ColorInt, PaintStyle, RenderBuffer, RenderPaint, RenderShader,
    StrokeCap, StrokeJoin, Vec2D,
};

/// Geometry of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    /// Linear gradient between two points.
    Linear {
        /// Start point (offset 0).
        start: Vec2D,
        /// End point (offset 1).
        end: Vec2D,
    },
    /// Radial gradient around a center.
    Radial {
        /// Center (offset 0).
        center: Vec2D,
        /// Radius reaching offset 1.
        radius: f32,
    },
}

/// One color stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Stop color.
    pub color: ColorInt,
    /// Offset in `0..=1`.
    pub position: f32,
}

/// Gradient shader.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    kind: GradientKind,
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Pair `colors` with `stops` by position; extra entries are dropped.
    #[must_use]
    pub fn new(kind: GradientKind, colors: &[ColorInt], stops: &[f32]) -> Self {
        let stops = colors
            .iter()
            .zip(stops)
            .map(|(&color, &position)| GradientStop {
                color,
                position: position.clamp(0.0, 1.0),
            })
            .collect();
        Self { kind, stops }
    }

    /// Gradient geometry.
    #[must_use]
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Color stops in declaration order.
    #[must_use]
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color of the first stop, used by backends that draw flat colors.
    #[must_use]
    pub fn first_color(&self) -> Option<ColorInt> {
        self.stops.first().map(|stop| stop.color)
    }
}

impl RenderShader for Gradient {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Paint state shared by every backend.
#[derive(Clone)]
pub struct Paint {
    style: PaintStyle,
    color: ColorInt,
    thickness: f32,
    join: StrokeJoin,
    cap: StrokeCap,
    blend_mode: BlendMode,
    shader: Option<Rc<dyn RenderShader>>,
    stroke_generation: u64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            style: PaintStyle::Fill,
            color: 0xFF00_0000,
            thickness: 1.0,
            join: StrokeJoin::Miter,
            cap: StrokeCap::Butt,
            blend_mode: BlendMode::SrcOver,
            shader: None,
            stroke_generation: 0,
        }
    }
}

impl std::fmt::Debug for Paint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paint")
            .field("style", &self.style)
            .field("color", &format_args!("{:#010X}", self.color))
            .field("thickness", &self.thickness)
            .field("join", &self.join)
            .field("cap", &self.cap)
            .field("blend_mode", &self.blend_mode)
            .field("gradient", &self.gradient())
            .finish()
    }
}

impl Paint {
    /// Fill or stroke.
    #[must_use]
    pub fn style(&self) -> PaintStyle {
        self.style
    }

    /// Solid color.
    #[must_use]
    pub fn color(&self) -> ColorInt {
        self.color
    }

    /// Stroke thickness.
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Stroke join.
    #[must_use]
    pub fn join(&self) -> StrokeJoin {
        self.join
    }

    /// Stroke cap.
    #[must_use]
    pub fn cap(&self) -> StrokeCap {
        self.cap
    }

    /// Compositing mode.
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// The attached gradient, if the shader is one of ours.
    #[must_use]
    pub fn gradient(&self) -> Option<&Gradient> {
        self.shader
            .as_deref()
            .and_then(|shader| shader.as_any().downcast_ref::<Gradient>())
    }

    /// Bumped whenever stroke geometry derived from this paint goes stale.
    #[must_use]
    pub fn stroke_generation(&self) -> u64 {
        self.stroke_generation
    }

    /// Color to use when gradients are drawn flat.
    #[must_use]
    pub fn flat_color(&self) -> ColorInt {
        self.gradient()
            .and_then(Gradient::first_color)
            .unwrap_or(self.color)
    }
}

impl RenderPaint for Paint {
    fn set_style(&mut self, style: PaintStyle) {
        self.style = style;
    }

    fn set_color(&mut self, color: ColorInt) {
        self.color = color;
    }

    #[allow(clippy::float_cmp)]
    fn set_thickness(&mut self, thickness: f32) {
        if self.thickness != thickness {
            self.thickness = thickness;
            self.invalidate_stroke();
        }
    }

    fn set_join(&mut self, join: StrokeJoin) {
        if self.join != join {
            self.join = join;
            self.invalidate_stroke();
        }
    }

    fn set_cap(&mut self, cap: StrokeCap) {
        if self.cap != cap {
            self.cap = cap;
            self.invalidate_stroke();
        }
    }

    fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
    }

    fn set_shader(&mut self, shader: Option<Rc<dyn RenderShader>>) {
        if shader
            .as_deref()
            .is_some_and(|s| s.as_any().downcast_ref::<Gradient>().is_none())
        {
            tracing::warn!("Foreign shader attached to paint; drawing with solid color");
        }
        self.shader = shader;
    }

    fn invalidate_stroke(&mut self) {
        self.stroke_generation = self.stroke_generation.wrapping_add(1);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Element types a [`Buffer`] can hold.
pub trait BufferElement: Pod {
    /// Matching core buffer type.
    const BUFFER_TYPE: BufferType;
}

impl BufferElement for u16 {
    const BUFFER_TYPE: BufferType = BufferType::U16;
}

impl BufferElement for u32 {
    const BUFFER_TYPE: BufferType = BufferType::U32;
}

impl BufferElement for f32 {
    const BUFFER_TYPE: BufferType = BufferType::F32;
}

/// Vertex or index data kept on the CPU until a backend uploads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T: BufferElement> {
    data: Vec<T>,
}

impl<T: BufferElement> Buffer<T> {
    /// Copy `data` into a new buffer.
    #[must_use]
    pub fn new(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Element data.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T: BufferElement> RenderBuffer for Buffer<T> {
    fn buffer_type(&self) -> BufferType {
        T::BUFFER_TYPE
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of_val(self.data.as_slice())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_zips_to_shorter() {
        let gradient = Gradient::new(
            GradientKind::Radial {
                center: Vec2D::new(0.0, 0.0),
                radius: 10.0,
            },
            &[0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF],
            &[0.0, 1.0],
        );
        assert_eq!(gradient.stops().len(), 2);
        assert_eq!(gradient.first_color(), Some(0xFFFF_0000));
    }

    #[test]
    fn test_paint_defaults() {
        let paint = Paint::default();
        assert_eq!(paint.style(), PaintStyle::Fill);
        assert_eq!(paint.color(), 0xFF00_0000);
        assert!((paint.thickness() - 1.0).abs() < f32::EPSILON);
        assert_eq!(paint.join(), StrokeJoin::Miter);
        assert_eq!(paint.cap(), StrokeCap::Butt);
        assert_eq!(paint.blend_mode(), BlendMode::SrcOver);
        assert!(paint.gradient().is_none());
    }

    #[test]
    fn test_stroke_changes_bump_generation() {
        let mut paint = Paint::default();
        paint.set_thickness(1.0);
        assert_eq!(paint.stroke_generation(), 0);
        paint.set_thickness(3.0);
        paint.set_join(StrokeJoin::Round);
        assert_eq!(paint.stroke_generation(), 2);
        paint.invalidate_stroke();
        assert_eq!(paint.stroke_generation(), 3);
    }

    #[test]
    fn test_flat_color_prefers_gradient() {
        let mut paint = Paint::default();
        paint.set_color(0xFF12_3456);
        assert_eq!(paint.flat_color(), 0xFF12_3456);
        let gradient = Gradient::new(
            GradientKind::Linear {
                start: Vec2D::new(0.0, 0.0),
                end: Vec2D::new(1.0, 0.0),
            },
            &[0xFFAB_CDEF],
            &[0.0],
        );
        paint.set_shader(Some(Rc::new(gradient)));
        assert_eq!(paint.flat_color(), 0xFFAB_CDEF);
    }

    #[test]
    fn test_buffer_sizes() {
        let buffer = Buffer::new(&[1u16, 2, 3]);
        assert_eq!(buffer.buffer_type(), BufferType::U16);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.size_in_bytes(), 6);
        assert_eq!(buffer.as_bytes().len(), 6);

        let floats = Buffer::new(&[0.5f32; 4]);
        assert_eq!(floats.buffer_type(), BufferType::F32);
        assert_eq!(floats.size_in_bytes(), 16);
    }
}
