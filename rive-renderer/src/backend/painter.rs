//! Software painter backend on top of tiny-skia.
//!
//! [`PainterPath`] keeps both the raw commands and the tiny-skia path built
//! from them. [`PainterRenderer`] rasterizes into a [`Pixmap`] and supports
//! solid and gradient paints, strokes, blend modes, clipping and images.

use std::any::Any;

use rive_core::color::{color_alpha, color_blue, color_green, color_red};
use rive_core::{
    BlendMode, ColorInt, FillRule, Mat2D, PaintStyle, PathCommand, RawPath, RenderImage,
    RenderPaint, RenderPath, Renderer, StrokeCap, StrokeJoin,
};
use tiny_skia::{
    FilterQuality, GradientStop, IntSize, LinearGradient, Mask, Pixmap, PixmapPaint, Point,
    RadialGradient, Shader, SpreadMode, Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::image::DecodedImage;
use crate::resources::{Gradient, GradientKind, Paint};

/// Path for the painter backend.
#[derive(Debug, Clone, Default)]
pub struct PainterPath {
    raw: RawPath,
    fill_rule: FillRule,
    path: Option<tiny_skia::Path>,
}

impl PainterPath {
    /// Build from raw geometry.
    #[must_use]
    pub fn new(raw: &RawPath, fill_rule: FillRule) -> Self {
        let mut path = Self {
            raw: raw.clone(),
            fill_rule,
            path: None,
        };
        path.rebuild();
        path
    }

    /// The tiny-skia path, `None` when the geometry is empty or degenerate.
    #[must_use]
    pub fn skia_path(&self) -> Option<&tiny_skia::Path> {
        self.path.as_ref()
    }

    /// The raw commands.
    #[must_use]
    pub fn raw(&self) -> &RawPath {
        &self.raw
    }

    fn rebuild(&mut self) {
        let mut builder = tiny_skia::PathBuilder::new();
        for command in self.raw.commands() {
            match *command {
                PathCommand::MoveTo { x, y } => builder.move_to(x, y),
                PathCommand::LineTo { x, y } => builder.line_to(x, y),
                PathCommand::QuadTo { cx, cy, x, y } => builder.quad_to(cx, cy, x, y),
                PathCommand::CubicTo {
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                    x,
                    y,
                } => builder.cubic_to(c1x, c1y, c2x, c2y, x, y),
                PathCommand::Close => builder.close(),
            }
        }
        self.path = builder.finish();
    }
}

impl RenderPath for PainterPath {
    fn rewind(&mut self) {
        self.raw.rewind();
        self.path = None;
    }

    fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }

    fn add_raw_path(&mut self, raw: &RawPath) {
        self.raw.extend_from(raw);
        self.rebuild();
    }

    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone)]
struct PainterState {
    transform: Mat2D,
    clip: Option<Mask>,
}

/// Renderer drawing into an owned [`Pixmap`].
pub struct PainterRenderer {
    pixmap: Pixmap,
    state: PainterState,
    stack: Vec<PainterState>,
}

impl std::fmt::Debug for PainterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PainterRenderer")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("depth", &self.stack.len())
            .field("clipped", &self.state.clip.is_some())
            .finish()
    }
}

impl PainterRenderer {
    /// Create a transparent target of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Surface(format!("invalid painter target size {width}x{height}"))
        })?;
        Ok(Self {
            pixmap,
            state: PainterState {
                transform: Mat2D::IDENTITY,
                clip: None,
            },
            stack: Vec::new(),
        })
    }

    /// Target width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Target height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fill the whole target and reset transform, clip and save stack.
    pub fn clear(&mut self, color: ColorInt) {
        self.pixmap.fill(skia_color(color));
        self.stack.clear();
        self.state = PainterState {
            transform: Mat2D::IDENTITY,
            clip: None,
        };
    }

    /// The rendered pixels.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Un-premultiplied color of one pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorInt> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(
            (u32::from(color.alpha()) << 24)
                | (u32::from(color.red()) << 16)
                | (u32::from(color.green()) << 8)
                | u32::from(color.blue()),
        )
    }

    /// Encode the target as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Surface(format!("PNG encoding failed: {e}")))
    }

    fn skia_transform(&self) -> Transform {
        let m = &self.state.transform.0;
        Transform::from_row(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    fn skia_paint(paint: &Paint) -> tiny_skia::Paint<'static> {
        let mut skia = tiny_skia::Paint {
            blend_mode: skia_blend_mode(paint.blend_mode()),
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        skia.shader = paint
            .gradient()
            .and_then(gradient_shader)
            .unwrap_or_else(|| Shader::SolidColor(skia_color(paint.color())));
        skia
    }
}

fn skia_color(color: ColorInt) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(
        color_red(color),
        color_green(color),
        color_blue(color),
        color_alpha(color),
    )
}

fn skia_fill_rule(fill_rule: FillRule) -> tiny_skia::FillRule {
    match fill_rule {
        FillRule::NonZero => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}

fn skia_blend_mode(blend_mode: BlendMode) -> tiny_skia::BlendMode {
    match blend_mode {
        BlendMode::SrcOver => tiny_skia::BlendMode::SourceOver,
        BlendMode::Screen => tiny_skia::BlendMode::Screen,
        BlendMode::Overlay => tiny_skia::BlendMode::Overlay,
        BlendMode::Darken => tiny_skia::BlendMode::Darken,
        BlendMode::Lighten => tiny_skia::BlendMode::Lighten,
        BlendMode::ColorDodge => tiny_skia::BlendMode::ColorDodge,
        BlendMode::ColorBurn => tiny_skia::BlendMode::ColorBurn,
        BlendMode::HardLight => tiny_skia::BlendMode::HardLight,
        BlendMode::SoftLight => tiny_skia::BlendMode::SoftLight,
        BlendMode::Difference => tiny_skia::BlendMode::Difference,
        BlendMode::Exclusion => tiny_skia::BlendMode::Exclusion,
        BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
        BlendMode::Hue => tiny_skia::BlendMode::Hue,
        BlendMode::Saturation => tiny_skia::BlendMode::Saturation,
        BlendMode::Color => tiny_skia::BlendMode::Color,
        BlendMode::Luminosity => tiny_skia::BlendMode::Luminosity,
    }
}

fn gradient_shader(gradient: &Gradient) -> Option<Shader<'static>> {
    let stops: Vec<GradientStop> = gradient
        .stops()
        .iter()
        .map(|stop| GradientStop::new(stop.position, skia_color(stop.color)))
        .collect();
    match gradient.kind() {
        GradientKind::Linear { start, end } => LinearGradient::new(
            Point::from_xy(start.x, start.y),
            Point::from_xy(end.x, end.y),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ),
        GradientKind::Radial { center, radius } => {
            let center = Point::from_xy(center.x, center.y);
            RadialGradient::new(
                center,
                center,
                radius,
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    }
}

impl Renderer for PainterRenderer {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        } else {
            tracing::warn!("Painter restore without matching save");
        }
    }

    fn transform(&mut self, transform: &Mat2D) {
        self.state.transform = self.state.transform * *transform;
    }

    fn draw_path(&mut self, path: &dyn RenderPath, paint: &dyn RenderPaint) {
        let Some(path) = path.as_any().downcast_ref::<PainterPath>() else {
            tracing::warn!("Painter renderer received a foreign path; skipping draw");
            return;
        };
        let Some(paint) = paint.as_any().downcast_ref::<Paint>() else {
            tracing::warn!("Painter renderer received a foreign paint; skipping draw");
            return;
        };
        let Some(skia_path) = path.skia_path() else {
            return;
        };

        let skia_paint = Self::skia_paint(paint);
        let transform = self.skia_transform();
        let mask = self.state.clip.as_ref();
        match paint.style() {
            PaintStyle::Fill => {
                self.pixmap.fill_path(
                    skia_path,
                    &skia_paint,
                    skia_fill_rule(path.fill_rule()),
                    transform,
                    mask,
                );
            }
            PaintStyle::Stroke => {
                if paint.thickness() <= 0.0 {
                    return;
                }
                let stroke = Stroke {
                    width: paint.thickness(),
                    line_cap: match paint.cap() {
                        StrokeCap::Butt => tiny_skia::LineCap::Butt,
                        StrokeCap::Round => tiny_skia::LineCap::Round,
                        StrokeCap::Square => tiny_skia::LineCap::Square,
                    },
                    line_join: match paint.join() {
                        StrokeJoin::Miter => tiny_skia::LineJoin::Miter,
                        StrokeJoin::Round => tiny_skia::LineJoin::Round,
                        StrokeJoin::Bevel => tiny_skia::LineJoin::Bevel,
                    },
                    ..Stroke::default()
                };
                self.pixmap
                    .stroke_path(skia_path, &skia_paint, &stroke, transform, mask);
            }
        }
    }

    fn clip_path(&mut self, path: &dyn RenderPath) {
        let Some(path) = path.as_any().downcast_ref::<PainterPath>() else {
            tracing::warn!("Painter renderer received a foreign clip path; skipping clip");
            return;
        };
        let transform = self.skia_transform();
        let fill_rule = skia_fill_rule(path.fill_rule());
        let clip = match (self.state.clip.take(), path.skia_path()) {
            (Some(mut mask), Some(skia_path)) => {
                mask.intersect_path(skia_path, fill_rule, true, transform);
                Some(mask)
            }
            (None, Some(skia_path)) => Mask::new(self.pixmap.width(), self.pixmap.height())
                .map(|mut mask| {
                    mask.fill_path(skia_path, fill_rule, true, transform);
                    mask
                }),
            // An empty clip hides everything.
            (_, None) => Mask::new(self.pixmap.width(), self.pixmap.height()),
        };
        self.state.clip = clip;
    }

    fn draw_image(&mut self, image: &dyn RenderImage, blend_mode: BlendMode, opacity: f32) {
        let Some(image) = image.as_any().downcast_ref::<DecodedImage>() else {
            tracing::warn!("Painter renderer received a foreign image; skipping draw");
            return;
        };
        let Some(size) = IntSize::from_wh(image.width(), image.height()) else {
            return;
        };
        let Some(source) = Pixmap::from_vec(image.premultiplied(), size) else {
            tracing::warn!("Image pixels do not match its size; skipping draw");
            return;
        };
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode: skia_blend_mode(blend_mode),
            quality: FilterQuality::Bilinear,
        };
        let transform = self.skia_transform();
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            transform,
            self.state.clip.as_ref(),
        );
    }
}
