//! OpenGL backend resources.
//!
//! Paths are tessellated into flat triangle lists with lyon when their
//! geometry changes. [`OpenGlDrawList`] records what a GL scene pass would
//! upload: transformed triangles with one flat RGBA color per draw, plus
//! nested clip regions for stencil setup.

use std::any::Any;
use std::cell::RefCell;

use rive_core::color::color_to_rgba_f32;
use rive_core::{
    BlendMode, FillRule, Mat2D, PaintStyle, RawPath, RenderImage, RenderPaint, RenderPath,
    Renderer, StrokeCap, StrokeJoin,
};

use super::{tessellate_fill, tessellate_stroke, transform_position, StrokeStyle};
use crate::resources::Paint;

#[derive(Debug, Clone, Copy, PartialEq)]
struct StrokeKey {
    thickness: f32,
    join: StrokeJoin,
    cap: StrokeCap,
    generation: u64,
}

/// Path for the OpenGL backend.
#[derive(Debug, Default)]
pub struct OpenGlPath {
    raw: RawPath,
    fill_rule: FillRule,
    tolerance: f32,
    triangles: Vec<[f32; 2]>,
    stroke: RefCell<Option<(StrokeKey, Vec<[f32; 2]>)>>,
}

impl OpenGlPath {
    /// Build and tessellate raw geometry.
    #[must_use]
    pub fn new(raw: &RawPath, fill_rule: FillRule, tolerance: f32) -> Self {
        let mut path = Self {
            raw: raw.clone(),
            fill_rule,
            tolerance,
            ..Self::default()
        };
        path.retessellate();
        path
    }

    /// Fill triangles as a flat list, three vertices per triangle.
    #[must_use]
    pub fn triangles(&self) -> &[[f32; 2]] {
        &self.triangles
    }

    /// Stroke triangles for `paint`, reusing the cached tessellation when
    /// the stroke parameters are unchanged.
    #[must_use]
    pub fn stroke_triangles(&self, paint: &Paint) -> Vec<[f32; 2]> {
        let key = StrokeKey {
            thickness: paint.thickness(),
            join: paint.join(),
            cap: paint.cap(),
            generation: paint.stroke_generation(),
        };
        let mut cache = self.stroke.borrow_mut();
        if let Some((cached_key, triangles)) = cache.as_ref() {
            if *cached_key == key {
                return triangles.clone();
            }
        }
        let style = StrokeStyle {
            thickness: key.thickness,
            join: key.join,
            cap: key.cap,
        };
        let triangles = match tessellate_stroke(&self.raw, style, self.tolerance) {
            Ok(mesh) => mesh.to_triangle_list(),
            Err(e) => {
                tracing::warn!("{e}");
                Vec::new()
            }
        };
        *cache = Some((key, triangles.clone()));
        triangles
    }

    fn retessellate(&mut self) {
        self.stroke.replace(None);
        self.triangles = match tessellate_fill(&self.raw, self.fill_rule, self.tolerance) {
            Ok(mesh) => mesh.to_triangle_list(),
            Err(e) => {
                tracing::warn!("{e}");
                Vec::new()
            }
        };
    }
}

impl RenderPath for OpenGlPath {
    fn rewind(&mut self) {
        self.raw.rewind();
        self.triangles.clear();
        self.stroke.replace(None);
    }

    fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    fn set_fill_rule(&mut self, fill_rule: FillRule) {
        if self.fill_rule != fill_rule {
            self.fill_rule = fill_rule;
            self.retessellate();
        }
    }

    fn add_raw_path(&mut self, raw: &RawPath) {
        self.raw.extend_from(raw);
        self.retessellate();
    }

    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub enum GlDrawCommand {
    /// Colored triangles in target space.
    Triangles {
        /// Flat triangle list.
        vertices: Vec<[f32; 2]>,
        /// Normalized RGBA.
        color: [f32; 4],
        /// Compositing mode.
        blend_mode: BlendMode,
        /// Innermost active clip region.
        clip: Option<usize>,
    },
    /// Textured quad in target space.
    Image {
        /// Corners: top-left, top-right, bottom-right, bottom-left.
        corners: [[f32; 2]; 4],
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
        /// Opacity multiplier.
        opacity: f32,
        /// Compositing mode.
        blend_mode: BlendMode,
        /// Innermost active clip region.
        clip: Option<usize>,
    },
}

/// Clip region recorded by [`OpenGlDrawList`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlClipRegion {
    /// Flat triangle list in target space.
    pub vertices: Vec<[f32; 2]>,
    /// Enclosing region this one intersects with.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct GlState {
    transform: Mat2D,
    clip: Option<usize>,
}

impl Default for GlState {
    fn default() -> Self {
        Self {
            transform: Mat2D::IDENTITY,
            clip: None,
        }
    }
}

/// Renderer recording OpenGL draw batches.
#[derive(Debug, Default)]
pub struct OpenGlDrawList {
    commands: Vec<GlDrawCommand>,
    clips: Vec<GlClipRegion>,
    state: GlState,
    stack: Vec<GlState>,
}

impl OpenGlDrawList {
    /// Create an empty draw list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded draws in submission order.
    #[must_use]
    pub fn commands(&self) -> &[GlDrawCommand] {
        &self.commands
    }

    /// Recorded clip regions.
    #[must_use]
    pub fn clips(&self) -> &[GlClipRegion] {
        &self.clips
    }

    /// Total triangle vertices across all draws.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.commands
            .iter()
            .map(|command| match command {
                GlDrawCommand::Triangles { vertices, .. } => vertices.len(),
                GlDrawCommand::Image { .. } => 6,
            })
            .sum()
    }

    /// Drop everything recorded and reset the state.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.clips.clear();
        self.stack.clear();
        self.state = GlState::default();
    }

    fn to_target(&self, vertices: &[[f32; 2]]) -> Vec<[f32; 2]> {
        vertices
            .iter()
            .map(|&v| transform_position(&self.state.transform, v))
            .collect()
    }
}

impl Renderer for OpenGlDrawList {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        } else {
            tracing::warn!("OpenGL restore without matching save");
        }
    }

    fn transform(&mut self, transform: &Mat2D) {
        self.state.transform = self.state.transform * *transform;
    }

    fn draw_path(&mut self, path: &dyn RenderPath, paint: &dyn RenderPaint) {
        let Some(path) = path.as_any().downcast_ref::<OpenGlPath>() else {
            tracing::warn!("OpenGL renderer received a foreign path; skipping draw");
            return;
        };
        let Some(paint) = paint.as_any().downcast_ref::<Paint>() else {
            tracing::warn!("OpenGL renderer received a foreign paint; skipping draw");
            return;
        };

        let vertices = match paint.style() {
            PaintStyle::Fill => self.to_target(path.triangles()),
            PaintStyle::Stroke => self.to_target(&path.stroke_triangles(paint)),
        };
        if vertices.is_empty() {
            return;
        }
        self.commands.push(GlDrawCommand::Triangles {
            vertices,
            color: color_to_rgba_f32(paint.flat_color()),
            blend_mode: paint.blend_mode(),
            clip: self.state.clip,
        });
    }

    fn clip_path(&mut self, path: &dyn RenderPath) {
        let Some(path) = path.as_any().downcast_ref::<OpenGlPath>() else {
            tracing::warn!("OpenGL renderer received a foreign clip path; skipping clip");
            return;
        };
        let vertices = self.to_target(path.triangles());
        self.clips.push(GlClipRegion {
            vertices,
            parent: self.state.clip,
        });
        self.state.clip = Some(self.clips.len() - 1);
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_image(&mut self, image: &dyn RenderImage, blend_mode: BlendMode, opacity: f32) {
        let (width, height) = (image.width(), image.height());
        let (w, h) = (width as f32, height as f32);
        let corners = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]
            .map(|corner| transform_position(&self.state.transform, corner));
        self.commands.push(GlDrawCommand::Image {
            corners,
            width,
            height,
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode,
            clip: self.state.clip,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> OpenGlPath {
        let mut raw = RawPath::new();
        raw.add_rect(0.0, 0.0, size, size);
        OpenGlPath::new(&raw, FillRule::NonZero, 0.1)
    }

    #[test]
    fn test_fill_is_flat_triangle_list() {
        let path = square(10.0);
        assert_eq!(path.triangles().len(), 6);
        assert_eq!(path.triangles().len() % 3, 0);
    }

    #[test]
    fn test_rewind_clears_geometry() {
        let mut path = square(10.0);
        path.rewind();
        assert!(path.is_empty());
        assert!(path.triangles().is_empty());
    }

    #[test]
    fn test_draw_records_transformed_batch() {
        let mut list = OpenGlDrawList::new();
        let mut paint = Paint::default();
        paint.set_color(0xFFFF_0000);

        list.save();
        list.transform(&Mat2D::from_translate(100.0, 0.0));
        list.draw_path(&square(10.0), &paint);
        list.restore();

        let [GlDrawCommand::Triangles {
            vertices, color, ..
        }] = list.commands()
        else {
            panic!("expected one triangle batch");
        };
        assert_eq!(*color, [1.0, 0.0, 0.0, 1.0]);
        assert!(vertices.iter().all(|v| v[0] >= 100.0 && v[0] <= 110.0));
    }

    #[test]
    fn test_stroke_uses_thickness_and_cache() {
        let path = square(10.0);
        let mut paint = Paint::default();
        paint.set_style(PaintStyle::Stroke);
        paint.set_thickness(2.0);

        let first = path.stroke_triangles(&paint);
        assert!(!first.is_empty());
        assert_eq!(path.stroke_triangles(&paint), first);

        paint.set_thickness(0.0);
        assert!(path.stroke_triangles(&paint).is_empty());
    }

    #[test]
    fn test_clip_regions_nest() {
        let mut list = OpenGlDrawList::new();
        list.save();
        list.clip_path(&square(50.0));
        list.clip_path(&square(20.0));
        list.draw_path(&square(10.0), &Paint::default());
        list.restore();
        list.draw_path(&square(10.0), &Paint::default());

        assert_eq!(list.clips()[1].parent, Some(0));
        let clips: Vec<_> = list
            .commands()
            .iter()
            .map(|c| match c {
                GlDrawCommand::Triangles { clip, .. } | GlDrawCommand::Image { clip, .. } => *clip,
            })
            .collect();
        assert_eq!(clips, [Some(1), None]);
    }
}
