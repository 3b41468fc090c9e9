//! Backend implementations.
//!
//! ```text
//! RawPath ──► PainterPath  (tiny-skia path)       ──► PainterRenderer
//!         ├─► OpenGlPath   (lyon triangle list)   ──► OpenGlDrawList
//!         └─► GpuPath      (lyon indexed mesh)    ──► wgpu buffers
//! ```
//!
//! The triangle-based backends share the lyon tessellation helpers below.

pub mod gpu;
pub mod opengl;
pub mod painter;

use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, StrokeOptions, StrokeTessellator,
    StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::PathEvent;
use rive_core::{FillRule, Mat2D, PathCommand, RawPath, StrokeCap, StrokeJoin, Vec2D};

use crate::error::{RenderError, RenderResult};

/// Indexed triangle mesh produced by tessellation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions in path space.
    pub vertices: Vec<[f32; 2]>,
    /// Triangle indices, three per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Expand into a flat triangle list.
    #[must_use]
    pub fn to_triangle_list(&self) -> Vec<[f32; 2]> {
        self.indices
            .iter()
            .filter_map(|&i| self.vertices.get(i as usize).copied())
            .collect()
    }
}

/// Stroke parameters used for stroke tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Line width.
    pub thickness: f32,
    /// Corner style.
    pub join: StrokeJoin,
    /// End style.
    pub cap: StrokeCap,
}

fn begin_if_needed(events: &mut Vec<PathEvent>, first: &mut Option<Vec2D>, at: Vec2D) {
    if first.is_none() {
        events.push(PathEvent::Begin {
            at: point(at.x, at.y),
        });
        *first = Some(at);
    }
}

/// Convert a raw path into lyon path events.
///
/// Drawing commands before any move start a contour at the current point.
fn path_events(raw: &RawPath) -> Vec<PathEvent> {
    let mut events = Vec::new();
    let mut first: Option<Vec2D> = None;
    let mut current = Vec2D::new(0.0, 0.0);

    for command in raw.commands() {
        match *command {
            PathCommand::MoveTo { x, y } => {
                if let Some(start) = first.take() {
                    events.push(PathEvent::End {
                        last: point(current.x, current.y),
                        first: point(start.x, start.y),
                        close: false,
                    });
                }
                current = Vec2D::new(x, y);
                begin_if_needed(&mut events, &mut first, current);
            }
            PathCommand::LineTo { x, y } => {
                begin_if_needed(&mut events, &mut first, current);
                events.push(PathEvent::Line {
                    from: point(current.x, current.y),
                    to: point(x, y),
                });
                current = Vec2D::new(x, y);
            }
            PathCommand::QuadTo { cx, cy, x, y } => {
                begin_if_needed(&mut events, &mut first, current);
                events.push(PathEvent::Quadratic {
                    from: point(current.x, current.y),
                    ctrl: point(cx, cy),
                    to: point(x, y),
                });
                current = Vec2D::new(x, y);
            }
            PathCommand::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                begin_if_needed(&mut events, &mut first, current);
                events.push(PathEvent::Cubic {
                    from: point(current.x, current.y),
                    ctrl1: point(c1x, c1y),
                    ctrl2: point(c2x, c2y),
                    to: point(x, y),
                });
                current = Vec2D::new(x, y);
            }
            PathCommand::Close => {
                if let Some(start) = first.take() {
                    events.push(PathEvent::End {
                        last: point(current.x, current.y),
                        first: point(start.x, start.y),
                        close: true,
                    });
                    current = start;
                }
            }
        }
    }

    if let Some(start) = first {
        events.push(PathEvent::End {
            last: point(current.x, current.y),
            first: point(start.x, start.y),
            close: false,
        });
    }
    events
}

/// Tessellate the interior of a path.
///
/// # Errors
///
/// Returns an error if lyon rejects the geometry.
pub fn tessellate_fill(raw: &RawPath, fill_rule: FillRule, tolerance: f32) -> RenderResult<Mesh> {
    let events = path_events(raw);
    if events.is_empty() {
        return Ok(Mesh::default());
    }

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    let options = FillOptions::default()
        .with_tolerance(tolerance)
        .with_fill_rule(match fill_rule {
            FillRule::NonZero => lyon::lyon_tessellation::FillRule::NonZero,
            FillRule::EvenOdd => lyon::lyon_tessellation::FillRule::EvenOdd,
        });

    tessellator
        .tessellate(
            events.iter().cloned(),
            &options,
            &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        )
        .map_err(|e| RenderError::Tessellation(format!("fill: {e:?}")))?;

    Ok(Mesh {
        vertices: geometry.vertices,
        indices: geometry.indices,
    })
}

/// Tessellate the outline of a path.
///
/// # Errors
///
/// Returns an error if lyon rejects the geometry.
pub fn tessellate_stroke(raw: &RawPath, style: StrokeStyle, tolerance: f32) -> RenderResult<Mesh> {
    let events = path_events(raw);
    if events.is_empty() || style.thickness <= 0.0 {
        return Ok(Mesh::default());
    }

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = StrokeTessellator::new();

    let options = StrokeOptions::default()
        .with_line_width(style.thickness)
        .with_tolerance(tolerance)
        .with_line_cap(match style.cap {
            StrokeCap::Butt => lyon::lyon_tessellation::LineCap::Butt,
            StrokeCap::Round => lyon::lyon_tessellation::LineCap::Round,
            StrokeCap::Square => lyon::lyon_tessellation::LineCap::Square,
        })
        .with_line_join(match style.join {
            StrokeJoin::Miter => lyon::lyon_tessellation::LineJoin::Miter,
            StrokeJoin::Round => lyon::lyon_tessellation::LineJoin::Round,
            StrokeJoin::Bevel => lyon::lyon_tessellation::LineJoin::Bevel,
        });

    tessellator
        .tessellate(
            events.iter().cloned(),
            &options,
            &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex| {
                vertex.position().to_array()
            }),
        )
        .map_err(|e| RenderError::Tessellation(format!("stroke: {e:?}")))?;

    Ok(Mesh {
        vertices: geometry.vertices,
        indices: geometry.indices,
    })
}

/// Apply `transform` to a mesh position.
pub(crate) fn transform_position(transform: &Mat2D, position: [f32; 2]) -> [f32; 2] {
    let p = transform.transform_point(Vec2D::new(position[0], position[1]));
    [p.x, p.y]
}
