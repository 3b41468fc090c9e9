//! Backend-neutral path geometry.
//!
//! A [`RawPath`] is the plain command list handed to
//! [`Factory::make_render_path`](crate::Factory::make_render_path); backends
//! convert it into whatever representation they rasterize from.

use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Mat2D, Vec2D};

/// Cubic approximation constant for quarter circles.
const CIRCLE_CONSTANT: f32 = 0.552_284_8;

/// Fill rule used when filling a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    /// Non-zero winding.
    #[default]
    NonZero,
    /// Even-odd.
    EvenOdd,
}

/// A single path command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)] // Field names are the usual control/end point coordinates
pub enum PathCommand {
    /// Start a new contour.
    MoveTo { x: f32, y: f32 },
    /// Straight line to a point.
    LineTo { x: f32, y: f32 },
    /// Quadratic curve.
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    /// Cubic curve.
    CubicTo {
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    },
    /// Close the current contour.
    Close,
}

impl PathCommand {
    /// All points referenced by the command, end point last.
    fn points(&self) -> impl Iterator<Item = Vec2D> {
        let points: [Option<Vec2D>; 3] = match *self {
            Self::MoveTo { x, y } | Self::LineTo { x, y } => [Some(Vec2D::new(x, y)), None, None],
            Self::QuadTo { cx, cy, x, y } => [Some(Vec2D::new(cx, cy)), Some(Vec2D::new(x, y)), None],
            Self::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => [
                Some(Vec2D::new(c1x, c1y)),
                Some(Vec2D::new(c2x, c2y)),
                Some(Vec2D::new(x, y)),
            ],
            Self::Close => [None, None, None],
        };
        points.into_iter().flatten()
    }

    /// The command with every point mapped through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Mat2D) -> Self {
        let t = |x: f32, y: f32| transform.transform_point(Vec2D::new(x, y));
        match *self {
            Self::MoveTo { x, y } => {
                let p = t(x, y);
                Self::MoveTo { x: p.x, y: p.y }
            }
            Self::LineTo { x, y } => {
                let p = t(x, y);
                Self::LineTo { x: p.x, y: p.y }
            }
            Self::QuadTo { cx, cy, x, y } => {
                let c = t(cx, cy);
                let p = t(x, y);
                Self::QuadTo {
                    cx: c.x,
                    cy: c.y,
                    x: p.x,
                    y: p.y,
                }
            }
            Self::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                let c1 = t(c1x, c1y);
                let c2 = t(c2x, c2y);
                let p = t(x, y);
                Self::CubicTo {
                    c1x: c1.x,
                    c1y: c1.y,
                    c2x: c2.x,
                    c2y: c2.y,
                    x: p.x,
                    y: p.y,
                }
            }
            Self::Close => Self::Close,
        }
    }
}

/// An ordered list of path commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPath {
    commands: Vec<PathCommand>,
}

impl RawPath {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from existing commands.
    #[must_use]
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    /// The commands of this path.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Whether the path has no drawable commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self
            .commands
            .iter()
            .any(|c| !matches!(c, PathCommand::MoveTo { .. } | PathCommand::Close))
    }

    /// Remove all commands.
    pub fn rewind(&mut self) {
        self.commands.clear();
    }

    /// Append all commands of another path.
    pub fn extend_from(&mut self, other: &RawPath) {
        self.commands.extend_from_slice(&other.commands);
    }

    /// Start a new contour.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo { x, y });
    }

    /// Add a line segment.
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo { x, y });
    }

    /// Add a quadratic segment.
    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.commands.push(PathCommand::QuadTo { cx, cy, x, y });
    }

    /// Add a cubic segment.
    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.commands.push(PathCommand::CubicTo {
            c1x,
            c1y,
            c2x,
            c2y,
            x,
            y,
        });
    }

    /// Close the current contour.
    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    /// Add a closed rectangle.
    pub fn add_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close();
    }

    /// Add a closed rectangle with circular corners.
    ///
    /// The radius is clamped to half the shorter side.
    pub fn add_rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let r = radius.min(width.abs() / 2.0).min(height.abs() / 2.0).max(0.0);
        if r <= 0.0 {
            self.add_rect(x, y, width, height);
            return;
        }
        let k = r * (1.0 - CIRCLE_CONSTANT);
        let (right, bottom) = (x + width, y + height);
        self.move_to(x + r, y);
        self.line_to(right - r, y);
        self.cubic_to(right - k, y, right, y + k, right, y + r);
        self.line_to(right, bottom - r);
        self.cubic_to(right, bottom - k, right - k, bottom, right - r, bottom);
        self.line_to(x + r, bottom);
        self.cubic_to(x + k, bottom, x, bottom - k, x, bottom - r);
        self.line_to(x, y + r);
        self.cubic_to(x, y + k, x + k, y, x + r, y);
        self.close();
    }

    /// Add a closed ellipse centered at `(cx, cy)`.
    pub fn add_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        let ox = rx * CIRCLE_CONSTANT;
        let oy = ry * CIRCLE_CONSTANT;
        self.move_to(cx, cy - ry);
        self.cubic_to(cx + ox, cy - ry, cx + rx, cy - oy, cx + rx, cy);
        self.cubic_to(cx + rx, cy + oy, cx + ox, cy + ry, cx, cy + ry);
        self.cubic_to(cx - ox, cy + ry, cx - rx, cy + oy, cx - rx, cy);
        self.cubic_to(cx - rx, cy - oy, cx - ox, cy - ry, cx, cy - ry);
        self.close();
    }

    /// A copy of the path with every point mapped through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Mat2D) -> Self {
        Self {
            commands: self
                .commands
                .iter()
                .map(|c| c.transformed(transform))
                .collect(),
        }
    }

    /// Bounds of all points, including control points.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.commands.iter().flat_map(PathCommand::points))
    }
}
