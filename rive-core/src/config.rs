//! Player configuration.

use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Mat2D};

/// How an artboard is scaled into the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale uniformly so the artboard fits entirely.
    #[default]
    Contain,
    /// Scale uniformly so the artboard covers the viewport.
    Cover,
    /// Stretch to the viewport.
    Fill,
    /// No scaling.
    None,
}

impl Fit {
    /// Transform mapping `content` into `viewport`, centered.
    #[must_use]
    pub fn transform(self, content: Aabb, viewport: Aabb) -> Mat2D {
        let (cw, ch) = (content.width(), content.height());
        let (vw, vh) = (viewport.width(), viewport.height());
        if cw <= 0.0 || ch <= 0.0 {
            return Mat2D::IDENTITY;
        }
        let (sx, sy) = match self {
            Self::Contain => {
                let s = (vw / cw).min(vh / ch);
                (s, s)
            }
            Self::Cover => {
                let s = (vw / cw).max(vh / ch);
                (s, s)
            }
            Self::Fill => (vw / cw, vh / ch),
            Self::None => (1.0, 1.0),
        };
        let tx = viewport.min_x + (vw - cw * sx) / 2.0 - content.min_x * sx;
        let ty = viewport.min_y + (vh - ch * sy) / 2.0 - content.min_y * sy;
        Mat2D([sx, 0.0, 0.0, sy, tx, ty])
    }
}

/// Configuration for a [`Player`](crate::Player).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Whether pointer events reach state machine listeners.
    pub interactive: bool,
    /// Artboard selected after the first successful load.
    pub initial_artboard: Option<usize>,
    /// Name of the state machine preferred after the first load.
    pub initial_state_machine: Option<String>,
    /// Viewport width in host units.
    pub viewport_width: f32,
    /// Viewport height in host units.
    pub viewport_height: f32,
    /// Artboard fit.
    pub fit: Fit,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            initial_artboard: Some(0),
            initial_state_machine: None,
            viewport_width: 0.0,
            viewport_height: 0.0,
            fit: Fit::Contain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2D;

    #[test]
    fn test_contain_centers_letterboxed() {
        let content = Aabb::from_xywh(0.0, 0.0, 100.0, 50.0);
        let viewport = Aabb::from_xywh(0.0, 0.0, 200.0, 200.0);
        let t = Fit::Contain.transform(content, viewport);
        let p = t.transform_point(Vec2D::new(0.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-4);
        assert!((p.y - 50.0).abs() < 1e-4);
        let q = t.transform_point(Vec2D::new(100.0, 50.0));
        assert!((q.x - 200.0).abs() < 1e-4);
        assert!((q.y - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: PlayerConfig = serde_json::from_str("{}").unwrap();
        assert!(config.interactive);
        assert_eq!(config.initial_artboard, Some(0));
        assert_eq!(config.fit, Fit::Contain);
    }
}
