//! Mutable artboard instances.
//!
//! An [`ArtboardInstance`] is the per-use copy of an [`ArtboardDef`]: node
//! properties are animated in place, world transforms are recomputed on
//! every advance, and renderer resources are created lazily through the
//! document's [`Factory`] the first time a node is drawn.

use std::rc::Rc;

use crate::animation::LinearAnimationInstance;
use crate::color::{color_modulate_opacity, ColorInt};
use crate::document::{
    AnimationDef, ArtboardDef, Document, GeometryDef, GradientStopDef, NodeKind, NodeProperty,
    PaintDef, StateMachineDef, StrokeDef,
};
use crate::factory::{
    BlendMode, Factory, PaintStyle, RenderImage, RenderPaint, RenderPath, RenderShader, Renderer,
};
use crate::math::{Aabb, Mat2D, Vec2D};
use crate::path::{FillRule, RawPath};

/// Lazily created paint for a fill or a stroke.
struct PaintSlot {
    def: PaintDef,
    style: PaintStyle,
    stroke: Option<StrokeDef>,
    paint: Option<Box<dyn RenderPaint>>,
    /// Opacity the current shader was built with.
    shader_opacity: Option<f32>,
}

impl PaintSlot {
    fn fill(def: PaintDef) -> Self {
        Self {
            def,
            style: PaintStyle::Fill,
            stroke: None,
            paint: None,
            shader_opacity: None,
        }
    }

    fn stroke(def: StrokeDef) -> Self {
        Self {
            def: def.paint.clone(),
            style: PaintStyle::Stroke,
            stroke: Some(def),
            paint: None,
            shader_opacity: None,
        }
    }

    /// Bring the backend paint up to date for this frame.
    #[allow(clippy::float_cmp)]
    fn prepare(&mut self, factory: &dyn Factory, opacity: f32, blend_mode: BlendMode) -> &dyn RenderPaint {
        let paint = self.paint.get_or_insert_with(|| {
            let mut paint = factory.make_render_paint();
            paint.set_style(self.style);
            if let Some(stroke) = &self.stroke {
                paint.set_thickness(stroke.thickness);
                paint.set_join(stroke.join);
                paint.set_cap(stroke.cap);
            }
            paint
        });
        paint.set_blend_mode(blend_mode);
        match &self.def {
            PaintDef::Solid { color } => paint.set_color(color_modulate_opacity(*color, opacity)),
            PaintDef::LinearGradient { start, end, stops } => {
                if self.shader_opacity != Some(opacity) {
                    let (colors, positions) = gradient_stops(stops, opacity);
                    paint.set_shader(Some(factory.make_linear_gradient(
                        start[0],
                        start[1],
                        end[0],
                        end[1],
                        &colors,
                        &positions,
                    )));
                    self.shader_opacity = Some(opacity);
                }
            }
            PaintDef::RadialGradient {
                center,
                radius,
                stops,
            } => {
                if self.shader_opacity != Some(opacity) {
                    let (colors, positions) = gradient_stops(stops, opacity);
                    let shader: Rc<dyn RenderShader> = factory.make_radial_gradient(
                        center[0],
                        center[1],
                        *radius,
                        &colors,
                        &positions,
                    );
                    paint.set_shader(Some(shader));
                    self.shader_opacity = Some(opacity);
                }
            }
        }
        &**paint
    }
}

fn gradient_stops(stops: &[GradientStopDef], opacity: f32) -> (Vec<ColorInt>, Vec<f32>) {
    stops
        .iter()
        .map(|s| (color_modulate_opacity(s.color, opacity), s.position))
        .unzip()
}

struct ShapeInstance {
    geometry: GeometryDef,
    raw: RawPath,
    fill_rule: FillRule,
    path: Option<Box<dyn RenderPath>>,
    fill: Option<PaintSlot>,
    stroke: Option<PaintSlot>,
    blend_mode: BlendMode,
}

struct NestedInstance {
    artboard: ArtboardInstance,
    animation: Option<LinearAnimationInstance>,
}

enum NodeContent {
    Group,
    Shape(Box<ShapeInstance>),
    Image(Option<Rc<dyn RenderImage>>),
    Nested(Box<NestedInstance>),
}

struct NodeInstance {
    name: String,
    parent: Option<usize>,
    x: f32,
    y: f32,
    rotation: f32,
    scale_x: f32,
    scale_y: f32,
    opacity: f32,
    world_transform: Mat2D,
    render_opacity: f32,
    content: NodeContent,
}

/// A live, animatable copy of an artboard definition.
pub struct ArtboardInstance {
    def: Rc<ArtboardDef>,
    factory: Rc<dyn Factory>,
    nodes: Vec<NodeInstance>,
    clip: Option<Box<dyn RenderPath>>,
}

impl std::fmt::Debug for ArtboardInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtboardInstance")
            .field("name", &self.def.name)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl ArtboardInstance {
    /// Instantiate artboard `index` of `document`.
    ///
    /// Returns `None` when the index is out of range.
    #[must_use]
    pub fn new(document: &Document, index: usize) -> Option<Self> {
        let def = Rc::clone(document.artboard(index)?);
        let nodes = def
            .nodes
            .iter()
            .map(|node| {
                let t = node.transform;
                let content = match &node.kind {
                    NodeKind::Group => NodeContent::Group,
                    NodeKind::Shape(shape) => {
                        let (raw, fill_rule) = build_geometry(&shape.geometry);
                        NodeContent::Shape(Box::new(ShapeInstance {
                            geometry: shape.geometry.clone(),
                            raw,
                            fill_rule,
                            path: None,
                            fill: shape.fill.clone().map(PaintSlot::fill),
                            stroke: shape.stroke.clone().map(PaintSlot::stroke),
                            blend_mode: shape.blend_mode,
                        }))
                    }
                    NodeKind::Image { asset } => NodeContent::Image(document.image(*asset)),
                    NodeKind::NestedArtboard {
                        artboard,
                        animation,
                    } => match Self::new(document, *artboard) {
                        Some(nested) => {
                            let animation = animation
                                .and_then(|i| nested.animation(i))
                                .map(LinearAnimationInstance::new);
                            NodeContent::Nested(Box::new(NestedInstance {
                                artboard: nested,
                                animation,
                            }))
                        }
                        None => NodeContent::Group,
                    },
                };
                NodeInstance {
                    name: node.name.clone(),
                    parent: node.parent,
                    x: t.x,
                    y: t.y,
                    rotation: t.rotation,
                    scale_x: t.scale_x,
                    scale_y: t.scale_y,
                    opacity: node.opacity,
                    world_transform: Mat2D::IDENTITY,
                    render_opacity: 1.0,
                    content,
                }
            })
            .collect();

        let mut instance = Self {
            def,
            factory: Rc::clone(document.factory()),
            nodes,
            clip: None,
        };
        instance.update_transforms();
        tracing::debug!(
            "Instantiated artboard '{}' with {} nodes",
            instance.def.name,
            instance.nodes.len()
        );
        Some(instance)
    }

    /// Artboard name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Artboard width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.def.width
    }

    /// Artboard height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.def.height
    }

    /// Artboard bounds, origin at the top-left corner.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_xywh(0.0, 0.0, self.def.width, self.def.height)
    }

    /// The definition this instance was created from.
    #[must_use]
    pub fn def(&self) -> &Rc<ArtboardDef> {
        &self.def
    }

    /// Number of linear animations.
    #[must_use]
    pub fn animation_count(&self) -> usize {
        self.def.animations.len()
    }

    /// Linear animation definition by index.
    #[must_use]
    pub fn animation(&self, index: usize) -> Option<Rc<AnimationDef>> {
        self.def.animations.get(index).cloned()
    }

    /// Number of state machines.
    #[must_use]
    pub fn state_machine_count(&self) -> usize {
        self.def.state_machines.len()
    }

    /// State machine definition by index.
    #[must_use]
    pub fn state_machine(&self, index: usize) -> Option<Rc<StateMachineDef>> {
        self.def.state_machines.get(index).cloned()
    }

    /// Index of the state machine named `name`.
    #[must_use]
    pub fn state_machine_index(&self, name: &str) -> Option<usize> {
        self.def.state_machines.iter().position(|sm| sm.name == name)
    }

    /// State machine used when none is explicitly selected.
    #[must_use]
    pub fn default_state_machine_index(&self) -> Option<usize> {
        self.def.default_state_machine
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the first node named `name`.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Current local value of a node property.
    #[must_use]
    pub fn node_property(&self, node: usize, property: NodeProperty) -> Option<f32> {
        let n = self.nodes.get(node)?;
        Some(match property {
            NodeProperty::X => n.x,
            NodeProperty::Y => n.y,
            NodeProperty::Rotation => n.rotation,
            NodeProperty::ScaleX => n.scale_x,
            NodeProperty::ScaleY => n.scale_y,
            NodeProperty::Opacity => n.opacity,
        })
    }

    /// Set a node property. Takes effect in world space on the next advance.
    pub fn set_node_property(&mut self, node: usize, property: NodeProperty, value: f32) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        match property {
            NodeProperty::X => n.x = value,
            NodeProperty::Y => n.y = value,
            NodeProperty::Rotation => n.rotation = value,
            NodeProperty::ScaleX => n.scale_x = value,
            NodeProperty::ScaleY => n.scale_y = value,
            NodeProperty::Opacity => n.opacity = value,
        }
    }

    /// World transform of a node as of the last advance.
    #[must_use]
    pub fn world_transform(&self, node: usize) -> Option<Mat2D> {
        self.nodes.get(node).map(|n| n.world_transform)
    }

    /// Effective opacity of a node as of the last advance.
    #[must_use]
    pub fn render_opacity(&self, node: usize) -> Option<f32> {
        self.nodes.get(node).map(|n| n.render_opacity)
    }

    /// Advance nested artboards and recompute world transforms.
    ///
    /// Returns `true` while any nested animation still wants frames.
    pub fn advance(&mut self, elapsed: f32) -> bool {
        let mut keep_going = false;
        for node in &mut self.nodes {
            if let NodeContent::Nested(nested) = &mut node.content {
                if let Some(animation) = &mut nested.animation {
                    keep_going |= animation.advance(elapsed);
                    animation.apply(&mut nested.artboard, 1.0);
                }
                keep_going |= nested.artboard.advance(elapsed);
            }
        }
        self.update_transforms();
        keep_going
    }

    /// Recompute world transforms and render opacities.
    pub fn update_transforms(&mut self) {
        for index in 0..self.nodes.len() {
            let (parent_transform, parent_opacity) = match self.nodes[index].parent {
                Some(parent) => (
                    self.nodes[parent].world_transform,
                    self.nodes[parent].render_opacity,
                ),
                None => (Mat2D::IDENTITY, 1.0),
            };
            let node = &mut self.nodes[index];
            let local = Mat2D::from_components(node.x, node.y, node.rotation, node.scale_x, node.scale_y);
            node.world_transform = parent_transform * local;
            node.render_opacity = parent_opacity * node.opacity.clamp(0.0, 1.0);
        }
    }

    /// Whether `point` (artboard space) lies on `node`.
    ///
    /// Rectangles and ellipses are tested exactly, custom paths by bounds,
    /// groups by any of their descendants.
    #[must_use]
    pub fn hit_test(&self, node: usize, point: Vec2D) -> bool {
        let Some(n) = self.nodes.get(node) else {
            return false;
        };
        let Some(local) = n.world_transform.invert().map(|inv| inv.transform_point(point)) else {
            return false;
        };
        match &n.content {
            NodeContent::Shape(shape) => geometry_contains(&shape.geometry, &shape.raw, local),
            NodeContent::Image(Some(image)) => {
                #[allow(clippy::cast_precision_loss)]
                let (w, h) = (image.width() as f32, image.height() as f32);
                Aabb::from_xywh(-w / 2.0, -h / 2.0, w, h).contains(local)
            }
            NodeContent::Image(None) => false,
            NodeContent::Nested(nested) => nested.artboard.bounds().contains(local),
            NodeContent::Group => (node + 1..self.nodes.len())
                .filter(|&child| self.is_descendant(child, node))
                .any(|child| self.hit_test(child, point)),
        }
    }

    fn is_descendant(&self, mut node: usize, ancestor: usize) -> bool {
        while let Some(parent) = self.nodes[node].parent {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Emit this artboard's geometry into `renderer`.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        let factory = Rc::clone(&self.factory);
        renderer.save();
        if self.def.clip {
            let (width, height) = (self.def.width, self.def.height);
            let clip = self.clip.get_or_insert_with(|| {
                let mut raw = RawPath::new();
                raw.add_rect(0.0, 0.0, width, height);
                factory.make_render_path(&raw, FillRule::NonZero)
            });
            renderer.clip_path(&**clip);
        }

        for node in &mut self.nodes {
            if node.render_opacity <= 0.0 {
                continue;
            }
            let opacity = node.render_opacity;
            match &mut node.content {
                NodeContent::Group => {}
                NodeContent::Shape(shape) => {
                    let shape = shape.as_mut();
                    let path = shape.path.get_or_insert_with(|| {
                        if shape.raw.is_empty() {
                            factory.make_empty_render_path()
                        } else {
                            factory.make_render_path(&shape.raw, shape.fill_rule)
                        }
                    });
                    if path.is_empty() {
                        continue;
                    }
                    renderer.save();
                    renderer.transform(&node.world_transform);
                    if let Some(fill) = &mut shape.fill {
                        let paint = fill.prepare(&*factory, opacity, shape.blend_mode);
                        renderer.draw_path(&**path, paint);
                    }
                    if let Some(stroke) = &mut shape.stroke {
                        let paint = stroke.prepare(&*factory, opacity, shape.blend_mode);
                        renderer.draw_path(&**path, paint);
                    }
                    renderer.restore();
                }
                NodeContent::Image(Some(image)) => {
                    #[allow(clippy::cast_precision_loss)]
                    let (w, h) = (image.width() as f32, image.height() as f32);
                    renderer.save();
                    renderer.transform(&(node.world_transform * Mat2D::from_translate(-w / 2.0, -h / 2.0)));
                    renderer.draw_image(&**image, BlendMode::SrcOver, opacity);
                    renderer.restore();
                }
                NodeContent::Image(None) => {}
                NodeContent::Nested(nested) => {
                    renderer.save();
                    renderer.transform(&node.world_transform);
                    nested.artboard.draw(renderer);
                    renderer.restore();
                }
            }
        }
        renderer.restore();
    }
}

fn build_geometry(geometry: &GeometryDef) -> (RawPath, FillRule) {
    let mut raw = RawPath::new();
    match geometry {
        GeometryDef::Rectangle {
            width,
            height,
            corner_radius,
        } => {
            if *width > 0.0 && *height > 0.0 {
                raw.add_rounded_rect(-width / 2.0, -height / 2.0, *width, *height, *corner_radius);
            }
            (raw, FillRule::NonZero)
        }
        GeometryDef::Ellipse { width, height } => {
            if *width > 0.0 && *height > 0.0 {
                raw.add_ellipse(0.0, 0.0, width / 2.0, height / 2.0);
            }
            (raw, FillRule::NonZero)
        }
        GeometryDef::Path {
            commands,
            fill_rule,
        } => (RawPath::from_commands(commands.clone()), *fill_rule),
    }
}

fn geometry_contains(geometry: &GeometryDef, raw: &RawPath, local: Vec2D) -> bool {
    match geometry {
        GeometryDef::Rectangle { width, height, .. } => {
            local.x.abs() <= width / 2.0 && local.y.abs() <= height / 2.0
        }
        GeometryDef::Ellipse { width, height } => {
            let (rx, ry) = (width / 2.0, height / 2.0);
            if rx <= 0.0 || ry <= 0.0 {
                return false;
            }
            let (nx, ny) = (local.x / rx, local.y / ry);
            nx * nx + ny * ny <= 1.0
        }
        GeometryDef::Path { .. } => raw.bounds().is_some_and(|b| b.contains(local)),
    }
}
