//! Immutable animation documents.
//!
//! A [`Document`] owns artboard definitions, each with its nodes, linear
//! animations and state machines, plus the embedded assets decoded through
//! the [`Factory`] the document was loaded with.

use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::color::ColorInt;
use crate::factory::{BlendMode, Factory, Font, RenderImage, StrokeCap, StrokeJoin};
use crate::path::{FillRule, PathCommand};
use crate::{CoreError, CoreResult};

fn one() -> f32 {
    1.0
}

fn default_fps() -> u32 {
    60
}

/// Local transform of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDef {
    /// X translation.
    pub x: f32,
    /// Y translation.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
}

impl Default for TransformDef {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStopDef {
    /// Stop color.
    pub color: ColorInt,
    /// Stop position in `0..=1`.
    pub position: f32,
}

/// Fill or stroke color source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaintDef {
    /// A single color.
    Solid {
        /// `0xAARRGGBB` color.
        color: ColorInt,
    },
    /// Linear gradient in node-local coordinates.
    LinearGradient {
        /// Start point.
        start: [f32; 2],
        /// End point.
        end: [f32; 2],
        /// Color stops.
        stops: Vec<GradientStopDef>,
    },
    /// Radial gradient in node-local coordinates.
    RadialGradient {
        /// Center point.
        center: [f32; 2],
        /// Radius.
        radius: f32,
        /// Color stops.
        stops: Vec<GradientStopDef>,
    },
}

/// Stroke description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeDef {
    /// Color source.
    pub paint: PaintDef,
    /// Stroke width.
    #[serde(default = "one")]
    pub thickness: f32,
    /// Corner style.
    #[serde(default)]
    pub join: StrokeJoin,
    /// End style.
    #[serde(default)]
    pub cap: StrokeCap,
}

/// Shape geometry in node-local coordinates.
///
/// Rectangles and ellipses are centered on the node origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryDef {
    /// Axis-aligned rectangle.
    Rectangle {
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Corner radius.
        #[serde(default)]
        corner_radius: f32,
    },
    /// Ellipse inscribed in `width` x `height`.
    Ellipse {
        /// Width.
        width: f32,
        /// Height.
        height: f32,
    },
    /// Arbitrary path.
    Path {
        /// Path commands.
        commands: Vec<PathCommand>,
        /// Fill rule.
        #[serde(default)]
        fill_rule: FillRule,
    },
}

/// A drawable vector shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDef {
    /// Geometry.
    pub geometry: GeometryDef,
    /// Optional fill.
    #[serde(default)]
    pub fill: Option<PaintDef>,
    /// Optional stroke.
    #[serde(default)]
    pub stroke: Option<StrokeDef>,
    /// Compositing mode for both fill and stroke.
    #[serde(default)]
    pub blend_mode: BlendMode,
}

/// What a node contributes to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Transform-only container.
    Group,
    /// Vector shape.
    Shape(ShapeDef),
    /// Embedded image, centered on the node origin.
    Image {
        /// Index into the document assets.
        asset: usize,
    },
    /// Another artboard drawn in place.
    NestedArtboard {
        /// Index of the nested artboard in the document.
        artboard: usize,
        /// Animation of the nested artboard that drives it.
        #[serde(default)]
        animation: Option<usize>,
    },
}

/// A node of the artboard hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Node name.
    #[serde(default)]
    pub name: String,
    /// Parent node index; must precede this node.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local transform.
    #[serde(default)]
    pub transform: TransformDef,
    /// Local opacity.
    #[serde(default = "one")]
    pub opacity: f32,
    /// Node content.
    pub kind: NodeKind,
}

/// Animatable numeric node property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeProperty {
    /// X translation.
    X,
    /// Y translation.
    Y,
    /// Rotation in radians.
    Rotation,
    /// Horizontal scale.
    ScaleX,
    /// Vertical scale.
    ScaleY,
    /// Opacity.
    Opacity,
}

/// What happens when an animation reaches its end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Stop at the end.
    #[default]
    OneShot,
    /// Wrap back to the start.
    Loop,
    /// Reverse direction at each end.
    PingPong,
}

/// Interpolation from a keyframe to the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Keep the value until the next keyframe.
    Hold,
    /// Linear interpolation.
    #[default]
    Linear,
}

/// A single keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyFrameDef {
    /// Frame number.
    pub frame: u32,
    /// Value at this frame.
    pub value: f32,
    /// Interpolation towards the next keyframe.
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// Keyframes for one property of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedPropertyDef {
    /// Target node index.
    pub node: usize,
    /// Target property.
    pub property: NodeProperty,
    /// Keyframes in ascending frame order.
    pub keyframes: Vec<KeyFrameDef>,
}

/// A linear (timeline) animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    /// Animation name.
    pub name: String,
    /// Frames per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Duration in frames.
    pub duration: u32,
    /// End behavior.
    #[serde(default, rename = "loop")]
    pub loop_mode: LoopMode,
    /// Playback speed multiplier.
    #[serde(default = "one")]
    pub speed: f32,
    /// Animated properties.
    #[serde(default)]
    pub keyed: Vec<KeyedPropertyDef>,
}

impl AnimationDef {
    /// Duration in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_seconds(&self) -> f32 {
        if self.fps == 0 {
            0.0
        } else {
            self.duration as f32 / self.fps as f32
        }
    }
}

/// Declared state machine input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputDef {
    /// Numeric input.
    Number {
        /// Input name.
        name: String,
        /// Initial value.
        #[serde(default)]
        value: f32,
    },
    /// Boolean input.
    Boolean {
        /// Input name.
        name: String,
        /// Initial value.
        #[serde(default)]
        value: bool,
    },
    /// Fire-once input.
    Trigger {
        /// Input name.
        name: String,
    },
}

impl InputDef {
    /// Input name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Number { name, .. } | Self::Boolean { name, .. } | Self::Trigger { name } => name,
        }
    }
}

/// Comparison used by numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOp {
    /// Evaluate `lhs <op> rhs`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn evaluate(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::LessThan => lhs < rhs,
            Self::LessThanOrEqual => lhs <= rhs,
            Self::GreaterThan => lhs > rhs,
            Self::GreaterThanOrEqual => lhs >= rhs,
        }
    }
}

/// Transition condition on an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDef {
    /// Boolean input equals `value`.
    Bool {
        /// Input name.
        input: String,
        /// Expected value.
        value: bool,
    },
    /// Numeric input compared against `value`.
    Number {
        /// Input name.
        input: String,
        /// Comparison.
        op: ComparisonOp,
        /// Right-hand side.
        value: f32,
    },
    /// Trigger input fired during this advance.
    Trigger {
        /// Input name.
        input: String,
    },
}

impl ConditionDef {
    fn input(&self) -> &str {
        match self {
            Self::Bool { input, .. } | Self::Number { input, .. } | Self::Trigger { input } => input,
        }
    }
}

/// Edge between two states of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    /// Target state index within the layer.
    pub to: usize,
    /// All conditions must hold.
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
    /// Cross-fade duration in seconds.
    #[serde(default)]
    pub duration: f32,
    /// Required progress (`0..=1`) of the source animation before leaving.
    #[serde(default)]
    pub exit_time: Option<f32>,
}

/// Kind of a layer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateKind {
    /// Where the layer starts.
    Entry,
    /// Transitions that apply from every state.
    Any,
    /// Terminal state.
    Exit,
    /// Plays a linear animation of the artboard.
    Animation {
        /// Animation index on the owning artboard.
        animation: usize,
        /// Speed multiplier on top of the animation's own speed.
        #[serde(default = "one")]
        speed: f32,
    },
}

/// A state of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    /// State kind.
    pub kind: StateKind,
    /// Outgoing transitions, checked in order.
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

/// An independent state graph of a state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDef {
    /// Layer name.
    #[serde(default)]
    pub name: String,
    /// States; exactly one must be `Entry`.
    pub states: Vec<StateDef>,
}

/// Pointer interaction that activates a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerType {
    /// Pointer entered the target.
    Enter,
    /// Pointer left the target.
    Exit,
    /// Pointer pressed over the target.
    Down,
    /// Pointer released over the target.
    Up,
    /// Pointer moved over the target.
    Move,
}

/// Effect of a listener on the state machine inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerActionDef {
    /// Set a boolean input.
    SetBool {
        /// Input name.
        input: String,
        /// New value.
        value: bool,
    },
    /// Invert a boolean input.
    ToggleBool {
        /// Input name.
        input: String,
    },
    /// Set a numeric input.
    SetNumber {
        /// Input name.
        input: String,
        /// New value.
        value: f32,
    },
    /// Fire a trigger input.
    FireTrigger {
        /// Input name.
        input: String,
    },
}

impl ListenerActionDef {
    fn input(&self) -> &str {
        match self {
            Self::SetBool { input, .. }
            | Self::ToggleBool { input }
            | Self::SetNumber { input, .. }
            | Self::FireTrigger { input } => input,
        }
    }
}

/// Interactive region bound to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerDef {
    /// Hit-test target node.
    pub target: usize,
    /// Interaction kind.
    #[serde(rename = "type")]
    pub listener_type: ListenerType,
    /// Actions performed when the listener fires.
    #[serde(default)]
    pub actions: Vec<ListenerActionDef>,
}

/// A state machine definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDef {
    /// State machine name.
    pub name: String,
    /// Inputs; names are unique.
    #[serde(default)]
    pub inputs: Vec<InputDef>,
    /// Layers, advanced in order.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
    /// Pointer listeners.
    #[serde(default)]
    pub listeners: Vec<ListenerDef>,
}

/// An artboard definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtboardDef {
    /// Artboard name.
    pub name: String,
    /// Width in artboard units.
    pub width: f32,
    /// Height in artboard units.
    pub height: f32,
    /// Clip drawing to the artboard bounds.
    #[serde(default = "default_clip")]
    pub clip: bool,
    /// Nodes, parents before children.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    /// Linear animations.
    #[serde(default)]
    pub animations: Vec<Rc<AnimationDef>>,
    /// State machines.
    #[serde(default)]
    pub state_machines: Vec<Rc<StateMachineDef>>,
    /// State machine used when none is explicitly selected.
    #[serde(default)]
    pub default_state_machine: Option<usize>,
}

fn default_clip() -> bool {
    true
}

/// Kind of embedded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Encoded image (PNG, JPEG, WebP...).
    Image,
    /// Encoded font (TTF/OTF).
    Font,
}

/// Embedded asset payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDef {
    /// Asset name.
    #[serde(default)]
    pub name: String,
    /// Asset kind.
    pub kind: AssetKind,
    /// Base64-encoded bytes.
    pub data: String,
}

impl AssetDef {
    /// Decode the base64 payload.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AssetDecode`] if the payload is not valid base64.
    pub fn decode_bytes(&self) -> CoreResult<Vec<u8>> {
        use base64::Engine;

        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| CoreError::AssetDecode(format!("'{}': {e}", self.name)))
    }
}

/// Serialized shape of a document, before assets are decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDef {
    /// Artboards.
    #[serde(default)]
    pub artboards: Vec<Rc<ArtboardDef>>,
    /// Embedded assets.
    #[serde(default)]
    pub assets: Vec<AssetDef>,
}

impl DocumentDef {
    /// Check every cross reference of the document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDocument`] describing the first broken
    /// reference found.
    pub fn validate(&self) -> CoreResult<()> {
        for (index, artboard) in self.artboards.iter().enumerate() {
            self.validate_artboard(artboard)
                .map_err(|e| invalid(format!("artboard {index} '{}': {e}", artboard.name)))?;
        }
        for index in 0..self.artboards.len() {
            self.check_nesting(index, &mut Vec::new())?;
        }
        Ok(())
    }

    fn validate_artboard(&self, artboard: &ArtboardDef) -> Result<(), String> {
        if !(artboard.width >= 0.0 && artboard.height >= 0.0) {
            return Err("negative or invalid size".to_string());
        }
        for (index, node) in artboard.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= index {
                    return Err(format!("node {index} has parent {parent} that does not precede it"));
                }
            }
            match &node.kind {
                NodeKind::Image { asset } => match self.assets.get(*asset) {
                    Some(def) if def.kind == AssetKind::Image => {}
                    _ => return Err(format!("node {index} references missing image asset {asset}")),
                },
                NodeKind::NestedArtboard {
                    artboard: nested,
                    animation,
                } => {
                    let Some(target) = self.artboards.get(*nested) else {
                        return Err(format!("node {index} references missing artboard {nested}"));
                    };
                    if let Some(animation) = animation {
                        if *animation >= target.animations.len() {
                            return Err(format!(
                                "node {index} references missing animation {animation} of nested artboard {nested}"
                            ));
                        }
                    }
                }
                NodeKind::Group | NodeKind::Shape(_) => {}
            }
        }
        for animation in &artboard.animations {
            validate_animation(animation, artboard.nodes.len())
                .map_err(|e| format!("animation '{}': {e}", animation.name))?;
        }
        for machine in &artboard.state_machines {
            validate_state_machine(machine, artboard)
                .map_err(|e| format!("state machine '{}': {e}", machine.name))?;
        }
        if let Some(default) = artboard.default_state_machine {
            if default >= artboard.state_machines.len() {
                return Err(format!("default state machine {default} out of range"));
            }
        }
        Ok(())
    }

    /// Reject artboards that (transitively) nest themselves.
    fn check_nesting(&self, index: usize, stack: &mut Vec<usize>) -> CoreResult<()> {
        if stack.contains(&index) {
            return Err(invalid(format!("artboard {index} nests itself")));
        }
        stack.push(index);
        for node in &self.artboards[index].nodes {
            if let NodeKind::NestedArtboard { artboard, .. } = node.kind {
                self.check_nesting(artboard, stack)?;
            }
        }
        stack.pop();
        Ok(())
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::InvalidDocument(message)
}

fn validate_animation(animation: &AnimationDef, node_count: usize) -> Result<(), String> {
    if animation.fps == 0 {
        return Err("fps must be positive".to_string());
    }
    for keyed in &animation.keyed {
        if keyed.node >= node_count {
            return Err(format!("keyed node {} out of range", keyed.node));
        }
        if keyed.keyframes.windows(2).any(|w| w[0].frame > w[1].frame) {
            return Err(format!("keyframes of node {} are not ordered", keyed.node));
        }
    }
    Ok(())
}

fn validate_state_machine(machine: &StateMachineDef, artboard: &ArtboardDef) -> Result<(), String> {
    let mut names = HashSet::new();
    for input in &machine.inputs {
        if !names.insert(input.name()) {
            return Err(format!("duplicate input '{}'", input.name()));
        }
    }
    let find = |name: &str| machine.inputs.iter().find(|i| i.name() == name);

    for (layer_index, layer) in machine.layers.iter().enumerate() {
        let entries = layer
            .states
            .iter()
            .filter(|s| s.kind == StateKind::Entry)
            .count();
        if entries != 1 {
            return Err(format!("layer {layer_index} must have exactly one entry state"));
        }
        for state in &layer.states {
            if let StateKind::Animation { animation, .. } = state.kind {
                if animation >= artboard.animations.len() {
                    return Err(format!("layer {layer_index} references missing animation {animation}"));
                }
            }
            for transition in &state.transitions {
                match layer.states.get(transition.to).map(|s| &s.kind) {
                    None => {
                        return Err(format!(
                            "layer {layer_index} transition targets missing state {}",
                            transition.to
                        ))
                    }
                    Some(StateKind::Entry | StateKind::Any) => {
                        return Err(format!(
                            "layer {layer_index} transition targets entry/any state {}",
                            transition.to
                        ))
                    }
                    Some(_) => {}
                }
                for condition in &transition.conditions {
                    let matches = match (condition, find(condition.input())) {
                        (ConditionDef::Bool { .. }, Some(InputDef::Boolean { .. }))
                        | (ConditionDef::Number { .. }, Some(InputDef::Number { .. }))
                        | (ConditionDef::Trigger { .. }, Some(InputDef::Trigger { .. })) => true,
                        _ => false,
                    };
                    if !matches {
                        return Err(format!(
                            "condition references missing or mistyped input '{}'",
                            condition.input()
                        ));
                    }
                }
            }
        }
    }

    for listener in &machine.listeners {
        if listener.target >= artboard.nodes.len() {
            return Err(format!("listener target {} out of range", listener.target));
        }
        for action in &listener.actions {
            let matches = match (action, find(action.input())) {
                (
                    ListenerActionDef::SetBool { .. } | ListenerActionDef::ToggleBool { .. },
                    Some(InputDef::Boolean { .. }),
                )
                | (ListenerActionDef::SetNumber { .. }, Some(InputDef::Number { .. }))
                | (ListenerActionDef::FireTrigger { .. }, Some(InputDef::Trigger { .. })) => true,
                _ => false,
            };
            if !matches {
                return Err(format!(
                    "listener action references missing or mistyped input '{}'",
                    action.input()
                ));
            }
        }
    }
    Ok(())
}

/// A decoded embedded asset.
#[derive(Clone)]
pub enum Asset {
    /// Image asset; `None` when decoding failed.
    Image(Option<Rc<dyn RenderImage>>),
    /// Font asset; `None` when registration failed.
    Font(Option<Rc<dyn Font>>),
}

/// A loaded, validated, read-only animation document.
pub struct Document {
    artboards: Vec<Rc<ArtboardDef>>,
    assets: Vec<Asset>,
    factory: Rc<dyn Factory>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("artboards", &self.artboards.len())
            .field("assets", &self.assets.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Validate a definition and decode its assets through `factory`.
    ///
    /// Asset decode failures are tolerated: the asset resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition fails validation.
    pub fn from_def(def: DocumentDef, factory: Rc<dyn Factory>) -> CoreResult<Self> {
        def.validate()?;
        let assets = def
            .assets
            .iter()
            .map(|asset| decode_asset(asset, factory.as_ref()))
            .collect();
        Ok(Self {
            artboards: def.artboards,
            assets,
            factory,
        })
    }

    /// Number of artboards.
    #[must_use]
    pub fn artboard_count(&self) -> usize {
        self.artboards.len()
    }

    /// Artboard definition by index.
    #[must_use]
    pub fn artboard(&self, index: usize) -> Option<&Rc<ArtboardDef>> {
        self.artboards.get(index)
    }

    /// All artboard definitions.
    #[must_use]
    pub fn artboards(&self) -> &[Rc<ArtboardDef>] {
        &self.artboards
    }

    /// Decoded image asset by index.
    #[must_use]
    pub fn image(&self, asset: usize) -> Option<Rc<dyn RenderImage>> {
        match self.assets.get(asset)? {
            Asset::Image(image) => image.clone(),
            Asset::Font(_) => None,
        }
    }

    /// Registered font asset by index.
    #[must_use]
    pub fn font(&self, asset: usize) -> Option<Rc<dyn Font>> {
        match self.assets.get(asset)? {
            Asset::Font(font) => font.clone(),
            Asset::Image(_) => None,
        }
    }

    /// The factory all resources of this document are built with.
    #[must_use]
    pub fn factory(&self) -> &Rc<dyn Factory> {
        &self.factory
    }
}

fn decode_asset(asset: &AssetDef, factory: &dyn Factory) -> Asset {
    let bytes = match asset.decode_bytes() {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    };
    match asset.kind {
        AssetKind::Image => {
            let image = bytes.and_then(|b| factory.decode_image(&b));
            if image.is_none() {
                tracing::warn!("Image asset '{}' could not be decoded", asset.name);
            }
            Asset::Image(image)
        }
        AssetKind::Font => {
            let font = bytes.and_then(|b| factory.decode_font(&b));
            if font.is_none() {
                tracing::warn!("Font asset '{}' could not be registered", asset.name);
            }
            Asset::Font(font)
        }
    }
}
