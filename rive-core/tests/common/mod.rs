//! Shared fixtures for core integration tests.
//!
//! Provides a recording [`Factory`] / [`Renderer`] pair so the animation
//! core can be exercised without a real backend, plus a sample document.

#![allow(dead_code)]

use std::any::Any;
use std::rc::Rc;

use rive_core::{
    BlendMode, BufferType, ColorInt, Factory, FillRule, Font, Mat2D, PaintStyle, Player,
    RawPath, RenderBuffer, RenderImage, RenderPaint, RenderPath, RenderShader, Renderer,
    StrokeCap, StrokeJoin,
};

pub struct TestBuffer {
    buffer_type: BufferType,
    len: usize,
}

impl RenderBuffer for TestBuffer {
    fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    fn len(&self) -> usize {
        self.len
    }

    fn size_in_bytes(&self) -> usize {
        match self.buffer_type {
            BufferType::U16 => self.len * 2,
            BufferType::U32 | BufferType::F32 => self.len * 4,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct TestShader {
    pub colors: Vec<ColorInt>,
}

impl RenderShader for TestShader {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
pub struct TestPaint {
    pub style: PaintStyle,
    pub color: ColorInt,
    pub thickness: f32,
    pub has_shader: bool,
}

impl RenderPaint for TestPaint {
    fn set_style(&mut self, style: PaintStyle) {
        self.style = style;
    }
    fn set_color(&mut self, color: ColorInt) {
        self.color = color;
    }
    fn set_thickness(&mut self, thickness: f32) {
        self.thickness = thickness;
    }
    fn set_join(&mut self, _join: StrokeJoin) {}
    fn set_cap(&mut self, _cap: StrokeCap) {}
    fn set_blend_mode(&mut self, _blend_mode: BlendMode) {}
    fn set_shader(&mut self, shader: Option<Rc<dyn RenderShader>>) {
        self.has_shader = shader.is_some();
    }
    fn invalidate_stroke(&mut self) {}
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct TestPath {
    pub raw: RawPath,
    pub fill_rule: FillRule,
}

impl RenderPath for TestPath {
    fn rewind(&mut self) {
        self.raw.rewind();
    }
    fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }
    fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }
    fn add_raw_path(&mut self, raw: &RawPath) {
        self.raw.extend_from(raw);
    }
    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct TestImage;

impl RenderImage for TestImage {
    fn width(&self) -> u32 {
        4
    }
    fn height(&self) -> u32 {
        4
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory producing inspectable in-memory resources.
///
/// Images decode only from payloads starting with `IMG`; fonts never do.
#[derive(Default)]
pub struct TestFactory;

impl Factory for TestFactory {
    fn make_buffer_u16(&self, data: &[u16]) -> Rc<dyn RenderBuffer> {
        Rc::new(TestBuffer {
            buffer_type: BufferType::U16,
            len: data.len(),
        })
    }

    fn make_buffer_u32(&self, data: &[u32]) -> Rc<dyn RenderBuffer> {
        Rc::new(TestBuffer {
            buffer_type: BufferType::U32,
            len: data.len(),
        })
    }

    fn make_buffer_f32(&self, data: &[f32]) -> Rc<dyn RenderBuffer> {
        Rc::new(TestBuffer {
            buffer_type: BufferType::F32,
            len: data.len(),
        })
    }

    fn make_linear_gradient(
        &self,
        _sx: f32,
        _sy: f32,
        _ex: f32,
        _ey: f32,
        colors: &[ColorInt],
        _stops: &[f32],
    ) -> Rc<dyn RenderShader> {
        Rc::new(TestShader {
            colors: colors.to_vec(),
        })
    }

    fn make_radial_gradient(
        &self,
        _cx: f32,
        _cy: f32,
        _radius: f32,
        colors: &[ColorInt],
        _stops: &[f32],
    ) -> Rc<dyn RenderShader> {
        Rc::new(TestShader {
            colors: colors.to_vec(),
        })
    }

    fn make_render_path(&self, raw: &RawPath, fill_rule: FillRule) -> Box<dyn RenderPath> {
        Box::new(TestPath {
            raw: raw.clone(),
            fill_rule,
        })
    }

    fn make_empty_render_path(&self) -> Box<dyn RenderPath> {
        Box::new(TestPath {
            raw: RawPath::new(),
            fill_rule: FillRule::NonZero,
        })
    }

    fn make_render_paint(&self) -> Box<dyn RenderPaint> {
        Box::new(TestPaint {
            color: 0xFF00_0000,
            thickness: 1.0,
            ..TestPaint::default()
        })
    }

    fn decode_image(&self, bytes: &[u8]) -> Option<Rc<dyn RenderImage>> {
        bytes.starts_with(b"IMG").then(|| Rc::new(TestImage) as Rc<dyn RenderImage>)
    }

    fn decode_font(&self, _bytes: &[u8]) -> Option<Rc<dyn Font>> {
        None
    }
}

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Save,
    Restore,
    Transform(Mat2D),
    DrawPath { color: ColorInt, style: PaintStyle },
    ClipPath,
    DrawImage { opacity: f32 },
}

/// Renderer that records every call.
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<Call>,
}

impl RecordingRenderer {
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawPath { .. }))
            .count()
    }

    pub fn colors(&self) -> Vec<ColorInt> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawPath { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn save(&mut self) {
        self.calls.push(Call::Save);
    }
    fn restore(&mut self) {
        self.calls.push(Call::Restore);
    }
    fn transform(&mut self, transform: &Mat2D) {
        self.calls.push(Call::Transform(*transform));
    }
    fn draw_path(&mut self, _path: &dyn RenderPath, paint: &dyn RenderPaint) {
        let paint = paint
            .as_any()
            .downcast_ref::<TestPaint>()
            .expect("test paint");
        self.calls.push(Call::DrawPath {
            color: paint.color,
            style: paint.style,
        });
    }
    fn clip_path(&mut self, _path: &dyn RenderPath) {
        self.calls.push(Call::ClipPath);
    }
    fn draw_image(&mut self, _image: &dyn RenderImage, _blend_mode: BlendMode, opacity: f32) {
        self.calls.push(Call::DrawImage { opacity });
    }
}

pub fn factory() -> Rc<dyn Factory> {
    Rc::new(TestFactory)
}

/// Player with the sample document loaded.
pub fn loaded_player() -> Player {
    let mut player = Player::new(factory());
    player.load_bytes(SAMPLE_DOCUMENT.as_bytes());
    player
}

/// Two artboards, "Main" and "Icon".
///
/// Main: state machine "Controls" with number "progress", boolean
/// "hovered" and trigger "fire". Its layer goes entry -> idle, idle ->
/// burst on "fire", burst -> idle once burst finished. Pressing the
/// "button" ellipse fires "fire"; hovering it sets "hovered".
///
/// Icon: state machines "Other" and "Controls".
pub const SAMPLE_DOCUMENT: &str = r#"{
  "artboards": [
    {
      "name": "Main",
      "width": 100,
      "height": 100,
      "nodes": [
        {
          "name": "background",
          "transform": { "x": 50, "y": 50 },
          "kind": {
            "type": "shape",
            "geometry": { "type": "rectangle", "width": 100, "height": 100 },
            "fill": { "type": "solid", "color": 4294967295 }
          }
        },
        {
          "name": "button",
          "transform": { "x": 50, "y": 50 },
          "kind": {
            "type": "shape",
            "geometry": { "type": "ellipse", "width": 20, "height": 20 },
            "fill": { "type": "solid", "color": 4294901760 }
          }
        }
      ],
      "animations": [
        {
          "name": "idle",
          "fps": 10,
          "duration": 10,
          "loop": "loop",
          "keyed": [
            {
              "node": 1,
              "property": "x",
              "keyframes": [
                { "frame": 0, "value": 50 },
                { "frame": 10, "value": 60 }
              ]
            }
          ]
        },
        {
          "name": "burst",
          "fps": 10,
          "duration": 5,
          "keyed": [
            {
              "node": 1,
              "property": "scale_x",
              "keyframes": [
                { "frame": 0, "value": 1 },
                { "frame": 5, "value": 2 }
              ]
            }
          ]
        }
      ],
      "state_machines": [
        {
          "name": "Controls",
          "inputs": [
            { "type": "number", "name": "progress", "value": 0 },
            { "type": "boolean", "name": "hovered" },
            { "type": "trigger", "name": "fire" }
          ],
          "layers": [
            {
              "name": "main",
              "states": [
                { "kind": { "type": "entry" }, "transitions": [ { "to": 1 } ] },
                {
                  "kind": { "type": "animation", "animation": 0 },
                  "transitions": [
                    { "to": 2, "conditions": [ { "type": "trigger", "input": "fire" } ] }
                  ]
                },
                {
                  "kind": { "type": "animation", "animation": 1 },
                  "transitions": [ { "to": 1, "exit_time": 1.0 } ]
                }
              ]
            }
          ],
          "listeners": [
            {
              "target": 1,
              "type": "down",
              "actions": [ { "type": "fire_trigger", "input": "fire" } ]
            },
            {
              "target": 1,
              "type": "enter",
              "actions": [ { "type": "set_bool", "input": "hovered", "value": true } ]
            },
            {
              "target": 1,
              "type": "exit",
              "actions": [ { "type": "set_bool", "input": "hovered", "value": false } ]
            }
          ]
        }
      ]
    },
    {
      "name": "Icon",
      "width": 50,
      "height": 50,
      "nodes": [
        {
          "name": "dot",
          "transform": { "x": 25, "y": 25 },
          "kind": {
            "type": "shape",
            "geometry": { "type": "ellipse", "width": 10, "height": 10 },
            "fill": { "type": "solid", "color": 4278190335 }
          }
        }
      ],
      "animations": [
        { "name": "spin", "fps": 30, "duration": 30, "loop": "loop" }
      ],
      "state_machines": [
        {
          "name": "Other",
          "layers": [ { "states": [ { "kind": { "type": "entry" } } ] } ]
        },
        {
          "name": "Controls",
          "inputs": [ { "type": "number", "name": "progress", "value": 1 } ],
          "layers": [ { "states": [ { "kind": { "type": "entry" } } ] } ]
        }
      ]
    }
  ]
}"#;
