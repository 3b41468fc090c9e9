//! Artboard and document tests: hierarchy, assets, nesting and drawing.

mod common;

use common::{Call, RecordingRenderer};
use rive_core::document::{AssetDef, AssetKind, NodeProperty};
use rive_core::{
    ArtboardInstance, CoreError, DocumentLoader, JsonDocumentLoader, StateMachineInstance, Vec2D,
};

// "IMG1" decodes with the test factory, "AAAA" does not.
const SCENE: &str = r#"{
  "assets": [
    { "name": "logo", "kind": "image", "data": "SU1HMQ==" },
    { "name": "broken", "kind": "image", "data": "AAAA" }
  ],
  "artboards": [
    {
      "name": "Scene",
      "width": 100,
      "height": 100,
      "clip": false,
      "nodes": [
        { "name": "root", "transform": { "x": 10, "y": 10 }, "opacity": 0.5, "kind": { "type": "group" } },
        {
          "name": "gradient",
          "parent": 0,
          "transform": { "x": 10 },
          "kind": {
            "type": "shape",
            "geometry": { "type": "rectangle", "width": 20, "height": 20, "corner_radius": 4 },
            "fill": {
              "type": "linear_gradient",
              "start": [-10, 0],
              "end": [10, 0],
              "stops": [
                { "color": 4294901760, "position": 0 },
                { "color": 4278190335, "position": 1 }
              ]
            }
          }
        },
        {
          "name": "flat",
          "kind": {
            "type": "shape",
            "geometry": { "type": "rectangle", "width": 0, "height": 10 },
            "fill": { "type": "solid", "color": 4278190080 }
          }
        },
        { "name": "logo", "transform": { "x": 80, "y": 80 }, "kind": { "type": "image", "asset": 0 } },
        { "name": "missing", "kind": { "type": "image", "asset": 1 } },
        { "name": "child", "transform": { "x": 50, "y": 50 }, "kind": { "type": "nested_artboard", "artboard": 1, "animation": 0 } },
        {
          "name": "outline",
          "transform": { "x": 50, "y": 20 },
          "kind": {
            "type": "shape",
            "geometry": { "type": "ellipse", "width": 30, "height": 10 },
            "stroke": { "paint": { "type": "solid", "color": 4278255360 }, "thickness": 2, "join": "round" }
          }
        }
      ]
    },
    {
      "name": "Child",
      "width": 10,
      "height": 10,
      "nodes": [
        {
          "name": "square",
          "transform": { "x": 5, "y": 5 },
          "kind": {
            "type": "shape",
            "geometry": { "type": "rectangle", "width": 10, "height": 10 },
            "fill": { "type": "solid", "color": 4294967040 }
          }
        }
      ],
      "animations": [
        {
          "name": "slide",
          "fps": 10,
          "duration": 10,
          "loop": "loop",
          "keyed": [
            { "node": 0, "property": "x", "keyframes": [ { "frame": 0, "value": 0 }, { "frame": 10, "value": 10 } ] }
          ]
        }
      ]
    }
  ]
}"#;

fn scene() -> ArtboardInstance {
    let document = JsonDocumentLoader
        .load(SCENE.as_bytes(), common::factory())
        .unwrap();
    ArtboardInstance::new(&document, 0).unwrap()
}

#[test]
fn test_world_transforms_follow_hierarchy() {
    let artboard = scene();
    let world = artboard.world_transform(1).unwrap();
    let origin = world.transform_point(Vec2D::new(0.0, 0.0));
    assert!((origin.x - 20.0).abs() < 1e-4);
    assert!((origin.y - 10.0).abs() < 1e-4);
    assert!((artboard.render_opacity(1).unwrap() - 0.5).abs() < 1e-6);
}

#[test]
fn test_property_changes_apply_on_advance() {
    let mut artboard = scene();
    artboard.set_node_property(0, NodeProperty::X, 30.0);
    let before = artboard.world_transform(1).unwrap().translation();
    assert!((before.x - 20.0).abs() < 1e-4);

    artboard.advance(0.0);
    let after = artboard.world_transform(1).unwrap().translation();
    assert!((after.x - 40.0).abs() < 1e-4);
}

#[test]
fn test_group_hit_test_uses_descendants() {
    let artboard = scene();
    assert!(artboard.hit_test(0, Vec2D::new(20.0, 10.0)));
    assert!(!artboard.hit_test(0, Vec2D::new(90.0, 90.0)));
    assert!(artboard.hit_test(6, Vec2D::new(64.0, 20.0)));
    assert!(!artboard.hit_test(6, Vec2D::new(64.0, 24.0)));
    assert!(!artboard.hit_test(99, Vec2D::new(0.0, 0.0)));
}

#[test]
fn test_draw_skips_empty_and_undecoded_nodes() {
    let mut artboard = scene();
    artboard.advance(0.0);
    let mut renderer = RecordingRenderer::default();
    artboard.draw(&mut renderer);

    // gradient fill, nested square, outline stroke
    assert_eq!(renderer.draw_count(), 3);
    let images: Vec<_> = renderer
        .calls
        .iter()
        .filter(|c| matches!(c, Call::DrawImage { .. }))
        .collect();
    assert_eq!(images, [&Call::DrawImage { opacity: 1.0 }]);
    // Only the nested artboard clips.
    assert_eq!(
        renderer.calls.iter().filter(|c| **c == Call::ClipPath).count(),
        1
    );
}

#[test]
fn test_nested_artboard_keeps_animating() {
    let mut artboard = scene();
    assert!(artboard.advance(0.25));
    assert!(artboard.advance(1.0));
}

#[test]
fn test_asset_decode_failure_is_tolerated() {
    let document = JsonDocumentLoader
        .load(SCENE.as_bytes(), common::factory())
        .unwrap();
    assert!(document.image(0).is_some());
    assert!(document.image(1).is_none());
    assert!(document.font(0).is_none());
}

#[test]
fn test_state_machine_index_out_of_range() {
    let artboard = scene();
    assert_eq!(artboard.state_machine_count(), 0);
    assert!(StateMachineInstance::new(&artboard, 0).is_none());
}

#[test]
fn test_validation_rejects_dangling_references() {
    let cases = [
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1,
             "nodes": [{ "kind": { "type": "image", "asset": 3 } }] }] }"#,
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1,
             "nodes": [{ "kind": { "type": "nested_artboard", "artboard": 0 } }] }] }"#,
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1,
             "animations": [{ "name": "x", "duration": 1, "keyed": [{ "node": 0, "property": "x", "keyframes": [] }] }] }] }"#,
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1,
             "state_machines": [{ "name": "sm", "layers": [{ "states": [] }] }] }] }"#,
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1,
             "state_machines": [{ "name": "sm", "layers": [{ "states": [
               { "kind": { "type": "entry" }, "transitions": [{ "to": 0 }] }
             ] }] }] }] }"#,
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1,
             "state_machines": [{ "name": "sm",
               "inputs": [{ "type": "number", "name": "n" }],
               "layers": [{ "states": [
                 { "kind": { "type": "entry" }, "transitions": [{ "to": 1, "conditions": [{ "type": "bool", "input": "n", "value": true }] }] },
                 { "kind": { "type": "exit" } }
               ] }] }] }] }"#,
        r#"{ "artboards": [{ "name": "a", "width": 1, "height": 1, "default_state_machine": 0 }] }"#,
    ];
    for json in cases {
        let result = JsonDocumentLoader.load(json.as_bytes(), common::factory());
        assert!(
            matches!(result, Err(CoreError::InvalidDocument(_))),
            "expected invalid document for {json}"
        );
    }
}

#[test]
fn test_asset_payload_must_be_base64() {
    let asset = AssetDef {
        name: "logo".to_string(),
        kind: AssetKind::Image,
        data: "not base64!".to_string(),
    };
    assert!(matches!(asset.decode_bytes(), Err(CoreError::AssetDecode(msg)) if msg.contains("logo")));

    let asset = AssetDef {
        data: "SU1HMQ==".to_string(),
        ..asset
    };
    assert_eq!(asset.decode_bytes().unwrap(), b"IMG1");
}
