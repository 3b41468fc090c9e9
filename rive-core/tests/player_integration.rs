//! Player Integration Tests
//!
//! Drives the full load → select → advance → draw cycle against the sample
//! document from `common`:
//! - Loading status and definition lists
//! - Deferred artboard / state machine swaps
//! - Input bridge reads, writes and triggers
//! - Pointer listeners

mod common;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use common::{loaded_player, Call, RecordingRenderer, SAMPLE_DOCUMENT};
use rive_core::document::NodeProperty;
use rive_core::{
    InputValue, LoadingStatus, Player, PlayerConfig, PlayerEvent, PointerEvent, PointerEventKind,
    TRIGGERS_KEY,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Sample player with "Controls" on "Main" running.
fn controls_player() -> Player {
    let mut player = loaded_player();
    player.set_current_artboard_index(0);
    player.set_current_state_machine_index(0);
    player.advance(Duration::ZERO);
    player
}

fn current_animation(player: &Player) -> Option<String> {
    player
        .state_machine()
        .and_then(|sm| sm.borrow().current_animation_name(0).map(str::to_string))
}

/// Exactly one of animation / state machine drives the artboard.
fn assert_single_driver(player: &Player) {
    assert!(
        player.animation().is_some() != player.state_machine().is_some(),
        "expected exactly one driver"
    );
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_populates_lists() {
    let mut player = loaded_player();
    assert_eq!(player.status(), LoadingStatus::Loaded);

    let names: Vec<_> = player.artboards().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Main", "Icon"]);
    assert_eq!(player.current_artboard_index(), Some(0));

    let animations: Vec<_> = player.animations().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(animations, ["idle", "burst"]);
    assert!((player.animations()[0].duration - 1.0).abs() < 1e-6);
    assert_eq!(player.animations()[0].fps, 10);

    assert_eq!(player.state_machines().len(), 1);
    assert_eq!(player.state_machines()[0].name, "Controls");

    let events = player.drain_events();
    assert!(events.contains(&PlayerEvent::StatusChanged(LoadingStatus::Loading)));
    assert!(events.contains(&PlayerEvent::StatusChanged(LoadingStatus::Loaded)));
    assert!(events.contains(&PlayerEvent::CurrentArtboardChanged(Some(0))));
    assert!(player.drain_events().is_empty());
}

#[test]
fn test_load_without_state_machine_plays_first_animation() {
    let player = loaded_player();
    assert_eq!(player.current_state_machine_index(), None);
    assert_eq!(player.animation().map(|a| a.name()), Some("idle"));
    assert!(player.input_map().is_empty());
}

#[test]
fn test_invalid_bytes_set_error_status() {
    let mut player = Player::new(common::factory());
    player.load_bytes(b"{ definitely not a document");

    assert_eq!(player.status(), LoadingStatus::Error);
    assert!(player.artboards().is_empty());
    assert!(player.animations().is_empty());
    assert!(player.state_machines().is_empty());
    assert_eq!(player.current_artboard_index(), None);
    assert!(!player.advance(ms(16)));
}

#[test]
fn test_structural_error_fails_load() {
    let json = r#"{
      "artboards": [{
        "name": "Broken", "width": 10, "height": 10,
        "nodes": [
          { "name": "child", "parent": 1, "kind": { "type": "group" } },
          { "name": "parent", "kind": { "type": "group" } }
        ]
      }]
    }"#;
    let mut player = Player::new(common::factory());
    player.load_bytes(json.as_bytes());
    assert_eq!(player.status(), LoadingStatus::Error);
}

#[test]
fn test_reload_with_fewer_artboards_falls_back_to_initial() {
    let config = PlayerConfig {
        initial_artboard: Some(0),
        ..PlayerConfig::default()
    };
    let mut player = Player::with_config(common::factory(), config);
    player.load_bytes(SAMPLE_DOCUMENT.as_bytes());
    player.set_current_artboard_index(1);
    player.advance(Duration::ZERO);
    assert_eq!(player.current_artboard_index(), Some(1));

    player.load_bytes(br#"{ "artboards": [{ "name": "Only", "width": 10, "height": 10 }] }"#);
    assert_eq!(player.status(), LoadingStatus::Loaded);
    assert_eq!(player.current_artboard_index(), Some(0));
    assert!(player.artboard().is_some());
}

#[test]
fn test_failed_reload_drops_previous_document() {
    let mut player = controls_player();
    assert!(player.artboard().is_some());

    player.load_bytes(b"not json");
    assert_eq!(player.status(), LoadingStatus::Error);
    assert!(player.artboard().is_none());
    assert!(player.state_machine().is_none());
    assert!(player.input_map().is_empty());
}

#[test]
fn test_file_source_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_DOCUMENT.as_bytes()).unwrap();

    let mut player = Player::new(common::factory());
    player.set_file_source(file.path());
    assert_eq!(player.status(), LoadingStatus::Loaded);
    assert_eq!(player.file_source(), Some(file.path()));
}

#[test]
fn test_missing_file_source_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = Player::new(common::factory());
    player.set_file_source(dir.path().join("missing.json"));
    assert_eq!(player.status(), LoadingStatus::Error);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_out_of_range_artboard_selects_nothing() {
    let mut player = loaded_player();

    player.set_current_artboard_index(-1);
    assert_eq!(player.current_artboard_index(), None);
    player.advance(ms(16));
    assert!(player.artboard().is_none());
    assert!(player.animations().is_empty());

    player.set_current_artboard_index(1);
    assert_eq!(player.current_artboard_index(), Some(1));

    player.set_current_artboard_index(2);
    assert_eq!(player.current_artboard_index(), None);
    player.advance(ms(16));
    assert!(player.artboard().is_none());
}

#[test]
fn test_artboard_swap_is_deferred() {
    let mut player = loaded_player();
    player.advance(Duration::ZERO);
    assert_eq!(player.artboard().map(|a| a.name().to_string()), Some("Main".into()));

    player.set_current_artboard_index(1);
    assert_eq!(player.artboard().map(|a| a.name().to_string()), Some("Main".into()));

    player.advance(Duration::ZERO);
    assert_eq!(player.artboard().map(|a| a.name().to_string()), Some("Icon".into()));
}

#[test]
fn test_artboard_swap_prefers_state_machine_name() {
    let mut player = controls_player();
    player.set_current_artboard_index(1);
    assert_eq!(player.current_state_machine_index(), Some(1));

    player.advance(Duration::ZERO);
    let sm = player.state_machine().unwrap();
    assert_eq!(sm.borrow().name(), "Controls");
    assert_eq!(
        player.input_map().get("progress"),
        Some(&InputValue::Number(1.0))
    );
}

#[test]
fn test_out_of_range_state_machine_empties_bridge() {
    let mut player = controls_player();
    assert!(!player.input_map().is_empty());

    player.set_current_state_machine_index(99);
    assert_eq!(player.current_state_machine_index(), None);
    player.advance(Duration::ZERO);

    assert!(player.state_machine().is_none());
    assert!(player.input_map().is_empty());
    assert_eq!(player.animation().map(|a| a.name()), Some("idle"));
}

#[test]
fn test_exactly_one_driver_after_selection_changes() {
    let mut player = loaded_player();
    player.advance(Duration::ZERO);
    assert_single_driver(&player);

    player.set_current_state_machine_index(0);
    player.advance(Duration::ZERO);
    assert_single_driver(&player);
    assert!(player.state_machine().is_some());

    player.set_current_state_machine_index(-1);
    player.advance(Duration::ZERO);
    assert_single_driver(&player);

    player.set_current_artboard_index(1);
    player.advance(Duration::ZERO);
    assert_single_driver(&player);
    assert_eq!(player.animation().map(|a| a.name()), Some("spin"));
}

#[test]
fn test_trigger_animation_replaces_state_machine() {
    let mut player = controls_player();
    player.trigger_animation(1);

    assert!(player.state_machine().is_none());
    assert_eq!(player.current_state_machine_index(), None);
    assert_eq!(player.animation().map(|a| a.name()), Some("burst"));
    assert!(player.input_map().is_empty());

    // Out of range is ignored.
    player.trigger_animation(7);
    assert_eq!(player.animation().map(|a| a.name()), Some("burst"));
}

// ============================================================================
// Input bridge
// ============================================================================

#[test]
fn test_controls_scenario() {
    let mut player = controls_player();
    let map = player.input_map();
    assert_eq!(map.keys(), ["hovered", "progress", TRIGGERS_KEY]);
    assert_eq!(map.get("progress"), Some(&InputValue::Number(0.0)));
    assert_eq!(
        map.get(TRIGGERS_KEY),
        Some(&InputValue::Triggers(vec!["fire".to_string()]))
    );

    player.set_input("progress", 0.5);
    assert_eq!(
        player.input_map().get("progress"),
        Some(&InputValue::Number(0.5))
    );
    let sm = Rc::clone(player.state_machine().unwrap());
    assert_eq!(sm.borrow().get_number("progress"), Some(0.5));

    assert_eq!(current_animation(&player).as_deref(), Some("idle"));
    player.activate_trigger("fire");
    assert!(player.input_map().is_dirty());

    player.advance(Duration::ZERO);
    assert!(!player.input_map().is_dirty());
    assert_eq!(current_animation(&player).as_deref(), Some("burst"));
    assert!(!sm.borrow().is_trigger_fired("fire"));
}

#[test]
fn test_exit_time_returns_to_idle() {
    let mut player = controls_player();
    player.activate_trigger("fire");
    player.advance(Duration::ZERO);
    assert_eq!(current_animation(&player).as_deref(), Some("burst"));

    player.advance(ms(600));
    assert_eq!(current_animation(&player).as_deref(), Some("burst"));
    player.advance(ms(16));
    assert_eq!(current_animation(&player).as_deref(), Some("idle"));
}

#[test]
fn test_unknown_trigger_is_noop() {
    let mut player = controls_player();
    let sm = Rc::clone(player.state_machine().unwrap());
    assert!(!sm.borrow().needs_advance());

    player.activate_trigger("missing");
    assert!(!player.input_map().is_dirty());
    assert!(!sm.borrow().needs_advance());
}

#[test]
fn test_boolean_write_marks_needs_advance() {
    let mut player = controls_player();
    let sm = Rc::clone(player.state_machine().unwrap());

    player.set_input("hovered", true);
    assert!(sm.borrow().needs_advance());
    assert_eq!(sm.borrow().get_bool("hovered"), Some(true));
    assert_eq!(
        player.input_map().get("hovered"),
        Some(&InputValue::Boolean(true))
    );
}

#[test]
fn test_unsupported_writes_are_ignored() {
    let mut player = controls_player();
    player.set_input("progress", "half");
    player.set_input("missing", 3.0);
    player.set_input("progress", true);
    player.set_input("hovered", 1);

    let map = player.input_map();
    assert_eq!(map.get("progress"), Some(&InputValue::Number(0.0)));
    assert_eq!(map.get("hovered"), Some(&InputValue::Boolean(false)));
    assert!(map.get("missing").is_none());
}

#[test]
fn test_integer_write_reaches_number_input() {
    let mut player = controls_player();
    player.set_input("progress", 3);
    assert_eq!(
        player.input_map().get("progress"),
        Some(&InputValue::Number(3.0))
    );
}

#[test]
fn test_zero_advance_is_idempotent() {
    let mut player = controls_player();
    player.advance(ms(250));

    let artboard = player.artboard().unwrap();
    let x = artboard.node_property(1, NodeProperty::X).unwrap();
    assert!((x - 52.5).abs() < 1e-3);
    let values = player.input_map().to_json();

    player.advance(Duration::ZERO);
    let artboard = player.artboard().unwrap();
    assert!((artboard.node_property(1, NodeProperty::X).unwrap() - x).abs() < 1e-6);
    assert_eq!(player.input_map().to_json(), values);
    assert_eq!(current_animation(&player).as_deref(), Some("idle"));
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn test_pointer_down_fires_listener() {
    let mut player = controls_player();
    assert!(player.pointer_event(PointerEventKind::Down, 50.0, 50.0));
    player.advance(Duration::ZERO);
    assert_eq!(current_animation(&player).as_deref(), Some("burst"));
}

#[test]
fn test_dispatch_routes_host_events() {
    let mut player = controls_player();
    assert!(!player.dispatch(PointerEvent::new(PointerEventKind::Down, 5.0, 5.0)));
    assert!(player.dispatch(PointerEvent::new(PointerEventKind::Down, 50.0, 50.0)));
    player.advance(Duration::ZERO);
    assert_eq!(current_animation(&player).as_deref(), Some("burst"));
}

#[test]
fn test_pointer_miss_does_nothing() {
    let mut player = controls_player();
    assert!(!player.pointer_event(PointerEventKind::Down, 5.0, 5.0));
    player.advance(Duration::ZERO);
    assert_eq!(current_animation(&player).as_deref(), Some("idle"));
}

#[test]
fn test_hover_notifies_subscribers() {
    let mut player = controls_player();
    let changes: Rc<RefCell<Vec<(String, InputValue)>>> = Rc::default();
    let sink = Rc::clone(&changes);
    player
        .input_map_mut()
        .subscribe(move |name, value| sink.borrow_mut().push((name.to_string(), value.clone())));

    player.pointer_event(PointerEventKind::Move, 50.0, 50.0);
    player.advance(Duration::ZERO);
    assert_eq!(
        changes.borrow().as_slice(),
        [("hovered".to_string(), InputValue::Boolean(true))]
    );

    player.pointer_event(PointerEventKind::Exit, 0.0, 0.0);
    player.advance(Duration::ZERO);
    assert_eq!(
        player.input_map().get("hovered"),
        Some(&InputValue::Boolean(false))
    );
    assert_eq!(changes.borrow().len(), 2);
}

#[test]
fn test_non_interactive_skips_hit_testing() {
    let mut player = controls_player();
    player.set_interactive(false);
    assert!(!player.pointer_event(PointerEventKind::Down, 50.0, 50.0));
    player.advance(Duration::ZERO);
    assert_eq!(current_animation(&player).as_deref(), Some("idle"));
    assert!(player
        .drain_events()
        .contains(&PlayerEvent::InteractiveChanged(false)));
}

#[test]
fn test_pointer_respects_fit_transform() {
    let mut player = controls_player();
    // Main is 100x100, fitted into 200x200 at 2x.
    player.set_viewport_size(200.0, 200.0);
    assert!(!player.pointer_event(PointerEventKind::Down, 50.0, 50.0));
    assert!(player.pointer_event(PointerEventKind::Down, 100.0, 100.0));
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_draw_emits_shapes_in_order() {
    let mut player = loaded_player();
    player.advance(Duration::ZERO);

    let mut renderer = RecordingRenderer::default();
    player.draw(&mut renderer);

    assert_eq!(renderer.draw_count(), 2);
    assert_eq!(renderer.colors(), [0xFFFF_FFFF, 0xFFFF_0000]);
    assert!(renderer.calls.contains(&Call::ClipPath));
    let saves = renderer.calls.iter().filter(|c| **c == Call::Save).count();
    let restores = renderer.calls.iter().filter(|c| **c == Call::Restore).count();
    assert_eq!(saves, restores);
}

#[test]
fn test_draw_without_artboard_is_noop() {
    let mut player = Player::new(common::factory());
    let mut renderer = RecordingRenderer::default();
    player.draw(&mut renderer);
    assert!(renderer.calls.is_empty());
}
