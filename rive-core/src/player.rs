//! Document lifecycle and the per-frame update loop.
//!
//! ```text
//!  set_file_source / load_bytes
//!        │
//!   Idle ─► Loading ─► Loaded ──► select artboard ──► select state machine
//!                 └──► Error            (deferred)          (deferred)
//!
//!  advance(dt):  apply pending swaps
//!                ├─ state machine? advance, clear dirty, update_values()
//!                ├─ animation?     advance + apply
//!                └─ neither        static pose
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::animation::LinearAnimationInstance;
use crate::artboard::ArtboardInstance;
use crate::config::PlayerConfig;
use crate::document::{ArtboardDef, Document};
use crate::error::CoreResult;
use crate::event::{PlayerEvent, PointerEvent, PointerEventKind};
use crate::factory::{Factory, Renderer};
use crate::input_map::StateMachineInputMap;
use crate::loader::{DocumentLoader, JsonDocumentLoader};
use crate::math::{Aabb, Mat2D, Vec2D};
use crate::state_machine::StateMachineInstance;

/// Document loading status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStatus {
    /// No source set yet.
    #[default]
    Idle,
    /// A load is in progress.
    Loading,
    /// The document is loaded.
    Loaded,
    /// The last load failed.
    Error,
}

/// Artboard entry of the loaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtboardInfo {
    /// Index in the document.
    pub id: usize,
    /// Artboard name.
    pub name: String,
}

/// Linear animation entry of the current artboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationInfo {
    /// Index on the artboard.
    pub id: usize,
    /// Animation name.
    pub name: String,
    /// Duration in seconds.
    pub duration: f32,
    /// Frames per second.
    pub fps: u32,
}

/// State machine entry of the current artboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMachineInfo {
    /// Index on the artboard.
    pub id: usize,
    /// State machine name.
    pub name: String,
}

/// Owns a document and drives its current artboard frame by frame.
pub struct Player {
    factory: Rc<dyn Factory>,
    loader: Box<dyn DocumentLoader>,
    config: PlayerConfig,
    status: LoadingStatus,
    file_source: Option<PathBuf>,
    document: Option<Rc<Document>>,

    artboards: Vec<ArtboardInfo>,
    animations: Vec<AnimationInfo>,
    state_machines: Vec<StateMachineInfo>,
    current_artboard: Option<usize>,
    current_state_machine: Option<usize>,
    artboard_swap_pending: bool,
    state_machine_swap_pending: bool,

    artboard: Option<ArtboardInstance>,
    animation: Option<LinearAnimationInstance>,
    state_machine: Option<Rc<RefCell<StateMachineInstance>>>,
    input_map: StateMachineInputMap,

    interactive: bool,
    viewport: (f32, f32),
    last_tick: Option<Instant>,
    events: Vec<PlayerEvent>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("status", &self.status)
            .field("current_artboard", &self.current_artboard)
            .field("current_state_machine", &self.current_state_machine)
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Player using the JSON loader and default configuration.
    #[must_use]
    pub fn new(factory: Rc<dyn Factory>) -> Self {
        Self::with_config(factory, PlayerConfig::default())
    }

    /// Player using the JSON loader.
    #[must_use]
    pub fn with_config(factory: Rc<dyn Factory>, config: PlayerConfig) -> Self {
        Self::with_loader(factory, JsonDocumentLoader, config)
    }

    /// Player using a custom document loader.
    #[must_use]
    pub fn with_loader(
        factory: Rc<dyn Factory>,
        loader: impl DocumentLoader + 'static,
        config: PlayerConfig,
    ) -> Self {
        Self {
            factory,
            loader: Box::new(loader),
            interactive: config.interactive,
            viewport: (config.viewport_width, config.viewport_height),
            config,
            status: LoadingStatus::Idle,
            file_source: None,
            document: None,
            artboards: Vec::new(),
            animations: Vec::new(),
            state_machines: Vec::new(),
            current_artboard: None,
            current_state_machine: None,
            artboard_swap_pending: false,
            state_machine_swap_pending: false,
            artboard: None,
            animation: None,
            state_machine: None,
            input_map: StateMachineInputMap::default(),
            last_tick: None,
            events: Vec::new(),
        }
    }

    // ---- Loading -------------------------------------------------------

    /// Load the document at `path`.
    pub fn set_file_source(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.set_status(LoadingStatus::Loading);
        let bytes = read_source(&path);
        self.file_source = Some(path.clone());
        match bytes {
            Ok(bytes) => self.load_bytes(&bytes),
            Err(e) => {
                tracing::warn!("{}: {e}", path.display());
                self.fail_load();
            }
        }
    }

    /// The last file source set.
    #[must_use]
    pub fn file_source(&self) -> Option<&Path> {
        self.file_source.as_deref()
    }

    /// Load a document from memory.
    ///
    /// Failures are reported through [`LoadingStatus::Error`].
    pub fn load_bytes(&mut self, bytes: &[u8]) {
        self.set_status(LoadingStatus::Loading);
        let previous_state_machine = self.current_state_machine_name();

        match self.loader.load(bytes, Rc::clone(&self.factory)) {
            Ok(document) => {
                let document = Rc::new(document);
                self.release_instances();
                self.artboards = document
                    .artboards()
                    .iter()
                    .enumerate()
                    .map(|(id, a)| ArtboardInfo {
                        id,
                        name: a.name.clone(),
                    })
                    .collect();
                self.document = Some(document);
                self.events.push(PlayerEvent::ArtboardsChanged);
                tracing::info!("Document loaded with {} artboards", self.artboards.len());
                self.set_status(LoadingStatus::Loaded);

                let count = self.artboards.len();
                let artboard = self
                    .current_artboard
                    .filter(|&i| i < count)
                    .or(self.config.initial_artboard.filter(|&i| i < count));
                let preferred = previous_state_machine
                    .or_else(|| self.config.initial_state_machine.clone());
                self.select_artboard(artboard, preferred.as_deref(), self.current_state_machine);
                // Nothing is being drawn from the new document yet.
                self.apply_pending_swaps();
            }
            Err(e) => {
                tracing::warn!("Failed to load document: {e}");
                self.fail_load();
            }
        }
    }

    fn fail_load(&mut self) {
        self.release_instances();
        self.document = None;
        self.artboards.clear();
        self.animations.clear();
        self.state_machines.clear();
        self.events.extend([
            PlayerEvent::ArtboardsChanged,
            PlayerEvent::AnimationsChanged,
            PlayerEvent::StateMachinesChanged,
        ]);
        self.set_artboard_index(None);
        self.set_state_machine_index(None);
        self.artboard_swap_pending = false;
        self.state_machine_swap_pending = false;
        self.set_status(LoadingStatus::Error);
    }

    fn set_status(&mut self, status: LoadingStatus) {
        if self.status != status {
            tracing::debug!("Loading status {:?} -> {status:?}", self.status);
            self.status = status;
            self.events.push(PlayerEvent::StatusChanged(status));
        }
    }

    /// Current loading status.
    #[must_use]
    pub fn status(&self) -> LoadingStatus {
        self.status
    }

    /// The loaded document.
    #[must_use]
    pub fn document(&self) -> Option<&Rc<Document>> {
        self.document.as_ref()
    }

    // ---- Selection -----------------------------------------------------

    /// Artboards of the loaded document.
    #[must_use]
    pub fn artboards(&self) -> &[ArtboardInfo] {
        &self.artboards
    }

    /// Animations of the selected artboard.
    #[must_use]
    pub fn animations(&self) -> &[AnimationInfo] {
        &self.animations
    }

    /// State machines of the selected artboard.
    #[must_use]
    pub fn state_machines(&self) -> &[StateMachineInfo] {
        &self.state_machines
    }

    /// Selected artboard index.
    #[must_use]
    pub fn current_artboard_index(&self) -> Option<usize> {
        self.current_artboard
    }

    /// Selected state machine index.
    #[must_use]
    pub fn current_state_machine_index(&self) -> Option<usize> {
        self.current_state_machine
    }

    /// Select an artboard. Negative or out-of-range indices select nothing.
    ///
    /// The instance swap happens at the next frame boundary.
    pub fn set_current_artboard_index(&mut self, index: isize) {
        let index = usize::try_from(index)
            .ok()
            .filter(|&i| i < self.artboards.len());
        if index == self.current_artboard {
            return;
        }
        let name = self.current_state_machine_name();
        self.select_artboard(index, name.as_deref(), self.current_state_machine);
    }

    /// Select a state machine. Negative or out-of-range indices select
    /// nothing, which falls back to the first animation.
    ///
    /// The instance swap happens at the next frame boundary.
    pub fn set_current_state_machine_index(&mut self, index: isize) {
        let index = usize::try_from(index)
            .ok()
            .filter(|&i| i < self.state_machines.len());
        if index == self.current_state_machine {
            return;
        }
        self.set_state_machine_index(index);
        self.state_machine_swap_pending = true;
    }

    fn current_state_machine_name(&self) -> Option<String> {
        self.current_state_machine
            .and_then(|i| self.state_machines.get(i))
            .map(|info| info.name.clone())
    }

    fn select_artboard(
        &mut self,
        index: Option<usize>,
        preferred_name: Option<&str>,
        preferred_index: Option<usize>,
    ) {
        self.set_artboard_index(index);
        self.artboard_swap_pending = true;

        let def = index.and_then(|i| self.artboard_def(i));
        self.animations = def.as_ref().map_or_else(Vec::new, |def| {
            def.animations
                .iter()
                .enumerate()
                .map(|(id, a)| AnimationInfo {
                    id,
                    name: a.name.clone(),
                    duration: a.duration_seconds(),
                    fps: a.fps,
                })
                .collect()
        });
        self.state_machines = def.as_ref().map_or_else(Vec::new, |def| {
            def.state_machines
                .iter()
                .enumerate()
                .map(|(id, sm)| StateMachineInfo {
                    id,
                    name: sm.name.clone(),
                })
                .collect()
        });
        self.events.push(PlayerEvent::AnimationsChanged);
        self.events.push(PlayerEvent::StateMachinesChanged);

        let state_machine = def
            .as_deref()
            .and_then(|def| preferred_state_machine(def, preferred_name, preferred_index));
        self.set_state_machine_index(state_machine);
    }

    fn artboard_def(&self, index: usize) -> Option<Rc<ArtboardDef>> {
        self.document.as_ref()?.artboard(index).cloned()
    }

    fn set_artboard_index(&mut self, index: Option<usize>) {
        if self.current_artboard != index {
            self.current_artboard = index;
            self.events.push(PlayerEvent::CurrentArtboardChanged(index));
        }
    }

    fn set_state_machine_index(&mut self, index: Option<usize>) {
        if self.current_state_machine != index {
            self.current_state_machine = index;
            self.events.push(PlayerEvent::CurrentStateMachineChanged(index));
        }
    }

    fn release_instances(&mut self) {
        self.state_machine = None;
        self.animation = None;
        self.artboard = None;
        if self.input_map.is_bound() || !self.input_map.is_empty() {
            self.input_map = StateMachineInputMap::default();
            self.events.push(PlayerEvent::InputMapChanged);
        }
    }

    fn apply_pending_swaps(&mut self) {
        if self.artboard_swap_pending {
            self.artboard_swap_pending = false;
            self.state_machine_swap_pending = true;
            self.release_instances();
            self.artboard = match (&self.document, self.current_artboard) {
                (Some(document), Some(index)) => ArtboardInstance::new(document, index),
                _ => None,
            };
        }

        if self.state_machine_swap_pending {
            self.state_machine_swap_pending = false;
            self.state_machine = None;
            self.animation = None;
            if let Some(artboard) = &self.artboard {
                self.state_machine = self
                    .current_state_machine
                    .and_then(|i| StateMachineInstance::new(artboard, i))
                    .map(|sm| Rc::new(RefCell::new(sm)));
                if self.state_machine.is_none() {
                    self.animation = artboard.animation(0).map(LinearAnimationInstance::new);
                }
            }
            self.input_map = StateMachineInputMap::new(self.state_machine.as_ref());
            self.events.push(PlayerEvent::InputMapChanged);
            tracing::debug!(
                "Driver: state machine {:?}, animation {:?}",
                self.state_machine.as_ref().map(|sm| sm.borrow().name().to_string()),
                self.animation.as_ref().map(LinearAnimationInstance::name)
            );
        }
    }

    // ---- Frame loop ----------------------------------------------------

    /// Advance by the wall time elapsed since the previous tick.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = self.last_tick.map(|last| now - last).unwrap_or_default();
        self.last_tick = Some(now);
        self.advance(elapsed)
    }

    /// Advance by `elapsed`. Applies pending swaps first.
    ///
    /// Returns `true` while the driver still wants frames.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.apply_pending_swaps();
        let seconds = elapsed.as_secs_f32();
        let Some(artboard) = &mut self.artboard else {
            return false;
        };

        let mut keep_going = false;
        if let Some(state_machine) = &self.state_machine {
            if let Ok(mut machine) = state_machine.try_borrow_mut() {
                if seconds > 0.0 || machine.needs_advance() || self.input_map.is_dirty() {
                    keep_going = machine.advance(artboard, seconds);
                }
            }
            self.input_map.clear_dirty();
            self.input_map.update_values();
        } else if let Some(animation) = &mut self.animation {
            keep_going = animation.advance(seconds);
            animation.apply(artboard, 1.0);
        }
        keep_going |= artboard.advance(seconds);
        tracing::trace!("Advanced {seconds}s, keep going: {keep_going}");
        keep_going
    }

    // ---- Drivers -------------------------------------------------------

    /// The current artboard instance.
    #[must_use]
    pub fn artboard(&self) -> Option<&ArtboardInstance> {
        self.artboard.as_ref()
    }

    /// The animation driving the artboard, if no state machine does.
    #[must_use]
    pub fn animation(&self) -> Option<&LinearAnimationInstance> {
        self.animation.as_ref()
    }

    /// The state machine driving the artboard.
    #[must_use]
    pub fn state_machine(&self) -> Option<&Rc<RefCell<StateMachineInstance>>> {
        self.state_machine.as_ref()
    }

    /// The input bridge of the current state machine.
    #[must_use]
    pub fn input_map(&self) -> &StateMachineInputMap {
        &self.input_map
    }

    /// Mutable access to the input bridge.
    pub fn input_map_mut(&mut self) -> &mut StateMachineInputMap {
        &mut self.input_map
    }

    /// Write an input value through the bridge.
    pub fn set_input(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.input_map.set(name, value);
    }

    /// Fire a trigger through the bridge.
    pub fn activate_trigger(&mut self, name: &str) {
        self.input_map.activate_trigger(name);
    }

    /// Play the animation at `index` from its start, replacing any state
    /// machine. Out-of-range indices are ignored.
    pub fn trigger_animation(&mut self, index: usize) {
        let Some(def) = self.artboard.as_ref().and_then(|a| a.animation(index)) else {
            tracing::debug!("No animation {index} to trigger");
            return;
        };
        tracing::debug!("Playing animation '{}'", def.name);
        self.state_machine = None;
        self.state_machine_swap_pending = false;
        self.set_state_machine_index(None);
        self.input_map = StateMachineInputMap::default();
        self.events.push(PlayerEvent::InputMapChanged);
        self.animation = Some(LinearAnimationInstance::new(def));
    }

    // ---- Interaction ---------------------------------------------------

    /// Whether pointer events reach the state machine.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Enable or disable pointer interaction.
    pub fn set_interactive(&mut self, interactive: bool) {
        if self.interactive != interactive {
            self.interactive = interactive;
            self.events.push(PlayerEvent::InteractiveChanged(interactive));
        }
    }

    /// Dispatch a pointer event at viewport position `(x, y)`.
    ///
    /// Returns `true` if a listener region was hit.
    pub fn pointer_event(&mut self, kind: PointerEventKind, x: f32, y: f32) -> bool {
        self.dispatch(PointerEvent::new(kind, x, y))
    }

    /// Dispatch a host pointer event.
    ///
    /// Returns `true` if a listener region was hit. Ignored while the
    /// player is not interactive.
    pub fn dispatch(&mut self, event: PointerEvent) -> bool {
        let PointerEvent { kind, x, y } = event;
        if !self.interactive {
            return false;
        }
        let (Some(artboard), Some(state_machine)) = (&self.artboard, &self.state_machine) else {
            return false;
        };
        let Some(inverse) = self.fit_transform().invert() else {
            return false;
        };
        let point = inverse.transform_point(Vec2D::new(x, y));
        let Ok(mut machine) = state_machine.try_borrow_mut() else {
            return false;
        };
        let hit = machine.pointer_event(artboard, kind, point);
        tracing::trace!("Pointer {kind:?} at ({}, {}) hit: {hit}", point.x, point.y);
        hit
    }

    // ---- Presentation --------------------------------------------------

    /// Set the viewport size the artboard is fitted into.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    /// Viewport size.
    #[must_use]
    pub fn viewport_size(&self) -> (f32, f32) {
        self.viewport
    }

    /// Artboard-to-viewport transform.
    ///
    /// Identity when there is no artboard or the viewport is empty.
    #[must_use]
    pub fn fit_transform(&self) -> Mat2D {
        let Some(artboard) = &self.artboard else {
            return Mat2D::IDENTITY;
        };
        let (width, height) = self.viewport;
        if width <= 0.0 || height <= 0.0 {
            return Mat2D::IDENTITY;
        }
        self.config
            .fit
            .transform(artboard.bounds(), Aabb::from_xywh(0.0, 0.0, width, height))
    }

    /// Draw the current artboard into `renderer`.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        let transform = self.fit_transform();
        let Some(artboard) = &mut self.artboard else {
            return;
        };
        renderer.save();
        renderer.transform(&transform);
        artboard.draw(renderer);
        renderer.restore();
    }

    /// Take all notifications queued since the last call.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Pick the state machine for a freshly selected artboard.
///
/// Name match first, then the same index, then the artboard's default.
fn preferred_state_machine(
    def: &ArtboardDef,
    name: Option<&str>,
    index: Option<usize>,
) -> Option<usize> {
    name.and_then(|name| def.state_machines.iter().position(|sm| sm.name == name))
        .or_else(|| index.filter(|&i| i < def.state_machines.len()))
        .or(def.default_state_machine)
}

fn read_source(path: &Path) -> CoreResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}
