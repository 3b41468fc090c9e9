//! # Rive Core
//!
//! Animation runtime core: documents, artboard instances, linear
//! animations, state machines, the input bridge and the per-frame update
//! loop. Rendering is reached only through the [`Factory`] and
//! [`Renderer`] traits.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Player                     │
//! │  load ─► select artboard ─► select driver   │
//! ├─────────────────────────────────────────────┤
//! │  ArtboardInstance   │  StateMachineInstance │
//! │  - Nodes            │  - Inputs / layers    │
//! │  - Transforms       │  - Listeners          │
//! │  - Lazy resources   │  StateMachineInputMap │
//! ├─────────────────────────────────────────────┤
//! │  Factory / Renderer (backend agnostic)      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod artboard;
pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod factory;
pub mod input;
pub mod input_map;
pub mod loader;
pub mod math;
pub mod path;
pub mod player;
pub mod state_machine;

pub use animation::LinearAnimationInstance;
pub use artboard::ArtboardInstance;
pub use color::ColorInt;
pub use config::{Fit, PlayerConfig};
pub use document::{Document, DocumentDef};
pub use error::{CoreError, CoreResult};
pub use event::{PlayerEvent, PointerEvent, PointerEventKind};
pub use factory::{
    BlendMode, BufferType, Factory, Font, PaintStyle, RenderBuffer, RenderImage, RenderPaint,
    RenderPath, RenderShader, Renderer, StrokeCap, StrokeJoin,
};
pub use input::{InputKind, InputState, StateMachineInput};
pub use input_map::{InputValue, StateMachineInputMap, TRIGGERS_KEY};
pub use loader::{DocumentLoader, JsonDocumentLoader};
pub use math::{Aabb, Mat2D, Vec2D};
pub use path::{FillRule, PathCommand, RawPath};
pub use player::{AnimationInfo, ArtboardInfo, LoadingStatus, Player, StateMachineInfo};
pub use state_machine::{StateMachineInstance, MAX_TRANSITIONS_PER_ADVANCE};
