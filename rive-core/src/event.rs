//! Pointer input and player notifications.

use serde::{Deserialize, Serialize};

use crate::document::ListenerType;
use crate::player::LoadingStatus;

/// Kind of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    /// Pointer entered the item (hover begins).
    Enter,
    /// Pointer left the item (hover ends).
    Exit,
    /// Button pressed.
    Down,
    /// Button released.
    Up,
    /// Pointer moved.
    Move,
}

impl PointerEventKind {
    /// Listener type fired directly by this kind of event.
    #[must_use]
    pub fn listener_type(self) -> ListenerType {
        match self {
            Self::Enter => ListenerType::Enter,
            Self::Exit => ListenerType::Exit,
            Self::Down => ListenerType::Down,
            Self::Up => ListenerType::Up,
            Self::Move => ListenerType::Move,
        }
    }
}

/// A pointer event in host (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Event kind.
    pub kind: PointerEventKind,
    /// X position in viewport coordinates.
    pub x: f32,
    /// Y position in viewport coordinates.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(kind: PointerEventKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }
}

/// Observable change on a [`Player`](crate::Player).
///
/// Hosts drain these after driving the player to refresh whatever
/// presentation they bind to.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Loading status changed.
    StatusChanged(LoadingStatus),
    /// Artboard list changed.
    ArtboardsChanged,
    /// Animation list changed.
    AnimationsChanged,
    /// State machine list changed.
    StateMachinesChanged,
    /// Selected artboard index changed; `None` means no selection.
    CurrentArtboardChanged(Option<usize>),
    /// Selected state machine index changed; `None` means no selection.
    CurrentStateMachineChanged(Option<usize>),
    /// The input bridge was rebuilt against a new instance.
    InputMapChanged,
    /// Interactivity was toggled.
    InteractiveChanged(bool),
}
