//! Running state machines.
//!
//! A [`StateMachineInstance`] owns the input values of one state machine and
//! one cursor per layer. Each [`advance`](StateMachineInstance::advance):
//!
//! 1. takes transitions whose conditions hold (any-state first), up to
//!    [`MAX_TRANSITIONS_PER_ADVANCE`] per layer,
//! 2. advances the current state's animation (cross-fading from the
//!    previous one while a transition duration runs),
//! 3. applies the result to the artboard,
//! 4. consumes all fired triggers.

use std::rc::Rc;

use crate::animation::LinearAnimationInstance;
use crate::artboard::ArtboardInstance;
use crate::document::{
    ConditionDef, LayerDef, ListenerActionDef, ListenerType, StateKind, StateMachineDef,
    TransitionDef,
};
use crate::event::PointerEventKind;
use crate::input::{InputKind, InputState, StateMachineInput};
use crate::math::Vec2D;

/// Upper bound on transitions taken by one layer in a single advance.
pub const MAX_TRANSITIONS_PER_ADVANCE: usize = 100;

struct CrossFade {
    from: LinearAnimationInstance,
    elapsed: f32,
    duration: f32,
}

struct LayerInstance {
    current: usize,
    animation: Option<LinearAnimationInstance>,
    fade: Option<CrossFade>,
}

impl LayerInstance {
    fn new(layer: &LayerDef) -> Self {
        let entry = layer
            .states
            .iter()
            .position(|s| s.kind == StateKind::Entry)
            .unwrap_or_default();
        Self {
            current: entry,
            animation: None,
            fade: None,
        }
    }
}

/// A running instance of a [`StateMachineDef`].
pub struct StateMachineInstance {
    def: Rc<StateMachineDef>,
    inputs: Vec<StateMachineInput>,
    layers: Vec<LayerInstance>,
    hovered: Vec<bool>,
    needs_advance: bool,
}

impl std::fmt::Debug for StateMachineInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachineInstance")
            .field("name", &self.def.name)
            .field("inputs", &self.inputs)
            .field("needs_advance", &self.needs_advance)
            .finish_non_exhaustive()
    }
}

impl StateMachineInstance {
    /// Instantiate state machine `index` of `artboard`.
    ///
    /// Returns `None` when the index is out of range.
    #[must_use]
    pub fn new(artboard: &ArtboardInstance, index: usize) -> Option<Self> {
        let def = artboard.state_machine(index)?;
        let inputs = def.inputs.iter().map(StateMachineInput::from_def).collect();
        let layers = def.layers.iter().map(LayerInstance::new).collect();
        let hovered = vec![false; def.listeners.len()];
        tracing::debug!(
            "Instantiated state machine '{}' ({} inputs, {} layers)",
            def.name,
            def.inputs.len(),
            def.layers.len()
        );
        Some(Self {
            def,
            inputs,
            layers,
            hovered,
            // The entry transitions run on the first advance.
            needs_advance: true,
        })
    }

    /// State machine name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// The definition this instance runs.
    #[must_use]
    pub fn def(&self) -> &Rc<StateMachineDef> {
        &self.def
    }

    /// Number of inputs.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Input by index.
    #[must_use]
    pub fn input(&self, index: usize) -> Option<&StateMachineInput> {
        self.inputs.get(index)
    }

    /// All inputs in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &StateMachineInput> {
        self.inputs.iter()
    }

    fn find(&self, name: &str, kind: InputKind) -> Option<usize> {
        self.inputs
            .iter()
            .position(|i| i.name() == name && i.kind() == kind)
    }

    /// Value of the number input `name`.
    #[must_use]
    pub fn get_number(&self, name: &str) -> Option<f32> {
        self.find(name, InputKind::Number)
            .and_then(|i| self.inputs[i].as_number())
    }

    /// Set the number input `name`. Returns `false` if there is none.
    pub fn set_number(&mut self, name: &str, value: f32) -> bool {
        let Some(index) = self.find(name, InputKind::Number) else {
            return false;
        };
        *self.inputs[index].state_mut() = InputState::Number(value);
        self.needs_advance = true;
        true
    }

    /// Value of the boolean input `name`.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.find(name, InputKind::Boolean)
            .and_then(|i| self.inputs[i].as_bool())
    }

    /// Set the boolean input `name`. Returns `false` if there is none.
    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        let Some(index) = self.find(name, InputKind::Boolean) else {
            return false;
        };
        *self.inputs[index].state_mut() = InputState::Boolean(value);
        self.needs_advance = true;
        true
    }

    /// Whether a trigger input named `name` exists.
    #[must_use]
    pub fn has_trigger(&self, name: &str) -> bool {
        self.find(name, InputKind::Trigger).is_some()
    }

    /// Fire the trigger `name`. Returns `false` if there is none.
    pub fn fire_trigger(&mut self, name: &str) -> bool {
        let Some(index) = self.find(name, InputKind::Trigger) else {
            return false;
        };
        *self.inputs[index].state_mut() = InputState::Trigger { fired: true };
        self.needs_advance = true;
        true
    }

    /// Whether the trigger `name` has fired since the last advance.
    #[must_use]
    pub fn is_trigger_fired(&self, name: &str) -> bool {
        self.find(name, InputKind::Trigger)
            .is_some_and(|i| self.inputs[i].is_fired())
    }

    /// Whether an input changed since the last advance.
    #[must_use]
    pub fn needs_advance(&self) -> bool {
        self.needs_advance
    }

    /// Force the next frame to advance this instance.
    pub fn mark_needs_advance(&mut self) {
        self.needs_advance = true;
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Index of the current state of `layer`.
    #[must_use]
    pub fn current_state(&self, layer: usize) -> Option<usize> {
        self.layers.get(layer).map(|l| l.current)
    }

    /// Name of the animation playing on `layer`, if any.
    #[must_use]
    pub fn current_animation_name(&self, layer: usize) -> Option<&str> {
        self.layers
            .get(layer)?
            .animation
            .as_ref()
            .map(LinearAnimationInstance::name)
    }

    /// Advance every layer by `elapsed` seconds and apply the result.
    ///
    /// Returns `true` while the machine still wants frames.
    pub fn advance(&mut self, artboard: &mut ArtboardInstance, elapsed: f32) -> bool {
        let def = Rc::clone(&self.def);
        let mut keep_going = false;
        for (layer, layer_def) in self.layers.iter_mut().zip(&def.layers) {
            keep_going |= advance_layer(layer, layer_def, &self.inputs, artboard, elapsed);
        }

        for input in &mut self.inputs {
            if let InputState::Trigger { fired } = input.state_mut() {
                *fired = false;
            }
        }
        self.needs_advance = false;
        tracing::trace!("State machine '{}' advanced by {elapsed}s", def.name);
        keep_going
    }

    /// Dispatch a pointer event at `point` (artboard space) to the listeners.
    ///
    /// Returns `true` if the point lies on any listener's target.
    pub fn pointer_event(
        &mut self,
        artboard: &ArtboardInstance,
        kind: PointerEventKind,
        point: Vec2D,
    ) -> bool {
        let def = Rc::clone(&self.def);
        let mut hit = false;
        let mut actions: Vec<&ListenerActionDef> = Vec::new();

        for (listener, hovered) in def.listeners.iter().zip(self.hovered.iter_mut()) {
            let over = kind != PointerEventKind::Exit && artboard.hit_test(listener.target, point);
            let was_over = *hovered;
            let fires = match listener.listener_type {
                ListenerType::Enter => over && !was_over,
                ListenerType::Exit => was_over && !over,
                other => over && other == kind.listener_type(),
            };
            *hovered = over;
            hit |= over;
            if fires {
                actions.extend(&listener.actions);
            }
        }

        for action in actions {
            self.perform(action);
        }
        hit
    }

    fn perform(&mut self, action: &ListenerActionDef) {
        match action {
            ListenerActionDef::SetBool { input, value } => {
                self.set_bool(input, *value);
            }
            ListenerActionDef::ToggleBool { input } => {
                if let Some(current) = self.get_bool(input) {
                    self.set_bool(input, !current);
                }
            }
            ListenerActionDef::SetNumber { input, value } => {
                self.set_number(input, *value);
            }
            ListenerActionDef::FireTrigger { input } => {
                self.fire_trigger(input);
            }
        }
    }
}

fn advance_layer(
    layer: &mut LayerInstance,
    def: &LayerDef,
    inputs: &[StateMachineInput],
    artboard: &mut ArtboardInstance,
    elapsed: f32,
) -> bool {
    let mut changed = false;
    for _ in 0..MAX_TRANSITIONS_PER_ADVANCE {
        let Some(transition) = find_transition(layer, def, inputs) else {
            break;
        };
        enter_state(layer, def, transition, artboard);
        changed = true;
    }

    if let Some(fade) = &mut layer.fade {
        fade.from.advance(elapsed);
        fade.elapsed += elapsed;
        fade.from.apply(artboard, 1.0);
    }

    let mut keep_going = changed;
    if let Some(animation) = &mut layer.animation {
        let playing = animation.advance(elapsed);
        let mix = match &layer.fade {
            Some(fade) if fade.duration > 0.0 => (fade.elapsed / fade.duration).min(1.0),
            _ => 1.0,
        };
        animation.apply(artboard, mix);
        keep_going |= playing;
    }

    if layer.fade.as_ref().is_some_and(|f| f.elapsed >= f.duration) {
        layer.fade = None;
    }
    keep_going || layer.fade.is_some()
}

fn find_transition<'a>(
    layer: &LayerInstance,
    def: &'a LayerDef,
    inputs: &[StateMachineInput],
) -> Option<&'a TransitionDef> {
    let progress = layer.animation.as_ref().map(LinearAnimationInstance::progress);
    let any_states = def.states.iter().filter(|s| s.kind == StateKind::Any);
    let current = def.states.get(layer.current);

    any_states
        .chain(current)
        .flat_map(|state| state.transitions.iter())
        // Self transitions would restart the state on every pass.
        .filter(|t| t.to != layer.current)
        .find(|t| {
            let exit_ok = match (t.exit_time, progress) {
                (Some(exit_time), Some(progress)) => progress >= exit_time,
                _ => true,
            };
            exit_ok && t.conditions.iter().all(|c| condition_holds(c, inputs))
        })
}

fn condition_holds(condition: &ConditionDef, inputs: &[StateMachineInput]) -> bool {
    let find = |name: &str| inputs.iter().find(|i| i.name() == name);
    match condition {
        ConditionDef::Bool { input, value } => {
            find(input).and_then(StateMachineInput::as_bool) == Some(*value)
        }
        ConditionDef::Number { input, op, value } => find(input)
            .and_then(StateMachineInput::as_number)
            .is_some_and(|current| op.evaluate(current, *value)),
        ConditionDef::Trigger { input } => find(input).is_some_and(StateMachineInput::is_fired),
    }
}

fn enter_state(
    layer: &mut LayerInstance,
    def: &LayerDef,
    transition: &TransitionDef,
    artboard: &ArtboardInstance,
) {
    let Some(state) = def.states.get(transition.to) else {
        return;
    };
    tracing::debug!(
        "Layer '{}' transition {} -> {}",
        def.name,
        layer.current,
        transition.to
    );
    layer.current = transition.to;

    let previous = layer.animation.take();
    layer.fade = match previous {
        Some(from) if transition.duration > 0.0 => Some(CrossFade {
            from,
            elapsed: 0.0,
            duration: transition.duration,
        }),
        _ => None,
    };
    layer.animation = match state.kind {
        StateKind::Animation { animation, speed } => artboard
            .animation(animation)
            .map(|def| LinearAnimationInstance::with_speed(def, speed)),
        StateKind::Entry | StateKind::Any | StateKind::Exit => None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ComparisonOp, InputDef};

    fn inputs() -> Vec<StateMachineInput> {
        [
            InputDef::Number {
                name: "level".into(),
                value: 3.0,
            },
            InputDef::Boolean {
                name: "on".into(),
                value: true,
            },
            InputDef::Trigger { name: "go".into() },
        ]
        .iter()
        .map(StateMachineInput::from_def)
        .collect()
    }

    #[test]
    fn test_number_conditions() {
        let inputs = inputs();
        let cond = |op, value| ConditionDef::Number {
            input: "level".into(),
            op,
            value,
        };
        assert!(condition_holds(&cond(ComparisonOp::Equal, 3.0), &inputs));
        assert!(condition_holds(&cond(ComparisonOp::GreaterThan, 2.0), &inputs));
        assert!(!condition_holds(&cond(ComparisonOp::LessThan, 3.0), &inputs));
        assert!(condition_holds(&cond(ComparisonOp::LessThanOrEqual, 3.0), &inputs));
    }

    #[test]
    fn test_bool_and_trigger_conditions() {
        let mut inputs = inputs();
        let on = ConditionDef::Bool {
            input: "on".into(),
            value: true,
        };
        let go = ConditionDef::Trigger { input: "go".into() };
        assert!(condition_holds(&on, &inputs));
        assert!(!condition_holds(&go, &inputs));

        *inputs[2].state_mut() = InputState::Trigger { fired: true };
        assert!(condition_holds(&go, &inputs));
    }

    #[test]
    fn test_condition_on_wrong_kind_fails() {
        let inputs = inputs();
        let cond = ConditionDef::Bool {
            input: "level".into(),
            value: true,
        };
        assert!(!condition_holds(&cond, &inputs));
    }
}
