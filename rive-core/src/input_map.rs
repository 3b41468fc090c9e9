//! External view of a state machine's inputs.
//!
//! [`StateMachineInputMap`] publishes the number and boolean inputs of a
//! [`StateMachineInstance`] as named values, lists its triggers under the
//! reserved [`TRIGGERS_KEY`], and routes writes from the host back into the
//! instance. It only holds a weak reference: the player owns the instance
//! and rebuilds the map whenever the instance is replaced.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::input::{InputKind, InputState};
use crate::state_machine::StateMachineInstance;

/// Reserved key listing the trigger names.
pub const TRIGGERS_KEY: &str = "triggers";

/// A published input value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Number input value.
    Number(f32),
    /// Boolean input value.
    Boolean(bool),
    /// Names of all trigger inputs (only under [`TRIGGERS_KEY`]).
    Triggers(Vec<String>),
}

impl InputValue {
    /// Numeric value, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean value, if any.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Trigger names, if this is the trigger list.
    #[must_use]
    pub fn as_triggers(&self) -> Option<&[String]> {
        match self {
            Self::Triggers(names) => Some(names),
            _ => None,
        }
    }
}

type ChangeCallback = Box<dyn FnMut(&str, &InputValue)>;

/// Name-indexed bridge between a host and a state machine's inputs.
#[derive(Default)]
pub struct StateMachineInputMap {
    instance: Weak<RefCell<StateMachineInstance>>,
    values: HashMap<String, InputValue>,
    callbacks: Vec<ChangeCallback>,
    dirty: bool,
}

impl std::fmt::Debug for StateMachineInputMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachineInputMap")
            .field("values", &self.values)
            .field("dirty", &self.dirty)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl StateMachineInputMap {
    /// Build the map for `instance`. With no instance the map stays empty.
    #[must_use]
    pub fn new(instance: Option<&Rc<RefCell<StateMachineInstance>>>) -> Self {
        let mut map = Self::default();
        let Some(instance) = instance else {
            return map;
        };
        map.instance = Rc::downgrade(instance);

        let Ok(machine) = instance.try_borrow() else {
            tracing::warn!("State machine instance busy; input map left empty");
            return map;
        };
        let mut triggers = Vec::new();
        for input in machine.inputs() {
            if input.name() == TRIGGERS_KEY && input.kind() != InputKind::Trigger {
                tracing::warn!("Input '{TRIGGERS_KEY}' shadowed by the reserved trigger list");
                continue;
            }
            match input.state() {
                InputState::Number(value) => {
                    map.values
                        .insert(input.name().to_string(), InputValue::Number(value));
                }
                InputState::Boolean(value) => {
                    map.values
                        .insert(input.name().to_string(), InputValue::Boolean(value));
                }
                InputState::Trigger { .. } => triggers.push(input.name().to_string()),
            }
        }
        map.values
            .insert(TRIGGERS_KEY.to_string(), InputValue::Triggers(triggers));
        tracing::debug!(
            "Input map built for '{}' with {} keys",
            machine.name(),
            map.values.len()
        );
        map
    }

    /// Whether the map is bound to a live instance.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.instance.strong_count() > 0
    }

    fn with_instance<R>(&self, f: impl FnOnce(&mut StateMachineInstance) -> R) -> Option<R> {
        let instance = self.instance.upgrade()?;
        let Ok(mut machine) = instance.try_borrow_mut() else {
            tracing::warn!("State machine instance busy; input write dropped");
            return None;
        };
        Some(f(&mut machine))
    }

    /// Re-read every number and boolean input and republish changed values.
    pub fn update_values(&mut self) {
        let Some(instance) = self.instance.upgrade() else {
            return;
        };
        let current: Vec<(String, InputValue)> = match instance.try_borrow() {
            Ok(machine) => machine
                .inputs()
                .filter(|input| input.name() != TRIGGERS_KEY)
                .filter_map(|input| match input.state() {
                    InputState::Number(v) => Some((input.name().to_string(), InputValue::Number(v))),
                    InputState::Boolean(v) => {
                        Some((input.name().to_string(), InputValue::Boolean(v)))
                    }
                    InputState::Trigger { .. } => None,
                })
                .collect(),
            Err(_) => return,
        };
        for (name, value) in current {
            self.publish(&name, value);
        }
    }

    /// Fire the trigger `name` and mark the map dirty.
    ///
    /// Unknown names are ignored and leave the dirty flag untouched.
    pub fn activate_trigger(&mut self, name: &str) {
        let fired = self
            .with_instance(|machine| machine.fire_trigger(name))
            .unwrap_or(false);
        if fired {
            tracing::debug!("Trigger '{name}' fired");
            self.dirty = true;
        } else {
            tracing::trace!("No trigger named '{name}'");
        }
    }

    /// Route an externally originated write into the instance.
    ///
    /// Booleans go to boolean inputs, numbers (integer or float) to number
    /// inputs. Writes that match the current value, unknown names and any
    /// other value kind are ignored.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn on_external_value_changed(&mut self, name: &str, value: &serde_json::Value) {
        match value {
            serde_json::Value::Bool(new_value) => {
                let written = self.with_instance(|machine| match machine.get_bool(name) {
                    Some(current) if current != *new_value => {
                        machine.set_bool(name, *new_value);
                        machine.mark_needs_advance();
                        true
                    }
                    _ => false,
                });
                if written == Some(true) {
                    self.publish(name, InputValue::Boolean(*new_value));
                }
            }
            serde_json::Value::Number(number) => {
                let Some(new_value) = number.as_f64().map(|v| v as f32) else {
                    return;
                };
                let written = self.with_instance(|machine| match machine.get_number(name) {
                    Some(current) if current != new_value => machine.set_number(name, new_value),
                    _ => false,
                });
                if written == Some(true) {
                    self.publish(name, InputValue::Number(new_value));
                }
            }
            other => {
                tracing::debug!("Ignoring non-numeric, non-boolean write to '{name}': {other}");
            }
        }
    }

    /// External write entry point.
    pub fn set(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.on_external_value_changed(name, &value.into());
    }

    /// Published value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    /// Published names, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of published keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Register a change callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&str, &InputValue) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Whether a trigger fired since the last [`clear_dirty`](Self::clear_dirty).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset the dirty flag.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Published values as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or_default()))
            .collect();
        serde_json::Value::Object(map)
    }

    fn publish(&mut self, name: &str, value: InputValue) {
        if self.values.get(name) == Some(&value) {
            return;
        }
        self.values.insert(name.to_string(), value.clone());
        for callback in &mut self.callbacks {
            callback(name, &value);
        }
    }
}
