//! State machine inputs.

use crate::document::InputDef;

/// Kind of a state machine input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Floating point value.
    Number,
    /// Boolean value.
    Boolean,
    /// Fire-and-forget event.
    Trigger,
}

/// Current value of an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputState {
    /// Numeric value.
    Number(f32),
    /// Boolean value.
    Boolean(bool),
    /// Trigger; `fired` until the end of the next advance.
    Trigger {
        /// Fired since the last advance.
        fired: bool,
    },
}

/// A named input of a running state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachineInput {
    name: String,
    state: InputState,
}

impl StateMachineInput {
    /// Create an input in its declared initial state.
    #[must_use]
    pub fn from_def(def: &InputDef) -> Self {
        let state = match def {
            InputDef::Number { value, .. } => InputState::Number(*value),
            InputDef::Boolean { value, .. } => InputState::Boolean(*value),
            InputDef::Trigger { .. } => InputState::Trigger { fired: false },
        };
        Self {
            name: def.name().to_string(),
            state,
        }
    }

    /// Input name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input kind.
    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self.state {
            InputState::Number(_) => InputKind::Number,
            InputState::Boolean(_) => InputKind::Boolean,
            InputState::Trigger { .. } => InputKind::Trigger,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> InputState {
        self.state
    }

    /// Numeric value, if this is a number input.
    #[must_use]
    pub fn as_number(&self) -> Option<f32> {
        match self.state {
            InputState::Number(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean input.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.state {
            InputState::Boolean(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is a trigger that has fired since the last advance.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        matches!(self.state, InputState::Trigger { fired: true })
    }

    pub(crate) fn state_mut(&mut self) -> &mut InputState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_def_seeds_initial_values() {
        let number = StateMachineInput::from_def(&InputDef::Number {
            name: "progress".into(),
            value: 0.25,
        });
        assert_eq!(number.kind(), InputKind::Number);
        assert_eq!(number.as_number(), Some(0.25));
        assert_eq!(number.as_bool(), None);

        let trigger = StateMachineInput::from_def(&InputDef::Trigger {
            name: "fire".into(),
        });
        assert_eq!(trigger.kind(), InputKind::Trigger);
        assert!(!trigger.is_fired());
    }
}
