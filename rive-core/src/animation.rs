//! Linear animation playback.

use std::rc::Rc;

use crate::artboard::ArtboardInstance;
use crate::document::{AnimationDef, Interpolation, KeyFrameDef, LoopMode};

/// Plays one [`AnimationDef`] against an artboard.
#[derive(Debug, Clone)]
pub struct LinearAnimationInstance {
    def: Rc<AnimationDef>,
    time: f32,
    direction: f32,
    speed: f32,
    did_loop: bool,
}

impl LinearAnimationInstance {
    /// Start `def` at time zero, playing forward.
    #[must_use]
    pub fn new(def: Rc<AnimationDef>) -> Self {
        Self::with_speed(def, 1.0)
    }

    /// Start `def` with an extra speed multiplier.
    #[must_use]
    pub fn with_speed(def: Rc<AnimationDef>, speed: f32) -> Self {
        Self {
            def,
            time: 0.0,
            direction: 1.0,
            speed,
            did_loop: false,
        }
    }

    /// The animation definition.
    #[must_use]
    pub fn def(&self) -> &Rc<AnimationDef> {
        &self.def
    }

    /// Animation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Current time in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Jump to `time` seconds, clamped to the animation range.
    pub fn set_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.def.duration_seconds());
    }

    /// Fraction of the animation played, in `0..=1`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let duration = self.def.duration_seconds();
        if duration <= 0.0 {
            1.0
        } else {
            (self.time / duration).clamp(0.0, 1.0)
        }
    }

    /// Whether the last advance wrapped around or bounced.
    #[must_use]
    pub fn did_loop(&self) -> bool {
        self.did_loop
    }

    /// Advance by `elapsed` seconds.
    ///
    /// Returns `false` once a one-shot animation has reached its end.
    pub fn advance(&mut self, elapsed: f32) -> bool {
        let duration = self.def.duration_seconds();
        let delta = elapsed * self.def.speed * self.speed * self.direction;
        self.did_loop = false;

        if duration <= 0.0 {
            self.time = 0.0;
            return false;
        }

        match self.def.loop_mode {
            LoopMode::OneShot => {
                self.time += delta;
                if self.time >= duration {
                    self.time = duration;
                    return false;
                }
                if self.time <= 0.0 && self.direction < 0.0 {
                    self.time = 0.0;
                    return false;
                }
            }
            LoopMode::Loop => {
                let next = self.time + delta;
                if next >= duration || next < 0.0 {
                    self.did_loop = true;
                }
                self.time = next.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                // Whole round trips do not change the state.
                let mut remaining = delta % (2.0 * duration);
                loop {
                    let next = self.time + remaining;
                    if next > duration {
                        remaining = next - duration;
                        self.time = duration;
                        self.direction = -self.direction;
                        remaining = -remaining;
                        self.did_loop = true;
                    } else if next < 0.0 {
                        remaining = -next;
                        self.time = 0.0;
                        self.direction = -self.direction;
                        self.did_loop = true;
                    } else {
                        self.time = next;
                        break;
                    }
                }
            }
        }
        true
    }

    /// Write the animated values at the current time into `artboard`.
    ///
    /// `mix` blends from the artboard's current values (0) to the
    /// animation's values (1).
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(&self, artboard: &mut ArtboardInstance, mix: f32) {
        let frame = self.time * self.def.fps as f32;
        for keyed in &self.def.keyed {
            let Some(value) = sample(&keyed.keyframes, frame) else {
                continue;
            };
            let value = if mix >= 1.0 {
                value
            } else {
                let Some(current) = artboard.node_property(keyed.node, keyed.property) else {
                    continue;
                };
                current + (value - current) * mix
            };
            artboard.set_node_property(keyed.node, keyed.property, value);
        }
    }
}

/// Value of a keyframe track at `frame`.
#[allow(clippy::cast_precision_loss)]
fn sample(keyframes: &[KeyFrameDef], frame: f32) -> Option<f32> {
    let first = keyframes.first()?;
    let last = keyframes.last()?;
    if frame <= first.frame as f32 {
        return Some(first.value);
    }
    if frame >= last.frame as f32 {
        return Some(last.value);
    }
    let next_index = keyframes.partition_point(|k| k.frame as f32 <= frame);
    let from = &keyframes[next_index - 1];
    let to = &keyframes[next_index];
    match from.interpolation {
        Interpolation::Hold => Some(from.value),
        Interpolation::Linear => {
            let span = (to.frame - from.frame) as f32;
            if span <= 0.0 {
                return Some(to.value);
            }
            let t = (frame - from.frame as f32) / span;
            Some(from.value + (to.value - from.value) * t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animation(loop_mode: LoopMode) -> Rc<AnimationDef> {
        Rc::new(AnimationDef {
            name: "anim".to_string(),
            fps: 10,
            duration: 10,
            loop_mode,
            speed: 1.0,
            keyed: Vec::new(),
        })
    }

    fn key(frame: u32, value: f32, interpolation: Interpolation) -> KeyFrameDef {
        KeyFrameDef {
            frame,
            value,
            interpolation,
        }
    }

    #[test]
    fn test_one_shot_stops_at_end() {
        let mut instance = LinearAnimationInstance::new(animation(LoopMode::OneShot));
        assert!(instance.advance(0.5));
        assert!(!instance.advance(0.75));
        assert!((instance.time() - 1.0).abs() < 1e-5);
        assert!(!instance.advance(0.1));
    }

    #[test]
    fn test_loop_wraps() {
        let mut instance = LinearAnimationInstance::new(animation(LoopMode::Loop));
        assert!(instance.advance(1.25));
        assert!(instance.did_loop());
        assert!((instance.time() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_ping_pong_bounces() {
        let mut instance = LinearAnimationInstance::new(animation(LoopMode::PingPong));
        instance.advance(1.25);
        assert!(instance.did_loop());
        assert!((instance.time() - 0.75).abs() < 1e-5);
        instance.advance(0.5);
        assert!((instance.time() - 0.25).abs() < 1e-5);
        instance.advance(0.5);
        assert!((instance.time() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_sample_linear_and_hold() {
        let keys = [
            key(0, 0.0, Interpolation::Linear),
            key(10, 100.0, Interpolation::Hold),
            key(20, 0.0, Interpolation::Linear),
        ];
        assert!((sample(&keys, 5.0).unwrap_or_default() - 50.0).abs() < 1e-4);
        assert!((sample(&keys, 15.0).unwrap_or_default() - 100.0).abs() < 1e-4);
        assert!((sample(&keys, 25.0).unwrap_or_default()).abs() < 1e-4);
        assert!(sample(&[], 1.0).is_none());
    }
}
