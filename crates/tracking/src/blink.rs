//! Blink-to-click state machine.
//!
//! A short eye closure is a click. Holding the eyes closed past the
//! long-press threshold presses the primary button, and opening them again
//! releases it, which makes drag gestures possible.

use facecursor_common::config::BlinkDefaults;
use tracing::debug;

/// Default closure duration (seconds) that turns a click into a press.
pub const DEFAULT_LONG_PRESS_SECS: f64 = 1.0;

/// Pointer button effect of a blink transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlinkEvent {
    /// Press and release in one go.
    Click,
    /// Press and hold.
    Press,
    /// Release a held press.
    Release,
}

/// Where the current blink episode stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlinkPhase {
    Open,
    /// Eyes closed since `since`, not yet long enough for a press.
    BlinkingShort { since: f64 },
    /// Eyes closed past the threshold; the button is held.
    BlinkingLong { since: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlinkStateMachine {
    long_press_secs: f64,
    phase: BlinkPhase,
}

impl Default for BlinkStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS_SECS)
    }
}

impl BlinkStateMachine {
    pub fn new(long_press_secs: f64) -> Self {
        Self {
            long_press_secs,
            phase: BlinkPhase::Open,
        }
    }

    pub fn from_defaults(defaults: &BlinkDefaults) -> Self {
        Self::new(defaults.long_press_secs)
    }

    /// Advance with one frame's blink flag at `now_secs`.
    ///
    /// Returns the pointer events this transition produces, usually none.
    pub fn update(&mut self, is_blinking: bool, now_secs: f64) -> Vec<BlinkEvent> {
        let mut events = Vec::new();

        self.phase = match (self.phase, is_blinking) {
            (BlinkPhase::Open, true) => {
                debug!(at = now_secs, "Blink started");
                BlinkPhase::BlinkingShort { since: now_secs }
            }
            (BlinkPhase::Open, false) => BlinkPhase::Open,

            (BlinkPhase::BlinkingShort { since }, true) => {
                if now_secs - since >= self.long_press_secs {
                    debug!(held_secs = now_secs - since, "Long blink, pressing");
                    events.push(BlinkEvent::Press);
                    BlinkPhase::BlinkingLong { since }
                } else {
                    BlinkPhase::BlinkingShort { since }
                }
            }
            (BlinkPhase::BlinkingShort { since }, false) => {
                let held = now_secs - since;
                if held < self.long_press_secs {
                    debug!(held_secs = held, "Short blink, clicking");
                    events.push(BlinkEvent::Click);
                } else {
                    // The threshold passed between two samples.
                    debug!(held_secs = held, "Long blink ended between samples");
                    events.push(BlinkEvent::Press);
                    events.push(BlinkEvent::Release);
                }
                BlinkPhase::Open
            }

            (BlinkPhase::BlinkingLong { since }, true) => BlinkPhase::BlinkingLong { since },
            (BlinkPhase::BlinkingLong { since }, false) => {
                debug!(held_secs = now_secs - since, "Long blink ended, releasing");
                events.push(BlinkEvent::Release);
                BlinkPhase::Open
            }
        };

        events
    }

    /// Return to `Open`. If the button is held, the `Release` that keeps
    /// presses paired is returned.
    pub fn reset(&mut self) -> Option<BlinkEvent> {
        let held = self.is_pressed();
        self.phase = BlinkPhase::Open;
        held.then_some(BlinkEvent::Release)
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.phase, BlinkPhase::BlinkingLong { .. })
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn long_press_secs(&self) -> f64 {
        self.long_press_secs
    }
}
