//! Level-sampled push-button gesture classifier.
//!
//! ## Hardware
//!
//! Push buttons sit on the opto-isolated input bank; there is no per-line
//! interrupt, so the trigger sweep samples each line once per tick and
//! feeds the level into `tick()`, which runs the debounce + gesture state
//! machine.
//!
//! ## Gesture detection
//!
//! | Gesture      | Condition                                   | Event          |
//! |-------------|---------------------------------------------|----------------|
//! | Short press | Release before long threshold, no 2nd press | `ShortPress`   |
//! | Long press  | Held >= `long_press_ms`                     | `LongPress`    |
//! | Double press| Second press within `double_press_window_ms`| `DoublePress`  |

use serde::{Deserialize, Serialize};

use crate::config::RuntimeConfig;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
    DoublePress,
}

/// Gesture thresholds, taken from [`RuntimeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTiming {
    pub debounce_ms: u32,
    pub long_press_ms: u32,
    pub double_press_window_ms: u32,
}

impl From<&RuntimeConfig> for GestureTiming {
    fn from(cfg: &RuntimeConfig) -> Self {
        Self {
            debounce_ms: cfg.debounce_ms,
            long_press_ms: cfg.long_press_ms,
            double_press_window_ms: cfg.double_press_window_ms,
        }
    }
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self::from(&RuntimeConfig::default())
    }
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u64 },
    Pressed { since_ms: u64 },
    WaitSecondPress { first_release_ms: u64 },
    /// A gesture already fired for this press; wait for release.
    WaitRelease,
}

#[derive(Debug, Clone, Copy)]
pub struct GestureDetector {
    state: GestureState,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDetector {
    pub const fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Forget any press in progress.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Feed one level sample.  `pressed` is the logical (active) input level,
    /// `now_ms` the monotonic time of the sample.
    pub fn tick(&mut self, pressed: bool, now_ms: u64, timing: &GestureTiming) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if !pressed {
                    self.state = GestureState::Idle;
                } else if now_ms.saturating_sub(since_ms) >= u64::from(timing.debounce_ms) {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if !pressed {
                    self.state = GestureState::WaitSecondPress {
                        first_release_ms: now_ms,
                    };
                    return None;
                }
                if now_ms.saturating_sub(since_ms) >= u64::from(timing.long_press_ms) {
                    self.state = GestureState::WaitRelease;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::WaitSecondPress { first_release_ms } => {
                let gap = now_ms.saturating_sub(first_release_ms);
                if gap > u64::from(timing.double_press_window_ms) {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                if pressed && gap >= u64::from(timing.debounce_ms) {
                    self.state = GestureState::WaitRelease;
                    return Some(ButtonEvent::DoublePress);
                }
                None
            }

            GestureState::WaitRelease => {
                if !pressed {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }
}
