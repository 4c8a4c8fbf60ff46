//! Render-decision engine for a timer item.
//!
//! Given a snapshot of a timer and a monotonic clock reading, the engine decides
//! what a timer item view should show on this tick:
//!
//! - the remaining time (always refreshed),
//! - whether the blinking indicator is visible (a 1 Hz cycle while the timer is
//!   expired or missed, steady otherwise),
//! - which kind of button applies, and whether it changed since the previous
//!   tick so the host can skip relabeling.
//!
//! The engine knows nothing about terminals or widgets. A host applies the
//! returned [`RenderPlan`] to its own view; [`crate::item::Model`] is the host
//! shipped with this crate.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_timer_item::engine::{ButtonKind, RenderDecisionEngine, TimerSnapshot};
//! use bubbletea_timer_item::state::TimerState;
//!
//! let mut engine = RenderDecisionEngine::new();
//!
//! let plan = engine.compute_plan(&TimerSnapshot::new(5_000, TimerState::Running), 0);
//! assert_eq!(plan.button_kind, ButtonKind::AddMinute);
//! assert!(plan.button_updated);
//! assert!(plan.blink_visible);
//!
//! let plan = engine.compute_plan(&TimerSnapshot::new(4_000, TimerState::Running), 600);
//! assert!(!plan.button_updated);
//!
//! let plan = engine.compute_plan(&TimerSnapshot::new(-200, TimerState::Expired), 1_200);
//! assert!(!plan.blink_visible);
//! assert!(plan.button_updated);
//! ```
//!
//! # Re-binding
//!
//! An engine remembers the last state it saw. When a host reuses one engine for a
//! different timer it must call [`RenderDecisionEngine::reset`] first, otherwise
//! the first tick of the new timer may wrongly report an unchanged button.

use crate::state::{InvalidStateError, TimerState};
use crate::timer_text::DisplayedTime;
use tracing::{debug, trace, warn};

/// Length of one full blink cycle in milliseconds.
pub const BLINK_PERIOD_MILLIS: i64 = 1_000;

/// Phase, within a blink cycle, below which the indicator is off.
pub const BLINK_OFF_MILLIS: i64 = 500;

/// Read access to the timer being displayed.
///
/// Implemented by [`TimerSnapshot`]; a host can implement it directly on its own
/// timer model to avoid copying.
pub trait TimerSource {
    /// Remaining time in milliseconds, negative once the timer is overdue.
    fn remaining_time_millis(&self) -> i64;

    /// Current lifecycle state.
    fn state(&self) -> TimerState;
}

/// A timer's observable values at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Remaining time in milliseconds, negative once the timer is overdue.
    pub remaining_time_millis: i64,
    /// Current lifecycle state.
    pub state: TimerState,
}

impl TimerSnapshot {
    /// Creates a snapshot from its parts.
    pub fn new(remaining_time_millis: i64, state: TimerState) -> Self {
        Self {
            remaining_time_millis,
            state,
        }
    }
}

impl TimerSource for TimerSnapshot {
    fn remaining_time_millis(&self) -> i64 {
        self.remaining_time_millis
    }

    fn state(&self) -> TimerState {
        self.state
    }
}

/// A snapshot whose state is still an unchecked integer code.
///
/// This is the shape a timer arrives in from storage or another process.
/// Converting it into a [`TimerSnapshot`] validates the code.
///
/// ```rust
/// use bubbletea_timer_item::engine::{RawTimerSnapshot, TimerSnapshot};
/// use bubbletea_timer_item::state::{InvalidStateError, TimerState};
///
/// let ok = TimerSnapshot::try_from(RawTimerSnapshot::new(1_000, 1)).unwrap();
/// assert_eq!(ok.state, TimerState::Running);
///
/// let err = TimerSnapshot::try_from(RawTimerSnapshot::new(1_000, 99)).unwrap_err();
/// assert_eq!(err, InvalidStateError::Code(99));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTimerSnapshot {
    /// Remaining time in milliseconds.
    pub remaining_time_millis: i64,
    /// State code as persisted by the timer model.
    pub state_code: i32,
}

impl RawTimerSnapshot {
    /// Creates a raw snapshot from its parts.
    pub fn new(remaining_time_millis: i64, state_code: i32) -> Self {
        Self {
            remaining_time_millis,
            state_code,
        }
    }
}

impl TryFrom<RawTimerSnapshot> for TimerSnapshot {
    type Error = InvalidStateError;

    fn try_from(raw: RawTimerSnapshot) -> Result<Self, Self::Error> {
        let state = TimerState::try_from(raw.state_code)?;
        Ok(TimerSnapshot::new(raw.remaining_time_millis, state))
    }
}

/// What the item's single button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    /// Resets the timer to its initial duration. Carries no description.
    Reset,
    /// Adds sixty seconds to the remaining (or overrun) time. The host attaches
    /// a localized description.
    AddMinute,
}

/// The engine's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPlan {
    /// Remaining time to display; refreshed every tick.
    pub displayed_time: DisplayedTime,
    /// Whether the blink-capable indicator is shown this tick.
    pub blink_visible: bool,
    /// The button kind for the current state.
    pub button_kind: ButtonKind,
    /// Whether the state changed since the previous tick, so the button needs
    /// relabeling. When `false` the host can leave the button untouched.
    pub button_updated: bool,
}

/// The only state an engine keeps between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineMemory {
    /// The state seen on the previous tick, `None` before the first tick or
    /// after a reset.
    pub last_state: Option<TimerState>,
}

impl EngineMemory {
    /// Forgets the last observed state.
    pub fn clear(&mut self) {
        self.last_state = None;
    }
}

/// Maps a timer state to the button it calls for.
///
/// Reset and paused timers offer a reset; running, expired and missed timers
/// offer another minute.
pub fn button_kind_for(state: TimerState) -> ButtonKind {
    match state {
        TimerState::Reset | TimerState::Paused => ButtonKind::Reset,
        TimerState::Expired | TimerState::Missed | TimerState::Running => ButtonKind::AddMinute,
    }
}

/// Whether the indicator is in the off half of its blink cycle at `now_millis`.
///
/// The first 500 ms of every second are off, the last 500 ms on. This does not
/// depend on the timer state.
pub fn blink_off(now_millis: i64) -> bool {
    now_millis.rem_euclid(BLINK_PERIOD_MILLIS) < BLINK_OFF_MILLIS
}

/// Whether the indicator is shown for `state` at `now_millis`.
///
/// Hidden exactly when the timer is expired or missed and the cycle is in its
/// off half; always shown otherwise.
pub fn blink_visible(state: TimerState, now_millis: i64) -> bool {
    !(state.is_attention_seeking() && blink_off(now_millis))
}

/// Computes the plan for one tick and records the observed state in `memory`.
///
/// This is the whole decision procedure; [`RenderDecisionEngine`] only owns an
/// [`EngineMemory`] and forwards here.
pub fn plan<T: TimerSource + ?Sized>(
    memory: &mut EngineMemory,
    timer: &T,
    now_millis: i64,
) -> RenderPlan {
    let state = timer.state();
    let button_kind = button_kind_for(state);
    let button_updated = memory.last_state != Some(state);

    if button_updated {
        debug!(
            previous = ?memory.last_state,
            current = %state,
            kind = ?button_kind,
            "timer state changed"
        );
    }
    memory.last_state = Some(state);

    RenderPlan {
        displayed_time: DisplayedTime::from_millis(timer.remaining_time_millis()),
        blink_visible: blink_visible(state, now_millis),
        button_kind,
        button_updated,
    }
}

/// Decides per tick what a timer item view must update.
///
/// One engine belongs to one displayed timer at a time. It holds only the last
/// observed state, performs no I/O and never blocks.
///
/// # Examples
///
/// ```rust
/// use bubbletea_timer_item::engine::{ButtonKind, RenderDecisionEngine, TimerSnapshot};
/// use bubbletea_timer_item::state::TimerState;
///
/// let mut engine = RenderDecisionEngine::new();
/// let paused = TimerSnapshot::new(30_000, TimerState::Paused);
///
/// assert!(engine.compute_plan(&paused, 0).button_updated);
/// assert!(!engine.compute_plan(&paused, 16).button_updated);
///
/// // Bound to another timer: forget what the previous one looked like.
/// engine.reset();
/// let plan = engine.compute_plan(&paused, 32);
/// assert!(plan.button_updated);
/// assert_eq!(plan.button_kind, ButtonKind::Reset);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenderDecisionEngine {
    memory: EngineMemory,
}

impl RenderDecisionEngine {
    /// Creates an engine that has not observed any state yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the plan for `timer` at clock reading `now_millis`.
    ///
    /// `now_millis` must come from a monotonic clock. Any remaining time,
    /// including negative values, is accepted.
    pub fn compute_plan<T: TimerSource + ?Sized>(
        &mut self,
        timer: &T,
        now_millis: i64,
    ) -> RenderPlan {
        plan(&mut self.memory, timer, now_millis)
    }

    /// Computes the plan for a snapshot whose state code is unchecked.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateError`] when the code is not a known state. The
    /// engine's memory is left untouched in that case.
    ///
    /// ```rust
    /// use bubbletea_timer_item::engine::{RawTimerSnapshot, RenderDecisionEngine};
    /// use bubbletea_timer_item::state::InvalidStateError;
    ///
    /// let mut engine = RenderDecisionEngine::new();
    /// let result = engine.try_compute_plan(&RawTimerSnapshot::new(0, 0), 0);
    /// assert_eq!(result, Err(InvalidStateError::Code(0)));
    /// assert_eq!(engine.last_state(), None);
    /// ```
    pub fn try_compute_plan(
        &mut self,
        raw: &RawTimerSnapshot,
        now_millis: i64,
    ) -> Result<RenderPlan, InvalidStateError> {
        let snapshot = TimerSnapshot::try_from(*raw).inspect_err(|err| {
            warn!(error = %err, "rejected timer snapshot");
        })?;
        Ok(self.compute_plan(&snapshot, now_millis))
    }

    /// Forgets the last observed state so the next tick counts as a change.
    ///
    /// Call this whenever the engine is attached to a different timer.
    pub fn reset(&mut self) {
        trace!(last_state = ?self.memory.last_state, "render engine reset");
        self.memory.clear();
    }

    /// The state observed on the previous tick.
    pub fn last_state(&self) -> Option<TimerState> {
        self.memory.last_state
    }

    /// The engine's memory.
    pub fn memory(&self) -> &EngineMemory {
        &self.memory
    }
}
