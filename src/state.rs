//! Timer lifecycle states as observed by the item widget.
//!
//! The timer model owns its own state machine; this module only names the five
//! states it can report and converts them from the untyped forms a host may hold
//! (persisted integer codes, or upper-case names).
//!
//! # Examples
//!
//! ```rust
//! use bubbletea_timer_item::state::{InvalidStateError, TimerState};
//!
//! assert_eq!(TimerState::try_from(3), Ok(TimerState::Expired));
//! assert_eq!("missed".parse::<TimerState>(), Ok(TimerState::Missed));
//! assert_eq!(
//!     TimerState::try_from(42),
//!     Err(InvalidStateError::Code(42))
//! );
//! ```

use std::fmt;
use std::str::FromStr;

/// Error returned when a state value is not one of the five known variants.
///
/// This is an integration error: the timer model is expected to always report a
/// valid state. Callers should propagate it rather than substitute a default,
/// since a guessed state would silently pick the wrong button.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidStateError {
    /// An integer code outside `1..=5`.
    #[error("invalid timer state code: {0}")]
    Code(i32),

    /// A name that is not `RESET`, `PAUSED`, `RUNNING`, `EXPIRED` or `MISSED`.
    #[error("invalid timer state name: {0}")]
    Name(String),
}

/// The lifecycle state reported by a timer.
///
/// # Examples
///
/// ```rust
/// use bubbletea_timer_item::state::TimerState;
///
/// assert!(TimerState::Expired.is_attention_seeking());
/// assert!(TimerState::Missed.is_attention_seeking());
/// assert!(!TimerState::Running.is_attention_seeking());
/// assert_eq!(TimerState::Paused.to_string(), "PAUSED");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// Counting down.
    Running,
    /// Stopped with time remaining.
    Paused,
    /// Reached zero and currently alerting.
    Expired,
    /// Back at its initial duration, not started.
    Reset,
    /// Expired without being acknowledged.
    Missed,
}

impl TimerState {
    /// All states, in code order.
    pub const ALL: [TimerState; 5] = [
        TimerState::Running,
        TimerState::Paused,
        TimerState::Expired,
        TimerState::Reset,
        TimerState::Missed,
    ];

    /// Returns the persisted integer code of this state.
    pub fn code(self) -> i32 {
        match self {
            TimerState::Running => 1,
            TimerState::Paused => 2,
            TimerState::Expired => 3,
            TimerState::Reset => 4,
            TimerState::Missed => 5,
        }
    }

    /// Returns the upper-case name of this state.
    pub fn name(self) -> &'static str {
        match self {
            TimerState::Running => "RUNNING",
            TimerState::Paused => "PAUSED",
            TimerState::Expired => "EXPIRED",
            TimerState::Reset => "RESET",
            TimerState::Missed => "MISSED",
        }
    }

    /// Returns `true` for [`TimerState::Expired`].
    pub fn is_expired(self) -> bool {
        self == TimerState::Expired
    }

    /// Returns `true` for [`TimerState::Missed`].
    pub fn is_missed(self) -> bool {
        self == TimerState::Missed
    }

    /// Returns `true` while the timer wants the user's attention, i.e. it is
    /// expired or missed. Only these states make the indicator blink.
    pub fn is_attention_seeking(self) -> bool {
        self.is_expired() || self.is_missed()
    }
}

impl TryFrom<i32> for TimerState {
    type Error = InvalidStateError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        TimerState::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or(InvalidStateError::Code(code))
    }
}

impl FromStr for TimerState {
    type Err = InvalidStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimerState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidStateError::Name(s.to_string()))
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
