#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-timer-item/")]

//! # bubbletea-timer-item
//!
//! A timer list item for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications, built around a small, toolkit-independent render-decision
//! engine.
//!
//! ## Overview
//!
//! A timer item shows three things: the remaining time, an indicator that blinks
//! while the timer is expired or missed, and a button that either resets the
//! timer or adds a minute to it. Deciding what to show is separated from showing
//! it:
//!
//! - [`engine`] turns a timer snapshot and a clock reading into a
//!   [`RenderPlan`]. It has no UI dependencies and can drive any front end.
//! - [`item`] is a Bubble Tea component that applies plans to styled text and
//!   keeps the indicator blinking with its own frame loop.
//!
//! The timer itself (its countdown, persistence and state machine) belongs to the
//! application. The item only reads it through [`TimerSource`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`state`] | The five timer states and their untyped forms |
//! | [`engine`] | Blink, button and refresh decisions per tick |
//! | [`clock`] | Monotonic and manual millisecond clocks |
//! | [`timer_text`] | Remaining-time formatting |
//! | [`item`] | The Bubble Tea timer item component |
//!
//! ## Deciding without a UI
//!
//! ```rust
//! use bubbletea_timer_item::prelude::*;
//!
//! let mut engine = RenderDecisionEngine::new();
//!
//! let plan = engine.compute_plan(&TimerSnapshot::new(-200, TimerState::Expired), 1_200);
//! assert!(!plan.blink_visible); // first half of the second: off
//! assert_eq!(plan.button_kind, ButtonKind::AddMinute);
//! assert!(plan.button_updated);
//! assert_eq!(plan.displayed_time.to_string(), "-00:00");
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust
//! use bubbletea_timer_item::prelude::*;
//! use bubbletea_rs::{Cmd, Model, Msg};
//!
//! struct App {
//!     item: TimerItem,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut item = timer_item_new(&[]);
//!         item.bind(1, &TimerSnapshot::new(25 * 60_000, TimerState::Running));
//!         let cmd = item.init();
//!         (Self { item }, Some(cmd))
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.item.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.item.view()
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! State changes, re-binds and rejected snapshots are reported through
//! [`tracing`](https://docs.rs/tracing). Install a subscriber in the application
//! to see them.

pub mod clock;
pub mod engine;
pub mod item;
pub mod state;
pub mod timer_text;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{
    blink_visible, button_kind_for, plan, ButtonKind, EngineMemory, RawTimerSnapshot,
    RenderDecisionEngine, RenderPlan, TimerSnapshot, TimerSource,
};
pub use item::{
    new as timer_item_new, with_frame_interval, with_labels, with_styles, FrameMsg,
    ItemOption, Labels as TimerItemLabels, Model as TimerItem, Styles as TimerItemStyles,
    DEFAULT_LABELS,
};
pub use state::{InvalidStateError, TimerState};
pub use timer_text::{format_remaining, DisplayedTime};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_timer_item::prelude::*;
///
/// let engine = RenderDecisionEngine::new();
/// assert_eq!(engine.last_state(), None);
/// ```
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, MonotonicClock};
    pub use crate::engine::{
        ButtonKind, RawTimerSnapshot, RenderDecisionEngine, RenderPlan, TimerSnapshot,
        TimerSource,
    };
    pub use crate::item::{
        new as timer_item_new, with_frame_interval, with_labels, with_styles,
        Labels as TimerItemLabels, Model as TimerItem, Styles as TimerItemStyles,
    };
    pub use crate::state::{InvalidStateError, TimerState};
    pub use crate::timer_text::DisplayedTime;
}
