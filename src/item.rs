//! Timer item component for Bubble Tea applications.
//!
//! An item shows one timer: its remaining time, an indicator that blinks while
//! the timer is expired or missed, and a button that either resets the timer or
//! adds a minute to it. The decisions come from a
//! [`RenderDecisionEngine`](crate::engine::RenderDecisionEngine); this module
//! only applies them to text and styles.
//!
//! The item does not own the timer. The application keeps its timers and hands
//! the item a fresh [`TimerSource`] whenever a timer changes. In between, the
//! item's own frame ticks keep the indicator blinking.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_timer_item::item::new;
//! use bubbletea_timer_item::engine::TimerSnapshot;
//! use bubbletea_timer_item::state::TimerState;
//!
//! let mut item = new(&[]);
//! item.bind(7, &TimerSnapshot::new(90_000, TimerState::Running));
//!
//! assert_eq!(item.time_text(), "01:30");
//! assert_eq!(item.button_label(), "+1:00");
//! assert_eq!(item.button_description(), Some("Add 1 minute"));
//! ```
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use bubbletea_timer_item::engine::TimerSnapshot;
//! use bubbletea_timer_item::item::{new, Model};
//! use bubbletea_timer_item::state::TimerState;
//!
//! struct App {
//!     item: Model,
//!     timer: TimerSnapshot,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut item = new(&[]);
//!         let timer = TimerSnapshot::new(300_000, TimerState::Paused);
//!         item.bind(1, &timer);
//!         let cmd = item.init();
//!         (Self { item, timer }, Some(cmd))
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         // Your timer model would push new snapshots here.
//!         self.item.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.item.view()
//!     }
//! }
//! ```

use crate::clock::{Clock, MonotonicClock};
use crate::engine::{
    ButtonKind, RawTimerSnapshot, RenderDecisionEngine, RenderPlan, TimerSnapshot, TimerSource,
};
use crate::state::InvalidStateError;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use lipgloss_extras::prelude::*;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{trace, warn};
use unicode_width::UnicodeWidthStr;

// Internal ID management for item instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Default time between frames.
///
/// The indicator changes every 500 ms, so anything well under that keeps the
/// blink crisp.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Text shown by the item, supplied by the application for its locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Button label when the button resets the timer.
    pub reset: String,
    /// Button label when the button adds a minute.
    pub add_minute: String,
    /// Longer description of the add-minute action, for screen readers and
    /// help lines. The reset button has none.
    pub add_minute_description: String,
    /// Glyph used for the blinking indicator.
    pub indicator: String,
}

/// English labels.
pub static DEFAULT_LABELS: Lazy<Labels> = Lazy::new(|| Labels {
    reset: "Reset".to_string(),
    add_minute: "+1:00".to_string(),
    add_minute_description: "Add 1 minute".to_string(),
    indicator: "●".to_string(),
});

impl Default for Labels {
    fn default() -> Self {
        DEFAULT_LABELS.clone()
    }
}

/// Styles for the three parts of an item.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Style of the indicator glyph.
    pub indicator: Style,
    /// Style of the remaining time.
    pub time: Style,
    /// Style of the bracketed button.
    pub button: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            indicator: Style::new().foreground(AdaptiveColor {
                Light: "#D7005F",
                Dark: "#FF5F87",
            }),
            time: Style::new().bold(true),
            button: Style::new().foreground(AdaptiveColor {
                Light: "#5A56E0",
                Dark: "#7571F9",
            }),
        }
    }
}

/// Message that drives the item's frame loop.
///
/// Frames re-evaluate the blink phase against the clock so the indicator keeps
/// blinking even when the timer itself has nothing new to report.
#[derive(Debug, Clone)]
pub struct FrameMsg {
    /// The item this frame belongs to. Zero, as in [`FrameMsg::broadcast`], addresses every item.
    pub id: i64,
    /// Sequence tag; stale frames are dropped so the loop never runs doubled.
    tag: i64,
}

impl FrameMsg {
    /// Creates a frame that every item accepts, whatever its id or tag.
    ///
    /// Useful for forcing an immediate refresh of all items, for instance after
    /// the terminal regains focus.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::item::{new, FrameMsg};
    ///
    /// let mut first = new(&[]);
    /// let mut second = new(&[]);
    /// assert!(first.update(Box::new(FrameMsg::broadcast())).is_some());
    /// assert!(second.update(Box::new(FrameMsg::broadcast())).is_some());
    /// ```
    pub fn broadcast() -> Self {
        Self { id: 0, tag: 0 }
    }
}

/// Configuration options for [`new`], following the options pattern.
#[derive(Debug, Clone)]
pub enum ItemOption {
    /// Sets the labels.
    Labels(Labels),
    /// Sets the styles.
    Styles(Styles),
    /// Sets the time between frames.
    FrameInterval(Duration),
}

impl ItemOption {
    fn apply<C: Clock>(&self, m: &mut Model<C>) {
        match self {
            ItemOption::Labels(labels) => m.labels = labels.clone(),
            ItemOption::Styles(styles) => m.styles = styles.clone(),
            ItemOption::FrameInterval(interval) => m.frame_interval = *interval,
        }
    }
}

/// Option setting the item's labels.
pub fn with_labels(labels: Labels) -> ItemOption {
    ItemOption::Labels(labels)
}

/// Option setting the item's styles.
pub fn with_styles(styles: Styles) -> ItemOption {
    ItemOption::Styles(styles)
}

/// Option setting the time between frames.
pub fn with_frame_interval(interval: Duration) -> ItemOption {
    ItemOption::FrameInterval(interval)
}

/// A visual representation of one timer.
///
/// The clock parameter exists so tests and hosts with their own time base can
/// drive the blink phase; applications normally use the default
/// [`MonotonicClock`].
///
/// # Examples
///
/// ```rust
/// use bubbletea_timer_item::clock::ManualClock;
/// use bubbletea_timer_item::engine::TimerSnapshot;
/// use bubbletea_timer_item::item::Model;
/// use bubbletea_timer_item::state::TimerState;
///
/// let clock = ManualClock::new(0);
/// let mut item = Model::with_clock(clock.clone(), &[]);
///
/// item.bind(1, &TimerSnapshot::new(-1_000, TimerState::Expired));
/// assert!(!item.indicator_visible());
///
/// clock.advance(500);
/// item.update(Box::new(item.frame_msg()));
/// assert!(item.indicator_visible());
/// ```
#[derive(Debug, Clone)]
pub struct Model<C: Clock = MonotonicClock> {
    /// Text for the button, description and indicator.
    pub labels: Labels,
    /// Styles used by [`Model::view`].
    pub styles: Styles,
    /// Time between frames.
    pub frame_interval: Duration,
    id: i64,
    tag: i64,
    clock: C,
    engine: RenderDecisionEngine,
    snapshot: Option<TimerSnapshot>,
    bound_timer: Option<i64>,
    time_text: String,
    indicator_visible: bool,
    button_kind: Option<ButtonKind>,
    button_label: String,
    button_description: Option<String>,
}

impl Model {
    /// Creates an item on the monotonic clock with default labels and styles.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new(), &[])
    }

    /// Creates an item on the monotonic clock, configured by `opts`.
    ///
    /// ```rust
    /// use bubbletea_timer_item::item::{with_frame_interval, Model};
    /// use std::time::Duration;
    ///
    /// let item = Model::new_with_options(&[with_frame_interval(Duration::from_millis(50))]);
    /// assert_eq!(item.frame_interval, Duration::from_millis(50));
    /// ```
    pub fn new_with_options(opts: &[ItemOption]) -> Self {
        Self::with_clock(MonotonicClock::new(), opts)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Model<C> {
    /// Creates an item reading time from `clock`, configured by `opts`.
    pub fn with_clock(clock: C, opts: &[ItemOption]) -> Self {
        let mut m = Self {
            labels: Labels::default(),
            styles: Styles::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            id: next_id(),
            tag: 0,
            clock,
            engine: RenderDecisionEngine::new(),
            snapshot: None,
            bound_timer: None,
            time_text: String::new(),
            indicator_visible: true,
            button_kind: None,
            button_label: String::new(),
            button_description: None,
        };

        for opt in opts {
            opt.apply(&mut m);
        }

        m
    }

    /// Sets the labels using builder pattern.
    ///
    /// # Arguments
    ///
    /// * `labels` - Button texts, description and indicator glyph
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::engine::TimerSnapshot;
    /// use bubbletea_timer_item::item::{Labels, Model};
    /// use bubbletea_timer_item::state::TimerState;
    ///
    /// let mut item = Model::new().with_labels(Labels {
    ///     reset: "Remettre".to_string(),
    ///     ..Labels::default()
    /// });
    /// item.bind(1, &TimerSnapshot::new(10_000, TimerState::Reset));
    /// assert_eq!(item.button_label(), "Remettre");
    /// ```
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.set_labels(labels);
        self
    }

    /// Sets the styles using builder pattern.
    ///
    /// # Arguments
    ///
    /// * `styles` - The lipgloss styles for indicator, time and button
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::item::{Model, Styles};
    /// use lipgloss_extras::prelude::*;
    ///
    /// let item = Model::new().with_styles(Styles {
    ///     time: Style::new().foreground(Color::from("#00FF00")),
    ///     ..Styles::default()
    /// });
    /// ```
    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Replaces the labels.
    ///
    /// The button is only relabeled when the timer state changes, so this also
    /// resets the engine to make the next refresh pick up the new text.
    pub fn set_labels(&mut self, labels: Labels) {
        self.labels = labels;
        self.engine.reset();
    }

    /// The item's unique identifier, used to route frame messages.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::item::Model;
    ///
    /// let first = Model::new();
    /// let second = Model::new();
    /// assert_ne!(first.id(), second.id());
    /// assert_eq!(first.frame_msg().id, first.id());
    /// ```
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The identity of the timer this item shows, if bound.
    pub fn bound_timer(&self) -> Option<i64> {
        self.bound_timer
    }

    /// Shows the timer identified by `timer_id`.
    ///
    /// Binding to a different timer than before clears the engine's memory
    /// first, so the button is relabeled even when both timers share a state.
    /// Binding the same timer again is an ordinary refresh.
    ///
    /// ```rust
    /// use bubbletea_timer_item::engine::TimerSnapshot;
    /// use bubbletea_timer_item::item::new;
    /// use bubbletea_timer_item::state::TimerState;
    ///
    /// let mut item = new(&[]);
    /// item.bind(1, &TimerSnapshot::new(60_000, TimerState::Paused));
    /// item.bind(2, &TimerSnapshot::new(5_000, TimerState::Paused));
    /// assert_eq!(item.bound_timer(), Some(2));
    /// assert_eq!(item.time_text(), "00:05");
    /// ```
    pub fn bind<T: TimerSource + ?Sized>(&mut self, timer_id: i64, timer: &T) {
        if self.bound_timer != Some(timer_id) {
            trace!(item = self.id, from = ?self.bound_timer, to = timer_id, "binding timer item");
            self.engine.reset();
            self.bound_timer = Some(timer_id);
        }
        self.update_timer(timer);
    }

    /// Forgets the bound timer and clears what the item shows.
    pub fn unbind(&mut self) {
        trace!(item = self.id, timer = ?self.bound_timer, "unbinding timer item");
        self.engine.reset();
        self.bound_timer = None;
        self.snapshot = None;
        self.time_text.clear();
        self.indicator_visible = true;
        self.button_kind = None;
        self.button_label.clear();
        self.button_description = None;
    }

    /// Refreshes the item from the latest values of its timer.
    pub fn update_timer<T: TimerSource + ?Sized>(&mut self, timer: &T) {
        let snapshot = TimerSnapshot::new(timer.remaining_time_millis(), timer.state());
        self.snapshot = Some(snapshot);
        self.refresh();
    }

    /// Refreshes the item from a snapshot whose state code is unchecked.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateError`] for an unknown state code; the item keeps
    /// showing what it showed before.
    pub fn try_update_timer(&mut self, raw: &RawTimerSnapshot) -> Result<(), InvalidStateError> {
        let snapshot = TimerSnapshot::try_from(*raw).inspect_err(|err| {
            warn!(item = self.id, error = %err, "ignoring timer update");
        })?;
        self.update_timer(&snapshot);
        Ok(())
    }

    fn refresh(&mut self) {
        if let Some(snapshot) = self.snapshot {
            let plan = self.engine.compute_plan(&snapshot, self.clock.now_millis());
            self.apply(&plan);
        }
    }

    fn apply(&mut self, plan: &RenderPlan) {
        self.time_text = plan.displayed_time.to_string();
        self.indicator_visible = plan.blink_visible;

        if !plan.button_updated {
            return;
        }
        match plan.button_kind {
            ButtonKind::Reset => {
                self.button_label = self.labels.reset.clone();
                self.button_description = None;
            }
            ButtonKind::AddMinute => {
                self.button_label = self.labels.add_minute.clone();
                self.button_description = Some(self.labels.add_minute_description.clone());
            }
        }
        self.button_kind = Some(plan.button_kind);
    }

    /// The formatted remaining time, empty before any timer was shown.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::engine::TimerSnapshot;
    /// use bubbletea_timer_item::item::Model;
    /// use bubbletea_timer_item::state::TimerState;
    ///
    /// let mut item = Model::new();
    /// assert_eq!(item.time_text(), "");
    ///
    /// item.update_timer(&TimerSnapshot::new(3_723_000, TimerState::Paused));
    /// assert_eq!(item.time_text(), "1:02:03");
    /// ```
    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    /// Whether the indicator is currently shown.
    ///
    /// Only expired and missed timers ever hide it, during the first half of
    /// each second.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::clock::ManualClock;
    /// use bubbletea_timer_item::engine::TimerSnapshot;
    /// use bubbletea_timer_item::item::Model;
    /// use bubbletea_timer_item::state::TimerState;
    ///
    /// let mut item = Model::with_clock(ManualClock::new(2_100), &[]);
    /// item.update_timer(&TimerSnapshot::new(60_000, TimerState::Running));
    /// assert!(item.indicator_visible());
    ///
    /// item.update_timer(&TimerSnapshot::new(-100, TimerState::Missed));
    /// assert!(!item.indicator_visible());
    /// ```
    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    /// The current button kind, `None` before any timer was shown.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::engine::{ButtonKind, TimerSnapshot};
    /// use bubbletea_timer_item::item::Model;
    /// use bubbletea_timer_item::state::TimerState;
    ///
    /// let mut item = Model::new();
    /// assert_eq!(item.button_kind(), None);
    ///
    /// item.update_timer(&TimerSnapshot::new(5_000, TimerState::Paused));
    /// assert_eq!(item.button_kind(), Some(ButtonKind::Reset));
    /// ```
    pub fn button_kind(&self) -> Option<ButtonKind> {
        self.button_kind
    }

    /// The current button label.
    ///
    /// Rewritten only when the timer changes state, so a running timer keeps
    /// the same label across ticks.
    pub fn button_label(&self) -> &str {
        &self.button_label
    }

    /// The current button description, present only for the add-minute button.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_timer_item::engine::TimerSnapshot;
    /// use bubbletea_timer_item::item::Model;
    /// use bubbletea_timer_item::state::TimerState;
    ///
    /// let mut item = Model::new();
    /// item.update_timer(&TimerSnapshot::new(0, TimerState::Expired));
    /// assert_eq!(item.button_description(), Some("Add 1 minute"));
    ///
    /// item.update_timer(&TimerSnapshot::new(0, TimerState::Reset));
    /// assert_eq!(item.button_description(), None);
    /// ```
    pub fn button_description(&self) -> Option<&str> {
        self.button_description.as_deref()
    }

    /// Creates a frame message addressed to this item.
    pub fn frame_msg(&self) -> FrameMsg {
        FrameMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn frame(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;

        bubbletea_tick(self.frame_interval, move |_| Box::new(FrameMsg { id, tag }) as Msg)
    }

    /// Starts the frame loop.
    pub fn init(&self) -> Cmd {
        self.frame()
    }

    /// Processes frame messages.
    ///
    /// A frame for this item re-evaluates the plan against the clock and
    /// schedules the next frame. Frames for other items and stale frames are
    /// ignored. Before a timer is shown, frames only keep the loop alive.
    pub fn update(&mut self, msg: Msg) -> std::option::Option<Cmd> {
        if let Some(frame) = msg.downcast_ref::<FrameMsg>() {
            if frame.id > 0 && frame.id != self.id {
                return None;
            }

            // A mismatched tag means another frame loop already advanced us.
            if frame.tag > 0 && frame.tag != self.tag {
                return None;
            }

            self.refresh();
            self.tag += 1;
            return Some(self.frame());
        }

        None
    }

    /// Renders the item as `indicator time [button]`.
    ///
    /// A hidden indicator leaves blank cells of the same width so nothing
    /// shifts while it blinks. An item that has not shown a timer renders as
    /// an empty string.
    pub fn view(&self) -> String {
        if self.snapshot.is_none() {
            return String::new();
        }

        let indicator = if self.indicator_visible {
            self.styles.indicator.render(&self.labels.indicator)
        } else {
            " ".repeat(UnicodeWidthStr::width(self.labels.indicator.as_str()))
        };
        let time = self.styles.time.render(&self.time_text);
        let button = self.styles.button.render(&format!("[{}]", self.button_label));

        format!("{} {} {}", indicator, time, button)
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, std::option::Option<Cmd>) {
        let model = Model::new();
        let cmd = model.init();
        (model, Some(cmd))
    }

    fn update(&mut self, msg: Msg) -> std::option::Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

/// Creates an item on the monotonic clock, configured by `opts`.
pub fn new(opts: &[ItemOption]) -> Model {
    Model::new_with_options(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::state::TimerState;
    use lipgloss_extras::lipgloss::strip_ansi;

    fn item_at(now: i64) -> (Model<ManualClock>, ManualClock) {
        let clock = ManualClock::new(now);
        (Model::with_clock(clock.clone(), &[]), clock)
    }

    fn plain_styles() -> Styles {
        Styles {
            indicator: Style::new(),
            time: Style::new(),
            button: Style::new(),
        }
    }

    #[test]
    fn test_unique_ids() {
        let a = new(&[]);
        let b = new(&[]);
        assert_ne!(a.id(), b.id());
        assert!(a.id() > 0);
    }

    #[test]
    fn test_defaults() {
        let item = Model::default();
        assert_eq!(item.labels, *DEFAULT_LABELS);
        assert_eq!(item.frame_interval, DEFAULT_FRAME_INTERVAL);
        assert_eq!(item.bound_timer(), None);
        assert_eq!(item.button_kind(), None);
        assert_eq!(item.view(), "");
    }

    #[test]
    fn test_options_apply() {
        let labels = Labels {
            reset: "Zurücksetzen".to_string(),
            add_minute: "+1 Min".to_string(),
            add_minute_description: "1 Minute hinzufügen".to_string(),
            indicator: "*".to_string(),
        };
        let item = new(&[
            with_labels(labels.clone()),
            with_styles(plain_styles()),
            with_frame_interval(Duration::from_millis(40)),
        ]);
        assert_eq!(item.labels, labels);
        assert_eq!(item.frame_interval, Duration::from_millis(40));
    }

    #[test]
    fn test_running_timer_shows_add_minute() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));

        assert_eq!(item.time_text(), "00:05");
        assert!(item.indicator_visible());
        assert_eq!(item.button_kind(), Some(ButtonKind::AddMinute));
        assert_eq!(item.button_label(), "+1:00");
        assert_eq!(item.button_description(), Some("Add 1 minute"));
    }

    #[test]
    fn test_paused_timer_shows_reset_without_description() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));
        item.update_timer(&TimerSnapshot::new(4_000, TimerState::Paused));

        assert_eq!(item.button_kind(), Some(ButtonKind::Reset));
        assert_eq!(item.button_label(), "Reset");
        assert_eq!(item.button_description(), None);
    }

    #[test]
    fn test_button_relabeled_only_on_state_change() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));

        // Mutating the field directly bypasses the engine reset.
        item.labels.add_minute = "plus one".to_string();
        item.update_timer(&TimerSnapshot::new(4_000, TimerState::Running));
        assert_eq!(item.button_label(), "+1:00");
        assert_eq!(item.time_text(), "00:04");

        item.update_timer(&TimerSnapshot::new(0, TimerState::Expired));
        assert_eq!(item.button_label(), "plus one");
    }

    #[test]
    fn test_set_labels_forces_relabel() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Paused));
        item.set_labels(Labels {
            reset: "Again".to_string(),
            ..Labels::default()
        });
        item.update_timer(&TimerSnapshot::new(5_000, TimerState::Paused));
        assert_eq!(item.button_label(), "Again");
    }

    #[test]
    fn test_rebinding_relabels_same_state() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));
        item.labels.add_minute = "more".to_string();

        item.bind(2, &TimerSnapshot::new(8_000, TimerState::Running));
        assert_eq!(item.bound_timer(), Some(2));
        assert_eq!(item.button_label(), "more");
    }

    #[test]
    fn test_binding_same_timer_is_a_refresh() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));
        item.labels.add_minute = "more".to_string();

        item.bind(1, &TimerSnapshot::new(4_000, TimerState::Running));
        assert_eq!(item.button_label(), "+1:00");
        assert_eq!(item.time_text(), "00:04");
    }

    #[test]
    fn test_unbind_clears_view() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));
        item.unbind();

        assert_eq!(item.bound_timer(), None);
        assert_eq!(item.button_kind(), None);
        assert_eq!(item.button_label(), "");
        assert_eq!(item.view(), "");
    }

    #[test]
    fn test_expired_timer_blinks_on_frames() {
        let (mut item, clock) = item_at(1_200);
        item.bind(1, &TimerSnapshot::new(-200, TimerState::Expired));
        assert!(!item.indicator_visible());
        assert_eq!(item.time_text(), "-00:00");

        clock.set(1_600);
        assert!(item.update(Box::new(item.frame_msg())).is_some());
        assert!(item.indicator_visible());

        clock.set(2_100);
        item.update(Box::new(item.frame_msg()));
        assert!(!item.indicator_visible());
    }

    #[test]
    fn test_running_timer_never_blinks() {
        let (mut item, clock) = item_at(0);
        item.bind(1, &TimerSnapshot::new(60_000, TimerState::Running));
        for _ in 0..20 {
            clock.advance(100);
            item.update(Box::new(item.frame_msg()));
            assert!(item.indicator_visible());
        }
    }

    #[test]
    fn test_invalid_state_code_keeps_previous_view() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(5_000, TimerState::Running));

        let result = item.try_update_timer(&RawTimerSnapshot::new(1_000, 42));
        assert_eq!(result, Err(InvalidStateError::Code(42)));
        assert_eq!(item.time_text(), "00:05");
        assert_eq!(item.button_kind(), Some(ButtonKind::AddMinute));
    }

    #[test]
    fn test_valid_state_code_updates_view() {
        let (mut item, _) = item_at(0);
        let code = TimerState::Reset.code();
        item.try_update_timer(&RawTimerSnapshot::new(120_000, code)).unwrap();
        assert_eq!(item.time_text(), "02:00");
        assert_eq!(item.button_label(), "Reset");
    }

    #[test]
    fn test_frame_with_wrong_id_is_ignored() {
        let (mut item, _) = item_at(0);
        let wrong = FrameMsg {
            id: item.id() + 999,
            tag: 0,
        };
        assert!(item.update(Box::new(wrong)).is_none());
    }

    #[test]
    fn test_stale_frame_tag_is_ignored() {
        let (mut item, _) = item_at(0);
        item.update(Box::new(item.frame_msg()));
        item.update(Box::new(item.frame_msg()));

        let stale = FrameMsg {
            id: item.id(),
            tag: 1,
        };
        assert!(item.update(Box::new(stale)).is_none());
    }

    #[test]
    fn test_frames_before_binding_keep_loop_alive() {
        let (mut item, _) = item_at(0);
        assert!(item.update(Box::new(item.frame_msg())).is_some());
        assert_eq!(item.time_text(), "");
    }

    #[test]
    fn test_view_layout() {
        let (mut item, _) = item_at(0);
        item.bind(1, &TimerSnapshot::new(90_000, TimerState::Running));
        assert_eq!(strip_ansi(&item.view()), "● 01:30 [+1:00]");
    }

    #[test]
    fn test_hidden_indicator_preserves_width() {
        let clock = ManualClock::new(1_200);
        let mut item = Model::with_clock(clock.clone(), &[with_styles(plain_styles())]);
        item.bind(1, &TimerSnapshot::new(-3_000, TimerState::Missed));

        let hidden = item.view();
        clock.set(1_700);
        item.update(Box::new(item.frame_msg()));
        let shown = item.view();

        assert_eq!(hidden, "  -00:03 [+1:00]");
        assert_eq!(shown, "● -00:03 [+1:00]");
        assert_eq!(
            UnicodeWidthStr::width(hidden.as_str()),
            UnicodeWidthStr::width(shown.as_str())
        );
    }

    #[test]
    fn test_builder_methods_apply() {
        let mut item = Model::with_clock(ManualClock::new(0), &[])
            .with_labels(Labels {
                add_minute: "+60s".to_string(),
                ..Labels::default()
            })
            .with_styles(plain_styles())
            .with_labels(Labels {
                add_minute_description: "Add sixty seconds".to_string(),
                add_minute: "+60s".to_string(),
                ..Labels::default()
            });
        item.bind(1, &TimerSnapshot::new(30_000, TimerState::Running));

        assert_eq!(item.button_label(), "+60s");
        assert_eq!(item.button_description(), Some("Add sixty seconds"));
        assert_eq!(strip_ansi(&item.view()), "● 00:30 [+60s]");
    }

    #[test]
    fn test_broadcast_frame_reaches_every_item() {
        let (mut first, clock) = item_at(1_100);
        let mut second = Model::with_clock(clock.clone(), &[]);
        first.bind(1, &TimerSnapshot::new(-1_000, TimerState::Expired));
        second.bind(2, &TimerSnapshot::new(-2_000, TimerState::Missed));
        assert!(!first.indicator_visible());
        assert!(!second.indicator_visible());

        // Advance both loops so their tags are no longer zero.
        first.update(Box::new(first.frame_msg()));
        second.update(Box::new(second.frame_msg()));

        clock.set(1_600);
        assert!(first.update(Box::new(FrameMsg::broadcast())).is_some());
        assert!(second.update(Box::new(FrameMsg::broadcast())).is_some());
        assert!(first.indicator_visible());
        assert!(second.indicator_visible());
    }

    #[test]
    fn test_items_built_apart_blink_together() {
        let mut early = new(&[]);
        std::thread::sleep(Duration::from_millis(500));
        let mut late = new(&[]);
        let expired = TimerSnapshot::new(-1_000, TimerState::Expired);

        // Retry if the two refreshes straddle a half-second boundary.
        for _ in 0..5 {
            let before = MonotonicClock::new().now_millis();
            early.update_timer(&expired);
            late.update_timer(&expired);
            let after = MonotonicClock::new().now_millis();

            if before / 500 == after / 500 {
                assert_eq!(early.indicator_visible(), late.indicator_visible());
                return;
            }
        }
        panic!("could not refresh both items within one half-second phase");
    }

    #[tokio::test]
    async fn test_init_schedules_frame_for_this_item() {
        let item = new(&[with_frame_interval(Duration::from_millis(1))]);
        let msg = item.init().await.expect("frame command yields a message");
        let frame = msg.downcast_ref::<FrameMsg>().expect("frame message");
        assert_eq!(frame.id, item.id());
    }
}
