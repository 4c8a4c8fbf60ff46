//! Remaining-time text for the item widget.
//!
//! A countdown reads best when it never shows `00:00` while time is still left,
//! so positive values round up to the next whole second. Once the timer is
//! overdue the overrun is shown with a leading minus sign and counts up in whole
//! seconds.
//!
//! ```rust
//! use bubbletea_timer_item::timer_text::format_remaining;
//!
//! assert_eq!(format_remaining(4_200), "00:05");
//! assert_eq!(format_remaining(0), "00:00");
//! assert_eq!(format_remaining(-61_500), "-01:01");
//! assert_eq!(format_remaining(3_600_000), "1:00:00");
//! ```

use std::fmt;

const MILLIS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Remaining time as carried by a render plan.
///
/// The value is passed through untouched from the timer snapshot; formatting
/// happens only when the widget displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayedTime(i64);

impl DisplayedTime {
    /// Wraps a remaining duration in milliseconds. Negative means overdue.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The wrapped remaining duration in milliseconds.
    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Whether the timer is past zero.
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for DisplayedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_remaining(self.0))
    }
}

/// Formats a remaining duration in milliseconds as `MM:SS` or `H:MM:SS`.
///
/// Non-negative values round up to whole seconds; negative values are shown
/// as `-` followed by their magnitude truncated to whole seconds.
pub fn format_remaining(millis: i64) -> String {
    let negative = millis < 0;
    let magnitude = millis.unsigned_abs();
    let total_seconds = if negative {
        magnitude / MILLIS_PER_SECOND
    } else {
        magnitude.div_ceil(MILLIS_PER_SECOND)
    };

    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    let sign = if negative { "-" } else { "" };

    if hours > 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, minutes, seconds)
    } else {
        format!("{}{:02}:{:02}", sign, minutes, seconds)
    }
}
