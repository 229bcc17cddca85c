//! Duration strings in the issue tracker's timesheet notation.
//!
//! Remaining estimates arrive as strings such as `"3h 20m"` or `"2d"`. The
//! tracker counts a day as a workday and a week as a work week, so the units
//! here are not calendar units.

use std::sync::LazyLock;

use regex::Regex;

/// Hours in one tracker workday.
pub const WORKDAY_HOURS: i64 = 5;

/// Workdays in one tracker week.
pub const WORKWEEK_DAYS: i64 = 5;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_WORKDAY: i64 = WORKDAY_HOURS * SECONDS_PER_HOUR;
const SECONDS_PER_WORKWEEK: i64 = WORKWEEK_DAYS * SECONDS_PER_WORKDAY;

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*([wdhm])").unwrap());

/// Parses a duration string into seconds.
///
/// Accepts any combination of `w`, `d`, `h` and `m` segments with decimal
/// amounts, e.g. `"1h30m"`, `"1w 2d"`, `"0.5h"`. Returns `0` for empty,
/// missing, or unrecognised input; never fails.
pub fn parse_duration(input: Option<&str>) -> i64 {
    let Some(input) = input else {
        return 0;
    };

    let mut total = 0.0_f64;
    for caps in SEGMENT_RE.captures_iter(input) {
        let Ok(amount) = caps[1].parse::<f64>() else {
            continue;
        };
        let unit = match caps[2].to_ascii_lowercase().as_str() {
            "w" => SECONDS_PER_WORKWEEK,
            "d" => SECONDS_PER_WORKDAY,
            "h" => SECONDS_PER_HOUR,
            _ => SECONDS_PER_MINUTE,
        };
        #[expect(clippy::cast_precision_loss, reason = "unit constants are small")]
        let unit = unit as f64;
        total += amount * unit;
    }

    if !total.is_finite() || total <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "estimates are far below i64::MAX seconds"
    )]
    let seconds = total.round() as i64;
    seconds
}

/// Renders seconds as wall-clock hours and minutes, e.g. `"2h 30m"`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
