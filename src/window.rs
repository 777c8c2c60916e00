/// Retention window applied to the past-results view.
pub const PAST_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAge {
    Minutes(u64),
    Hours(u64),
    Days(u64),
}

/// Parse the first `<integer><unit>` token of a relative-time string such as
/// `"5h"`, `"2d 3h ago"` or `"45m"`.
///
/// Only minutes, hours and days are recognised. Anything else (weeks, months,
/// free text) yields `None`.
pub fn parse_relative_age(text: &str) -> Option<RelativeAge> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if !bytes[idx].is_ascii_digit() {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        // Digit runs only fail to parse on overflow; saturate so the unit still decides.
        let value = text[start..idx].parse::<u64>().unwrap_or(u64::MAX);
        let unit = &text[idx..];
        let unit = unit.trim_start_matches(' ');
        return classify_unit(unit, value);
    }
    None
}

fn classify_unit(unit: &str, value: u64) -> Option<RelativeAge> {
    let mut chars = unit.chars().map(|c| c.to_ascii_lowercase());
    match (chars.next(), chars.next()) {
        // "mo" is months, not minutes.
        (Some('m'), Some('o')) => None,
        (Some('m'), _) => Some(RelativeAge::Minutes(value)),
        (Some('h'), _) => Some(RelativeAge::Hours(value)),
        (Some('d'), _) => Some(RelativeAge::Days(value)),
        _ => None,
    }
}

/// Decide whether a relative-time string falls inside a `max_days` window.
///
/// Minutes and hours are always inside. Days are inside iff `<= max_days`.
/// Unparseable text is outside.
pub fn is_within_window(relative_time: &str, max_days: u32) -> bool {
    match parse_relative_age(relative_time) {
        Some(RelativeAge::Minutes(_)) | Some(RelativeAge::Hours(_)) => true,
        Some(RelativeAge::Days(days)) => days <= u64::from(max_days),
        None => false,
    }
}
