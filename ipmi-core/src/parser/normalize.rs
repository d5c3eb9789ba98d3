//! Shared value, unit and status normalization.
//!
//! Both SDR report parsers funnel their raw tokens through here so that unit
//! names and status words come out identically regardless of the format.
//! Known tokens are looked up in static tables; anything else falls back to
//! [`snake_case`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Unit words as printed by ipmitool, keyed lower-case.
static UNIT_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("watts", "watts"),
        ("volts", "volts"),
        ("amps", "amps"),
        ("degrees c", "degrees_c"),
        ("degrees f", "degrees_f"),
        ("rpm", "rpm"),
        ("feet", "feet"),
        ("percent", "percent"),
        ("cfm", "cfm"),
        ("joules", "joules"),
        ("seconds", "seconds"),
        ("unspecified", "unspecified"),
        ("%", "percent"),
    ])
});

/// Discrete readings printed in place of a value, keyed lower-case.
static STATUS_WORDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("no reading", "no_reading"),
        ("not readable", "not_readable"),
        ("disabled", "disabled"),
        ("connected", "connected"),
        ("disconnected", "disconnected"),
        ("presence detected", "presence_detected"),
        ("device present", "device_present"),
        ("device absent", "device_absent"),
        ("drive present", "drive_present"),
        ("fully redundant", "fully_redundant"),
        ("redundancy lost", "redundancy_lost"),
        ("transition to running", "transition_to_running"),
        ("predictive failure", "predictive_failure"),
        ("failure detected", "failure_detected"),
    ])
});

/// `<number>[ <unit>][, <detail>]`
static ANALOG_READING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<value>[-+]?(?:\d+(?:\.\d*)?|\.\d+))(?:\s+(?P<unit>[^,]*?))?\s*(?:,\s*(?P<detail>.*?))?\s*$",
    )
    .expect("Invalid analog reading regex")
});

static HEX_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[xX](?P<digits>[0-9a-fA-F]+)$").expect("Invalid hex value regex"));

/// Classified reading column.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// Nothing in the column.
    Empty,
    /// Numeric value, optionally with a unit and a trailing comma clause.
    Analog { value: f64, unit: Option<String>, detail: Option<String> },
    /// Raw hex byte such as `0x02`.
    Hex(f64),
    /// A word or phrase in place of a value (`No Reading`, `Connected`).
    Discrete(String),
}

impl Reading {
    /// Classify a raw reading column.
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Empty;
        }

        if let Some(value) = parse_hex(text) {
            return Self::Hex(value);
        }

        if let Some(caps) = ANALOG_READING.captures(text) {
            if let Ok(value) = caps["value"].parse::<f64>() {
                let non_empty = |name: &str| {
                    caps.name(name).map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
                };
                return Self::Analog {
                    value,
                    unit: non_empty("unit").and_then(normalize_unit),
                    detail: non_empty("detail")
                        .map(normalize_status_word)
                        .filter(|d| !d.is_empty()),
                };
            }
        }

        Self::Discrete(text.to_string())
    }
}

/// Lower-case a label and turn every run of spaces or punctuation into a
/// single underscore. Leading and trailing separators are dropped.
pub fn snake_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    out
}

/// Normalize a unit word (`degrees C` -> `degrees_c`).
///
/// Returns `None` when nothing usable is left, e.g. for bare punctuation.
pub fn normalize_unit(raw: &str) -> Option<String> {
    let key = collapse_whitespace(raw).to_lowercase();
    let unit = match UNIT_NAMES.get(key.as_str()) {
        Some(unit) => unit.to_string(),
        None => snake_case(raw),
    };
    Some(unit).filter(|u| !u.is_empty())
}

/// Normalize a discrete status word (`Presence detected` -> `presence_detected`).
pub fn normalize_status_word(raw: &str) -> String {
    let key = collapse_whitespace(raw).to_lowercase();
    match STATUS_WORDS.get(key.as_str()) {
        Some(word) => word.to_string(),
        None => snake_case(raw),
    }
}

/// Parse a `0x..` token.
pub fn parse_hex(token: &str) -> Option<f64> {
    let caps = HEX_VALUE.captures(token.trim())?;
    u64::from_str_radix(&caps["digits"], 16).ok().map(|v| v as f64)
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
