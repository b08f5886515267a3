//! Timer event definitions.
//!
//! BPMN timers arrive as raw ISO-8601 text — a duration (`PT5M`), a repeating
//! interval (`R3/PT5M`), or an absolute date (RFC 3339). Exactly one of the
//! three must be declared; anything else is a malformed definition and fails
//! the compile.

use crate::error::TransformError;
use crate::model::TimerDecl;
use chrono::DateTime;

/// A repeating wall-clock interval. `repetitions == 0` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingInterval {
    pub repetitions: u32,
    pub interval_ms: u64,
}

/// Compiled timer trigger attached to a catch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledTimer {
    /// Relative duration — an interval that fires exactly once.
    Duration(RepeatingInterval),
    /// Repeating cycle parsed from an ISO repeating-interval expression.
    Cycle(RepeatingInterval),
    /// Absolute due time, epoch milliseconds UTC.
    Date { due_ms: i64 },
}

/// Compile a timer declaration. Duration, cycle, and date are mutually
/// exclusive; zero or more than one declared is a hard error.
pub fn compile(element_id: &str, decl: &TimerDecl) -> Result<CompiledTimer, TransformError> {
    let invalid = |reason: String| TransformError::InvalidTimer {
        element_id: element_id.to_string(),
        reason,
    };

    match (&decl.duration, &decl.cycle, &decl.date) {
        (Some(duration), None, None) => {
            let interval_ms = parse_duration(duration).map_err(&invalid)?;
            Ok(CompiledTimer::Duration(RepeatingInterval {
                repetitions: 1,
                interval_ms,
            }))
        }
        (None, Some(cycle), None) => Ok(CompiledTimer::Cycle(
            parse_repeating(cycle).map_err(&invalid)?,
        )),
        (None, None, Some(date)) => {
            let due = DateTime::parse_from_rfc3339(date)
                .map_err(|e| invalid(format!("invalid date '{date}': {e}")))?;
            Ok(CompiledTimer::Date {
                due_ms: due.timestamp_millis(),
            })
        }
        (None, None, None) => Err(invalid(
            "one of duration, cycle, or date must be declared".to_string(),
        )),
        _ => Err(invalid(
            "duration, cycle, and date are mutually exclusive".to_string(),
        )),
    }
}

/// Parse an ISO-8601 duration (`P[nW][nD][T[nH][nM][nS]]`) to milliseconds.
/// Years and months are rejected — they have no fixed length.
fn parse_duration(text: &str) -> Result<u64, String> {
    let err = || format!("invalid duration '{text}'");
    let rest = text.strip_prefix('P').ok_or_else(err)?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut total_ms = 0f64;
    let mut seen = false;
    for (part, in_time) in [(date_part, false), (time_part.unwrap_or(""), true)] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let value: f64 = number.parse().map_err(|_| err())?;
            number.clear();
            seen = true;
            let unit_ms = match (c, in_time) {
                ('W', false) => 7.0 * 86_400_000.0,
                ('D', false) => 86_400_000.0,
                ('H', true) => 3_600_000.0,
                ('M', true) => 60_000.0,
                ('S', true) => 1_000.0,
                _ => return Err(err()),
            };
            total_ms += value * unit_ms;
        }
        if !number.is_empty() {
            return Err(err());
        }
    }
    if !seen {
        return Err(err());
    }
    Ok(total_ms as u64)
}

/// Parse an ISO-8601 repeating interval (`R[n]/<duration>`). A missing
/// repetition count means unbounded.
fn parse_repeating(text: &str) -> Result<RepeatingInterval, String> {
    let err = || format!("invalid repeating interval '{text}'");
    let rest = text.strip_prefix('R').ok_or_else(err)?;
    let (count, duration) = rest.split_once('/').ok_or_else(err)?;
    let repetitions = if count.is_empty() {
        0
    } else {
        count.parse::<u32>().map_err(|_| err())?
    };
    Ok(RepeatingInterval {
        repetitions,
        interval_ms: parse_duration(duration)?,
    })
}
