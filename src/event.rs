// MIT License - Copyright (c) 2026 Peter Wright
// Event classification

use crate::telegram::Telegram;

/// What a decoded telegram means for the bridge.
///
/// Exactly one variant per telegram: the code sets in
/// [`constants`](crate::constants) are disjoint and [`classify`] is a single
/// `match`, so an overlapping code would show up as an unreachable pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Open/close report; the qualifier says which direction.
    ArmDisarm(char),
    /// Alarm condition, carrying the numeric event code.
    AlarmCondition(u16),
    /// Manual or periodic test report.
    PeriodicTest,
    /// Anything else. Logged, no effects.
    NoAction,
}

impl Classification {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ArmDisarm(_) => "arm/disarm",
            Self::AlarmCondition(_) => "alarm",
            Self::PeriodicTest => "test report",
            Self::NoAction => "no action",
        }
    }
}

/// Classify a telegram by its event code.
pub fn classify(telegram: &Telegram) -> Classification {
    match telegram.event_code_value() {
        Some(code) => classify_code(code, telegram.qualifier()),
        None => Classification::NoAction,
    }
}

/// Classify a numeric event code. Total over `u16`.
///
/// Patterns mirror the code sets in [`constants`](crate::constants).
pub fn classify_code(code: u16, qualifier: char) -> Classification {
    match code {
        400 | 401 | 402 | 403 | 404 | 407 | 409 => Classification::ArmDisarm(qualifier),
        101 | 110 | 111 | 112 | 113 | 114 | 117 | 120 | 122 | 123 | 129 | 130 | 131 | 132
        | 133 | 134 | 136 | 137 | 139 | 140 | 141 | 142 | 144 | 145 | 146 | 147 | 150 => {
            Classification::AlarmCondition(code)
        }
        601 | 602 => Classification::PeriodicTest,
        _ => Classification::NoAction,
    }
}
