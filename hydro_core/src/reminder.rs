//! Reminder scheduling.
//!
//! A single repeating timer drives reminders. Each time it fires, the gate
//! decides whether the reminder is shown: with smart scheduling enabled,
//! reminders are suppressed outside the wake/sleep window.
//!
//! Windows may cross midnight (sleep time earlier in the day than wake
//! time). A window whose wake and sleep times are equal is treated as
//! covering the whole day.

use crate::{CupSize, Error, Result, UserSettings};
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Bounds for the suggested reminder interval (minutes)
pub const MIN_SUGGESTED_INTERVAL: u32 = 30;
pub const MAX_SUGGESTED_INTERVAL: u32 = 120;

/// Parse an "HH:mm" time of day
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| Error::InvalidTimeFormat(text.to_string()))
}

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// The part of the day the user is awake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SleepWindow {
    pub wake: NaiveTime,
    pub sleep: NaiveTime,
}

impl SleepWindow {
    pub fn new(wake: NaiveTime, sleep: NaiveTime) -> Self {
        Self { wake, sleep }
    }

    /// Parse a window from "HH:mm" strings
    pub fn parse(wake: &str, sleep: &str) -> Result<Self> {
        Ok(Self::new(parse_time_of_day(wake)?, parse_time_of_day(sleep)?))
    }

    /// The configured window, if smart scheduling is on and both bounds are set
    ///
    /// Malformed bounds are an error rather than a silently open window.
    pub fn from_settings(settings: &UserSettings) -> Result<Option<Self>> {
        if !settings.smart_scheduling {
            return Ok(None);
        }
        match (&settings.wake_time, &settings.sleep_time) {
            (Some(wake), Some(sleep)) => Self::parse(wake, sleep).map(Some),
            _ => Ok(None),
        }
    }

    /// Whether the window wraps past midnight
    pub fn crosses_midnight(&self) -> bool {
        minutes_since_midnight(self.sleep) < minutes_since_midnight(self.wake)
    }

    /// Whether `now` falls inside the awake window (bounds inclusive)
    pub fn contains(&self, now: NaiveTime) -> bool {
        let wake = minutes_since_midnight(self.wake);
        let sleep = minutes_since_midnight(self.sleep);
        let current = minutes_since_midnight(now);

        if wake == sleep {
            true
        } else if sleep < wake {
            current >= wake || current <= sleep
        } else {
            current >= wake && current <= sleep
        }
    }

    /// Length of the awake period in minutes
    pub fn awake_minutes(&self) -> u32 {
        let wake = minutes_since_midnight(self.wake) as i64;
        let sleep = minutes_since_midnight(self.sleep) as i64;
        let mut awake = sleep - wake;
        if awake <= 0 {
            awake += MINUTES_PER_DAY as i64;
        }
        awake as u32
    }
}

/// Whether a reminder should be shown at `now`
///
/// Always true when smart scheduling is disabled or a bound is missing.
pub fn should_show_reminder(settings: &UserSettings, now: NaiveTime) -> Result<bool> {
    let eligible = match SleepWindow::from_settings(settings)? {
        Some(window) => window.contains(now),
        None => true,
    };
    tracing::debug!("Reminder eligibility at {}: {}", now.format("%H:%M"), eligible);
    Ok(eligible)
}

/// The next wake-time instant strictly after `now`
///
/// Only meaningful with smart scheduling enabled and a wake time set;
/// used for display.
pub fn next_reminder_time(
    settings: &UserSettings,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>> {
    if !settings.smart_scheduling {
        return Ok(None);
    }
    let Some(wake_text) = &settings.wake_time else {
        return Ok(None);
    };
    let wake = parse_time_of_day(wake_text)?;

    let today = now.date().and_time(wake);
    let next = if today <= now {
        today + Duration::days(1)
    } else {
        today
    };
    Ok(Some(next))
}

/// Suggest a reminder cadence so the goal is spread over the awake hours
///
/// Without a window the default of 60 minutes applies. Otherwise the awake
/// period is divided into one more slot than the number of cups needed,
/// clamped to 30..=120 minutes.
pub fn suggest_reminder_interval(
    daily_goal_ml: u32,
    cup: CupSize,
    window: Option<&SleepWindow>,
) -> u32 {
    let Some(window) = window else {
        return crate::types::DEFAULT_REMINDER_INTERVAL_MINUTES;
    };
    let cups = cup.cups_for(daily_goal_ml);
    let interval = window.awake_minutes() / (cups + 1);
    interval.clamp(MIN_SUGGESTED_INTERVAL, MAX_SUGGESTED_INTERVAL)
}

/// Result of polling the reminder timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderTick {
    /// Interval has not elapsed yet
    Waiting,
    /// Interval elapsed but the user is asleep
    Suppressed,
    /// Show the reminder now
    Fire,
}

/// A single repeating timer
///
/// Like a browser interval, the first reminder is due one full interval
/// after the timer starts.
#[derive(Clone, Debug)]
pub struct ReminderTimer {
    interval: Duration,
    next_due: NaiveDateTime,
}

impl ReminderTimer {
    pub fn start(interval_minutes: u32, now: NaiveDateTime) -> Self {
        let interval = Duration::minutes(i64::from(interval_minutes.max(1)));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn next_due(&self) -> NaiveDateTime {
        self.next_due
    }

    /// Advance the timer to `now` and consult the gate if it elapsed
    ///
    /// Missed intervals (e.g. after a suspend) collapse into one tick.
    pub fn poll(&mut self, settings: &UserSettings, now: NaiveDateTime) -> Result<ReminderTick> {
        if now < self.next_due {
            return Ok(ReminderTick::Waiting);
        }
        while self.next_due <= now {
            self.next_due += self.interval;
        }

        if should_show_reminder(settings, now.time())? {
            Ok(ReminderTick::Fire)
        } else {
            tracing::info!("Reminder suppressed outside awake window");
            Ok(ReminderTick::Suppressed)
        }
    }
}
