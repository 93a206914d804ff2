#![forbid(unsafe_code)]

//! Core domain model and business logic for the Hydro water tracker.
//!
//! This crate provides:
//! - Domain types (personal factors, drink entries, settings)
//! - Daily goal calculation and recalculation advice
//! - Reminder gating around the user's sleep window
//! - Persistence (journal, CSV archive, settings) behind sidecar locks
//! - History aggregates and daily achievements

pub mod types;
pub mod error;
pub mod cups;
pub mod config;
pub mod logging;
pub mod goal;
pub mod reminder;
pub mod weather;
pub mod setup;
pub mod lock;
pub mod journal;
pub mod csv_rollup;
pub mod settings;
pub mod history;
pub mod achievements;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use cups::CupSize;
pub use config::Config;
pub use goal::{calculate_optimal_intake, should_recalculate_goal, RecalculationAdvice};
pub use reminder::{
    next_reminder_time, should_show_reminder, suggest_reminder_interval, ReminderTick,
    ReminderTimer, SleepWindow,
};
pub use weather::{WeatherCondition, WeatherObservation};
pub use setup::SetupInput;
pub use journal::{IntakeSink, JsonlJournal};
pub use history::{load_entries, DailyTotal};
