//! Core domain types for the Hydro water tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Personal factors feeding the goal calculator
//! - Environment (ambient temperature) snapshot
//! - Drink events recorded in the journal
//! - User settings persisted between runs

use crate::cups::CupSize;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Temperature assumed when no observation is available
pub const DEFAULT_TEMPERATURE_CELSIUS: f64 = 22.0;

/// Daily goal used before setup has run
pub const DEFAULT_DAILY_GOAL_ML: u32 = 2000;

/// Largest single drink accepted from the command line
pub const MAX_DRINK_ML: u32 = 5000;

/// Reminder cadence used before setup has run (minutes)
pub const DEFAULT_REMINDER_INTERVAL_MINUTES: u32 = 60;

// ============================================================================
// Personal Factors
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Self-reported weekly exercise level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week or hot climate
    Intense,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 4] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Intense,
    ];
}

/// Immutable snapshot of the person the goal is computed for
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalFactors {
    pub age: u32,
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
}

impl PersonalFactors {
    /// Check the declared input ranges
    ///
    /// The goal calculator itself never validates; this is for the setup
    /// and settings boundary.
    pub fn validate(&self) -> crate::Result<()> {
        if !(1..=120).contains(&self.age) {
            return Err(Error::Validation(format!(
                "age must be between 1 and 120, got {}",
                self.age
            )));
        }
        if !(1.0..=500.0).contains(&self.weight_kg) {
            return Err(Error::Validation(format!(
                "weight must be between 1 and 500 kg, got {}",
                self.weight_kg
            )));
        }
        if !(100.0..=250.0).contains(&self.height_cm) {
            return Err(Error::Validation(format!(
                "height must be between 100 and 250 cm, got {}",
                self.height_cm
            )));
        }
        Ok(())
    }
}

/// Ambient conditions affecting the goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    pub temperature_celsius: f64,
}

impl Environment {
    pub fn new(temperature_celsius: f64) -> Self {
        Self {
            temperature_celsius,
        }
    }

    /// Resolve an optional observation, falling back to 22°C
    pub fn from_observation(temperature_celsius: Option<f64>) -> Self {
        Self::new(temperature_celsius.unwrap_or(DEFAULT_TEMPERATURE_CELSIUS))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE_CELSIUS)
    }
}

// ============================================================================
// Settings Types
// ============================================================================

/// How the daily goal is maintained
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Goal is derived from personal factors and may be recalculated
    Automatic,
    /// Goal is a fixed, user-entered value
    #[default]
    Manual,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorTheme {
    #[default]
    Default,
    Ocean,
    Forest,
    Sunset,
    Lavender,
}

/// Personal factors as stored in settings; any field may be missing
/// until setup has been completed.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
}

impl Profile {
    /// Complete factors, or None if any field is missing or zero
    pub fn factors(&self) -> Option<PersonalFactors> {
        let age = self.age.filter(|a| *a > 0)?;
        let weight_kg = self.weight_kg.filter(|w| *w != 0.0)?;
        let height_cm = self.height_cm.filter(|h| *h != 0.0)?;
        Some(PersonalFactors {
            age,
            sex: self.sex?,
            weight_kg,
            height_cm,
            activity_level: self.activity_level?,
        })
    }
}

impl From<&PersonalFactors> for Profile {
    fn from(factors: &PersonalFactors) -> Self {
        Self {
            age: Some(factors.age),
            sex: Some(factors.sex),
            weight_kg: Some(factors.weight_kg),
            height_cm: Some(factors.height_cm),
            activity_level: Some(factors.activity_level),
        }
    }
}

/// User's persistent settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    pub daily_goal: u32,
    pub reminder_enabled: bool,
    /// Minutes between reminders
    pub reminder_interval: u32,
    #[serde(default)]
    pub setup_completed: bool,
    #[serde(default)]
    pub calculation_mode: CalculationMode,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub cup_size: CupSize,
    #[serde(default)]
    pub smart_scheduling: bool,
    /// "HH:mm"
    #[serde(default)]
    pub wake_time: Option<String>,
    /// "HH:mm"
    #[serde(default)]
    pub sleep_time: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub color_theme: ColorTheme,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL_ML,
            reminder_enabled: true,
            reminder_interval: DEFAULT_REMINDER_INTERVAL_MINUTES,
            setup_completed: false,
            calculation_mode: CalculationMode::default(),
            profile: Profile::default(),
            cup_size: CupSize::default(),
            smart_scheduling: false,
            wake_time: None,
            sleep_time: None,
            theme: Theme::default(),
            color_theme: ColorTheme::default(),
        }
    }
}

// ============================================================================
// Intake Types
// ============================================================================

/// A single recorded drink
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntakeEntry {
    pub id: Uuid,
    pub amount_ml: u32,
    pub timestamp: DateTime<Utc>,
}

impl IntakeEntry {
    /// Create an entry for a drink taken right now
    pub fn now(amount_ml: u32) -> Self {
        Self::at(amount_ml, Utc::now())
    }

    pub fn at(amount_ml: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount_ml,
            timestamp,
        }
    }
}

// ============================================================================
// Parsing and display (CLI boundary)
// ============================================================================

macro_rules! text_enum {
    ($ty:ty, $what:literal, { $($text:literal => $variant:path),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(Error::Validation(format!(
                        concat!("unknown ", $what, ": {}"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

text_enum!(Sex, "sex", {
    "male" => Sex::Male,
    "female" => Sex::Female,
});

text_enum!(ActivityLevel, "activity level", {
    "sedentary" => ActivityLevel::Sedentary,
    "light" => ActivityLevel::Light,
    "moderate" => ActivityLevel::Moderate,
    "intense" => ActivityLevel::Intense,
});

text_enum!(CalculationMode, "calculation mode", {
    "automatic" => CalculationMode::Automatic,
    "manual" => CalculationMode::Manual,
});

text_enum!(Theme, "theme", {
    "light" => Theme::Light,
    "dark" => Theme::Dark,
});

text_enum!(ColorTheme, "color theme", {
    "default" => ColorTheme::Default,
    "ocean" => ColorTheme::Ocean,
    "forest" => ColorTheme::Forest,
    "sunset" => ColorTheme::Sunset,
    "lavender" => ColorTheme::Lavender,
});
